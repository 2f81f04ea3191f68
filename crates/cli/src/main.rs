use clap::{Parser, Subcommand};
use medtracker_client::ConfiguredRemote;
use medtracker_core::{
    places::places_from_overpass, Catalog, CoreConfig, Coordinates, FileStore,
    HistoryEntry, Prediction, Session,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "medtracker")]
#[command(about = "Medical Tracker symptom checker CLI")]
struct Cli {
    /// Directory for local history and quick symptoms (overrides MEDTRACKER_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<String>,
    /// Base URL of the remote history store (overrides MEDTRACKER_REMOTE_URL)
    #[arg(long, global = true)]
    remote_url: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict likely conditions from symptoms
    Predict {
        /// Symptoms, separated by commas, semicolons, slashes, pipes or "and"
        text: Vec<String>,
        /// Add a quick symptom to the input (repeatable)
        #[arg(long = "select")]
        select: Vec<String>,
    },
    /// Show prediction history
    History {
        /// Skip the remote store and show local history only
        #[arg(long)]
        local: bool,
    },
    /// Manage quick symptoms
    Quick {
        #[command(subcommand)]
        action: QuickCommands,
    },
    /// List the known conditions
    Catalog,
    /// List medical facilities from a saved Overpass result, nearest first
    Places {
        /// Overpass JSON document
        #[arg(long)]
        file: PathBuf,
        /// Your latitude
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Your longitude
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
}

#[derive(Subcommand)]
enum QuickCommands {
    /// List quick symptoms
    List {
        /// Only show symptoms containing this text
        #[arg(long)]
        filter: Option<String>,
    },
    /// Add a quick symptom
    Add {
        /// Symptom to add
        symptom: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("medtracker_core=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let cfg = CoreConfig::from_env_values(
        cli.data_dir.or_else(|| std::env::var("MEDTRACKER_DATA_DIR").ok()),
        cli.remote_url
            .or_else(|| std::env::var("MEDTRACKER_REMOTE_URL").ok()),
        std::env::var("MEDTRACKER_REMOTE_TIMEOUT_SECS").ok(),
        std::env::var("MEDTRACKER_CATALOG_FILE").ok(),
    )?;

    let catalog = Arc::new(Catalog::load(cfg.catalog_file()));
    let store = FileStore::open(cfg.data_dir())?;
    let remote = ConfiguredRemote::from_config(&cfg)?;
    let mut session = Session::new(catalog, store, remote)?;

    match cli.command {
        Some(Commands::Predict { text, select }) => {
            for symptom in &select {
                if let Err(e) = session.toggle_selection(symptom) {
                    eprintln!("Ignoring selected symptom '{}': {}", symptom, e);
                }
            }

            match session.run_prediction(&text.join(" ")) {
                Ok((prediction, pending)) => {
                    print_prediction(&prediction);
                    if let Some(pending) = pending {
                        if let Err(e) = pending.await {
                            tracing::warn!("remote history send did not complete: {}", e);
                        }
                    }
                }
                Err(e) => eprintln!("Error running prediction: {}", e),
            }
        }
        Some(Commands::History { local }) => {
            let history = if local {
                session.history()
            } else {
                session.load_history().await
            };
            match history {
                Ok(entries) => print_history(&entries),
                Err(e) => eprintln!("Error loading history: {}", e),
            }
        }
        Some(Commands::Quick {
            action: QuickCommands::List { filter },
        }) => {
            for symptom in session.quick_symptoms(filter.as_deref().unwrap_or("")) {
                println!("{}", symptom);
            }
        }
        Some(Commands::Quick {
            action: QuickCommands::Add { symptom },
        }) => match session.add_quick_symptom(&symptom) {
            Ok(Some(added)) => println!("Added quick symptom: {}", added),
            Ok(None) => println!("Already in quick symptoms: {}", symptom.trim()),
            Err(e) => eprintln!("Error adding quick symptom: {}", e),
        },
        Some(Commands::Catalog) => {
            for condition in session.catalog().conditions() {
                println!("{} ({})", condition.name, condition.id);
                println!("    symptoms: {}", condition.symptoms.join(", "));
            }
        }
        Some(Commands::Places { file, lat, lon }) => {
            session.set_location(lat, lon);
            let origin = session.location().unwrap_or(Coordinates::new(lat, lon));
            match std::fs::read_to_string(&file)
                .map_err(|e| e.to_string())
                .and_then(|raw| {
                    serde_json::from_str::<serde_json::Value>(&raw).map_err(|e| e.to_string())
                })
            {
                Ok(document) => {
                    let places = places_from_overpass(&document, origin);
                    if places.is_empty() {
                        println!("No nearby clinics found.");
                    }
                    for place in places {
                        println!(
                            "{:>6} m  {} ({})",
                            (place.distance_km * 1000.0).round(),
                            place.name,
                            place.kind
                        );
                    }
                }
                Err(e) => eprintln!("Error reading {}: {}", file.display(), e),
            }
        }
        None => {
            println!("Use 'medtracker --help' for commands");
        }
    }

    Ok(())
}

fn print_prediction(prediction: &Prediction) {
    println!("Symptoms: {}", prediction.entry.query);

    let matches = prediction.matches();
    if matches.is_empty() {
        println!("No conditions matched your symptoms.");
        return;
    }

    for condition in matches {
        println!(
            "{:>4}%  {}  (matches {} symptom(s))",
            (condition.score * 100.0).round(),
            condition.name,
            condition.match_count
        );
        if !condition.description.is_empty() {
            println!("       {}", condition.description);
        }
        if !condition.causes.is_empty() {
            println!("       Causes: {}", condition.causes);
        }
    }

    let care = prediction.supportive_care();
    if !care.is_empty() {
        println!();
        println!("Suggested supportive medications / steps: {}", care.join(", "));
    }
}

fn print_history(entries: &[HistoryEntry]) {
    if entries.is_empty() {
        println!("No saved history.");
        return;
    }
    for entry in entries {
        println!(
            "{}  {}  (top: {})",
            entry.when,
            entry.query,
            entry.top.as_deref().unwrap_or("none")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use medtracker_core::tokenize;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn predict_collects_words_and_selections() {
        let cli = Cli::parse_from([
            "medtracker",
            "predict",
            "sore",
            "throat,",
            "cough",
            "--select",
            "fever",
            "--select",
            "chills",
        ]);
        match cli.command {
            Some(Commands::Predict { text, select }) => {
                let typed: Vec<String> = tokenize(&text.join(" "))
                    .into_iter()
                    .map(|t| t.into_string())
                    .collect();
                assert_eq!(typed, vec!["sore throat", "cough"]);
                assert_eq!(select, vec!["fever", "chills"]);
            }
            _ => panic!("expected predict"),
        }
    }

    #[test]
    fn places_accepts_negative_coordinates() {
        let cli = Cli::parse_from([
            "medtracker",
            "places",
            "--file",
            "osm.json",
            "--lat",
            "-33.86",
            "--lon",
            "151.2",
        ]);
        match cli.command {
            Some(Commands::Places { lat, lon, .. }) => {
                assert_eq!(lat, -33.86);
                assert_eq!(lon, 151.2);
            }
            _ => panic!("expected places"),
        }
    }

    #[test]
    fn global_options_follow_subcommands() {
        let cli = Cli::parse_from(["medtracker", "history", "--local", "--data-dir", "/tmp/m"]);
        assert_eq!(cli.data_dir.as_deref(), Some("/tmp/m"));
        assert!(matches!(cli.command, Some(Commands::History { local: true })));
    }
}
