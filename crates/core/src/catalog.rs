//! The condition catalog.
//!
//! The catalog is loaded once at startup and never mutated afterwards. A built-in catalog is
//! always available; deployments may replace it with a YAML file (see [`Catalog::load`]).

use crate::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// One known condition with its canonical symptoms and supportive-care suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub causes: String,
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub meds: Vec<String>,
}

/// Ordered, immutable list of conditions.
///
/// Order matters: the matcher keeps catalog order for conditions that score identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    conditions: Vec<Condition>,
}

impl Catalog {
    /// Builds a catalog from the given conditions.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidCatalog` if a condition has an empty id or name, or if two
    /// conditions share an id.
    pub fn new(conditions: Vec<Condition>) -> CoreResult<Self> {
        let mut seen = HashSet::new();
        for condition in &conditions {
            if condition.id.trim().is_empty() {
                return Err(CoreError::InvalidCatalog("condition id cannot be empty".into()));
            }
            if condition.name.trim().is_empty() {
                return Err(CoreError::InvalidCatalog(format!(
                    "condition '{}' has an empty name",
                    condition.id
                )));
            }
            if !seen.insert(condition.id.as_str()) {
                return Err(CoreError::InvalidCatalog(format!(
                    "duplicate condition id '{}'",
                    condition.id
                )));
            }
        }
        Ok(Self { conditions })
    }

    /// The catalog compiled into the crate.
    pub fn builtin() -> Self {
        let conditions = BUILTIN_CONDITIONS
            .iter()
            .map(|c| Condition {
                id: c.id.to_owned(),
                name: c.name.to_owned(),
                description: c.description.to_owned(),
                causes: c.causes.to_owned(),
                symptoms: c.symptoms.iter().map(|s| (*s).to_owned()).collect(),
                meds: c.meds.iter().map(|m| (*m).to_owned()).collect(),
            })
            .collect();
        Self { conditions }
    }

    /// Parses a YAML sequence of conditions.
    pub fn from_yaml_str(yaml: &str) -> CoreResult<Self> {
        let conditions: Vec<Condition> =
            serde_yaml::from_str(yaml).map_err(CoreError::CatalogDeserialization)?;
        Self::new(conditions)
    }

    /// Reads and parses a YAML catalog file.
    pub fn from_yaml_file(path: &Path) -> CoreResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(CoreError::CatalogRead)?;
        Self::from_yaml_str(&contents)
    }

    /// Resolves the catalog for this process.
    ///
    /// With no override the built-in catalog is returned. An override that cannot be read or
    /// parsed is logged and the built-in catalog is used instead.
    pub fn load(override_file: Option<&Path>) -> Self {
        let Some(path) = override_file else {
            return Self::builtin();
        };

        match Self::from_yaml_file(path) {
            Ok(catalog) => {
                tracing::info!(
                    "loaded {} conditions from {}",
                    catalog.len(),
                    path.display()
                );
                catalog
            }
            Err(e) => {
                tracing::warn!(
                    "catalog override {} unusable, falling back to built-in catalog: {}",
                    path.display(),
                    e
                );
                Self::builtin()
            }
        }
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn get(&self, id: &str) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

struct BuiltinCondition {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    causes: &'static str,
    symptoms: &'static [&'static str],
    meds: &'static [&'static str],
}

const BUILTIN_CONDITIONS: &[BuiltinCondition] = &[
    BuiltinCondition {
        id: "common_cold",
        name: "Common Cold",
        description: "A mild viral infection of the nose and throat.",
        causes: "Many types of viruses (rhinoviruses most common).",
        symptoms: &["sneezing", "sore throat", "runny nose", "congestion", "cough", "mild fever"],
        meds: &["Rest", "Paracetamol/Ibuprofen", "Decongestants (short-term)"],
    },
    BuiltinCondition {
        id: "influenza",
        name: "Influenza (Flu)",
        description: "A contagious respiratory illness caused by influenza viruses.",
        causes: "Influenza A and B viruses (seasonal).",
        symptoms: &["fever", "body ache", "chills", "headache", "cough", "fatigue"],
        meds: &[
            "Antivirals (early, consult doctor)",
            "Paracetamol/Ibuprofen",
            "Rest & fluids",
        ],
    },
    BuiltinCondition {
        id: "covid19",
        name: "COVID-19",
        description: "Respiratory infection by SARS-CoV-2 with variable severity.",
        causes: "SARS-CoV-2 virus transmitted via respiratory droplets/aerosols.",
        symptoms: &[
            "fever",
            "dry cough",
            "loss of taste",
            "loss of smell",
            "fatigue",
            "sore throat",
            "shortness of breath",
        ],
        meds: &[
            "Follow local testing guidance",
            "Symptomatic care",
            "Seek medical care if breathing difficulty",
        ],
    },
    BuiltinCondition {
        id: "migraine",
        name: "Migraine",
        description: "A neurological condition causing severe, recurring headaches.",
        causes: "Often genetic and environmental triggers (food, stress, sleep).",
        symptoms: &[
            "headache",
            "nausea",
            "light sensitivity",
            "sound sensitivity",
            "visual aura",
        ],
        meds: &["Triptans (prescription)", "NSAIDs/Paracetamol", "Dark quiet room"],
    },
    BuiltinCondition {
        id: "gastroenteritis",
        name: "Gastroenteritis (Stomach infection)",
        description: "Inflammation of stomach and intestines causing diarrhea and vomiting.",
        causes: "Viral (norovirus), bacterial, or parasitic infections; foodborne toxins.",
        symptoms: &["diarrhea", "vomiting", "stomach pain", "fever", "nausea"],
        meds: &["Oral rehydration", "Antiemetic (doctor advice)", "Rest"],
    },
    BuiltinCondition {
        id: "pneumonia",
        name: "Pneumonia",
        description: "Infection of the lungs causing inflammation and possible difficulty breathing.",
        causes: "Bacterial (e.g. Streptococcus), viral, or fungal organisms.",
        symptoms: &[
            "fever",
            "productive cough",
            "shortness of breath",
            "chest pain",
            "fatigue",
        ],
        meds: &[
            "Antibiotics (if bacterial)",
            "Supportive oxygen/fluids",
            "Seek medical care",
        ],
    },
    BuiltinCondition {
        id: "dengue",
        name: "Dengue",
        description: "Mosquito-borne viral infection that can cause high fever and bleeding.",
        causes: "Dengue virus transmitted by Aedes mosquitoes.",
        symptoms: &[
            "high fever",
            "severe headache",
            "joint pain",
            "rash",
            "bleeding tendencies",
        ],
        meds: &[
            "Hydration",
            "Paracetamol (avoid NSAIDs if bleeding risk)",
            "Seek medical care",
        ],
    },
    BuiltinCondition {
        id: "malaria",
        name: "Malaria",
        description: "Parasitic infection transmitted by mosquitoes causing cyclical fevers.",
        causes: "Plasmodium species carried by Anopheles mosquitoes.",
        symptoms: &["fever", "chills", "sweats", "headache", "muscle pain"],
        meds: &["Antimalarial drugs (prescription)", "Prompt medical treatment"],
    },
    BuiltinCondition {
        id: "typhoid",
        name: "Typhoid Fever",
        description: "Systemic bacterial infection from Salmonella typhi.",
        causes: "Contaminated food/water with Salmonella typhi.",
        symptoms: &[
            "sustained fever",
            "abdominal pain",
            "constipation/diarrhea",
            "headache",
        ],
        meds: &["Antibiotics (prescription)", "Hydration and supportive care"],
    },
    BuiltinCondition {
        id: "asthma",
        name: "Asthma (Exacerbation)",
        description: "Chronic lung condition with reversible airway narrowing.",
        causes: "Allergic triggers, infections, exercise, irritants.",
        symptoms: &["wheezing", "shortness of breath", "chest tightness", "cough"],
        meds: &[
            "Inhaled bronchodilators (salbutamol)",
            "Inhaled steroids (maintenance)",
            "Seek emergency care if severe",
        ],
    },
    BuiltinCondition {
        id: "hypertension",
        name: "Hypertension (High blood pressure)",
        description: "Chronic elevation of blood pressure, often without symptoms.",
        causes: "Genetics, diet, obesity, sedentary lifestyle, other conditions.",
        symptoms: &["often asymptomatic", "headache (occasionally)"],
        meds: &[
            "Lifestyle changes",
            "Antihypertensive medications (prescription)",
        ],
    },
    BuiltinCondition {
        id: "diabetes",
        name: "Diabetes Mellitus",
        description: "Disorder of blood glucose regulation; type 1 and type 2 exist.",
        causes: "Autoimmune (type 1) or insulin resistance/defects (type 2).",
        symptoms: &[
            "increased thirst",
            "frequent urination",
            "weight loss",
            "fatigue",
            "blurred vision",
        ],
        meds: &[
            "Insulin (type 1)",
            "Oral hypoglycemics (type 2)",
            "Diet & exercise",
        ],
    },
    BuiltinCondition {
        id: "anemia",
        name: "Anemia",
        description: "Low hemoglobin reducing oxygen-carrying capacity of blood.",
        causes: "Iron deficiency, chronic disease, B12/folate deficiency, blood loss.",
        symptoms: &["fatigue", "pallor", "shortness of breath", "palpitations"],
        meds: &[
            "Iron supplementation (if iron deficiency)",
            "Treat underlying cause",
        ],
    },
    BuiltinCondition {
        id: "arthritis",
        name: "Arthritis (Osteoarthritis/Rheumatoid)",
        description: "Joint inflammation causing pain and stiffness.",
        causes: "Wear-and-tear (osteoarthritis) or autoimmune (rheumatoid).",
        symptoms: &[
            "joint pain",
            "stiffness",
            "reduced range of motion",
            "swelling",
        ],
        meds: &[
            "Analgesics/NSAIDs",
            "Physiotherapy",
            "Disease-modifying drugs (rheumatoid)",
        ],
    },
    BuiltinCondition {
        id: "food_poisoning",
        name: "Food Poisoning",
        description: "Illness from ingesting contaminated food or drinks.",
        causes: "Bacteria, viruses, parasites, toxins in food.",
        symptoms: &["nausea", "vomiting", "diarrhea", "stomach cramps", "fever"],
        meds: &["Hydration", "Rest", "Seek care if severe or prolonged"],
    },
    BuiltinCondition {
        id: "urinary_tract_infection",
        name: "Urinary Tract Infection (UTI)",
        description: "Infection of urinary tract, often causing painful urination.",
        causes: "Bacterial infection (commonly E. coli).",
        symptoms: &[
            "dysuria",
            "frequency",
            "urgency",
            "lower abdominal pain",
            "fever",
        ],
        meds: &[
            "Antibiotics (prescription)",
            "Hydration",
            "Urine culture as advised",
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_catalog_has_unique_ids() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), 16);
        assert!(Catalog::new(catalog.conditions().to_vec()).is_ok());
    }

    #[test]
    fn builtin_catalog_keeps_declaration_order() {
        let catalog = Catalog::builtin();
        let ids: Vec<&str> = catalog.conditions().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids[0], "common_cold");
        assert_eq!(ids[1], "influenza");
        assert_eq!(ids[15], "urinary_tract_infection");
    }

    #[test]
    fn from_yaml_str_parses_conditions() {
        let yaml = r#"
- id: hay_fever
  name: Hay Fever
  symptoms: [sneezing, itchy eyes]
  meds: [Antihistamines]
- id: sprain
  name: Sprain
  description: Stretched ligament.
  symptoms: [swelling, joint pain]
"#;
        let catalog = Catalog::from_yaml_str(yaml).unwrap();
        assert_eq!(catalog.len(), 2);
        let sprain = catalog.get("sprain").unwrap();
        assert_eq!(sprain.description, "Stretched ligament.");
        assert!(sprain.meds.is_empty());
    }

    #[test]
    fn from_yaml_str_rejects_duplicate_ids() {
        let yaml = r#"
- id: flu
  name: Flu
  symptoms: [fever]
- id: flu
  name: Flu again
  symptoms: [cough]
"#;
        let err = Catalog::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, CoreError::InvalidCatalog(_)));
    }

    #[test]
    fn from_yaml_str_rejects_malformed_yaml() {
        let err = Catalog::from_yaml_str("- id: [unclosed").unwrap_err();
        assert!(matches!(err, CoreError::CatalogDeserialization(_)));
    }

    #[test]
    fn load_falls_back_to_builtin_on_bad_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not: a list").unwrap();

        let catalog = Catalog::load(Some(file.path()));
        assert_eq!(catalog, Catalog::builtin());
    }

    #[test]
    fn load_falls_back_to_builtin_on_missing_override() {
        let catalog = Catalog::load(Some(Path::new("/definitely/not/here.yaml")));
        assert_eq!(catalog, Catalog::builtin());
    }

    #[test]
    fn load_uses_valid_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "- id: gout\n  name: Gout\n  symptoms: [joint pain]").unwrap();

        let catalog = Catalog::load(Some(file.path()));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.conditions()[0].name, "Gout");
    }
}
