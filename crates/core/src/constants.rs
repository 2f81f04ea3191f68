//! Constants used throughout the Medical Tracker core crate.
//!
//! Storage keys, retention limits and defaults live here so the store, the reconciler and the
//! front ends agree on them.

/// Storage key for the serialized prediction history.
pub const HISTORY_KEY: &str = "med_tracker_history_v1";

/// Storage key for the serialized quick-symptom list.
pub const QUICK_SYMPTOMS_KEY: &str = "med_quick_symptoms_v1";

/// Maximum number of history entries kept in the local store.
pub const HISTORY_LIMIT: usize = 50;

/// Maximum number of entries kept in the quick-symptom list.
pub const QUICK_SYMPTOMS_LIMIT: usize = 120;

/// Maximum number of positive matches shown for one prediction.
pub const DISPLAY_LIMIT: usize = 10;

/// Separator between the query and timestamp halves of a history dedup key.
pub const DEDUP_KEY_SEPARATOR: &str = "||";

/// Separator used when joining symptom tokens into a history query.
pub const QUERY_SEPARATOR: &str = ", ";

/// Display format for history timestamps.
pub const WHEN_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Quick symptoms offered when nothing usable is stored.
pub const DEFAULT_QUICK_SYMPTOMS: &[&str] = &[
    "fever",
    "cough",
    "sore throat",
    "runny nose",
    "headache",
    "fatigue",
    "nausea",
    "diarrhea",
    "loss of taste",
    "loss of smell",
    "shortness of breath",
    "sneezing",
];

/// Default directory for the local key-value store when none is configured.
pub const DEFAULT_DATA_DIR: &str = "medtracker_data";

/// Default timeout applied to remote history calls, in seconds.
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 10;

/// Path of the remote history endpoint, relative to the remote base URL.
pub const HISTORY_API_PATH: &str = "/api/history";

/// Mean earth radius used for distance calculations, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;
