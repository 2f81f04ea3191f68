#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("please enter or select at least one symptom")]
    EmptySymptoms,
    #[error("invalid symptom: {0}")]
    InvalidSymptom(#[from] medtracker_types::TokenError),

    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to read store entry '{key}': {source}")]
    StoreRead {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write store entry '{key}': {source}")]
    StoreWrite {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid store key: {0}")]
    InvalidStoreKey(String),
    #[error("store lock poisoned")]
    StoreLockPoisoned,
    #[error("failed to serialize store value: {0}")]
    Serialization(serde_json::Error),

    #[error("failed to read catalog file: {0}")]
    CatalogRead(std::io::Error),
    #[error("failed to deserialize catalog YAML: {0}")]
    CatalogDeserialization(serde_yaml::Error),
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
