use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not encode stored value: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("no saved document with id {0}")]
    NotFound(String),

    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}
