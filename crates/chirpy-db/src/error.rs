use chirpy_crypto::HashError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("email already in use")]
    EmailTaken,
    #[error("id counter exhausted")]
    IdsExhausted,
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode snapshot: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("snapshot is corrupt: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Hash(#[from] HashError),
    #[error("store lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, StoreError>;
