use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to write record: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
