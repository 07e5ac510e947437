use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("insufficient data: required {required} bars, got {got}")]
    InsufficientData { required: usize, got: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
