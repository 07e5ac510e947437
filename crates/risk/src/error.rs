use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// An entry would breach a portfolio constraint. This is expected
    /// control flow, not a fault: callers log it and move on.
    #[error("entry vetoed by risk manager: {reason}")]
    Vetoed { reason: String },

    #[error("invalid risk parameters: {0}")]
    InvalidParameters(String),
}

pub type Result<T> = std::result::Result<T, Error>;
