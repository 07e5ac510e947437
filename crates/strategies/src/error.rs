use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Bad weights or thresholds. Fatal at startup, never raised mid-run.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A required indicator could not be computed for this window.
    /// Non-fatal: the symbol is skipped for the current tick.
    #[error(transparent)]
    Indicator(#[from] indicators::Error),
}

impl Error {
    /// True when the error only means "not enough history yet".
    pub fn is_insufficient_data(&self) -> bool {
        matches!(
            self,
            Error::Indicator(indicators::Error::InsufficientData { .. })
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
