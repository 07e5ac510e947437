use thiserror::Error;

use crate::types::OrderHandle;

#[derive(Error, Debug)]
pub enum Error {
    /// The venue was unreachable or rejected the request.
    #[error("venue error: {reason}")]
    Venue { reason: String },

    #[error("unknown order handle {0:?}")]
    UnknownOrder(OrderHandle),

    /// Submission kept failing through the whole retry budget. The order is
    /// dropped; no position state has changed.
    #[error("order submission failed after {attempts} attempts: {reason}")]
    RetriesExhausted { attempts: u32, reason: String },

    #[error("invalid venue settings: {0}")]
    InvalidSettings(String),
}

pub type Result<T> = std::result::Result<T, Error>;
