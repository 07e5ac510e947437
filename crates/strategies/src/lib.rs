use core_types::{Bar, Signal};

pub mod error;
pub mod momentum;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use momentum::MomentumScorer;
pub use types::{ScorerSettings, SignalWeights};

/// The universal interface for a signal generator.
///
/// A generator analyzes an ordered bar window for one symbol and produces a
/// trading `Signal`. Implementations must be pure: no state retained between
/// calls, identical windows always yield identical signals. The risk manager
/// and backtester depend only on this trait, never on a concrete generator.
pub trait SignalGenerator: Send + Sync {
    /// The name of the generator.
    fn name(&self) -> &'static str;

    /// The minimum number of bars `evaluate` needs before it can produce a
    /// signal instead of an `InsufficientData` error.
    fn min_history(&self) -> usize;

    /// Evaluates the window and produces a signal for its final bar.
    ///
    /// # Errors
    ///
    /// * `Error::Indicator` when the window is too short for a required
    ///   indicator; callers skip the symbol for this tick.
    fn evaluate(&self, bars: &[Bar]) -> Result<Signal>;
}
