use async_trait::async_trait;
use core_types::{Bar, OrderRequest};

pub mod error;
pub mod retry;
pub mod simulated;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use retry::{submit_with_backoff, RetryPolicy};
pub use simulated::SimulatedVenue;
pub use types::{FillModel, FillStatus, OrderHandle, SimulationSettings};

/// The universal interface to an order-routing venue.
///
/// A `Venue` accepts validated `OrderRequest`s and reports fills. The core
/// never assumes a synchronous fill: after submission it polls `get_fill`
/// and treats [`FillStatus::Pending`] as non-terminal, with no change to any
/// position state. In production this is a broker adapter; in a backtest it
/// is the simulated fill model.
#[async_trait]
pub trait Venue: Send {
    /// The name of the venue (e.g. "SimulatedVenue").
    fn name(&self) -> &'static str;

    /// Submits an order and returns a handle for polling.
    async fn submit_order(&mut self, order: &OrderRequest) -> Result<OrderHandle>;

    /// Polls a previously submitted order. Each fill is reported exactly
    /// once; later polls of the same handle error with `UnknownOrder`.
    async fn get_fill(&mut self, handle: OrderHandle) -> Result<FillStatus>;

    /// Cancels a resting order. Errors if the order has already filled.
    async fn cancel(&mut self, handle: OrderHandle) -> Result<()>;

    /// Gives the venue sight of the latest bar. A broker-backed venue has
    /// its own market data and ignores this; the simulated venue prices its
    /// fills from it.
    fn on_market_data(&mut self, _bar: &Bar) {}

    /// Called once when the session winds down, after the force-close sweep
    /// has been submitted. The simulated venue realizes any resting market
    /// orders at their last seen close here; a broker-backed venue ignores
    /// it.
    fn on_session_end(&mut self) {}
}
