pub mod feed;
pub mod session;

pub use feed::{BarFeed, ReplayFeed};
pub use session::{SessionEngine, SessionReport, SessionSettings};
