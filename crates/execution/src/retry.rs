use std::time::Duration;

use core_types::OrderRequest;
use serde::{Deserialize, Serialize};

use crate::types::OrderHandle;
use crate::{Error, Result, Venue};

/// Bounded retry schedule for order submission, the one operation allowed to
/// block: it crosses a real network boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 250,
        }
    }
}

impl RetryPolicy {
    /// Exponential backoff: base, 2x base, 4x base, ...
    fn delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.base_delay_ms << attempt.min(8))
    }
}

/// Submits an order, retrying venue failures with exponential backoff.
///
/// On exhaustion the intended order is dropped and the error surfaced; the
/// caller logs it and leaves every position in its prior state, so no
/// phantom position can appear.
pub async fn submit_with_backoff(
    venue: &mut dyn Venue,
    order: &OrderRequest,
    policy: &RetryPolicy,
) -> Result<OrderHandle> {
    let mut attempt: u32 = 0;
    loop {
        match venue.submit_order(order).await {
            Ok(handle) => return Ok(handle),
            Err(e) => {
                attempt += 1;
                if attempt >= policy.max_attempts.max(1) {
                    return Err(Error::RetriesExhausted {
                        attempts: attempt,
                        reason: e.to_string(),
                    });
                }
                let delay = policy.delay(attempt - 1);
                tracing::warn!(
                    error = %e,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    symbol = %order.symbol,
                    "Order submission failed; backing off before retry."
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
