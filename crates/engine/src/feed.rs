use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_types::{Bar, Symbol};

/// The market-data collaborator boundary.
///
/// `next_tick` paces the session (a live feed would wait out the poll
/// interval here); `latest_bars` serves the trailing window for one symbol
/// and may be called concurrently for the whole watchlist.
#[async_trait]
pub trait BarFeed: Send + Sync {
    /// Advances to the next evaluation tick, returning its timestamp, or
    /// `None` once the feed is exhausted and the session should wind down.
    async fn next_tick(&mut self) -> anyhow::Result<Option<DateTime<Utc>>>;

    /// The most recent `limit` bars for `symbol`, oldest first. Empty means
    /// the feed has nothing for the symbol yet.
    async fn latest_bars(&self, symbol: &Symbol, limit: usize) -> anyhow::Result<Vec<Bar>>;
}

/// Serves preloaded series tick by tick. Drives paper sessions and tests
/// through the exact code path a live feed would.
pub struct ReplayFeed {
    series: BTreeMap<Symbol, Vec<Bar>>,
    axis: Vec<DateTime<Utc>>,
    cursor: usize,
    current: Option<DateTime<Utc>>,
}

impl ReplayFeed {
    pub fn new(series: BTreeMap<Symbol, Vec<Bar>>) -> Self {
        let axis: BTreeSet<DateTime<Utc>> = series
            .values()
            .flat_map(|bars| bars.iter().map(|b| b.timestamp))
            .collect();
        Self {
            series,
            axis: axis.into_iter().collect(),
            cursor: 0,
            current: None,
        }
    }
}

#[async_trait]
impl BarFeed for ReplayFeed {
    async fn next_tick(&mut self) -> anyhow::Result<Option<DateTime<Utc>>> {
        if self.cursor >= self.axis.len() {
            return Ok(None);
        }
        self.current = Some(self.axis[self.cursor]);
        self.cursor += 1;
        Ok(self.current)
    }

    async fn latest_bars(&self, symbol: &Symbol, limit: usize) -> anyhow::Result<Vec<Bar>> {
        let Some(current) = self.current else {
            return Ok(Vec::new());
        };
        let Some(bars) = self.series.get(symbol) else {
            return Ok(Vec::new());
        };
        let upto: Vec<Bar> = bars
            .iter()
            .filter(|b| b.timestamp <= current)
            .cloned()
            .collect();
        let start = upto.len().saturating_sub(limit);
        Ok(upto[start..].to_vec())
    }
}
