use std::collections::BTreeMap;

use async_trait::async_trait;
use core_types::{Bar, Fill, OrderRequest, OrderSide, OrderType, Symbol};
use rust_decimal::Decimal;

use crate::types::{FillModel, FillStatus, OrderHandle, SimulationSettings};
use crate::{Error, Result, Venue};

/// Deterministic fill model used by backtests and paper runs.
///
/// The venue is fed bars through [`SimulatedVenue::on_bar`]. Market orders
/// rest until the next bar and fill at its open (the signal bar's prices are
/// never tradable under the default [`FillModel::NextBarOpen`]); protective
/// stop and limit sells fill at exactly their trigger price once a bar's
/// range touches it. Identical inputs always produce identical fills.
pub struct SimulatedVenue {
    settings: SimulationSettings,
    slippage: Decimal,
    next_handle: u64,
    pending: BTreeMap<OrderHandle, OrderRequest>,
    fills: BTreeMap<OrderHandle, Fill>,
    last_bar: BTreeMap<Symbol, Bar>,
}

impl SimulatedVenue {
    pub fn new(settings: SimulationSettings) -> Result<Self> {
        if !(0.0..1.0).contains(&settings.slippage_percent) {
            return Err(Error::InvalidSettings(format!(
                "slippage_percent must be in [0, 1), got {}",
                settings.slippage_percent
            )));
        }
        let slippage = Decimal::try_from(settings.slippage_percent)
            .map_err(|e| Error::InvalidSettings(format!("slippage_percent: {e}")))?;
        Ok(Self {
            settings,
            slippage,
            next_handle: 1,
            pending: BTreeMap::new(),
            fills: BTreeMap::new(),
            last_bar: BTreeMap::new(),
        })
    }

    /// Feeds the venue the next bar for one symbol. Resting market orders on
    /// that symbol fill at this bar's open; stop/limit orders fill at their
    /// trigger price when the bar's range reaches it.
    pub fn on_bar(&mut self, bar: &Bar) {
        let handles: Vec<OrderHandle> = self
            .pending
            .iter()
            .filter(|(_, order)| order.symbol == bar.symbol)
            .map(|(handle, _)| *handle)
            .collect();
        for handle in handles {
            let order = &self.pending[&handle];
            if let Some(price) = self.fill_price(order, bar, true) {
                let order = self.pending.remove(&handle).expect("handle is pending");
                self.fills.insert(
                    handle,
                    Fill {
                        price,
                        quantity: order.quantity,
                        timestamp: bar.timestamp,
                    },
                );
            }
        }
        self.last_bar.insert(bar.symbol.clone(), bar.clone());
    }

    /// Fills every resting market order at its symbol's last seen close.
    /// Used for the end-of-session sweep, where no further bar will come.
    pub fn fill_remaining_at_close(&mut self) {
        let handles: Vec<OrderHandle> = self.pending.keys().copied().collect();
        for handle in handles {
            let order = &self.pending[&handle];
            if !matches!(order.order_type, OrderType::Market) {
                continue;
            }
            let Some(bar) = self.last_bar.get(&order.symbol) else {
                continue;
            };
            let fill = Fill {
                price: self.market_price(order.side, bar.close),
                quantity: order.quantity,
                timestamp: bar.timestamp,
            };
            self.pending.remove(&handle);
            self.fills.insert(handle, fill);
        }
    }

    /// True when no order is resting unfilled.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    fn market_price(&self, side: OrderSide, reference: Decimal) -> Decimal {
        // Slippage always worsens the fill.
        match side {
            OrderSide::Buy => reference * (Decimal::ONE + self.slippage),
            OrderSide::Sell => reference * (Decimal::ONE - self.slippage),
        }
    }

    /// The price this order would fill at against `bar`, if any.
    /// `market_eligible` is false at submission time: under `NextBarOpen` a
    /// market order must wait for the bar after the one it was placed on.
    fn fill_price(&self, order: &OrderRequest, bar: &Bar, market_eligible: bool) -> Option<Decimal> {
        match order.order_type {
            OrderType::Market => match self.settings.fill_model {
                FillModel::NextBarOpen => {
                    market_eligible.then(|| self.market_price(order.side, bar.open))
                }
                FillModel::SignalClose => Some(self.market_price(order.side, bar.close)),
            },
            OrderType::Stop { stop_price } => {
                let triggered = match order.side {
                    OrderSide::Sell => bar.low <= stop_price,
                    OrderSide::Buy => bar.high >= stop_price,
                };
                triggered.then_some(stop_price)
            }
            OrderType::Limit { limit_price } => {
                let triggered = match order.side {
                    OrderSide::Sell => bar.high >= limit_price,
                    OrderSide::Buy => bar.low <= limit_price,
                };
                triggered.then_some(limit_price)
            }
        }
    }
}

#[async_trait]
impl Venue for SimulatedVenue {
    fn name(&self) -> &'static str {
        "SimulatedVenue"
    }

    async fn submit_order(&mut self, order: &OrderRequest) -> Result<OrderHandle> {
        let handle = OrderHandle(self.next_handle);
        self.next_handle += 1;

        // Stop/limit orders (and SignalClose market orders) may already be
        // triggered by the bar the caller just evaluated.
        if let Some(bar) = self.last_bar.get(&order.symbol).cloned() {
            if let Some(price) = self.fill_price(order, &bar, false) {
                self.fills.insert(
                    handle,
                    Fill {
                        price,
                        quantity: order.quantity,
                        timestamp: bar.timestamp,
                    },
                );
                return Ok(handle);
            }
        }
        self.pending.insert(handle, order.clone());
        Ok(handle)
    }

    async fn get_fill(&mut self, handle: OrderHandle) -> Result<FillStatus> {
        if let Some(fill) = self.fills.remove(&handle) {
            return Ok(FillStatus::Filled(fill));
        }
        if self.pending.contains_key(&handle) {
            return Ok(FillStatus::Pending);
        }
        Err(Error::UnknownOrder(handle))
    }

    async fn cancel(&mut self, handle: OrderHandle) -> Result<()> {
        if self.pending.remove(&handle).is_some() {
            return Ok(());
        }
        if self.fills.contains_key(&handle) {
            return Err(Error::Venue {
                reason: format!("order {handle:?} already filled"),
            });
        }
        Err(Error::UnknownOrder(handle))
    }

    fn on_market_data(&mut self, bar: &Bar) {
        self.on_bar(bar);
    }

    fn on_session_end(&mut self) {
        self.fill_remaining_at_close();
    }
}
