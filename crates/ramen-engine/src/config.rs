//! # Engine Configuration
//!
//! Store-level knobs for the fulfillment engine. Everything has a
//! sensible default; the builder exists so deployments can tune the
//! delivery surcharge without recompiling.

use ramen_core::Money;

/// Default delivery surcharge: ₱50.00.
pub const DEFAULT_DELIVERY_FEE_CENTS: i64 = 5000;

/// Default capacity of the order event broadcast channel.
///
/// Observers that fall more than this many events behind start losing
/// the oldest ones (broadcast semantics); 256 is generous for a
/// single-store deployment.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Configuration for the fulfillment engine.
///
/// ## Example
/// ```rust,ignore
/// let config = EngineConfig::default().delivery_fee_cents(7500);
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Fixed surcharge applied to delivery orders, in centavos.
    pub delivery_fee_cents: i64,

    /// Capacity of the order event broadcast channel.
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            delivery_fee_cents: DEFAULT_DELIVERY_FEE_CENTS,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Sets the delivery surcharge in centavos.
    pub fn delivery_fee_cents(mut self, cents: i64) -> Self {
        self.delivery_fee_cents = cents;
        self
    }

    /// Sets the event channel capacity.
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Delivery surcharge as Money.
    pub fn delivery_fee(&self) -> Money {
        Money::from_cents(self.delivery_fee_cents)
    }
}
