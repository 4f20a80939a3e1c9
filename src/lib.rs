//! Offline analysis of epidemic total-order-broadcast traces.
//!
//! Given the parsed events of a protocol run, eptoscope answers two
//! questions after the fact: could the per-actor delivery sequences have
//! come from one global total order, and how did delivery latency and
//! coverage distribute across the broadcast messages.
//!
//! # Quick Start
//!
//! ```
//! use eptoscope::{check_delivery_orders, DeliveryIndex, MessageId, TraceEvent};
//!
//! let m = |r: &str| r.parse::<MessageId>().unwrap();
//!
//! // Two actors, both delivering actor_0's first message.
//! let events = vec![
//!     TraceEvent::broadcast("actor_0", 100, 1, m("actor_0:1")),
//!     TraceEvent::delivered("actor_0", 104, 2, m("actor_0:1")),
//!     TraceEvent::delivered("actor_1", 106, 2, m("actor_0:1")),
//! ];
//!
//! let index = DeliveryIndex::from_events(events);
//! assert!(check_delivery_orders(index.orders()).is_ok());
//! ```
//!
//! # Order checking
//!
//! [`check_delivery_orders`] compares every pair of actors' delivery
//! sequences and fails fast with an [`OrderInconsistency`] witness naming
//! the two actors and the two messages they disagree on. The check only
//! compares adjacent pairs of each sequence against the other sequence's
//! positions, so a passing result is evidence, not proof, of a global
//! order; see [`order`] for the exact guarantee.
//!
//! # Delivery statistics
//!
//! [`delay`] turns per-message receipt clocks into delay distributions and
//! a cross-message average; [`rate`] measures per-message delivery
//! coverage and compresses it into a display-ready histogram. Both are
//! grouped folds over the [`aggregate`] primitives.

pub mod aggregate;
pub mod delay;
pub mod index;
pub mod order;
pub mod rate;
pub mod trace;

pub use delay::{
    aggregate_delay_distribution, delay_distribution, delivery_delays,
    message_delay_distributions, DelayDistribution,
};
pub use index::{DeliveryIndex, DeliverySet, Epoch};
pub use order::{
    check_delivery_orders, check_pair, OrderInconsistency, PairViolation, Side,
};
pub use rate::{
    delivery_rates, rate_histogram, rates_in_range, InvalidRange, RateBin, RateOptions,
};
pub use trace::{Action, ActorId, MessageId, ParseMessageIdError, TraceEvent};
