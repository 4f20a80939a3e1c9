//! Delivery indexing: from a flat event stream to the per-actor delivery
//! orders and per-message delivery sets the analyses consume.
//!
//! The index is built once, in strict event order, and handed to the
//! checker and analyzers as a read-only snapshot.

use ahash::{HashMap, HashSet};
use tracing::debug;

use crate::aggregate::reduce;
use crate::trace::{Action, ActorId, MessageId, TraceEvent};

/// All actors that delivered one message, with their receipt clocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliverySet {
    /// Global clock at which the message was broadcast, if the broadcast
    /// itself appears in the trace.
    pub broadcast_at: Option<u64>,
    /// `(actor, receipt clock)` per delivering actor, in trace order.
    pub receipts: Vec<(ActorId, u64)>,
}

impl DeliverySet {
    /// Percentage of `num_actors` that delivered this message, real-valued.
    ///
    /// `num_actors` is the known total process count of the run and must be
    /// non-zero.
    #[must_use]
    pub fn coverage(&self, num_actors: usize) -> f64 {
        self.receipts.len() as f64 / num_actors as f64 * 100.0
    }
}

/// The span of message sequence numbers observed in a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Epoch {
    pub min_seq: u64,
    pub max_seq: u64,
}

/// Everything the analyses need from a trace: who delivered what in which
/// order, and who delivered each message when.
#[derive(Debug, Clone, Default)]
pub struct DeliveryIndex {
    orders: HashMap<ActorId, Vec<MessageId>>,
    sets: HashMap<MessageId, DeliverySet>,
}

impl DeliveryIndex {
    /// Build the index from a trace in a single pass over the events.
    ///
    /// `broadcast` registers the message with its broadcast clock,
    /// `delivered` appends to the observing actor's order and to the
    /// message's receipt list. Every actor that appears in the trace gets an
    /// order entry, even if it never delivered anything. A delivery for a
    /// message whose broadcast is missing from the trace is kept; the
    /// message simply has no broadcast clock.
    pub fn from_events(events: impl IntoIterator<Item = TraceEvent>) -> Self {
        let mut index = Self::default();
        for event in events {
            match event.action {
                Action::Broadcast(message) => {
                    index.orders.entry(event.actor).or_default();
                    index.sets.entry(message).or_default().broadcast_at =
                        Some(event.global_clock);
                }
                Action::Delivered(message) => {
                    index
                        .orders
                        .entry(event.actor.clone())
                        .or_default()
                        .push(message.clone());
                    index
                        .sets
                        .entry(message)
                        .or_default()
                        .receipts
                        .push((event.actor, event.global_clock));
                }
                _ => {
                    index.orders.entry(event.actor).or_default();
                }
            }
        }
        debug!(
            actors = index.orders.len(),
            messages = index.sets.len(),
            "indexed trace"
        );
        index
    }

    /// Per-actor delivery orders: each actor's messages in the order that
    /// actor delivered them.
    #[must_use]
    pub fn orders(&self) -> &HashMap<ActorId, Vec<MessageId>> {
        &self.orders
    }

    /// Per-message delivery sets.
    #[must_use]
    pub fn sets(&self) -> &HashMap<MessageId, DeliverySet> {
        &self.sets
    }

    /// One actor's delivery order.
    #[must_use]
    pub fn order(&self, actor: &ActorId) -> Option<&[MessageId]> {
        self.orders.get(actor).map(Vec::as_slice)
    }

    /// One message's delivery set.
    #[must_use]
    pub fn set(&self, message: &MessageId) -> Option<&DeliverySet> {
        self.sets.get(message)
    }

    /// Number of actors observed in the trace.
    #[must_use]
    pub fn num_actors(&self) -> usize {
        self.orders.len()
    }

    /// Number of distinct messages observed in the trace.
    #[must_use]
    pub fn num_messages(&self) -> usize {
        self.sets.len()
    }

    /// The `(min, max)` sequence-number span delivered across all actors,
    /// or `None` when nothing was delivered.
    #[must_use]
    pub fn epoch(&self) -> Option<Epoch> {
        let seqs = reduce(
            self.orders
                .values()
                .map(|order| order.iter().map(|m| m.seq).collect::<HashSet<u64>>()),
            |mut union, set| {
                union.extend(set);
                union
            },
        )?;
        let min_seq = seqs.iter().copied().min()?;
        let max_seq = seqs.iter().copied().max()?;
        Some(Epoch { min_seq, max_seq })
    }

    /// Restrict the index to messages whose sequence number lies within the
    /// given optional inclusive bounds, in both the delivery sets and each
    /// actor's order.
    #[must_use]
    pub fn filter_messages(&self, min_seq: Option<u64>, max_seq: Option<u64>) -> Self {
        let keep = |m: &MessageId| {
            min_seq.is_none_or(|lo| m.seq >= lo) && max_seq.is_none_or(|hi| m.seq <= hi)
        };
        Self {
            orders: self
                .orders
                .iter()
                .map(|(actor, order)| {
                    (
                        actor.clone(),
                        order.iter().filter(|m| keep(m)).cloned().collect(),
                    )
                })
                .collect(),
            sets: self
                .sets
                .iter()
                .filter(|(m, _)| keep(m))
                .map(|(m, set)| (m.clone(), set.clone()))
                .collect(),
        }
    }
}
