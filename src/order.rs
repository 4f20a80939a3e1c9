//! Order-consistency checking across per-actor delivery sequences.
//!
//! Two delivery sequences are order-compatible when no message that appears
//! in both is seen in opposite relative order versus a neighbour. The check
//! compares only *adjacent* pairs of each sequence against the other's
//! positions: this is necessary but not sufficient for true total-order
//! compatibility, since an inversion spanning a run of absent messages can
//! go undetected. Callers should treat a passing check as "no evidence of a
//! violation", not as proof of one global order.

use ahash::{HashMap, HashMapExt};
use thiserror::Error;
use tracing::debug;

use crate::trace::{ActorId, MessageId};

/// Which of the two checked sequences contains the witnessing adjacent pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    First,
    Second,
}

/// A contradicted adjacent pair: on `side`, `first` was delivered before
/// `second`, while the other sequence orders them the opposite way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairViolation {
    pub side: Side,
    pub first: MessageId,
    pub second: MessageId,
}

/// Evidence that two actors disagree on the relative delivery order of two
/// messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "actors {actor_a} and {actor_b} disagree on delivery order: \
     {witness} delivered {first} before {second}"
)]
pub struct OrderInconsistency {
    pub actor_a: ActorId,
    pub actor_b: ActorId,
    /// The actor whose sequence contains the witnessing adjacent pair.
    pub witness: ActorId,
    pub first: MessageId,
    pub second: MessageId,
}

/// Check whether two delivery sequences could stem from one global order.
///
/// Returns the first contradicted adjacent pair, scanning `seq1` fully
/// before `seq2`, or `None` when every comparable pair agrees. A message
/// absent from one of the sequences is a gap and never counts as evidence
/// by itself. Each message is assumed to appear at most once per sequence;
/// duplicated entries are tolerated but make the result best-effort.
#[must_use]
pub fn check_pair(seq1: &[MessageId], seq2: &[MessageId]) -> Option<PairViolation> {
    // message -> (position in seq1, position in seq2)
    let mut positions: HashMap<&MessageId, (Option<usize>, Option<usize>)> =
        HashMap::with_capacity(seq1.len() + seq2.len());
    for (i, message) in seq1.iter().enumerate() {
        positions.insert(message, (Some(i), None));
    }
    for (i, message) in seq2.iter().enumerate() {
        positions.entry(message).or_insert((None, None)).1 = Some(i);
    }

    for pair in seq1.windows(2) {
        let (Some(p1), Some(p2)) = positions[&pair[0]] else {
            continue;
        };
        let (Some(n1), Some(n2)) = positions[&pair[1]] else {
            continue;
        };
        if (p1 < n1 && p2 > n2) || (p1 > n1 && p2 < n2) {
            return Some(PairViolation {
                side: Side::First,
                first: pair[0].clone(),
                second: pair[1].clone(),
            });
        }
    }
    for pair in seq2.windows(2) {
        let (Some(p1), Some(p2)) = positions[&pair[0]] else {
            continue;
        };
        let (Some(n1), Some(n2)) = positions[&pair[1]] else {
            continue;
        };
        if (p2 < n2 && p1 > n1) || (p2 > n2 && p1 < n1) {
            return Some(PairViolation {
                side: Side::Second,
                first: pair[0].clone(),
                second: pair[1].clone(),
            });
        }
    }
    None
}

/// Check every unordered pair of actors' delivery orders for mutual
/// order-compatibility.
///
/// Actors are visited in sorted order, so the fail-fast witness is
/// deterministic for a given input. `Ok(())` means no adjacent-pair
/// evidence of a global order violation was found across any pair.
pub fn check_delivery_orders(
    orders: &HashMap<ActorId, Vec<MessageId>>,
) -> Result<(), OrderInconsistency> {
    let mut actors: Vec<&ActorId> = orders.keys().collect();
    actors.sort();
    for (i, &actor_a) in actors.iter().enumerate() {
        for &actor_b in &actors[i + 1..] {
            if let Some(violation) = check_pair(&orders[actor_a], &orders[actor_b]) {
                let witness = match violation.side {
                    Side::First => actor_a.clone(),
                    Side::Second => actor_b.clone(),
                };
                debug!(
                    actor_a = %actor_a,
                    actor_b = %actor_b,
                    first = %violation.first,
                    second = %violation.second,
                    "delivery order violation"
                );
                return Err(OrderInconsistency {
                    actor_a: actor_a.clone(),
                    actor_b: actor_b.clone(),
                    witness,
                    first: violation.first,
                    second: violation.second,
                });
            }
        }
    }
    Ok(())
}
