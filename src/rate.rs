//! Delivery-coverage (rate) analysis.
//!
//! Coverage of a message is the percentage of the run's actors that
//! eventually delivered it. The histogram over all messages is compressed
//! for display: integer percentage buckets below a noise floor collapse
//! into zero-valued range bins, so a run where most messages sit at a few
//! coverage values stays readable across the full 0..=100 axis.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::aggregate::reduce_by_key;
use crate::index::DeliveryIndex;
use crate::trace::MessageId;

/// Tunables for [`rate_histogram`].
#[derive(Debug, Clone)]
pub struct RateOptions {
    /// Buckets whose normalized fraction is at or below this value are
    /// treated as display noise and merged into zero-valued ranges.
    pub noise_floor: f64,
}

impl Default for RateOptions {
    fn default() -> Self {
        Self { noise_floor: 0.01 }
    }
}

/// One bin of a compressed coverage histogram: a retained integer
/// percentage labelled `"r"`, or a merged empty range labelled
/// `"low-high"` (just `"low"` when the range is a single bucket).
#[derive(Debug, Clone, PartialEq)]
pub struct RateBin {
    pub label: String,
    pub value: f64,
}

/// The requested percentage window is not a valid sub-range of 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid percentage range [{left}, {right}]: expected 0 <= left < right <= 100")]
pub struct InvalidRange {
    pub left: i64,
    pub right: i64,
}

/// Coverage percentage per message: delivering actors over `num_actors`,
/// real-valued and unrounded. `num_actors` is the known total process
/// count of the run and must be non-zero.
#[must_use]
pub fn delivery_rates(index: &DeliveryIndex, num_actors: usize) -> BTreeMap<MessageId, f64> {
    index
        .sets()
        .iter()
        .map(|(message, set)| (message.clone(), set.coverage(num_actors)))
        .collect()
}

/// Compressed coverage histogram over all messages.
///
/// Each message's percentage is floored to an integer bucket, bucket counts
/// are normalized by the message count, buckets at or below the noise floor
/// are discarded, and every maximal run of discarded or empty buckets
/// collapses into one zero-valued bin spanning its range. Bins ascend from
/// 0 to 100.
#[must_use]
pub fn rate_histogram(
    index: &DeliveryIndex,
    num_actors: usize,
    options: &RateOptions,
) -> Vec<RateBin> {
    let num_messages = index.num_messages();
    if num_messages == 0 {
        return Vec::new();
    }
    let counts = reduce_by_key(
        delivery_rates(index, num_actors)
            .into_values()
            .map(|pct| (pct.floor() as i64, 1usize)),
        |x, y| x + y,
    );

    let mut bins = Vec::new();
    let mut empty_run: Option<(i64, i64)> = None;
    for bucket in 0..=100i64 {
        let fraction = counts
            .get(&bucket)
            .map_or(0.0, |count| *count as f64 / num_messages as f64);
        if fraction > options.noise_floor {
            if let Some((low, high)) = empty_run.take() {
                bins.push(RateBin {
                    label: span_label(low, high),
                    value: 0.0,
                });
            }
            bins.push(RateBin {
                label: bucket.to_string(),
                value: fraction,
            });
        } else {
            empty_run = Some(match empty_run {
                Some((low, _)) => (low, bucket),
                None => (bucket, bucket),
            });
        }
    }
    if let Some((low, high)) = empty_run {
        bins.push(RateBin {
            label: span_label(low, high),
            value: 0.0,
        });
    }
    bins
}

/// Unnormalized integer-floor coverage counts restricted to the inclusive
/// percentage window `[left, right]`.
///
/// Only buckets with at least one message appear in the result.
pub fn rates_in_range(
    index: &DeliveryIndex,
    num_actors: usize,
    left: i64,
    right: i64,
) -> Result<BTreeMap<i64, u64>, InvalidRange> {
    if left >= right || left < 0 || right > 100 {
        return Err(InvalidRange { left, right });
    }
    Ok(reduce_by_key(
        delivery_rates(index, num_actors)
            .into_values()
            .map(|pct| pct.floor() as i64)
            .filter(|bucket| (left..=right).contains(bucket))
            .map(|bucket| (bucket, 1u64)),
        |x, y| x + y,
    ))
}

fn span_label(low: i64, high: i64) -> String {
    if low == high {
        low.to_string()
    } else {
        format!("{low}-{high}")
    }
}
