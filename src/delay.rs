//! Delivery-delay distributions.
//!
//! Delays are measured on the global clock: receipt clock minus broadcast
//! clock, per observing actor. Distributions map each distinct delay value
//! to the fraction of observers (per message) or the averaged fraction
//! across messages. Cumulative sums are a presentation concern left to the
//! caller.

use std::collections::BTreeMap;

use crate::aggregate::reduce_by_key;
use crate::index::DeliveryIndex;
use crate::trace::MessageId;

/// Mapping from delay value to the fraction attaining it.
pub type DelayDistribution = BTreeMap<i64, f64>;

/// Per-message delivery delays, ascending.
///
/// Messages whose broadcast never appears in the trace have no reference
/// point and are skipped. Negative delays (a receipt clock behind the
/// broadcast clock) are kept as data.
#[must_use]
pub fn delivery_delays(index: &DeliveryIndex) -> BTreeMap<MessageId, Vec<i64>> {
    index
        .sets()
        .iter()
        .filter_map(|(message, set)| {
            let t0 = set.broadcast_at? as i64;
            let mut delays: Vec<i64> = set
                .receipts
                .iter()
                .map(|(_, receipt)| *receipt as i64 - t0)
                .collect();
            delays.sort_unstable();
            Some((message.clone(), delays))
        })
        .collect()
}

/// Distribution of one message's delays: delay value to the fraction of its
/// observing actors that delivered at that delay.
#[must_use]
pub fn delay_distribution(delays: &[i64]) -> DelayDistribution {
    let num_observers = delays.len();
    if num_observers == 0 {
        return DelayDistribution::new();
    }
    reduce_by_key(delays.iter().map(|delay| (*delay, 1usize)), |x, y| x + y)
        .into_iter()
        .map(|(delay, count)| (delay, count as f64 / num_observers as f64))
        .collect()
}

/// Per-message delay distributions for every message with a broadcast
/// record.
#[must_use]
pub fn message_delay_distributions(
    index: &DeliveryIndex,
) -> BTreeMap<MessageId, DelayDistribution> {
    delivery_delays(index)
        .into_iter()
        .map(|(message, delays)| (message, delay_distribution(&delays)))
        .collect()
}

/// Average per-message distributions into one: for each delay value, the
/// sum of the per-message fractions divided by the number of messages.
#[must_use]
pub fn aggregate_delay_distribution<'a>(
    distributions: impl IntoIterator<Item = &'a DelayDistribution>,
) -> DelayDistribution {
    let mut pairs = Vec::new();
    let mut num_messages = 0usize;
    for distribution in distributions {
        num_messages += 1;
        pairs.extend(distribution.iter().map(|(delay, fraction)| (*delay, *fraction)));
    }
    if num_messages == 0 {
        return DelayDistribution::new();
    }
    reduce_by_key(pairs, |x, y| x + y)
        .into_iter()
        .map(|(delay, total)| (delay, total / num_messages as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::TraceEvent;

    fn msg(reference: &str) -> MessageId {
        reference.parse().unwrap()
    }

    /// One message broadcast at `t0`, delivered at the given clocks by
    /// distinct actors.
    fn single_message_index(t0: u64, receipts: &[u64]) -> DeliveryIndex {
        let mut events = vec![TraceEvent::broadcast("src", t0, 0, msg("src:1"))];
        for (i, &clock) in receipts.iter().enumerate() {
            events.push(TraceEvent::delivered(
                format!("actor_{i}"),
                clock,
                1,
                msg("src:1"),
            ));
        }
        DeliveryIndex::from_events(events)
    }

    #[test]
    fn test_delays_are_sorted_ascending() {
        let index = single_message_index(100, &[110, 100, 105]);
        let delays = delivery_delays(&index);

        assert_eq!(delays.get(&msg("src:1")), Some(&vec![0, 5, 10]));
    }

    #[test]
    fn test_single_message_distribution_round_trip() {
        // Broadcast at 100, receipts at [100, 105, 105, 110] over 4 actors.
        let index = single_message_index(100, &[100, 105, 105, 110]);
        let distributions = message_delay_distributions(&index);

        let dist = distributions.get(&msg("src:1")).unwrap();
        assert_eq!(dist.len(), 3);
        assert!((dist[&0] - 0.25).abs() < 1e-12);
        assert!((dist[&5] - 0.5).abs() < 1e-12);
        assert!((dist[&10] - 0.25).abs() < 1e-12);
        assert!((dist.values().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_negative_delays_are_kept() {
        // A receipt logged before the broadcast line stays in the data.
        let index = single_message_index(100, &[95, 105]);
        let delays = delivery_delays(&index);

        assert_eq!(delays.get(&msg("src:1")), Some(&vec![-5, 5]));

        let dist = delay_distribution(&delays[&msg("src:1")]);
        assert!((dist[&-5] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_message_without_broadcast_is_skipped() {
        let events = vec![TraceEvent::delivered("actor_0", 50, 1, msg("ghost:1"))];
        let index = DeliveryIndex::from_events(events);

        assert!(delivery_delays(&index).is_empty());
        assert!(message_delay_distributions(&index).is_empty());
    }

    #[test]
    fn test_aggregate_averages_across_messages() {
        // msg1: delays [0, 5] -> {0: 0.5, 5: 0.5}
        // msg2: delays [0, 0] -> {0: 1.0}
        let events = vec![
            TraceEvent::broadcast("a", 10, 0, msg("a:1")),
            TraceEvent::delivered("p0", 10, 1, msg("a:1")),
            TraceEvent::delivered("p1", 15, 1, msg("a:1")),
            TraceEvent::broadcast("a", 20, 2, msg("a:2")),
            TraceEvent::delivered("p0", 20, 3, msg("a:2")),
            TraceEvent::delivered("p1", 20, 3, msg("a:2")),
        ];
        let index = DeliveryIndex::from_events(events);

        let per_message = message_delay_distributions(&index);
        let aggregate = aggregate_delay_distribution(per_message.values());

        assert_eq!(aggregate.len(), 2);
        assert!((aggregate[&0] - 0.75).abs() < 1e-12);
        assert!((aggregate[&5] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_aggregate_of_nothing_is_empty() {
        let aggregate = aggregate_delay_distribution(std::iter::empty());
        assert!(aggregate.is_empty());
    }
}
