//! Generic group-and-reduce primitives.
//!
//! Every statistic in this crate is a grouped fold: pair each observation
//! with a key, then combine all values sharing a key with a binary combiner.
//! Output keys are sorted, so downstream results are deterministic from run
//! to run.

use std::collections::BTreeMap;

/// Reduce a sequence of `(key, value)` pairs to one entry per distinct key.
///
/// Values are combined in the order they are encountered within each key
/// group; a key with a single value passes it through untouched. The output
/// key set is exactly the set of distinct input keys — no key is dropped.
pub fn reduce_by_key<K, V, I, F>(pairs: I, mut combine: F) -> BTreeMap<K, V>
where
    K: Ord,
    I: IntoIterator<Item = (K, V)>,
    F: FnMut(V, V) -> V,
{
    let mut groups = BTreeMap::new();
    for (key, value) in pairs {
        let merged = match groups.remove(&key) {
            Some(prev) => combine(prev, value),
            None => value,
        };
        groups.insert(key, merged);
    }
    groups
}

/// Key-less counterpart of [`reduce_by_key`]: fold a whole sequence into a
/// single value. Returns `None` for an empty sequence.
pub fn reduce<V, I, F>(values: I, combine: F) -> Option<V>
where
    I: IntoIterator<Item = V>,
    F: FnMut(V, V) -> V,
{
    values.into_iter().reduce(combine)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_keys_equal_distinct_input_keys() {
        let pairs = vec![("a", 1), ("b", 2), ("a", 3), ("c", 4), ("b", 5)];
        let grouped = reduce_by_key(pairs, |x, y| x + y);

        let keys: Vec<&str> = grouped.keys().copied().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_sum_combiner_is_order_independent() {
        let forward = reduce_by_key(vec![(1, 10), (2, 20), (1, 30)], |x, y| x + y);
        let backward = reduce_by_key(vec![(1, 30), (2, 20), (1, 10)], |x, y| x + y);

        assert_eq!(forward, backward);
        assert_eq!(forward.get(&1), Some(&40));
        assert_eq!(forward.get(&2), Some(&20));
    }

    #[test]
    fn test_values_combine_in_encounter_order() {
        // A non-commutative combiner exposes the per-key ordering.
        let pairs = vec![(0, "x".to_owned()), (1, "q".to_owned()), (0, "y".to_owned())];
        let grouped = reduce_by_key(pairs, |a, b| a + &b);

        assert_eq!(grouped.get(&0).map(String::as_str), Some("xy"));
        assert_eq!(grouped.get(&1).map(String::as_str), Some("q"));
    }

    #[test]
    fn test_single_element_group_passes_through() {
        // The combiner must never run for singleton groups.
        let grouped = reduce_by_key(vec![(7u32, 42u32)], |_, _| panic!("combined a singleton"));
        assert_eq!(grouped.get(&7), Some(&42));
    }

    #[test]
    fn test_empty_input() {
        let grouped: BTreeMap<u32, u32> = reduce_by_key(Vec::new(), |x: u32, y| x + y);
        assert!(grouped.is_empty());

        assert_eq!(reduce(Vec::<u32>::new(), |x, y| x + y), None);
    }

    #[test]
    fn test_keyless_reduce_folds_left() {
        assert_eq!(reduce(vec![1, 2, 3, 4], |x, y| x + y), Some(10));
        assert_eq!(reduce(vec![5], |_, _| unreachable!()), Some(5));
    }
}
