//! Top-N ranking over aggregated maps.
//!
//! Ranking is a pure read: nothing is cached, every call recomputes from
//! the aggregate state. The raw data provides no stable secondary key, so
//! ties break on the order in which keys were first observed during the
//! fold, which keeps output deterministic for a given input sequence.

use std::collections::BTreeMap;

/// An aggregated value that remembers when its key was first observed.
pub trait FirstSeen {
    /// Zero-based observation index assigned during the fold.
    fn first_seen(&self) -> usize;
}

/// Which numeric accessor to rank by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    /// Stream or play counts.
    #[default]
    Streams,
    /// Variety counts (distinct tracks per artist, distinct days per track).
    Unique,
    /// Listening time.
    Hours,
}

/// One row of a ranked view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranked<'a, K, V> {
    /// 1-based position.
    pub rank: usize,
    pub key: &'a K,
    pub stat: &'a V,
}

/// Ranks a stat map descending by `metric`, truncated to `limit` when given.
///
/// The sort is stable, so equal metric values keep their relative order
/// after the pre-sort on first observation.
pub fn top_n<'a, K, V, M>(
    map: &'a BTreeMap<K, V>,
    limit: Option<usize>,
    metric: M,
) -> Vec<Ranked<'a, K, V>>
where
    V: FirstSeen,
    M: Fn(&V) -> f64,
{
    let mut rows: Vec<(&K, &V)> = map.iter().collect();
    rows.sort_by_key(|(_, stat)| stat.first_seen());
    rows.sort_by(|a, b| metric(b.1).total_cmp(&metric(a.1)));
    if let Some(limit) = limit {
        rows.truncate(limit);
    }
    rows.into_iter()
        .enumerate()
        .map(|(i, (key, stat))| Ranked {
            rank: i + 1,
            key,
            stat,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fake {
        value: u64,
        first_seen: usize,
    }

    impl FirstSeen for Fake {
        fn first_seen(&self) -> usize {
            self.first_seen
        }
    }

    fn map(entries: &[(&str, u64, usize)]) -> BTreeMap<String, Fake> {
        entries
            .iter()
            .map(|&(key, value, first_seen)| (key.to_string(), Fake { value, first_seen }))
            .collect()
    }

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn ranks_descending_with_one_based_positions() {
        let stats = map(&[("a", 3, 0), ("b", 9, 1), ("c", 5, 2)]);
        let ranked = top_n(&stats, None, |s| s.value as f64);

        let keys: Vec<&str> = ranked.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["b", "c", "a"]);
        let positions: Vec<usize> = ranked.iter().map(|r| r.rank).collect();
        assert_eq!(positions, [1, 2, 3]);
    }

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn ties_break_on_first_observation() {
        // "zzz" was observed before "aaa"; alphabetical order must not win.
        let stats = map(&[("aaa", 4, 5), ("zzz", 4, 1), ("mmm", 4, 3)]);
        let ranked = top_n(&stats, None, |s| s.value as f64);

        let keys: Vec<&str> = ranked.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["zzz", "mmm", "aaa"]);
    }

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn limit_truncates() {
        let stats = map(&[("a", 1, 0), ("b", 2, 1), ("c", 3, 2)]);
        let ranked = top_n(&stats, Some(2), |s| s.value as f64);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].key, "c");
    }

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn empty_map_ranks_empty() {
        let stats: BTreeMap<String, Fake> = BTreeMap::new();
        assert!(top_n(&stats, None, |s| s.value as f64).is_empty());
    }
}
