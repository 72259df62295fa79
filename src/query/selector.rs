//! Per-query selection: cherry-pick list, else offset/limit range minus skips.

use crate::config::{BenchmarkConfig, QueryNumbers};

/// Extract the TPC-DS query number embedded in a query name.
///
/// The text after the first `q` is cut at the first `a`/`b` suffix marker and
/// the first run of digits in what remains is the number. Names without
/// digits map to 0.
pub fn query_number(name: &str) -> u32 {
    let Some((_, rest)) = name.split_once('q') else {
        return 0;
    };
    let rest = match rest.find(['a', 'b']) {
        Some(end) => &rest[..end],
        None => rest,
    };

    let digits: String = rest
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    // Saturate rather than fail on absurdly long digit runs
    digits.parse().unwrap_or(if digits.is_empty() { 0 } else { u32::MAX })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotCherryPicked,
    OutOfRange,
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Run,
    Skip(SkipReason),
}

impl Selection {
    pub fn should_run(&self) -> bool {
        matches!(self, Selection::Run)
    }
}

#[derive(Debug, Clone)]
pub struct QuerySelector {
    offset: u32,
    limit: u32,
    skipped: QueryNumbers,
    cherry_picked: QueryNumbers,
}

impl QuerySelector {
    pub fn new(config: &BenchmarkConfig) -> Self {
        Self {
            offset: config.query_offset,
            limit: config.query_limit,
            skipped: config.skipped_queries.clone(),
            cherry_picked: config.cherry_picked_queries.clone(),
        }
    }

    pub fn select(&self, name: &str) -> Selection {
        self.select_number(query_number(name))
    }

    pub fn select_number(&self, number: u32) -> Selection {
        if !self.cherry_picked.is_empty() {
            return if self.cherry_picked.contains(number) {
                Selection::Run
            } else {
                Selection::Skip(SkipReason::NotCherryPicked)
            };
        }

        // Inclusive on both ends: offset..=offset+limit
        let upper = self.offset.saturating_add(self.limit);
        if number < self.offset || number > upper {
            Selection::Skip(SkipReason::OutOfRange)
        } else if self.skipped.contains(number) {
            Selection::Skip(SkipReason::Skipped)
        } else {
            Selection::Run
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector(offset: u32, limit: u32, skipped: &[u32], cherry: &[u32]) -> QuerySelector {
        let config = BenchmarkConfig::builder()
            .format("parquet")
            .scale_in_gb(1)
            .benchmark_path("/tmp")
            .query_offset(offset)
            .query_limit(limit)
            .skipped_queries(skipped.iter().copied().collect())
            .cherry_picked_queries(cherry.iter().copied().collect())
            .build()
            .unwrap();
        QuerySelector::new(&config)
    }

    #[test]
    fn test_query_number_extraction() {
        assert_eq!(query_number("q14a"), 14);
        assert_eq!(query_number("q14b"), 14);
        assert_eq!(query_number("q1"), 1);
        assert_eq!(query_number("q98"), 98);
        assert_eq!(query_number("qNoDigits"), 0);
        assert_eq!(query_number(""), 0);
        assert_eq!(query_number("no-marker"), 0);
        assert_eq!(query_number("query-7"), 7);
    }

    #[test]
    fn test_query_number_suffix_cuts_before_digits() {
        // "a" terminates the search even when digits follow it
        assert_eq!(query_number("qa5"), 0);
        assert_eq!(query_number("tpcds-q39b-v2"), 39);
    }

    #[test]
    fn test_cherry_pick_overrides_range() {
        let sel = selector(100, 0, &[3, 7], &[3, 7]);
        let run: Vec<u32> = [1, 3, 5, 7]
            .into_iter()
            .filter(|n| sel.select_number(*n).should_run())
            .collect();
        assert_eq!(run, vec![3, 7]);
        assert_eq!(sel.select("q5"), Selection::Skip(SkipReason::NotCherryPicked));
    }

    #[test]
    fn test_range_and_skip_list() {
        let sel = selector(5, 10, &[7], &[]);
        assert_eq!(sel.select("q6"), Selection::Run);
        assert_eq!(sel.select("q7"), Selection::Skip(SkipReason::Skipped));
        assert_eq!(sel.select("q16"), Selection::Skip(SkipReason::OutOfRange));
        assert_eq!(sel.select("q4"), Selection::Skip(SkipReason::OutOfRange));
        // Both bounds are inclusive
        assert_eq!(sel.select("q5"), Selection::Run);
        assert_eq!(sel.select("q15"), Selection::Run);
    }

    #[test]
    fn test_defaults_run_everything_numbered() {
        let sel = selector(1, 100_000, &[], &[]);
        assert!(sel.select("q1").should_run());
        assert!(sel.select("q99").should_run());
        assert!(!sel.select("qNoDigits").should_run());
    }

    #[test]
    fn test_selection_is_stable() {
        let sel = selector(1, 50, &[42], &[]);
        for _ in 0..3 {
            assert_eq!(sel.select("q39a"), Selection::Run);
            assert_eq!(sel.select("q42"), Selection::Skip(SkipReason::Skipped));
        }
    }

    #[test]
    fn test_limit_does_not_overflow() {
        let sel = selector(u32::MAX - 1, 100_000, &[], &[]);
        assert!(sel.select_number(u32::MAX).should_run());
    }
}
