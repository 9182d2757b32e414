//! # Token Frequency Counter

use crate::types::{TokenId, UTHashMap};

/// A frequency bucket: `[low, high)`.
pub type CountBound = (u64, u64);

/// Per-id frequency counts, only recorded while active.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Counter {
    active: bool,
    counts: UTHashMap<TokenId, u64>,
}

impl Counter {
    /// Start recording.
    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Stop recording; existing counts are kept.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Drop all recorded counts.
    pub fn initialize(&mut self) {
        self.counts.clear();
    }

    /// Is the counter recording?
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Record one occurrence of `index`, if active.
    pub fn record(
        &mut self,
        index: TokenId,
    ) {
        if self.active {
            *self.counts.entry(index).or_default() += 1;
        }
    }

    /// The recorded count for `index`.
    pub fn count(
        &self,
        index: TokenId,
    ) -> u64 {
        self.counts.get(&index).copied().unwrap_or_default()
    }

    /// Ids counted at least `min_count` times, in id order.
    pub fn trim(
        &self,
        min_count: u64,
    ) -> Vec<TokenId> {
        let mut valid = self
            .counts
            .iter()
            .filter(|&(_, &count)| count >= min_count)
            .map(|(&index, _)| index)
            .collect::<Vec<_>>();
        valid.sort_unstable();
        valid
    }

    /// Histogram of token frequencies.
    ///
    /// Buckets are `[(1, 2), ..., (9, 10), (10, 20), ..., (90, 100), ...]` for `base = 10`;
    /// empty buckets are omitted.
    ///
    /// ## Returns
    /// `(bound, number of ids whose count falls in bound)`, ascending.
    pub fn summarize(
        &self,
        base: u64,
    ) -> Vec<(CountBound, usize)> {
        let Some(&max_count) = self.counts.values().max() else {
            return Vec::new();
        };
        let base = base.max(2);

        let mut digits_max = base;
        while digits_max <= max_count {
            digits_max *= base;
        }

        let mut bounds = Vec::new();
        while digits_max >= base {
            let digits_min = digits_max / base;
            for k in (1..base).rev() {
                let low = k * digits_min;
                bounds.push((low, low + digits_min));
            }
            digits_max = digits_min;
        }
        bounds.reverse();

        let mut histogram = vec![0usize; bounds.len()];
        for &count in self.counts.values() {
            let slot = bounds.partition_point(|&(_, high)| high <= count);
            if let Some(&(low, high)) = bounds.get(slot)
                && low <= count
                && count < high
            {
                histogram[slot] += 1;
            }
        }

        bounds
            .into_iter()
            .zip(histogram)
            .filter(|&(_, n)| n > 0)
            .collect()
    }
}
