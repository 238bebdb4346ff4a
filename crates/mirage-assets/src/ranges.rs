//! Ordered set of received byte ranges
//!
//! Tracks which parts of an asset have arrived when chunks land in arbitrary
//! order. Ranges are half-open `[start, end)`, kept sorted, disjoint, and
//! merged with any neighbor they touch.

/// Set of non-overlapping byte ranges.
#[derive(Debug, Clone, Default)]
pub struct RangeSet {
    spans: Vec<(u32, u32)>,
}

impl RangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `[start, end)`, merging with existing spans.
    ///
    /// Returns `false` if the range was already fully covered (a duplicate
    /// chunk) or empty, `true` if any new bytes were recorded.
    pub fn insert(&mut self, start: u32, end: u32) -> bool {
        if start >= end || self.covers(start, end) {
            return false;
        }

        let mut merged = Vec::with_capacity(self.spans.len() + 1);
        let mut new_start = start;
        let mut new_end = end;
        let mut i = 0;

        // Spans strictly before the new range, not even adjacent.
        while i < self.spans.len() && self.spans[i].1 < new_start {
            merged.push(self.spans[i]);
            i += 1;
        }
        // Everything overlapping or adjacent folds into the new span.
        while i < self.spans.len() && self.spans[i].0 <= new_end {
            new_start = new_start.min(self.spans[i].0);
            new_end = new_end.max(self.spans[i].1);
            i += 1;
        }
        merged.push((new_start, new_end));
        merged.extend_from_slice(&self.spans[i..]);

        self.spans = merged;
        true
    }

    /// Whether `[start, end)` lies entirely within one recorded span.
    pub fn covers(&self, start: u32, end: u32) -> bool {
        if start >= end {
            return true;
        }
        self.spans.iter().any(|&(s, e)| s <= start && end <= e)
    }

    /// Length of the gap-free prefix starting at offset 0.
    pub fn continuous(&self) -> u32 {
        match self.spans.first() {
            Some(&(0, end)) => end,
            _ => 0,
        }
    }

    /// Total number of bytes recorded across all spans.
    pub fn total(&self) -> u32 {
        self.spans.iter().map(|&(s, e)| e - s).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}
