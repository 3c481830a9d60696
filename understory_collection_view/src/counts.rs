// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-section item counts with a lazily-maintained prefix-sum cache.

use alloc::vec::Vec;

use crate::source::DataSource;

/// Per-section item counts plus the cumulative "items before section" table.
///
/// The table maps between the two-level `(section, item)` coordinate and a
/// flat global item index: `global = items_before(section) + item`. Prefix
/// sums are filled lazily up to the furthest section queried so far, and the
/// inverse lookup binary-searches them.
///
/// Methods that consult prefix sums take `&mut self` so the cache can be
/// maintained without interior mutability.
///
/// ```rust
/// use understory_collection_view::SectionCounts;
///
/// let mut counts = SectionCounts::from_source(&[3_usize, 0, 2]);
/// assert_eq!(counts.items_before(2), Some(3));
/// assert_eq!(counts.section_for_global_index(3), Some(2));
/// assert_eq!(counts.total(), 5);
/// ```
#[derive(Clone, Default, Debug)]
pub struct SectionCounts {
    counts: Vec<usize>,
    prefix_starts: Vec<usize>,
    dirty_from: Option<usize>,
}

impl SectionCounts {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            counts: Vec::new(),
            prefix_starts: Vec::new(),
            dirty_from: Some(0),
        }
    }

    /// Creates a table filled from `source`.
    pub fn from_source<D: DataSource + ?Sized>(source: &D) -> Self {
        let mut counts = Self::new();
        counts.rebuild(source);
        counts
    }

    /// Discards all counts and asks `source` again.
    pub fn rebuild<D: DataSource + ?Sized>(&mut self, source: &D) {
        let sections = source.number_of_sections();
        self.counts.clear();
        self.counts
            .extend((0..sections).map(|section| source.number_of_items(section)));
        self.prefix_starts.clear();
        self.prefix_starts.resize(sections, 0);
        self.dirty_from = Some(0);
    }

    /// Number of sections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Returns `true` if there are no sections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of items in `section`, or `None` if it does not exist.
    #[must_use]
    pub fn count(&self, section: usize) -> Option<usize> {
        self.counts.get(section).copied()
    }

    /// All per-section counts, in section order.
    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.counts
    }

    fn ensure_prefix_through(&mut self, through: usize) {
        let len = self.counts.len();
        if len == 0 || through >= len {
            return;
        }

        let dirty_from = match self.dirty_from {
            Some(d) if d <= through => d,
            _ => return,
        };

        let mut pos = if dirty_from == 0 {
            0
        } else {
            self.prefix_starts[dirty_from - 1] + self.counts[dirty_from - 1]
        };

        for i in dirty_from..=through {
            self.prefix_starts[i] = pos;
            pos += self.counts[i];
        }

        if through >= len - 1 {
            self.dirty_from = None;
        } else {
            self.dirty_from = Some(through + 1);
        }
    }

    /// Number of items in all sections before `section`.
    ///
    /// Returns `None` unless `section < len()`.
    pub fn items_before(&mut self, section: usize) -> Option<usize> {
        if section >= self.counts.len() {
            return None;
        }
        self.ensure_prefix_through(section);
        self.prefix_starts.get(section).copied()
    }

    /// Total number of items across all sections.
    pub fn total(&mut self) -> usize {
        let Some(last) = self.counts.len().checked_sub(1) else {
            return 0;
        };
        self.ensure_prefix_through(last);
        self.prefix_starts[last] + self.counts[last]
    }

    /// Section containing the item with global index `index`.
    ///
    /// Returns `None` when `index >= total()`. Empty sections never match.
    pub fn section_for_global_index(&mut self, index: usize) -> Option<usize> {
        if index >= self.total() {
            return None;
        }
        // The last section starting at or before `index`; with empty sections
        // sharing a start, that is the non-empty one that follows them.
        let after = self.prefix_starts.partition_point(|&start| start <= index);
        after.checked_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::SectionCounts;

    #[test]
    fn prefix_sums_match_counts() {
        let mut counts = SectionCounts::from_source(&[2_usize, 3, 0, 4]);
        assert_eq!(counts.len(), 4);
        assert_eq!(counts.items_before(0), Some(0));
        assert_eq!(counts.items_before(1), Some(2));
        assert_eq!(counts.items_before(2), Some(5));
        assert_eq!(counts.items_before(3), Some(5));
        assert_eq!(counts.total(), 9);
        assert_eq!(counts.items_before(4), None);
    }

    #[test]
    fn lazy_prefix_fills_incrementally() {
        let mut counts = SectionCounts::from_source(&[1_usize, 1, 1, 1]);
        assert_eq!(counts.items_before(1), Some(1));
        assert_eq!(counts.dirty_from, Some(2));
        assert_eq!(counts.items_before(3), Some(3));
        assert_eq!(counts.dirty_from, None);
    }

    #[test]
    fn global_lookup_skips_empty_sections() {
        let mut counts = SectionCounts::from_source(&[0_usize, 3, 0, 0, 2, 0]);
        assert_eq!(counts.section_for_global_index(0), Some(1));
        assert_eq!(counts.section_for_global_index(2), Some(1));
        assert_eq!(counts.section_for_global_index(3), Some(4));
        assert_eq!(counts.section_for_global_index(4), Some(4));
        assert_eq!(counts.section_for_global_index(5), None);
    }

    #[test]
    fn rebuild_discards_previous_counts() {
        let mut counts = SectionCounts::from_source(&[5_usize, 5]);
        assert_eq!(counts.total(), 10);
        counts.rebuild(&[1_usize]);
        assert_eq!(counts.as_slice(), &[1]);
        assert_eq!(counts.total(), 1);
        assert!(SectionCounts::new().is_empty());
        assert_eq!(SectionCounts::new().total(), 0);
    }
}
