// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounded per-output damage history for buffer-age repair.
//!
//! Swapchain buffers come back with stale content. A buffer of age `N`
//! still holds the frame presented `N` frames ago, so before reuse it must
//! additionally repaint everything that changed in the `N - 1` frames in
//! between. The journal keeps those per-frame damage regions, newest first,
//! up to a fixed depth.

use alloc::collections::VecDeque;

use strata_core::region::Region;

/// How many frames of damage are retained per output.
const CAPACITY: usize = 10;

/// A bounded, newest-first log of per-frame damage regions.
#[derive(Clone, Debug, Default)]
pub struct DamageJournal {
    history: VecDeque<Region>,
}

impl DamageJournal {
    /// Creates an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self {
            history: VecDeque::with_capacity(CAPACITY),
        }
    }

    /// Records the damage of a completed frame, evicting the oldest entry
    /// when the journal is full.
    pub fn record(&mut self, damage: Region) {
        if self.history.len() == CAPACITY {
            self.history.pop_back();
        }
        self.history.push_front(damage);
    }

    /// Number of retained frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Returns whether the journal holds no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Reconstructs the extra region a buffer of the given age must repaint.
    ///
    /// Returns the union of the newest `buffer_age - 1` entries, or `None`
    /// when the age is 0 (unknown content) or exceeds the retained history,
    /// in which case the caller must repaint the full output.
    #[must_use]
    pub fn accumulate(&self, buffer_age: usize) -> Option<Region> {
        if buffer_age == 0 || buffer_age > self.history.len() {
            return None;
        }
        let mut region = Region::new();
        for damage in self.history.iter().take(buffer_age - 1) {
            region.union(damage);
        }
        Some(region)
    }

    /// Drops all history, e.g. after an output reconfiguration.
    pub fn clear(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use strata_core::geometry::Rect;

    use super::*;

    fn region(x: i32) -> Region {
        Region::from_rect(Rect::new(x, 0, 10, 10))
    }

    #[test]
    fn accumulate_unions_newest_entries() {
        let mut journal = DamageJournal::new();
        journal.record(region(30)); // three frames ago
        journal.record(region(20)); // two frames ago
        journal.record(region(10)); // last frame

        // Age 3: the buffer holds the frame from three frames ago, so the
        // two newer frames' damage must be repainted on top.
        let expected = region(10).united(&region(20));
        assert_eq!(journal.accumulate(3), Some(expected));

        // Age 1: the buffer holds the last frame; nothing extra.
        assert_eq!(journal.accumulate(1), Some(Region::new()));
    }

    #[test]
    fn unknown_or_excessive_age_means_full_repaint() {
        let mut journal = DamageJournal::new();
        journal.record(region(10));

        assert_eq!(journal.accumulate(0), None, "age 0 is unknown content");
        assert_eq!(journal.accumulate(2), None, "not enough history");
    }

    #[test]
    fn history_is_bounded() {
        let mut journal = DamageJournal::new();
        for i in 0..15 {
            journal.record(region(i * 100));
        }
        assert_eq!(journal.len(), CAPACITY);

        // The newest entry survives; entries beyond the capacity are gone.
        let newest = journal.accumulate(2).expect("within history");
        assert_eq!(newest, region(1400));
        assert_eq!(journal.accumulate(CAPACITY + 1), None);
    }

    #[test]
    fn clear_forgets_everything() {
        let mut journal = DamageJournal::new();
        journal.record(region(0));
        journal.clear();
        assert!(journal.is_empty());
        assert_eq!(journal.accumulate(1), None);
    }
}
