use crate::types::{Interval, Offset};

/// The current zoom selection.
///
/// Intervals are sorted by offset, mutually disjoint and have a positive length.
/// Adjacent intervals are not merged because they may carry different `min_depth`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntervalSet {
    intervals: Vec<Interval>,
}

impl IntervalSet {
    /// `intervals` must be sorted and disjoint.
    pub fn new(intervals: Vec<Interval>) -> Self {
        let mut set = Self::default();
        set.apply_new_selection(intervals, 0.0);
        set
    }

    /// Replaces the selection. The caller guarantees the intervals are sorted and disjoint, up to
    /// an overlap of `epsilon`.
    pub fn apply_new_selection(&mut self, intervals: Vec<Interval>, epsilon: f64) {
        debug_assert!(
            intervals
                .windows(2)
                .all(|w| w[0].end() <= w[1].offset + epsilon),
            "selection intervals overlap or are not sorted"
        );
        self.intervals = intervals;
    }

    pub fn as_slice(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn iter(&self) -> impl Iterator<Item = &Interval> {
        self.intervals.iter()
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Sum of the lengths of all selected intervals.
    pub fn total_length(&self) -> f64 {
        self.intervals.iter().map(|interval| interval.length).sum()
    }

    /// Start of the first and end of the last interval.
    pub fn bounds(&self) -> Option<(Offset, Offset)> {
        let first = self.intervals.first()?;
        let last = self.intervals.last()?;
        Some((first.offset, last.end()))
    }

    /// Removes `delta` from the selection.
    ///
    /// With `invert`, everything *outside* of `delta` is removed instead, i.e. `delta` is replaced by
    /// its complement within the bounds of the current selection.
    pub fn subtract(&mut self, delta: &[Interval], invert: bool, epsilon: f64) {
        let complement;
        let delta = if invert {
            complement = self.complement_within(delta, epsilon);
            complement.as_slice()
        } else {
            delta
        };

        let mut i = 0;
        while i < self.intervals.len() {
            if self.cut_interval(i, delta, epsilon) {
                // The interval at `i` changed (or a new one moved there), another delta may still hit it.
                continue;
            }
            i += 1;
        }
    }

    /// Applies the first delta interval that overlaps the interval at `idx`.
    /// Returns true if the selection was modified.
    fn cut_interval(&mut self, idx: usize, delta: &[Interval], epsilon: f64) -> bool {
        let current = self.intervals[idx];

        let Some(cut) = delta.iter().find(|d| {
            d.offset + epsilon <= current.end() && d.end() - epsilon >= current.offset
        }) else {
            return false;
        };

        let covers_left = cut.offset - epsilon < current.offset;
        let covers_right = cut.end() + epsilon > current.end();
        match (covers_left, covers_right) {
            (true, true) => {
                self.intervals.remove(idx);
            }
            (true, false) => {
                self.intervals[idx].offset = cut.end();
                self.intervals[idx].length = current.end() - cut.end();
            }
            (false, true) => {
                self.intervals[idx].length = cut.offset - current.offset;
            }
            (false, false) => {
                self.intervals[idx].length = cut.offset - current.offset;
                self.intervals.insert(
                    idx + 1,
                    Interval::new(cut.end(), current.end() - cut.end(), current.min_depth),
                );
            }
        }
        true
    }

    /// Gaps before, between and after the `delta` intervals, bounded by the extremes of the current
    /// selection. Gaps are tagged with `min_depth` 0, gaps shorter than `epsilon` are dropped.
    pub fn complement_within(&self, delta: &[Interval], epsilon: f64) -> Vec<Interval> {
        let Some((start, end)) = self.bounds() else {
            return vec![];
        };

        let mut gaps = vec![];
        let mut cursor = start;
        for d in delta {
            let gap_end = d.offset.min(end);
            if gap_end - cursor > epsilon {
                gaps.push(Interval::new(cursor, gap_end - cursor, 0));
            }
            cursor = cursor.max(d.end());
        }
        if end - cursor > epsilon {
            gaps.push(Interval::new(cursor, end - cursor, 0));
        }
        gaps
    }
}
