//! Sorted, automatically merging set of disjoint ranges.
//!
//! Uses a sorted vector with binary search. Point queries are O(log n); insertion is O(n) because
//! the vector has to stay sorted.

use crate::delta::TextChange;
use crate::range::{Position, Range, RangeId};

/// Ordered set of disjoint ranges backing multi-selection.
///
/// At the end of every public operation no two stored ranges overlap or touch and the ranges
/// are strictly increasing by `start`. Touching ranges (`a.end == b.start`) are merged.
#[derive(Debug, Clone, Default)]
pub struct RangeList {
    ranges: Vec<Range>,
}

impl RangeList {
    /// Create an empty range list.
    pub fn new() -> Self {
        Self { ranges: Vec::new() }
    }

    /// Number of stored ranges.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Returns `true` if no range is stored.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Stored ranges in position order.
    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    /// First range in position order.
    pub fn first(&self) -> Option<&Range> {
        self.ranges.first()
    }

    /// Last range in position order.
    pub fn last(&self) -> Option<&Range> {
        self.ranges.last()
    }

    /// Look a range up by id.
    pub fn get(&self, id: RangeId) -> Option<&Range> {
        self.ranges.iter().find(|r| r.id == id)
    }

    /// Index of the range with the given id.
    pub fn index_of(&self, id: RangeId) -> Option<usize> {
        self.ranges.iter().position(|r| r.id == id)
    }

    /// Rewrite a stored range in place.
    ///
    /// The rewrite may break ordering or disjointness; call [`RangeList::merge`] afterwards to
    /// re-establish the invariants. Returns `false` if no range has that id.
    pub fn update<F>(&mut self, id: RangeId, f: F) -> bool
    where
        F: FnOnce(&mut Range),
    {
        match self.ranges.iter_mut().find(|r| r.id == id) {
            Some(range) => {
                f(range);
                true
            }
            None => false,
        }
    }

    /// Binary search for `pos`.
    ///
    /// Returns `Ok(index)` of the range containing `pos` (edges inclusive), or `Err(index)` where a
    /// range starting at `pos` would be inserted.
    pub fn point_index(&self, pos: Position) -> Result<usize, usize> {
        let idx = self.ranges.partition_point(|r| r.end < pos);
        match self.ranges.get(idx) {
            Some(range) if range.start <= pos => Ok(idx),
            _ => Err(idx),
        }
    }

    /// Insert `range`, merging every stored range it overlaps or touches.
    ///
    /// The merged range covers the union of the chain and keeps the direction, id and desired
    /// column of the inserted (most recent) range. Returns the absorbed ranges in position order.
    pub fn insert(&mut self, range: Range) -> Vec<Range> {
        let lo = self.ranges.partition_point(|r| r.end < range.start);
        let hi = self.ranges.partition_point(|r| r.start <= range.end);

        let mut merged = range;
        let removed: Vec<Range> = if lo < hi {
            self.ranges.drain(lo..hi).collect()
        } else {
            Vec::new()
        };
        for absorbed in &removed {
            merged.start = merged.start.min(absorbed.start);
            merged.end = merged.end.max(absorbed.end);
        }

        self.ranges.insert(lo, merged);
        removed
    }

    /// Remove every range, returning the previous contents.
    pub fn remove_all(&mut self) -> Vec<Range> {
        std::mem::take(&mut self.ranges)
    }

    /// Remove the range containing `pos`, if any.
    pub fn substract_point(&mut self, pos: Position) -> Option<Range> {
        let idx = self.point_index(pos).ok()?;
        Some(self.ranges.remove(idx))
    }

    /// Remove the range with the given id.
    pub fn remove(&mut self, id: RangeId) -> Option<Range> {
        let idx = self.index_of(id)?;
        Some(self.ranges.remove(idx))
    }

    /// Remove the last range in position order.
    pub fn pop_last(&mut self) -> Option<Range> {
        self.ranges.pop()
    }

    /// The range containing `pos`, if any.
    pub fn range_at_point(&self, pos: Position) -> Option<&Range> {
        let idx = self.point_index(pos).ok()?;
        self.ranges.get(idx)
    }

    /// Re-sort and merge ranges that came to overlap through out-of-band mutation.
    ///
    /// Of two merged ranges, the more recently inserted one (larger id) survives with the union
    /// span. Returns the absorbed ranges; a second call without intervening mutation returns an
    /// empty list.
    pub fn merge(&mut self) -> Vec<Range> {
        self.ranges.sort_by(Range::cmp_position);

        let mut removed = Vec::new();
        let mut merged: Vec<Range> = Vec::with_capacity(self.ranges.len());
        for range in self.ranges.drain(..) {
            let Some(last) = merged.last_mut() else {
                merged.push(range);
                continue;
            };
            if last.end < range.start {
                merged.push(range);
                continue;
            }

            let start = last.start.min(range.start);
            let end = last.end.max(range.end);
            if range.id > last.id {
                removed.push(std::mem::replace(last, range));
            } else {
                removed.push(range);
            }
            last.start = start;
            last.end = end;
        }

        self.ranges = merged;
        removed
    }

    /// Shift every stored range for a document edit.
    ///
    /// Order is preserved, but removals can make neighbours touch; follow with
    /// [`RangeList::merge`] when disjointness matters.
    pub fn apply_change(&mut self, change: &TextChange) {
        for range in &mut self.ranges {
            change.shift_range(range);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::SelectionDirection;

    fn with_id(mut range: Range, id: u64) -> Range {
        range.id = RangeId(id);
        range
    }

    #[test]
    fn test_insert_keeps_sorted_order() {
        let mut list = RangeList::new();
        list.insert(Range::from_coords(2, 0, 2, 1));
        list.insert(Range::from_coords(0, 0, 0, 1));
        list.insert(Range::from_coords(1, 0, 1, 1));

        let rows: Vec<usize> = list.ranges().iter().map(|r| r.start.row).collect();
        assert_eq!(rows, vec![0, 1, 2]);
    }

    #[test]
    fn test_insert_merges_chain_and_keeps_newest_direction() {
        let mut list = RangeList::new();
        list.insert(with_id(Range::from_coords(0, 0, 0, 2), 1));
        list.insert(with_id(Range::from_coords(0, 4, 0, 6), 2));
        list.insert(with_id(Range::from_coords(0, 8, 0, 9), 3));

        let newest = with_id(Range::from_coords(0, 2, 0, 4), 4)
            .with_direction(SelectionDirection::Backward);
        let removed = list.insert(newest);

        assert_eq!(removed.len(), 2);
        assert_eq!(list.len(), 2);
        let merged = &list.ranges()[0];
        assert_eq!(merged.start, Position::new(0, 0));
        assert_eq!(merged.end, Position::new(0, 6));
        assert_eq!(merged.id, RangeId(4));
        assert!(merged.is_backwards());
    }

    #[test]
    fn test_point_index_edges_are_inclusive() {
        let mut list = RangeList::new();
        list.insert(Range::from_coords(0, 2, 0, 4));
        assert_eq!(list.point_index(Position::new(0, 2)), Ok(0));
        assert_eq!(list.point_index(Position::new(0, 4)), Ok(0));
        assert_eq!(list.point_index(Position::new(0, 1)), Err(0));
        assert_eq!(list.point_index(Position::new(0, 5)), Err(1));
    }

    #[test]
    fn test_merge_after_out_of_band_update() {
        let mut list = RangeList::new();
        list.insert(with_id(Range::from_coords(0, 0, 0, 1), 1));
        list.insert(with_id(Range::from_coords(0, 5, 0, 6), 2));

        assert!(list.update(RangeId(1), |r| r.end = Position::new(0, 7)));
        let removed = list.merge();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id, RangeId(1));
        assert_eq!(list.ranges()[0].id, RangeId(2));
        assert_eq!(list.ranges()[0].start, Position::new(0, 0));
        assert_eq!(list.ranges()[0].end, Position::new(0, 7));

        assert!(list.merge().is_empty());
    }

    #[test]
    fn test_apply_change_shifts_ranges() {
        let mut list = RangeList::new();
        list.insert(Range::from_coords(0, 4, 0, 6));
        list.insert(Range::from_coords(1, 0, 1, 2));
        list.apply_change(&TextChange::insert(
            Position::new(0, 0),
            Position::new(1, 0),
            "\n",
        ));
        assert_eq!(list.ranges()[0], Range::from_coords(1, 4, 1, 6));
        assert_eq!(list.ranges()[1], Range::from_coords(2, 0, 2, 2));
    }
}
