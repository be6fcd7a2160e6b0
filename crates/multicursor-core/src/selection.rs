//! Selection controller.
//!
//! # Overview
//!
//! [`SelectionController`] owns the primary (oriented) range plus a [`RangeList`] of secondary
//! ranges, and switches between single and multi mode:
//!
//! - **Single mode**: the primary range is the whole selection and the list is empty.
//! - **Multi mode**: the list holds every range (two or more); the primary mirrors the most
//!   recently added one.
//!
//! A caller never observes multi mode with fewer than two ranges: whenever an operation drops
//! the list to one range, that range is evicted and becomes the single selection.
//!
//! Lifecycle signals ([`SelectionEvent`]) are delivered synchronously to subscribers after the
//! state change they describe, so a subscriber always sees the post-change state.
//!
//! # Example
//!
//! ```rust
//! use multicursor_core::{Range, SelectionController, SelectionMode};
//!
//! let mut selection = SelectionController::new();
//! selection.add_range(Range::from_coords(1, 0, 1, 3), false);
//! assert_eq!(selection.mode(), SelectionMode::Multi);
//! assert_eq!(selection.range_count(), 2);
//!
//! selection.to_single_range(None);
//! assert_eq!(selection.mode(), SelectionMode::Single);
//! assert_eq!(selection.range_count(), 0);
//! ```

use crate::block::rectangular_range_block;
use crate::delta::TextChange;
use crate::document::{Document, ScreenMapper};
use crate::range::{Position, Range, RangeId, ScreenPosition, SelectionDirection};
use crate::range_list::RangeList;
use std::fmt;

/// Selection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// One range, held as the primary.
    #[default]
    Single,
    /// Two or more ranges, held in the range list.
    Multi,
}

/// Lifecycle signal emitted by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    /// A range was added to the list.
    AddRange {
        /// The stored range.
        range: Range,
    },
    /// Ranges were absorbed or removed.
    RemoveRange {
        /// The removed ranges.
        ranges: Vec<Range>,
    },
    /// The controller entered multi mode.
    MultiSelect,
    /// The controller left multi mode.
    SingleSelect,
}

/// Subscriber callback.
pub type SelectionEventCallback = Box<dyn FnMut(&SelectionEvent) + Send>;

/// Owner of the primary range and the secondary range list.
pub struct SelectionController {
    primary: Range,
    range_list: RangeList,
    /// Ids of stored ranges, most recently added first.
    ranges: Vec<RangeId>,
    mode: SelectionMode,
    is_virtual: bool,
    next_id: u64,
    subscribers: Vec<SelectionEventCallback>,
}

impl fmt::Debug for SelectionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionController")
            .field("primary", &self.primary)
            .field("range_list", &self.range_list)
            .field("ranges", &self.ranges)
            .field("mode", &self.mode)
            .field("is_virtual", &self.is_virtual)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionController {
    /// Create a controller with a caret at the document start.
    pub fn new() -> Self {
        Self::with_primary(Range::caret(Position::new(0, 0)))
    }

    /// Create a controller whose single selection is `range`.
    pub fn with_primary(range: Range) -> Self {
        Self {
            primary: range.detached(),
            range_list: RangeList::new(),
            ranges: Vec::new(),
            mode: SelectionMode::Single,
            is_virtual: false,
            next_id: 1,
            subscribers: Vec::new(),
        }
    }

    /// Create a detached single-range stand-in used while replaying a command for one range.
    pub(crate) fn new_virtual(range: &Range) -> Self {
        let mut controller = Self::with_primary(range.clone());
        controller.is_virtual = true;
        controller
    }

    /// Current mode.
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Returns `true` in multi mode.
    pub fn is_multi(&self) -> bool {
        self.mode == SelectionMode::Multi
    }

    /// Returns `true` for the transient stand-in used during per-range replay.
    pub fn is_virtual(&self) -> bool {
        self.is_virtual
    }

    /// Number of ranges in the list (zero in single mode).
    pub fn range_count(&self) -> usize {
        self.range_list.len()
    }

    /// The primary (oriented) range.
    pub fn primary(&self) -> &Range {
        &self.primary
    }

    /// Replace the primary range without touching the list.
    pub fn set_primary(&mut self, range: Range) {
        self.primary = range.detached();
    }

    /// Read-only view of the position-sorted range list.
    pub fn range_list(&self) -> &RangeList {
        &self.range_list
    }

    /// Snapshot of every range: the list contents in multi mode, the primary otherwise.
    pub fn all_ranges(&self) -> Vec<Range> {
        if self.range_list.is_empty() {
            vec![self.primary.clone()]
        } else {
            self.range_list.ranges().to_vec()
        }
    }

    /// Stored ranges, most recently added first.
    pub fn ranges_by_recency(&self) -> Vec<Range> {
        self.ranges
            .iter()
            .filter_map(|id| self.range_list.get(*id))
            .cloned()
            .collect()
    }

    /// The most recently added stored range.
    pub fn most_recent(&self) -> Option<&Range> {
        self.ranges.first().and_then(|id| self.range_list.get(*id))
    }

    /// Subscribe to lifecycle signals.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&SelectionEvent) + Send + 'static,
    {
        self.subscribers.push(Box::new(callback));
    }

    pub(crate) fn detach_subscribers(&mut self) -> Vec<SelectionEventCallback> {
        std::mem::take(&mut self.subscribers)
    }

    pub(crate) fn attach_subscribers(&mut self, subscribers: Vec<SelectionEventCallback>) {
        self.subscribers = subscribers;
    }

    fn emit(&mut self, event: SelectionEvent) {
        for callback in &mut self.subscribers {
            callback(&event);
        }
    }

    fn allocate_id(&mut self) -> RangeId {
        let id = RangeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add a range, entering multi mode when a second distinct range appears.
    ///
    /// In single mode the current primary is materialized into the list first; if the two
    /// merge into one range, the controller stays in single mode with the merged result.
    /// With `silent`, `AddRange`/`RemoveRange` signals and the primary update are suppressed;
    /// mode signals still fire. Returns the stored (possibly merged) range.
    pub fn add_range(&mut self, range: Range, silent: bool) -> Range {
        let mut range = range;

        if self.mode == SelectionMode::Single && self.range_list.is_empty() {
            let mut old = self.primary.clone();
            old.id = self.allocate_id();
            range.id = self.allocate_id();

            self.range_list.insert(old.clone());
            self.range_list.insert(range.clone());
            if self.range_list.len() != 2 {
                let merged = self
                    .range_list
                    .remove_all()
                    .pop()
                    .unwrap_or_else(|| range.clone());
                if !silent {
                    self.set_primary(merged.clone());
                }
                return merged;
            }

            self.range_list.remove_all();
            self.range_list.insert(old.clone());
            self.on_add_range(old, silent);
        } else {
            range.id = self.allocate_id();
        }

        let id = range.id;
        let removed = self.range_list.insert(range.clone());
        let stored = self.range_list.get(id).cloned().unwrap_or(range);

        self.on_add_range(stored.clone(), silent);
        if !removed.is_empty() {
            self.on_remove_range(removed, silent);
        }

        if self.range_list.len() > 1 && self.mode == SelectionMode::Single {
            self.mode = SelectionMode::Multi;
            tracing::debug!(ranges = self.range_list.len(), "entered multi-select mode");
            self.emit(SelectionEvent::MultiSelect);
        }

        if !silent {
            self.set_primary(stored.clone());
        }
        stored
    }

    /// Clear the list and make `range` (default: the most recently added range) the single
    /// selection.
    pub fn to_single_range(&mut self, range: Option<Range>) {
        let range = range.or_else(|| self.most_recent().cloned());
        let removed = self.range_list.remove_all();
        if !removed.is_empty() {
            self.on_remove_range(removed, false);
        }
        if let Some(range) = range {
            self.set_primary(range);
        }
    }

    /// Replace the whole selection with `ranges`, the last one becoming the primary.
    ///
    /// The first range is adopted as the single selection before the others are added, so a
    /// multi-line primary does not absorb the ranges derived from it.
    pub fn set_ranges(&mut self, ranges: Vec<Range>) {
        let mut iter = ranges.into_iter();
        let Some(first) = iter.next() else {
            return;
        };
        self.to_single_range(Some(first));
        for range in iter {
            self.add_range(range, false);
        }
    }

    /// Remove the range containing `pos`.
    pub fn substract_point(&mut self, pos: Position) -> Option<Range> {
        let removed = self.range_list.substract_point(pos)?;
        self.on_remove_range(vec![removed.clone()], false);
        Some(removed)
    }

    /// Merge ranges that came to overlap after out-of-band changes.
    pub fn merge_overlapping_ranges(&mut self) {
        let removed = self.range_list.merge();
        if !removed.is_empty() {
            self.on_remove_range(removed, false);
        }
    }

    /// Rewrite a stored range in place; follow with [`Self::merge_overlapping_ranges`].
    pub fn update_range<F>(&mut self, id: RangeId, f: F) -> bool
    where
        F: FnOnce(&mut Range),
    {
        self.range_list.update(id, f)
    }

    /// Shift the primary and every stored range for a document edit.
    pub fn apply_change(&mut self, change: &TextChange) {
        change.shift_range(&mut self.primary);
        self.range_list.apply_change(change);
    }

    fn on_add_range(&mut self, range: Range, silent: bool) {
        self.ranges.insert(0, range.id);
        if !silent {
            self.emit(SelectionEvent::AddRange { range });
        }
    }

    fn on_remove_range(&mut self, mut removed: Vec<Range>, silent: bool) {
        let mut last_range = None;
        if self.range_list.len() == 1 && self.mode == SelectionMode::Multi {
            if let Some(last) = self.range_list.pop_last() {
                removed.push(last.clone());
                last_range = Some(last);
            }
        }

        self.ranges
            .retain(|id| !removed.iter().any(|range| range.id == *id));

        if !silent {
            self.emit(SelectionEvent::RemoveRange { ranges: removed });
        }

        if self.range_list.is_empty() && self.mode == SelectionMode::Multi {
            self.mode = SelectionMode::Single;
            tracing::debug!("left multi-select mode");
            self.emit(SelectionEvent::SingleSelect);
        }

        if let Some(range) = last_range.or_else(|| self.most_recent().cloned()) {
            self.set_primary(range);
        }
    }

    /// Split every multi-row range into one range per covered row.
    ///
    /// First and last rows keep the original column bounds, interior rows cover the whole line.
    pub fn split_into_lines(&mut self, doc: &dyn Document) {
        let sources = if self.ranges.is_empty() {
            vec![self.primary.clone()]
        } else {
            self.ranges_by_recency()
        };
        let backwards = self.primary.is_backwards();

        let mut new_ranges = Vec::new();
        for (i, range) in sources.iter().enumerate() {
            if !range.is_multi_line() {
                new_ranges.push(range.detached());
            } else {
                let (first, last) = (range.start.row, range.end.row);
                new_ranges.push(Range::from_coords(
                    first,
                    range.start.column,
                    first,
                    doc.line_len(first),
                ));
                for row in first + 1..last {
                    new_ranges.push(Range::from_coords(row, 0, row, doc.line_len(row)));
                }
                new_ranges.push(Range::from_coords(last, 0, last, range.end.column));
            }
            if i == 0 && !backwards {
                new_ranges.reverse();
            }
        }

        new_ranges.reverse();
        self.set_ranges(new_ranges);
    }

    /// Replace all ranges with one range from the first range's start to the last range's end,
    /// keeping the last range's orientation.
    pub fn join_selections(&mut self) {
        let (Some(first), Some(last)) = (self.range_list.first(), self.range_list.last()) else {
            return;
        };
        let joined = Range::new(first.start, last.end).with_direction(last.direction);
        self.to_single_range(Some(joined));
    }

    /// Toggle between a multi-range selection and its rectangular block.
    ///
    /// With several ranges, they are joined into one. With a single range, the rectangle spanned
    /// by its anchor and cursor on screen is derived and selected (only when `block_enabled`).
    pub fn toggle_block_selection(&mut self, mapper: &dyn ScreenMapper, block_enabled: bool) {
        if self.range_count() > 1 {
            self.join_selections();
            return;
        }
        if !block_enabled {
            return;
        }

        let cursor = mapper.document_to_screen(self.primary.cursor());
        let anchor = mapper.document_to_screen(self.primary.anchor());
        let block = self.rectangular_range_block(mapper, cursor, anchor, false);
        self.set_ranges(block);
    }

    /// Ranges composing the rectangular block between two screen corners.
    pub fn rectangular_range_block(
        &self,
        mapper: &dyn ScreenMapper,
        screen_cursor: ScreenPosition,
        screen_anchor: ScreenPosition,
        include_empty_lines: bool,
    ) -> Vec<Range> {
        rectangular_range_block(mapper, screen_cursor, screen_anchor, include_empty_lines)
    }

    /// Orientation-preserving copy of the primary range.
    pub fn to_oriented_range(&self) -> Range {
        self.primary.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder(selection: &mut SelectionController) -> Arc<Mutex<Vec<SelectionEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        selection.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        events
    }

    #[test]
    fn test_second_range_enters_multi_mode_once() {
        let mut selection = SelectionController::new();
        let events = recorder(&mut selection);

        selection.add_range(Range::from_coords(1, 0, 1, 2), false);
        selection.add_range(Range::from_coords(2, 0, 2, 2), false);

        assert_eq!(selection.mode(), SelectionMode::Multi);
        assert_eq!(selection.range_count(), 3);
        let multi = events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| **e == SelectionEvent::MultiSelect)
            .count();
        assert_eq!(multi, 1);
    }

    #[test]
    fn test_overlapping_second_range_stays_single() {
        let mut selection = SelectionController::with_primary(Range::from_coords(0, 0, 0, 3));
        let merged = selection.add_range(Range::from_coords(0, 2, 0, 5), false);

        assert_eq!(selection.mode(), SelectionMode::Single);
        assert_eq!(selection.range_count(), 0);
        assert_eq!(merged.start, Position::new(0, 0));
        assert_eq!(merged.end, Position::new(0, 5));
        assert!(selection.primary().is_same_span(&merged));
    }

    #[test]
    fn test_removing_down_to_one_range_collapses() {
        let mut selection = SelectionController::new();
        selection.add_range(Range::from_coords(1, 0, 1, 2), false);
        let events = recorder(&mut selection);

        let removed = selection.substract_point(Position::new(0, 0)).unwrap();
        assert_eq!(removed.start, Position::new(0, 0));
        assert_eq!(selection.mode(), SelectionMode::Single);
        assert_eq!(selection.range_count(), 0);
        assert!(selection.primary().is_same_span(&Range::from_coords(1, 0, 1, 2)));

        let events = events.lock().unwrap();
        assert!(matches!(&events[0], SelectionEvent::RemoveRange { ranges } if ranges.len() == 2));
        assert_eq!(events[1], SelectionEvent::SingleSelect);
    }

    #[test]
    fn test_recency_order_is_reverse_insertion() {
        let mut selection = SelectionController::new();
        selection.add_range(Range::from_coords(3, 0, 3, 1), false);
        selection.add_range(Range::from_coords(1, 0, 1, 1), false);

        let rows: Vec<usize> = selection
            .ranges_by_recency()
            .iter()
            .map(|r| r.start.row)
            .collect();
        assert_eq!(rows, vec![1, 3, 0]);
        assert_eq!(selection.primary().start.row, 1);
    }

    #[test]
    fn test_join_selections_keeps_last_orientation() {
        let mut selection = SelectionController::new();
        selection.add_range(
            Range::from_coords(2, 1, 2, 4).with_direction(SelectionDirection::Backward),
            false,
        );
        selection.join_selections();

        assert_eq!(selection.mode(), SelectionMode::Single);
        let primary = selection.primary();
        assert_eq!(primary.start, Position::new(0, 0));
        assert_eq!(primary.end, Position::new(2, 4));
        assert!(primary.is_backwards());
    }
}
