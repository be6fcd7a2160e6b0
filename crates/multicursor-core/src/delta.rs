//! Document edit descriptors.
//!
//! Every mutation performed through a [`Document`](crate::Document) reports a [`TextChange`].
//! Stored ranges are "live": the owner of a range feeds each change through
//! [`TextChange::shift_range`] so that coordinates keep pointing at the same text after
//! insertions and removals elsewhere in the document.

use crate::range::{Position, Range};

/// Kind of a document edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextChangeKind {
    /// Text was inserted; `start..end` is the span of the new text after the edit.
    Insert,
    /// Text was removed; `start..end` is the span of the removed text before the edit.
    Remove,
}

/// A single document edit expressed in document positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange {
    /// Insert or remove.
    pub kind: TextChangeKind,
    /// First affected position.
    pub start: Position,
    /// End of the inserted (or removed) text.
    pub end: Position,
    /// Inserted or removed text.
    pub text: String,
}

impl TextChange {
    /// Describe an insertion of `text` at `start` that ends at `end`.
    pub fn insert(start: Position, end: Position, text: impl Into<String>) -> Self {
        Self {
            kind: TextChangeKind::Insert,
            start,
            end,
            text: text.into(),
        }
    }

    /// Describe a removal of `text` that used to span `start..end`.
    pub fn remove(start: Position, end: Position, text: impl Into<String>) -> Self {
        Self {
            kind: TextChangeKind::Remove,
            start,
            end,
            text: text.into(),
        }
    }

    /// Number of rows added (positive) or removed (negative) by this edit.
    pub fn line_delta(&self) -> isize {
        let rows = (self.end.row - self.start.row) as isize;
        match self.kind {
            TextChangeKind::Insert => rows,
            TextChangeKind::Remove => -rows,
        }
    }

    /// Map a pre-edit position to its post-edit location.
    ///
    /// Positions sitting exactly on an insertion point move to the end of the inserted text.
    pub fn shift_position(&self, pos: Position) -> Position {
        let (start, end) = (self.start, self.end);
        match self.kind {
            TextChangeKind::Insert => {
                if pos < start {
                    pos
                } else if pos.row == start.row {
                    Position::new(end.row, end.column + (pos.column - start.column))
                } else {
                    Position::new(pos.row + (end.row - start.row), pos.column)
                }
            }
            TextChangeKind::Remove => {
                if pos <= start {
                    pos
                } else if pos <= end {
                    start
                } else if pos.row == end.row {
                    Position::new(start.row, start.column + (pos.column - end.column))
                } else {
                    Position::new(pos.row - (end.row - start.row), pos.column)
                }
            }
        }
    }

    /// Shift both endpoints of `range` in place.
    pub fn shift_range(&self, range: &mut Range) {
        range.start = self.shift_position(range.start);
        range.end = self.shift_position(range.end);
    }
}
