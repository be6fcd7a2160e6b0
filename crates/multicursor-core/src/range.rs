//! Position and range primitives.
//!
//! All coordinates are zero-based; columns are counted in characters (Unicode scalar values)
//! within a logical line. Positions are never clamped here: keeping them inside the document is
//! the job of the [`Document`](crate::Document) collaborator.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Document coordinate (row and column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Zero-based logical line index.
    pub row: usize,
    /// Zero-based column in characters within the logical line.
    pub column: usize,
}

impl Position {
    /// Create a new document position.
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row
            .cmp(&other.row)
            .then_with(|| self.column.cmp(&other.column))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Screen coordinate as produced by a [`ScreenMapper`](crate::ScreenMapper).
///
/// `offset_x` is the sub-column pixel offset of a pointer inside the cell; mappers that work on
/// whole cells can ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPosition {
    /// Screen (visual) row.
    pub row: usize,
    /// Screen column in cells.
    pub column: usize,
    /// Sub-column offset.
    pub offset_x: f32,
}

impl ScreenPosition {
    /// Create a screen position without a sub-column offset.
    pub const fn new(row: usize, column: usize) -> Self {
        Self {
            row,
            column,
            offset_x: 0.0,
        }
    }
}

/// Which endpoint of a [`Range`] is the moving one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SelectionDirection {
    /// The cursor sits on `end`.
    #[default]
    Forward,
    /// The cursor sits on `start`.
    Backward,
}

/// Identity of a range stored in a [`RangeList`](crate::RangeList).
///
/// Ids are handed out by the [`SelectionController`](crate::SelectionController) in increasing
/// order, so a larger id always denotes a more recent insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RangeId(pub u64);

impl RangeId {
    /// Id carried by ranges that were never stored.
    pub const DETACHED: Self = Self(0);

    /// Returns `true` if this id was assigned by a controller.
    pub fn is_attached(self) -> bool {
        self != Self::DETACHED
    }
}

/// An ordered pair of positions plus the endpoint that moves when the range is extended.
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    /// Start position (always `<= end`).
    pub start: Position,
    /// End position.
    pub end: Position,
    /// Which endpoint is the cursor.
    pub direction: SelectionDirection,
    /// Column remembered for vertical navigation.
    pub desired_column: Option<usize>,
    /// Storage identity, see [`RangeId`].
    pub id: RangeId,
}

impl Range {
    /// Create a forward range. `start` must not be after `end`.
    pub fn new(start: Position, end: Position) -> Self {
        Self {
            start,
            end,
            direction: SelectionDirection::Forward,
            desired_column: None,
            id: RangeId::DETACHED,
        }
    }

    /// Shorthand for `Range::new(Position::new(..), Position::new(..))`.
    pub fn from_coords(start_row: usize, start_col: usize, end_row: usize, end_col: usize) -> Self {
        Self::new(
            Position::new(start_row, start_col),
            Position::new(end_row, end_col),
        )
    }

    /// Create an empty range (a caret) at `pos`.
    pub fn caret(pos: Position) -> Self {
        Self::new(pos, pos)
    }

    /// Create a forward range spanning two points given in any order.
    pub fn from_points(a: Position, b: Position) -> Self {
        if a <= b { Self::new(a, b) } else { Self::new(b, a) }
    }

    /// Create a range from its anchor and cursor, deriving the direction.
    pub fn oriented(anchor: Position, cursor: Position) -> Self {
        if cursor < anchor {
            Self::new(cursor, anchor).with_direction(SelectionDirection::Backward)
        } else {
            Self::new(anchor, cursor)
        }
    }

    /// Builder-style direction setter.
    pub fn with_direction(mut self, direction: SelectionDirection) -> Self {
        self.direction = direction;
        self
    }

    /// The moving endpoint.
    pub fn cursor(&self) -> Position {
        match self.direction {
            SelectionDirection::Forward => self.end,
            SelectionDirection::Backward => self.start,
        }
    }

    /// The fixed endpoint.
    pub fn anchor(&self) -> Position {
        match self.direction {
            SelectionDirection::Forward => self.start,
            SelectionDirection::Backward => self.end,
        }
    }

    /// Returns `true` if the cursor sits on `start`.
    pub fn is_backwards(&self) -> bool {
        self.direction == SelectionDirection::Backward
    }

    /// Returns `true` if `start == end`.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if the range spans more than one row.
    pub fn is_multi_line(&self) -> bool {
        self.start.row != self.end.row
    }

    /// Inclusive point containment.
    pub fn contains(&self, pos: Position) -> bool {
        self.start <= pos && pos <= self.end
    }

    /// Returns `true` if the two ranges overlap or touch (`a.end == b.start` counts).
    pub fn intersects(&self, other: &Range) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Compares only the covered span, ignoring direction and identity.
    pub fn is_same_span(&self, other: &Range) -> bool {
        self.start == other.start && self.end == other.end
    }

    /// Ordering used by the range list: by `start`, shorter range first on ties.
    pub fn cmp_position(&self, other: &Range) -> Ordering {
        self.start
            .cmp(&other.start)
            .then_with(|| self.end.cmp(&other.end))
    }

    /// Copy of this range detached from any storage.
    pub fn detached(&self) -> Range {
        Range {
            id: RangeId::DETACHED,
            ..self.clone()
        }
    }

    /// Move the cursor to `cursor`, keeping the anchor.
    pub fn set_cursor(&mut self, cursor: Position) {
        let anchor = self.anchor();
        let oriented = Range::oriented(anchor, cursor);
        self.start = oriented.start;
        self.end = oriented.end;
        self.direction = oriented.direction;
    }

    /// Collapse to a caret at `pos`.
    pub fn collapse_to(&mut self, pos: Position) {
        self.start = pos;
        self.end = pos;
        self.direction = SelectionDirection::Forward;
    }
}
