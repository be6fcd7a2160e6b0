//! Rectangular (column/box) block derivation.
//!
//! A block is described by two screen corners. Each covered screen row contributes one range,
//! clipped by the [`ScreenMapper`] to the row's actual content, so short lines produce empty
//! ranges.

use crate::document::ScreenMapper;
use crate::range::{Range, ScreenPosition, SelectionDirection};

/// Compute the ranges composing the block between `screen_cursor` and `screen_anchor`.
///
/// - Ranges are emitted top to bottom, or bottom to top when the cursor row is above the anchor
///   row.
/// - Each range's cursor sits on its left edge when the cursor column is left of the anchor
///   column, otherwise on its right edge.
/// - Scanning stops at the first empty range repeating the previous empty range's end (rows
///   past the document end all clip to the same point).
/// - Unless `include_empty_lines` is set (always the case for a single-row block), empty ranges
///   between the first and the last non-empty range are dropped; empty ranges at the edges are
///   kept. When only the first range is non-empty nothing is dropped.
pub fn rectangular_range_block(
    mapper: &dyn ScreenMapper,
    screen_cursor: ScreenPosition,
    screen_anchor: ScreenPosition,
    include_empty_lines: bool,
) -> Vec<Range> {
    let x_backwards = screen_cursor.column < screen_anchor.column;
    let (left, right) = if x_backwards {
        (screen_cursor, screen_anchor)
    } else {
        (screen_anchor, screen_cursor)
    };

    let y_backwards = screen_cursor.row < screen_anchor.row;
    let (start_row, end_row) = if y_backwards {
        (screen_cursor.row, screen_anchor.row)
    } else {
        (screen_anchor.row, screen_cursor.row)
    };

    let include_empty_lines = include_empty_lines || start_row == end_row;
    let direction = if x_backwards {
        SelectionDirection::Backward
    } else {
        SelectionDirection::Forward
    };

    let mut block = Vec::new();
    let mut doc_end = None;
    for row in start_row..=end_row {
        let range = Range::from_points(
            mapper.screen_to_document(row, left.column, left.offset_x),
            mapper.screen_to_document(row, right.column, right.offset_x),
        )
        .with_direction(direction);

        if range.is_empty() {
            if doc_end == Some(range.end) {
                break;
            }
            doc_end = Some(range.end);
        }
        block.push(range);
    }

    if y_backwards {
        block.reverse();
    }

    if !include_empty_lines {
        drop_interior_empty_ranges(&mut block);
    }

    tracing::trace!(
        rows = (end_row - start_row).saturating_add(1),
        ranges = block.len(),
        "derived block"
    );
    block
}

fn drop_interior_empty_ranges(block: &mut Vec<Range>) {
    let Some(mut end) = block.len().checked_sub(1) else {
        return;
    };
    while end > 0 && block[end].is_empty() {
        end -= 1;
    }
    if end == 0 {
        return;
    }

    let mut start = 0;
    while block[start].is_empty() {
        start += 1;
    }

    let mut index = 0;
    block.retain(|range| {
        let keep = index < start || index > end || !range.is_empty();
        index += 1;
        keep
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TextDocument;
    use crate::range::Position;

    #[test]
    fn test_block_over_equal_lines() {
        let doc = TextDocument::new("abcdef\nabcdef\nabcdef\nabcdef\nabcdef");
        let block = rectangular_range_block(
            &doc,
            ScreenPosition::new(4, 5),
            ScreenPosition::new(2, 1),
            false,
        );
        assert_eq!(block.len(), 3);
        for (i, range) in block.iter().enumerate() {
            assert_eq!(range.start, Position::new(2 + i, 1));
            assert_eq!(range.end, Position::new(2 + i, 5));
            assert!(!range.is_backwards());
        }
    }

    #[test]
    fn test_upward_leftward_block_is_reversed_and_backward() {
        let doc = TextDocument::new("abcdef\nabcdef\nabcdef");
        let block = rectangular_range_block(
            &doc,
            ScreenPosition::new(0, 1),
            ScreenPosition::new(2, 4),
            false,
        );
        let rows: Vec<usize> = block.iter().map(|r| r.start.row).collect();
        assert_eq!(rows, vec![2, 1, 0]);
        assert!(block.iter().all(Range::is_backwards));
    }

    #[test]
    fn test_interior_empty_rows_are_dropped() {
        let doc = TextDocument::new("abcdef\nab\nabcdef\nab");
        let block = rectangular_range_block(
            &doc,
            ScreenPosition::new(3, 5),
            ScreenPosition::new(0, 3),
            false,
        );
        let rows: Vec<usize> = block.iter().map(|r| r.start.row).collect();
        // Row 1 is empty inside the block; row 3 is an empty trailing edge and stays.
        assert_eq!(rows, vec![0, 2, 3]);
        assert!(block[2].is_empty());
    }

    #[test]
    fn test_include_empty_lines_keeps_everything() {
        let doc = TextDocument::new("abcdef\nab\nabcdef");
        let block = rectangular_range_block(
            &doc,
            ScreenPosition::new(2, 5),
            ScreenPosition::new(0, 3),
            true,
        );
        assert_eq!(block.len(), 3);
        assert!(block[1].is_empty());
    }

    #[test]
    fn test_rows_past_document_end_stop_the_scan() {
        let doc = TextDocument::new("abcdef\nabcdef");
        let block = rectangular_range_block(
            &doc,
            ScreenPosition::new(6, 3),
            ScreenPosition::new(0, 1),
            true,
        );
        // Rows 0 and 1, then one clipped row at the document end before the repeat stops it.
        assert_eq!(block.len(), 3);
        assert!(block[2].is_empty());
    }

    #[test]
    fn test_duplicate_document_end_row_is_dropped_without_empty_lines() {
        let doc = TextDocument::new("abcdef\nabcdef");
        let block = rectangular_range_block(
            &doc,
            ScreenPosition::new(6, 3),
            ScreenPosition::new(0, 1),
            false,
        );
        // The first clipped row at the document end is a trailing edge and stays.
        assert_eq!(block.len(), 3);
        assert!(block[2].is_empty());
        assert_eq!(block[2].start, Position::new(1, 6));
    }

    #[test]
    fn test_leading_empty_rows_are_kept() {
        let doc = TextDocument::new("ab\nab\nabcdef\nabcdef");
        let block = rectangular_range_block(
            &doc,
            ScreenPosition::new(3, 5),
            ScreenPosition::new(0, 3),
            false,
        );
        let rows: Vec<usize> = block.iter().map(|r| r.start.row).collect();
        assert_eq!(rows, vec![0, 1, 2, 3]);
        assert!(block[0].is_empty() && block[1].is_empty());
        assert!(!block[2].is_empty() && !block[3].is_empty());
    }

    #[test]
    fn test_drag_far_past_document_end() {
        let doc = TextDocument::new("abc\nabc");
        let block = rectangular_range_block(
            &doc,
            ScreenPosition::new(usize::MAX / 8, 2),
            ScreenPosition::new(0, 1),
            false,
        );
        assert_eq!(block.len(), 3);
        assert!(block[0].is_same_span(&Range::from_coords(0, 1, 0, 2)));
        assert!(block[1].is_same_span(&Range::from_coords(1, 1, 1, 2)));
        assert!(block[2].is_empty());
    }
}
