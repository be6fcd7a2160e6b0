//! Rotating text between selected ranges.

use crate::editor::MultiSelectEditor;
use crate::range::{RangeId, SelectionDirection};

impl MultiSelectEditor {
    /// Rotate the text of all ranges by one slot.
    ///
    /// Empty ranges are first expanded to their word and overlaps merged. Texts are read in
    /// position order; `Forward` moves each range's text one slot back (range `i` receives the
    /// text of range `i + 1`), `Backward` one slot forward. Each range keeps its start and ends
    /// after its new text. Does nothing in single mode.
    pub fn transpose_selections(&mut self, dir: SelectionDirection) {
        if !self.selection.is_multi() {
            return;
        }

        let ids: Vec<RangeId> = self.selection.range_list().ranges().iter().map(|r| r.id).collect();
        for id in ids {
            let Some(range) = self.selection.range_list().get(id).cloned() else {
                continue;
            };
            if range.is_empty() {
                let word = self.document.word_range(range.start);
                self.selection.update_range(id, |stored| {
                    stored.start = word.start;
                    stored.end = word.end;
                });
            }
        }
        self.selection.merge_overlapping_ranges();
        if !self.selection.is_multi() {
            return;
        }

        let ranges = self.selection.range_list().ranges().to_vec();
        let mut words: Vec<String> = ranges
            .iter()
            .map(|range| self.document.text_range(range))
            .collect();
        match dir {
            SelectionDirection::Backward => words.rotate_right(1),
            SelectionDirection::Forward => words.rotate_left(1),
        }

        for (range, word) in ranges.iter().zip(words).rev() {
            let Some(current) = self.selection.range_list().get(range.id).cloned() else {
                continue;
            };
            self.replace_raw(&current, &word);
            self.selection.update_range(range.id, |stored| stored.start = current.start);
        }

        self.selection.merge_overlapping_ranges();
        if let Some(range) = self.selection.most_recent().cloned() {
            self.selection.set_primary(range);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TextDocument;
    use crate::range::{Position, Range};

    fn editor(text: &str, ranges: Vec<Range>) -> MultiSelectEditor {
        let mut editor = MultiSelectEditor::new(TextDocument::new(text));
        editor.selection_mut().set_ranges(ranges);
        editor
    }

    #[test]
    fn test_forward_rotation() {
        let mut editor = editor(
            "one, three, seven",
            vec![
                Range::from_coords(0, 0, 0, 3),
                Range::from_coords(0, 5, 0, 10),
                Range::from_coords(0, 12, 0, 17),
            ],
        );
        editor.transpose_selections(SelectionDirection::Forward);

        assert_eq!(editor.text(), "three, seven, one");
        let spans: Vec<(Position, Position)> = editor
            .selection()
            .all_ranges()
            .iter()
            .map(|r| (r.start, r.end))
            .collect();
        assert_eq!(
            spans,
            vec![
                (Position::new(0, 0), Position::new(0, 5)),
                (Position::new(0, 7), Position::new(0, 12)),
                (Position::new(0, 14), Position::new(0, 17)),
            ]
        );
    }

    #[test]
    fn test_backward_rotation_expands_carets_to_words() {
        let mut editor = editor(
            "ab cd ef",
            vec![
                Range::caret(Position::new(0, 1)),
                Range::caret(Position::new(0, 4)),
                Range::caret(Position::new(0, 7)),
            ],
        );
        editor.transpose_selections(SelectionDirection::Backward);
        assert_eq!(editor.text(), "ef ab cd");
    }

    #[test]
    fn test_single_mode_is_untouched() {
        let mut editor = MultiSelectEditor::new(TextDocument::new("ab cd"));
        editor.transpose_selections(SelectionDirection::Forward);
        assert_eq!(editor.text(), "ab cd");
    }
}
