//! Occurrence selection and vertical cursor addition.

use crate::commands::CommandError;
use crate::editor::MultiSelectEditor;
use crate::range::{Range, SelectionDirection};
use crate::search::SearchOptions;

impl MultiSelectEditor {
    /// Add the next occurrence of the active range's text as a new range.
    ///
    /// An empty active range is first expanded to the word around it (and added); with
    /// `stop_at_first` nothing else happens in that case. The search wraps around and starts at
    /// the active range's end (forward) or start (backward). The new range's cursor sits on the
    /// edge matching `dir` and is revealed in the viewport. With `skip`, the range the search
    /// started from is removed afterwards.
    pub fn select_more(
        &mut self,
        dir: SelectionDirection,
        skip: bool,
        stop_at_first: bool,
    ) -> Result<(), CommandError> {
        let mut range = self.selection.to_oriented_range();
        if range.is_empty() {
            range = self
                .document
                .word_range(range.start)
                .with_direction(dir);
            self.selection.add_range(range.clone(), false);
            if stop_at_first {
                return Ok(());
            }
        }

        let needle = self.document.text_range(&range);
        let backwards = dir == SelectionDirection::Backward;
        let from = if backwards { range.start } else { range.end };

        let found = self
            .searcher
            .find(self.document.as_document(), &needle, from, backwards)?;
        if let Some(found) = found {
            let stored = self.selection.add_range(found.with_direction(dir), false);
            self.reveal(&stored);
        }

        if skip {
            self.selection.substract_point(range.cursor());
        }
        Ok(())
    }

    /// Select every occurrence of `needle`, or of the active range's text (the word around it
    /// when empty) if `needle` is `None`. Returns the number of matches.
    ///
    /// Without `additive` the previous ranges are dropped first. When the needle came from the
    /// active range and that range sits on a match, it is re-added last, so it ends up as the
    /// most recent range and the primary.
    pub fn find_all(
        &mut self,
        needle: Option<&str>,
        options: Option<SearchOptions>,
        additive: bool,
    ) -> Result<usize, CommandError> {
        if let Some(options) = options {
            self.searcher.set_options(options);
        }

        let primary = self.selection.to_oriented_range();
        let range = if primary.is_empty() {
            self.document.word_range(primary.start)
        } else {
            primary
        };
        let from_selection = needle.is_none();
        let needle = match needle {
            Some(needle) => needle.to_string(),
            None => self.document.text_range(&range),
        };

        let matches = self
            .searcher
            .find_all(self.document.as_document(), &needle)?;
        let Some(first) = matches.first() else {
            tracing::trace!(needle = needle.as_str(), "find all: no occurrence");
            return Ok(0);
        };

        if !additive {
            self.selection.to_single_range(Some(first.clone()));
        }
        for found in matches.iter().rev() {
            self.selection.add_range(found.clone(), false);
        }

        if from_selection
            && self
                .selection
                .range_list()
                .range_at_point(range.start)
                .is_some()
        {
            self.selection.add_range(range, false);
        }

        tracing::debug!(matches = matches.len(), "selected all occurrences");
        Ok(matches.len())
    }

    /// Add a range one screen row above (`Backward`) or below (`Forward`) the primary range,
    /// keeping its shape and orientation and the remembered column.
    ///
    /// With `skip` in multi mode, the range the new one was derived from is removed. Nothing
    /// happens when there is no row to move to.
    pub fn select_more_lines(&mut self, dir: SelectionDirection, skip: bool) {
        let range = self.selection.to_oriented_range();
        let mapper = self.document.as_mapper();

        let mut screen_lead = mapper.document_to_screen(range.cursor());
        if let Some(column) = range.desired_column {
            screen_lead.column = column;
        }

        let Some(target_row) = shift_row(screen_lead.row, dir) else {
            return;
        };
        let lead = mapper.screen_to_document(target_row, screen_lead.column, 0.0);
        if mapper.document_to_screen(lead).row != target_row {
            return;
        }

        let anchor = if range.is_empty() {
            lead
        } else {
            let screen_anchor = mapper.document_to_screen(range.anchor());
            match shift_row(screen_anchor.row, dir) {
                Some(row) => mapper.screen_to_document(row, screen_anchor.column, 0.0),
                None => lead,
            }
        };

        let mut new_range = Range::oriented(anchor, lead);
        new_range.desired_column = Some(screen_lead.column);

        let mut to_remove = None;
        if !self.selection.is_multi() {
            self.selection.add_range(range.clone(), false);
        } else if skip {
            to_remove = Some(range.cursor());
        }

        let stored = self.selection.add_range(new_range, false);
        if let Some(point) = to_remove {
            self.selection.substract_point(point);
        }
        self.reveal(&stored);
    }
}

fn shift_row(row: usize, dir: SelectionDirection) -> Option<usize> {
    match dir {
        SelectionDirection::Backward => row.checked_sub(1),
        SelectionDirection::Forward => row.checked_add(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TextDocument;
    use crate::range::Position;
    use crate::selection::SelectionMode;

    #[test]
    fn test_select_more_expands_word_then_adds_next() {
        let mut editor = MultiSelectEditor::new(TextDocument::new("foo bar foo"));
        editor
            .selection_mut()
            .set_primary(Range::caret(Position::new(0, 1)));

        editor
            .select_more(SelectionDirection::Forward, false, false)
            .unwrap();
        let ranges = editor.selection().all_ranges();
        assert_eq!(ranges.len(), 2);
        assert!(ranges[0].is_same_span(&Range::from_coords(0, 0, 0, 3)));
        assert!(ranges[1].is_same_span(&Range::from_coords(0, 8, 0, 11)));
        assert_eq!(editor.selection().primary().start, Position::new(0, 8));
    }

    #[test]
    fn test_select_more_stop_at_first_only_expands() {
        let mut editor = MultiSelectEditor::new(TextDocument::new("foo foo"));
        editor
            .select_more(SelectionDirection::Forward, false, true)
            .unwrap();
        assert_eq!(editor.selection().mode(), SelectionMode::Single);
        assert!(editor.selection().primary().is_same_span(&Range::from_coords(0, 0, 0, 3)));
    }

    #[test]
    fn test_select_more_backward_orients_cursor_on_start() {
        let mut editor = MultiSelectEditor::new(TextDocument::new("ab x ab"));
        editor
            .selection_mut()
            .set_primary(Range::from_coords(0, 5, 0, 7));
        editor
            .select_more(SelectionDirection::Backward, false, false)
            .unwrap();

        let primary = editor.selection().primary();
        assert!(primary.is_same_span(&Range::from_coords(0, 0, 0, 2)));
        assert!(primary.is_backwards());
    }

    #[test]
    fn test_find_all_with_needle_keeps_only_matches() {
        let mut editor = MultiSelectEditor::new(TextDocument::new("foo fox"));
        editor
            .selection_mut()
            .set_primary(Range::caret(Position::new(0, 1)));

        let count = editor.find_all(Some("fo"), None, false).unwrap();

        assert_eq!(count, 2);
        let ranges = editor.selection().all_ranges();
        assert!(ranges[0].is_same_span(&Range::from_coords(0, 0, 0, 2)));
        assert!(ranges[1].is_same_span(&Range::from_coords(0, 4, 0, 6)));
        assert_eq!(editor.selected_text(), "fo\nfo");
    }

    #[test]
    fn test_select_more_lines_keeps_desired_column() {
        let mut editor = MultiSelectEditor::new(TextDocument::new("abcdef\nab\nabcdef"));
        editor
            .selection_mut()
            .set_primary(Range::caret(Position::new(0, 4)));

        editor.select_more_lines(SelectionDirection::Forward, false);
        editor.select_more_lines(SelectionDirection::Forward, false);

        let carets: Vec<Position> = editor
            .selection()
            .all_ranges()
            .iter()
            .map(Range::cursor)
            .collect();
        assert_eq!(
            carets,
            vec![Position::new(0, 4), Position::new(1, 2), Position::new(2, 4)]
        );
    }

    #[test]
    fn test_select_more_lines_at_document_edge_is_a_no_op() {
        let mut editor = MultiSelectEditor::new(TextDocument::new("abc\ndef"));
        editor.select_more_lines(SelectionDirection::Backward, false);
        assert_eq!(editor.selection().mode(), SelectionMode::Single);
        assert_eq!(editor.selection().range_count(), 0);
    }
}
