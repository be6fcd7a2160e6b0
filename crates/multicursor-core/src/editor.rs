//! Multi-selection editor façade.
//!
//! [`MultiSelectEditor`] ties a [`SelectionController`] to its collaborators (document, search,
//! viewport) and hosts the operations that need more than the range set: command dispatch,
//! per-range replay, occurrence search, transposition and alignment.
//!
//! Every edit goes through the editor so that the primary range and every stored range follow
//! the text ("live" coordinates), including the real controller while a per-range replay has
//! swapped in a virtual one.

use crate::commands::{
    Command, CommandArgs, CommandError, CommandRegistry, CommandResult, MultiSelectAction,
};
use crate::config::MultiSelectOptions;
use crate::delta::TextChange;
use crate::document::{Document, ScreenMapper, TextDocument};
use crate::range::{Position, Range};
use crate::search::{RegexSearcher, Searcher};
use crate::selection::{SelectionController, SelectionEventCallback};
use crate::viewport::{NoopViewport, Viewport};

/// A document that can also map coordinates to the screen.
pub trait EditorDocument: Document + ScreenMapper {
    /// View as a [`Document`].
    fn as_document(&self) -> &dyn Document;

    /// View as a [`ScreenMapper`].
    fn as_mapper(&self) -> &dyn ScreenMapper;
}

impl<T: Document + ScreenMapper> EditorDocument for T {
    fn as_document(&self) -> &dyn Document {
        self
    }

    fn as_mapper(&self) -> &dyn ScreenMapper {
        self
    }
}

/// Editor owning a document, a selection controller and the collaborators.
pub struct MultiSelectEditor {
    pub(crate) document: Box<dyn EditorDocument>,
    pub(crate) selection: SelectionController,
    /// The real controller while a virtual one is active.
    pub(crate) suspended: Option<SelectionController>,
    pub(crate) searcher: Box<dyn Searcher>,
    pub(crate) viewport: Box<dyn Viewport>,
    pub(crate) options: MultiSelectOptions,
    commands: CommandRegistry,
}

impl std::fmt::Debug for MultiSelectEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiSelectEditor")
            .field("selection", &self.selection)
            .field("virtual", &self.suspended.is_some())
            .field("options", &self.options)
            .field("commands", &self.commands.len())
            .finish_non_exhaustive()
    }
}

impl MultiSelectEditor {
    /// Create an editor over `document` with a [`RegexSearcher`] and a [`NoopViewport`].
    pub fn new(document: impl EditorDocument + 'static) -> Self {
        Self {
            document: Box::new(document),
            selection: SelectionController::new(),
            suspended: None,
            searcher: Box::new(RegexSearcher::default()),
            viewport: Box::new(NoopViewport),
            options: MultiSelectOptions::default(),
            commands: CommandRegistry::with_defaults(),
        }
    }

    /// Create an editor over a [`TextDocument`] built from `text`, honoring `options.tab_width`.
    pub fn from_text(text: &str, options: MultiSelectOptions) -> Self {
        let document = TextDocument::with_tab_width(text, options.tab_width);
        Self::new(document).with_options(options)
    }

    /// Replace the search collaborator.
    pub fn with_searcher(mut self, searcher: impl Searcher + 'static) -> Self {
        self.searcher = Box::new(searcher);
        self
    }

    /// Replace the viewport collaborator.
    pub fn with_viewport(mut self, viewport: impl Viewport + 'static) -> Self {
        self.viewport = Box::new(viewport);
        self
    }

    /// Replace the options.
    pub fn with_options(mut self, options: MultiSelectOptions) -> Self {
        self.options = options;
        self
    }

    /// Current options.
    pub fn options(&self) -> &MultiSelectOptions {
        &self.options
    }

    /// Replace the options.
    pub fn set_options(&mut self, options: MultiSelectOptions) {
        self.options = options;
    }

    /// The document.
    pub fn document(&self) -> &dyn EditorDocument {
        self.document.as_ref()
    }

    /// Whole document text.
    pub fn text(&self) -> String {
        self.document.text()
    }

    /// The active selection controller (the virtual one during per-range replay).
    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    /// Mutable access to the active selection controller.
    pub fn selection_mut(&mut self) -> &mut SelectionController {
        &mut self.selection
    }

    /// Returns `true` while a per-range replay is running.
    pub fn in_virtual_selection_mode(&self) -> bool {
        self.suspended.is_some()
    }

    /// Registered commands.
    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    /// Mutable access to the command registry.
    pub fn commands_mut(&mut self) -> &mut CommandRegistry {
        &mut self.commands
    }

    /// Insert `text` at `pos`, shifting every live range.
    pub fn insert(&mut self, pos: Position, text: &str) -> TextChange {
        let change = self.insert_raw(pos, text);
        self.settle();
        change
    }

    /// Remove the text covered by `range`, shifting every live range.
    pub fn remove(&mut self, range: &Range) -> Option<TextChange> {
        let change = self.remove_raw(range);
        self.settle();
        change
    }

    /// Replace the text covered by `range` with `text`; returns the end of the inserted text.
    pub fn replace(&mut self, range: &Range, text: &str) -> Position {
        let end = self.replace_raw(range, text);
        self.settle();
        end
    }

    pub(crate) fn insert_raw(&mut self, pos: Position, text: &str) -> TextChange {
        let change = self.document.insert(pos, text);
        self.apply_change(&change);
        change
    }

    pub(crate) fn remove_raw(&mut self, range: &Range) -> Option<TextChange> {
        let change = self.document.remove(range)?;
        self.apply_change(&change);
        Some(change)
    }

    pub(crate) fn replace_raw(&mut self, range: &Range, text: &str) -> Position {
        self.remove_raw(range);
        if text.is_empty() {
            return range.start;
        }
        self.insert_raw(range.start, text).end
    }

    fn apply_change(&mut self, change: &TextChange) {
        self.selection.apply_change(change);
        if let Some(real) = self.suspended.as_mut() {
            real.apply_change(change);
        }
    }

    /// Re-establish disjointness after an edit, except mid-replay where ids must stay stable.
    fn settle(&mut self) {
        if self.suspended.is_none() {
            self.selection.merge_overlapping_ranges();
        }
    }

    /// Dispatch `command` according to its [`MultiSelectAction`].
    ///
    /// In single mode, during a replay, or with multi-select disabled, the command runs once.
    pub fn exec(&mut self, command: &Command, args: &CommandArgs) -> CommandResult {
        if !self.options.enable_multiselect
            || !self.selection.is_multi()
            || self.in_virtual_selection_mode()
        {
            return command.run(self, args);
        }

        match command.action() {
            MultiSelectAction::Direct => {
                let output = command.run(self, args)?;
                let primary = self.selection.to_oriented_range();
                self.selection.add_range(primary, false);
                self.selection.merge_overlapping_ranges();
                Ok(output)
            }
            MultiSelectAction::PerRange => self.for_each_selection(command, args, false),
            MultiSelectAction::PerLineGroup => self.for_each_selection(command, args, true),
            MultiSelectAction::Single => {
                self.exit_multi_select_mode();
                command.run(self, args)
            }
            MultiSelectAction::Custom(handler) => handler(self, args),
        }
    }

    /// Look a registered command up by name and dispatch it.
    pub fn exec_command(&mut self, name: &str, args: &CommandArgs) -> CommandResult {
        let command = self
            .commands
            .get(name)
            .cloned()
            .ok_or_else(|| CommandError::UnknownCommand(name.to_string()))?;
        self.exec(&command, args)
    }

    /// Run `command` once per range, each time against a virtual single-range selection.
    ///
    /// Ranges are visited from last to first in position order. With `by_lines`, ranges sharing
    /// a row with their predecessor are skipped so each row group runs once. Subscribers of the
    /// real controller hear nothing until the replay ends; afterwards overlaps are merged and the
    /// most recent range becomes the primary again. The first `Some` output is returned.
    ///
    /// If an iteration fails, the remaining ranges are abandoned, the real controller is
    /// restored and merged, and the error is returned. With no stored range, or when already
    /// replaying, the command runs once directly.
    pub fn for_each_selection(
        &mut self,
        command: &Command,
        args: &CommandArgs,
        by_lines: bool,
    ) -> CommandResult {
        if self.in_virtual_selection_mode() || self.selection.range_count() == 0 {
            return command.run(self, args);
        }

        let count = self.selection.range_count();
        tracing::debug!(command = command.name(), ranges = count, by_lines, "replaying per range");

        let outcome = VirtualSelection::enter(self).replay(command, args, by_lines);

        self.selection.merge_overlapping_ranges();
        if let Some(range) = self.selection.most_recent().cloned() {
            self.selection.set_primary(range);
        }

        if let Err(err) = &outcome {
            tracing::warn!(command = command.name(), "per-range replay failed: {}", err);
        }
        outcome
    }

    /// Collapse to the most recently added range. No-op in single mode or during a replay.
    pub fn exit_multi_select_mode(&mut self) {
        if !self.selection.is_multi() || self.in_virtual_selection_mode() {
            return;
        }
        self.selection.to_single_range(None);
    }

    /// Selected text: in multi mode every range's text joined by `\n` (empty when all ranges are
    /// empty), otherwise the primary range's text.
    pub fn selected_text(&self) -> String {
        if self.selection.is_multi() && !self.in_virtual_selection_mode() {
            let parts: Vec<String> = self
                .selection
                .range_list()
                .ranges()
                .iter()
                .map(|range| self.document.text_range(range))
                .collect();
            if parts.iter().all(String::is_empty) {
                return String::new();
            }
            return parts.join("\n");
        }

        let primary = self.selection.primary();
        if primary.is_empty() {
            String::new()
        } else {
            self.document.text_range(primary)
        }
    }

    /// Join several ranges into one, or turn a single range into its rectangular block.
    pub fn toggle_block_selection(&mut self) {
        let enabled = self.options.enable_block_select;
        self.selection
            .toggle_block_selection(self.document.as_mapper(), enabled);
    }

    /// Split multi-row ranges into one range per row.
    pub fn split_into_lines(&mut self) {
        self.selection.split_into_lines(self.document.as_document());
    }

    /// Ask the viewport to reveal `range`.
    pub(crate) fn reveal(&mut self, range: &Range) {
        self.viewport
            .scroll_range_into_view(range, self.options.scroll_centering);
    }
}

/// Scoped substitution of a virtual selection for the real controller.
///
/// Entering moves the real controller aside with its subscribers detached; dropping restores
/// both on every exit path.
struct VirtualSelection<'a> {
    editor: &'a mut MultiSelectEditor,
    subscribers: Vec<SelectionEventCallback>,
}

impl<'a> VirtualSelection<'a> {
    fn enter(editor: &'a mut MultiSelectEditor) -> Self {
        let subscribers = editor.selection.detach_subscribers();
        let placeholder = SelectionController::new_virtual(editor.selection.primary());
        let real = std::mem::replace(&mut editor.selection, placeholder);
        editor.suspended = Some(real);
        Self {
            editor,
            subscribers,
        }
    }

    fn replay(mut self, command: &Command, args: &CommandArgs, by_lines: bool) -> CommandResult {
        let count = self
            .editor
            .suspended
            .as_ref()
            .map_or(0, SelectionController::range_count);

        let mut result = None;
        let mut i = count;
        while i > 0 {
            i -= 1;

            let Some(range) = self.stored_range(&mut i, by_lines) else {
                break;
            };
            self.editor.selection = SelectionController::new_virtual(&range);

            let output = command.run(self.editor, args)?;
            if result.is_none() {
                result = output;
            }

            let updated = self.editor.selection.to_oriented_range();
            if let Some(real) = self.editor.suspended.as_mut() {
                real.update_range(range.id, |stored| {
                    stored.start = updated.start;
                    stored.end = updated.end;
                    stored.direction = updated.direction;
                    stored.desired_column = updated.desired_column;
                });
            }
        }
        Ok(result)
    }

    /// The stored range visited at index `i`, moving `i` to the first range of its row group.
    fn stored_range(&mut self, i: &mut usize, by_lines: bool) -> Option<Range> {
        let ranges = self.editor.suspended.as_ref()?.range_list().ranges();
        if by_lines {
            while *i > 0 && ranges[*i].start.row == ranges[*i - 1].end.row {
                *i -= 1;
            }
        }
        ranges.get(*i).cloned()
    }

    fn restore(&mut self) {
        if let Some(mut real) = self.editor.suspended.take() {
            real.attach_subscribers(std::mem::take(&mut self.subscribers));
            self.editor.selection = real;
        }
    }
}

impl Drop for VirtualSelection<'_> {
    fn drop(&mut self) {
        self.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::SelectionDirection;
    use crate::selection::SelectionMode;

    fn editor_with_carets(text: &str, carets: &[(usize, usize)]) -> MultiSelectEditor {
        let mut editor = MultiSelectEditor::new(TextDocument::new(text));
        let ranges = carets
            .iter()
            .map(|&(row, column)| Range::caret(Position::new(row, column)))
            .collect();
        editor.selection_mut().set_ranges(ranges);
        editor
    }

    #[test]
    fn test_insertstring_replays_per_range() {
        let mut editor = editor_with_carets("ab\nab\nab", &[(0, 1), (1, 1), (2, 1)]);
        editor
            .exec_command("insertstring", &CommandArgs::text("X"))
            .unwrap();

        assert_eq!(editor.text(), "aXb\naXb\naXb");
        let carets: Vec<Position> = editor
            .selection()
            .all_ranges()
            .iter()
            .map(Range::cursor)
            .collect();
        assert_eq!(
            carets,
            vec![Position::new(0, 2), Position::new(1, 2), Position::new(2, 2)]
        );
        assert!(!editor.in_virtual_selection_mode());
    }

    #[test]
    fn test_removeline_runs_once_per_row() {
        let mut editor = editor_with_carets("one\ntwo\nthree", &[(0, 0), (0, 2), (2, 1)]);
        editor
            .exec_command("removeline", &CommandArgs::none())
            .unwrap();
        assert_eq!(editor.text(), "two");
    }

    #[test]
    fn test_replay_restores_subscribers_and_merges() {
        let mut editor = editor_with_carets("abc abc", &[(0, 0), (0, 4)]);
        let seen = std::sync::Arc::new(std::sync::Mutex::new(0usize));
        let sink = std::sync::Arc::clone(&seen);
        editor.selection_mut().subscribe(move |_| *sink.lock().unwrap() += 1);

        let select_word = Command::new("selectWord", |editor, _| {
            let cursor = editor.selection().primary().cursor();
            let word = editor.document().word_range(cursor);
            editor.selection_mut().set_primary(word);
            Ok(None)
        })
        .with_action(MultiSelectAction::PerRange);

        editor.exec(&select_word, &CommandArgs::none()).unwrap();
        assert_eq!(*seen.lock().unwrap(), 0);
        assert_eq!(editor.selection().range_count(), 2);
        assert_eq!(editor.selected_text(), "abc\nabc");

        let grow = Command::new("grow", |editor, _| {
            let mut range = editor.selection().to_oriented_range();
            range.start = Position::new(0, 0);
            editor.selection_mut().set_primary(range);
            Ok(None)
        })
        .with_action(MultiSelectAction::PerRange);
        editor.exec(&grow, &CommandArgs::none()).unwrap();

        // Both ranges now overlap and are merged after the replay; subscribers hear about it.
        assert_eq!(editor.selection().mode(), SelectionMode::Single);
        assert!(*seen.lock().unwrap() > 0);
    }

    #[test]
    fn test_single_action_exits_multi_mode_first() {
        let mut editor = editor_with_carets("a\nb", &[(0, 0), (1, 0)]);
        let probe = Command::new("probe", |editor, _| {
            Ok(Some(serde_json::Value::from(editor.selection().is_multi())))
        })
        .with_action(MultiSelectAction::Single);

        let output = editor.exec(&probe, &CommandArgs::none()).unwrap();
        assert_eq!(output, Some(serde_json::Value::from(false)));
        assert_eq!(editor.selection().primary().start, Position::new(1, 0));
    }

    #[test]
    fn test_unknown_command() {
        let mut editor = MultiSelectEditor::new(TextDocument::new(""));
        assert!(matches!(
            editor.exec_command("nope", &CommandArgs::none()),
            Err(CommandError::UnknownCommand(name)) if name == "nope"
        ));
    }

    #[test]
    fn test_edits_shift_live_ranges() {
        let mut editor = editor_with_carets("abc\ndef", &[(0, 1), (1, 1)]);
        editor.insert(Position::new(0, 0), "xx\n");
        let rows: Vec<usize> = editor
            .selection()
            .all_ranges()
            .iter()
            .map(|r| r.start.row)
            .collect();
        assert_eq!(rows, vec![1, 2]);
        assert_eq!(editor.selection().primary().direction, SelectionDirection::Forward);
    }
}
