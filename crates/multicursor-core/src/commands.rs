//! Commands and multi-selection dispatch tags.
//!
//! # Overview
//!
//! A [`Command`] is a named handler run against a [`MultiSelectEditor`]. In multi mode the editor
//! consults the command's [`MultiSelectAction`] once, at dispatch time, to decide how the handler
//! is applied:
//!
//! - [`MultiSelectAction::Direct`]: run once; the primary range is then re-added and overlaps are
//!   merged.
//! - [`MultiSelectAction::PerRange`]: replay once per range against a virtual single-range
//!   selection (see [`MultiSelectEditor::for_each_selection`]).
//! - [`MultiSelectAction::PerLineGroup`]: like `PerRange`, but ranges sharing a row are replayed
//!   once.
//! - [`MultiSelectAction::Single`]: leave multi mode, then run once.
//! - [`MultiSelectAction::Custom`]: run a dedicated multi-mode handler instead.
//!
//! In single mode every command simply runs once.
//!
//! [`CommandRegistry::with_defaults`] provides the stock multi-cursor commands
//! (add cursor above/below, select more, find all, split into lines, align, transpose, ...).

use crate::editor::MultiSelectEditor;
use crate::range::{Position, Range, SelectionDirection};
use crate::search::SearchError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Command execution errors.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command handler reported a failure.
    #[error("command failed: {0}")]
    Failed(String),

    /// No command is registered under that name.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// The occurrence search collaborator failed.
    #[error(transparent)]
    Search(#[from] SearchError),
}

/// Value produced by a command, if any.
pub type CommandOutput = Option<Value>;

/// Command result type.
pub type CommandResult = Result<CommandOutput, CommandError>;

/// Shared command handler.
pub type CommandHandler =
    Arc<dyn Fn(&mut MultiSelectEditor, &CommandArgs) -> CommandResult + Send + Sync>;

/// Arguments passed to a command: an arbitrary JSON value, usually an object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandArgs(Value);

impl CommandArgs {
    /// Empty arguments.
    pub fn none() -> Self {
        Self(Value::Null)
    }

    /// Wrap a JSON value.
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Arguments carrying a single `text` field.
    pub fn text(text: impl Into<String>) -> Self {
        Self::none().with("text", text.into())
    }

    /// Builder-style field setter. Non-object arguments are replaced by an object.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        if !self.0.is_object() {
            self.0 = Value::Object(serde_json::Map::new());
        }
        if let Value::Object(map) = &mut self.0 {
            map.insert(key.to_string(), value.into());
        }
        self
    }

    /// Underlying JSON value.
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// String field `key`.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Boolean field `key`.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    /// Integer field `key`.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(Value::as_i64)
    }

    /// Text payload: the value itself when it is a string, otherwise its `text` field.
    pub fn as_text(&self) -> Option<&str> {
        self.0.as_str().or_else(|| self.get_str("text"))
    }

    /// Direction from the `dir` field: negative means backward, anything else forward.
    pub fn direction(&self) -> SelectionDirection {
        match self.get_i64("dir") {
            Some(dir) if dir < 0 => SelectionDirection::Backward,
            _ => SelectionDirection::Forward,
        }
    }
}

impl From<Value> for CommandArgs {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// How a command is applied while several ranges are selected.
#[derive(Clone, Default)]
pub enum MultiSelectAction {
    /// Run once, then re-add the primary range and merge overlaps.
    #[default]
    Direct,
    /// Replay once per range.
    PerRange,
    /// Replay once per group of ranges sharing a row.
    PerLineGroup,
    /// Leave multi mode, then run once.
    Single,
    /// Run this handler instead of the command's own.
    Custom(CommandHandler),
}

impl fmt::Debug for MultiSelectAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MultiSelectAction::Direct => f.write_str("Direct"),
            MultiSelectAction::PerRange => f.write_str("PerRange"),
            MultiSelectAction::PerLineGroup => f.write_str("PerLineGroup"),
            MultiSelectAction::Single => f.write_str("Single"),
            MultiSelectAction::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A named command.
#[derive(Clone)]
pub struct Command {
    name: String,
    exec: CommandHandler,
    action: MultiSelectAction,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("action", &self.action)
            .finish_non_exhaustive()
    }
}

impl Command {
    /// Create a [`MultiSelectAction::Direct`] command.
    pub fn new<F>(name: impl Into<String>, exec: F) -> Self
    where
        F: Fn(&mut MultiSelectEditor, &CommandArgs) -> CommandResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            exec: Arc::new(exec),
            action: MultiSelectAction::Direct,
        }
    }

    /// Builder-style dispatch tag setter.
    pub fn with_action(mut self, action: MultiSelectAction) -> Self {
        self.action = action;
        self
    }

    /// Command name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dispatch tag.
    pub fn action(&self) -> &MultiSelectAction {
        &self.action
    }

    /// Run the command's own handler once, ignoring the dispatch tag.
    pub fn run(&self, editor: &mut MultiSelectEditor, args: &CommandArgs) -> CommandResult {
        (self.exec)(editor, args)
    }
}

/// Commands indexed by name.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Command>,
}

impl CommandRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the stock multi-cursor commands.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for command in default_commands() {
            registry.register(command);
        }
        registry
    }

    /// Register a command, returning the one it replaces.
    pub fn register(&mut self, command: Command) -> Option<Command> {
        self.commands.insert(command.name.clone(), command)
    }

    /// Look a command up by name.
    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if no command is registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

fn add_cursor(name: &str, dir: SelectionDirection, skip: bool) -> Command {
    Command::new(name, move |editor, _| {
        editor.select_more_lines(dir, skip);
        Ok(None)
    })
}

fn select_more(name: &str, dir: SelectionDirection, skip: bool) -> Command {
    Command::new(name, move |editor, _| {
        editor.select_more(dir, skip, false)?;
        Ok(None)
    })
}

fn default_commands() -> Vec<Command> {
    use SelectionDirection::{Backward, Forward};

    vec![
        add_cursor("addCursorAbove", Backward, false),
        add_cursor("addCursorBelow", Forward, false),
        add_cursor("addCursorAboveSkipCurrent", Backward, true),
        add_cursor("addCursorBelowSkipCurrent", Forward, true),
        select_more("selectMoreBefore", Backward, false),
        select_more("selectMoreAfter", Forward, false),
        select_more("selectNextBefore", Backward, true),
        select_more("selectNextAfter", Forward, true),
        Command::new("splitSelectionIntoLines", |editor, _| {
            editor.split_into_lines();
            Ok(None)
        }),
        Command::new("toggleSplitSelectionIntoLines", |editor, _| {
            if editor.selection().range_count() > 1 {
                editor.selection_mut().join_selections();
            } else {
                editor.split_into_lines();
            }
            Ok(None)
        }),
        Command::new("alignCursors", |editor, _| {
            editor.align_cursors();
            Ok(None)
        }),
        Command::new("findAll", |editor, args| {
            let count = editor.find_all(args.get_str("needle"), None, false)?;
            Ok(Some(Value::from(count)))
        }),
        Command::new("singleSelection", |editor, _| {
            editor.exit_multi_select_mode();
            Ok(None)
        })
        .with_action(MultiSelectAction::Single),
        Command::new("transposeSelections", |editor, args| {
            editor.transpose_selections(args.direction());
            Ok(None)
        }),
        Command::new("toggleBlockSelection", |editor, _| {
            editor.toggle_block_selection();
            Ok(None)
        }),
        Command::new("insertstring", |editor, args| {
            let text = args
                .as_text()
                .ok_or_else(|| CommandError::Failed("insertstring: missing text".to_string()))?;
            let range = editor.selection().to_oriented_range();
            let end = editor.replace(&range, text);
            editor.selection_mut().set_primary(Range::caret(end));
            Ok(None)
        })
        .with_action(MultiSelectAction::PerRange),
        Command::new("removeline", |editor, _| {
            remove_lines(editor);
            Ok(None)
        })
        .with_action(MultiSelectAction::PerLineGroup),
    ]
}

/// Remove every line touched by the primary range, including its line terminator.
fn remove_lines(editor: &mut MultiSelectEditor) {
    let range = editor.selection().to_oriented_range();
    let (first, last) = (range.start.row, range.end.row);

    let doc = editor.document();
    let line_count = doc.line_count();
    let span = if last + 1 < line_count {
        Range::from_coords(first, 0, last + 1, 0)
    } else if first > 0 {
        Range::from_coords(first - 1, doc.line_len(first - 1), last, doc.line_len(last))
    } else {
        Range::from_coords(0, 0, last, doc.line_len(last))
    };

    editor.remove(&span);
    let caret = editor.document().clip_position(Position::new(first, 0));
    editor.selection_mut().set_primary(Range::caret(caret));
}
