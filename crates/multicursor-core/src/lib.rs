#![warn(missing_docs)]
//! Multicursor Core - Headless Multi-Range Selection Engine
//!
//! # Overview
//!
//! `multicursor-core` keeps track of any number of simultaneous, non-overlapping selection
//! ranges over a text document and applies editing commands to each of them. It owns no
//! rendering and no input handling: the host supplies the document, the search capability and
//! the viewport, and listens to selection lifecycle signals.
//!
//! # Core Features
//!
//! - **Auto-merging range set**: ranges stay sorted and disjoint; touching or overlapping ranges
//!   merge, newest intent wins
//! - **Single/multi mode**: multi mode exactly when more than one range is selected
//! - **Per-range replay**: run a command once per range against an isolated virtual selection
//! - **Block selection**: rectangular column selection derived from screen corners
//! - **Occurrences**: select next / all occurrences, add cursors above and below
//! - **Transpose and align**: rotate range texts, align cursors or `key = value` columns
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Commands & Dispatch (MultiSelectEditor)    │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Occurrence / Transpose / Align             │  ← Derived ranges
//! ├─────────────────────────────────────────────┤
//! │  SelectionController (modes + signals)      │  ← Selection state
//! ├─────────────────────────────────────────────┤
//! │  RangeList (sorted, merging)                │  ← Range storage
//! ├─────────────────────────────────────────────┤
//! │  Document / ScreenMapper / Searcher         │  ← Collaborators
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use multicursor_core::{CommandArgs, MultiSelectEditor, MultiSelectOptions, Position, Range};
//!
//! let mut editor = MultiSelectEditor::from_text("foo bar\nfoo baz\nfoo", MultiSelectOptions::default());
//! editor.selection_mut().set_primary(Range::caret(Position::new(0, 1)));
//!
//! // Select every "foo", then type over all of them at once.
//! let count = editor.find_all(None, None, false).unwrap();
//! assert_eq!(count, 3);
//! editor.exec_command("insertstring", &CommandArgs::text("qux")).unwrap();
//! assert_eq!(editor.text(), "qux bar\nqux baz\nqux");
//! ```
//!
//! # Module Description
//!
//! - [`range`] - Positions, ranges and range identity
//! - [`delta`] - Document edit descriptors and live position shifting
//! - [`range_list`] - Sorted, merging range set
//! - [`selection`] - Selection controller, modes and lifecycle signals
//! - [`block`] - Rectangular block derivation
//! - [`document`] - Document and screen-mapping collaborators, rope-backed `TextDocument`
//! - [`search`] - Search collaborator and regex implementation
//! - [`viewport`] - Viewport reveal collaborator
//! - [`config`] - Engine options
//! - [`editor`] - Editor façade, edits and per-range replay
//! - [`commands`] - Commands, dispatch tags and the default registry
//! - [`align`] - Cursor and column alignment

pub mod align;
pub mod block;
pub mod commands;
pub mod config;
pub mod delta;
pub mod document;
pub mod editor;
mod occurrence;
pub mod range;
pub mod range_list;
pub mod search;
pub mod selection;
mod transpose;
pub mod viewport;

pub use align::realign_text;
pub use block::rectangular_range_block;
pub use commands::{
    Command, CommandArgs, CommandError, CommandHandler, CommandOutput, CommandRegistry,
    CommandResult, MultiSelectAction,
};
pub use config::{ConfigError, MultiSelectOptions};
pub use delta::{TextChange, TextChangeKind};
pub use document::{DEFAULT_TAB_WIDTH, Document, ScreenMapper, TextDocument, is_word_char};
pub use editor::{EditorDocument, MultiSelectEditor};
pub use range::{Position, Range, RangeId, ScreenPosition, SelectionDirection};
pub use range_list::RangeList;
pub use search::{RegexSearcher, SearchError, SearchOptions, Searcher};
pub use selection::{SelectionController, SelectionEvent, SelectionEventCallback, SelectionMode};
pub use viewport::{NoopViewport, RecordingViewport, Viewport};
