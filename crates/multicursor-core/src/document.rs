//! Text-buffer and coordinate-mapping collaborators.
//!
//! The selection engine never owns text. It reads and mutates the document through the
//! [`Document`] trait and converts between document and screen coordinates through
//! [`ScreenMapper`]. [`TextDocument`] is a rope-backed implementation of both, without soft
//! wrapping or folding, so a screen row is always the logical row.

use crate::delta::TextChange;
use crate::range::{Position, Range, ScreenPosition};
use ropey::Rope;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Default tab width used by [`TextDocument`].
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Read/write access to the document text.
pub trait Document {
    /// Number of logical lines (a trailing newline produces a final empty line).
    fn line_count(&self) -> usize;

    /// Text of line `row` without its line terminator; empty when `row` is out of range.
    fn line(&self, row: usize) -> String;

    /// Length of line `row` in characters.
    fn line_len(&self, row: usize) -> usize {
        self.line(row).chars().count()
    }

    /// Whole document text.
    fn text(&self) -> String;

    /// Text covered by `range`.
    fn text_range(&self, range: &Range) -> String;

    /// Character offset of `pos` (clamped into the document).
    fn position_to_offset(&self, pos: Position) -> usize;

    /// Position of character offset `offset` (clamped into the document).
    fn offset_to_position(&self, offset: usize) -> Position;

    /// Clamp `pos` to valid document coordinates.
    fn clip_position(&self, pos: Position) -> Position {
        let last_row = self.line_count().saturating_sub(1);
        let row = pos.row.min(last_row);
        Position::new(row, pos.column.min(self.line_len(row)))
    }

    /// Insert `text` at `pos` and report the edit.
    fn insert(&mut self, pos: Position, text: &str) -> TextChange;

    /// Remove the text covered by `range`; returns `None` for an empty range.
    fn remove(&mut self, range: &Range) -> Option<TextChange>;

    /// Range of the word (or whitespace run, or punctuation run) around `pos`.
    fn word_range(&self, pos: Position) -> Range {
        let pos = self.clip_position(pos);
        let line: Vec<char> = self.line(pos.row).chars().collect();
        let column = pos.column;

        let before = column.checked_sub(1).and_then(|i| line.get(i)).copied();
        let at = line.get(column).copied();

        let class = if before.is_some_and(is_word_char) || at.is_some_and(is_word_char) {
            CharClass::Word
        } else if before.is_some_and(char::is_whitespace) && at.is_some_and(char::is_whitespace)
        {
            CharClass::Space
        } else {
            CharClass::Other
        };

        let mut start = column;
        while start > 0 && class.matches(line[start - 1]) {
            start -= 1;
        }
        let mut end = column;
        while end < line.len() && class.matches(line[end]) {
            end += 1;
        }

        Range::from_coords(pos.row, start, pos.row, end)
    }
}

/// Conversion between document and screen coordinates.
pub trait ScreenMapper {
    /// Screen coordinate of a document position.
    fn document_to_screen(&self, pos: Position) -> ScreenPosition;

    /// Document position shown at a screen cell. `offset_x` is the pointer offset inside the
    /// cell as a fraction of the cell width.
    fn screen_to_document(&self, row: usize, column: usize, offset_x: f32) -> Position;
}

/// Returns `true` for characters that make up identifiers.
pub fn is_word_char(ch: char) -> bool {
    ch == '_' || ch.is_alphanumeric()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Word,
    Space,
    Other,
}

impl CharClass {
    fn matches(self, ch: char) -> bool {
        match self {
            CharClass::Word => is_word_char(ch),
            CharClass::Space => ch.is_whitespace(),
            CharClass::Other => !is_word_char(ch) && !ch.is_whitespace(),
        }
    }
}

/// Width in cells of a grapheme starting at cell `x`.
fn grapheme_width(grapheme: &str, x: usize, tab_width: usize) -> usize {
    if grapheme == "\t" {
        let tab_width = tab_width.max(1);
        tab_width - x % tab_width
    } else {
        UnicodeWidthStr::width(grapheme)
    }
}

/// Rope-backed [`Document`] and [`ScreenMapper`].
///
/// Line endings are normalized to `\n` on construction.
#[derive(Debug, Clone)]
pub struct TextDocument {
    rope: Rope,
    tab_width: usize,
}

impl TextDocument {
    /// Create a document from text.
    pub fn new(text: &str) -> Self {
        Self::with_tab_width(text, DEFAULT_TAB_WIDTH)
    }

    /// Create a document with a custom tab width for screen mapping.
    pub fn with_tab_width(text: &str, tab_width: usize) -> Self {
        let normalized = text.replace("\r\n", "\n");
        Self {
            rope: Rope::from_str(&normalized),
            tab_width: tab_width.max(1),
        }
    }

    /// Tab width used for screen mapping.
    pub fn tab_width(&self) -> usize {
        self.tab_width
    }

    /// Change the tab width.
    pub fn set_tab_width(&mut self, tab_width: usize) {
        self.tab_width = tab_width.max(1);
    }

    /// Total character count.
    pub fn char_count(&self) -> usize {
        self.rope.len_chars()
    }
}

impl Default for TextDocument {
    fn default() -> Self {
        Self::new("")
    }
}

impl Document for TextDocument {
    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn line(&self, row: usize) -> String {
        if row >= self.rope.len_lines() {
            return String::new();
        }
        let mut text = self.rope.line(row).to_string();
        if text.ends_with('\n') {
            text.pop();
        }
        text
    }

    fn line_len(&self, row: usize) -> usize {
        if row >= self.rope.len_lines() {
            return 0;
        }
        let line = self.rope.line(row);
        let len = line.len_chars();
        if len > 0 && line.char(len - 1) == '\n' {
            len - 1
        } else {
            len
        }
    }

    fn text(&self) -> String {
        self.rope.to_string()
    }

    fn text_range(&self, range: &Range) -> String {
        let start = self.position_to_offset(range.start);
        let end = self.position_to_offset(range.end);
        if start >= end {
            return String::new();
        }
        self.rope.slice(start..end).to_string()
    }

    fn position_to_offset(&self, pos: Position) -> usize {
        let pos = self.clip_position(pos);
        self.rope.line_to_char(pos.row) + pos.column
    }

    fn offset_to_position(&self, offset: usize) -> Position {
        let offset = offset.min(self.rope.len_chars());
        let row = self.rope.char_to_line(offset);
        Position::new(row, offset - self.rope.line_to_char(row))
    }

    fn insert(&mut self, pos: Position, text: &str) -> TextChange {
        let pos = self.clip_position(pos);
        let text = text.replace("\r\n", "\n");
        let offset = self.position_to_offset(pos);
        self.rope.insert(offset, &text);
        let end = self.offset_to_position(offset + text.chars().count());
        TextChange::insert(pos, end, text)
    }

    fn remove(&mut self, range: &Range) -> Option<TextChange> {
        let start = self.position_to_offset(range.start);
        let end = self.position_to_offset(range.end);
        if start >= end {
            return None;
        }
        let start_pos = self.offset_to_position(start);
        let end_pos = self.offset_to_position(end);
        let removed = self.rope.slice(start..end).to_string();
        self.rope.remove(start..end);
        Some(TextChange::remove(start_pos, end_pos, removed))
    }
}

impl ScreenMapper for TextDocument {
    fn document_to_screen(&self, pos: Position) -> ScreenPosition {
        let pos = self.clip_position(pos);
        let line = self.line(pos.row);

        let mut x = 0usize;
        let mut column = 0usize;
        for grapheme in line.graphemes(true) {
            if column >= pos.column {
                break;
            }
            x += grapheme_width(grapheme, x, self.tab_width);
            column += grapheme.chars().count();
        }
        ScreenPosition::new(pos.row, x)
    }

    fn screen_to_document(&self, row: usize, column: usize, offset_x: f32) -> Position {
        let line_count = self.line_count();
        if row >= line_count {
            let last = line_count.saturating_sub(1);
            return Position::new(last, self.line_len(last));
        }

        let line = self.line(row);
        let mut x = 0usize;
        let mut doc_column = 0usize;
        for grapheme in line.graphemes(true) {
            let width = grapheme_width(grapheme, x, self.tab_width);
            if column < x + width {
                // Inside a multi-cell glyph: snap to the nearer edge.
                let into = (column - x) as f32 + offset_x;
                if width > 1 && into >= width as f32 / 2.0 {
                    doc_column += grapheme.chars().count();
                }
                return Position::new(row, doc_column);
            }
            x += width;
            doc_column += grapheme.chars().count();
        }
        Position::new(row, doc_column)
    }
}
