//! Occurrence search collaborator.
//!
//! The engine asks a [`Searcher`] for the next match of a needle; it never scans text itself.
//! [`RegexSearcher`] is the bundled implementation: plain substring search (escaped and compiled
//! into a regex) or regex search, with optional case-insensitive and whole-word matching. Offsets
//! are character offsets, converted to [`Position`]s through the [`Document`].

use crate::document::{Document, is_word_char};
use crate::range::{Position, Range};
use regex::{Regex, RegexBuilder};
use thiserror::Error;

/// Options that control how search is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// If `true`, performs a case-sensitive search.
    pub case_sensitive: bool,
    /// If `true`, matches only whole words.
    pub whole_word: bool,
    /// If `true`, treats the needle as a regex pattern.
    pub regex: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            whole_word: false,
            regex: false,
        }
    }
}

/// Search errors.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The provided regex pattern failed to compile.
    #[error("invalid regex: {0}")]
    InvalidRegex(#[from] regex::Error),
}

/// Text search capability consumed by the selection engine.
pub trait Searcher {
    /// Find the next match of `needle` from `from`, wrapping around the document.
    ///
    /// Forward search returns the first match starting at or after `from`; backward search
    /// returns the last match ending at or before `from`.
    fn find(
        &self,
        doc: &dyn Document,
        needle: &str,
        from: Position,
        backwards: bool,
    ) -> Result<Option<Range>, SearchError>;

    /// Every non-overlapping match of `needle`, in document order.
    fn find_all(&self, doc: &dyn Document, needle: &str) -> Result<Vec<Range>, SearchError>;

    /// Replace the options used by later searches. Searchers without options ignore this.
    fn set_options(&mut self, _options: SearchOptions) {}
}

/// A half-open character range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CharMatch {
    start: usize,
    end: usize,
}

impl CharMatch {
    fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

#[derive(Debug)]
struct CharIndex {
    char_to_byte: Vec<usize>,
    text_len: usize,
}

impl CharIndex {
    fn new(text: &str) -> Self {
        let mut char_to_byte: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        char_to_byte.push(text.len());
        Self {
            char_to_byte,
            text_len: text.len(),
        }
    }

    fn char_count(&self) -> usize {
        self.char_to_byte.len().saturating_sub(1)
    }

    fn char_to_byte(&self, char_offset: usize) -> usize {
        let clamped = char_offset.min(self.char_count());
        self.char_to_byte
            .get(clamped)
            .copied()
            .unwrap_or(self.text_len)
    }

    fn byte_to_char(&self, byte_offset: usize) -> usize {
        let clamped = byte_offset.min(self.text_len);
        match self.char_to_byte.binary_search(&clamped) {
            Ok(idx) => idx,
            Err(idx) => idx,
        }
    }

    fn char_at(&self, text: &str, char_offset: usize) -> Option<char> {
        if char_offset >= self.char_count() {
            return None;
        }
        let start = self.char_to_byte[char_offset];
        let end = self.char_to_byte[char_offset + 1];
        text.get(start..end)?.chars().next()
    }
}

/// Regex-backed [`Searcher`].
#[derive(Debug, Clone, Default)]
pub struct RegexSearcher {
    options: SearchOptions,
}

impl RegexSearcher {
    /// Create a searcher with the given options.
    pub fn new(options: SearchOptions) -> Self {
        Self { options }
    }

    /// Current options.
    pub fn options(&self) -> SearchOptions {
        self.options
    }

    fn compile(&self, needle: &str) -> Result<Regex, SearchError> {
        let pattern = if self.options.regex {
            needle.to_string()
        } else {
            regex::escape(needle)
        };

        Ok(RegexBuilder::new(&pattern)
            .case_insensitive(!self.options.case_sensitive)
            .multi_line(true)
            .build()?)
    }

    fn is_whole_word(&self, text: &str, index: &CharIndex, m: CharMatch) -> bool {
        let before = m
            .start
            .checked_sub(1)
            .and_then(|i| index.char_at(text, i));
        let after = index.char_at(text, m.end);
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    }

    /// All accepted matches in `text`, as character ranges.
    fn matches(&self, text: &str, needle: &str) -> Result<Vec<CharMatch>, SearchError> {
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let re = self.compile(needle)?;
        let index = CharIndex::new(text);

        let mut matches = Vec::new();
        for m in re.find_iter(text) {
            let candidate = CharMatch {
                start: index.byte_to_char(m.start()),
                end: index.byte_to_char(m.end()),
            };
            if candidate.is_empty() {
                continue;
            }
            if self.options.whole_word && !self.is_whole_word(text, &index, candidate) {
                continue;
            }
            matches.push(candidate);
        }
        Ok(matches)
    }

    /// Forward search from `from_char`, returning the first match starting at or after it.
    fn find_next(
        &self,
        text: &str,
        needle: &str,
        from_char: usize,
    ) -> Result<Option<CharMatch>, SearchError> {
        if needle.is_empty() {
            return Ok(None);
        }

        let re = self.compile(needle)?;
        let index = CharIndex::new(text);

        let mut start_char = from_char.min(index.char_count());
        loop {
            let start_byte = index.char_to_byte(start_char);
            let Some(m) = re.find_at(text, start_byte) else {
                return Ok(None);
            };

            let candidate = CharMatch {
                start: index.byte_to_char(m.start()),
                end: index.byte_to_char(m.end()),
            };

            if candidate.is_empty() {
                if candidate.end >= index.char_count() {
                    return Ok(None);
                }
                start_char = candidate.end + 1;
                continue;
            }

            if self.options.whole_word && !self.is_whole_word(text, &index, candidate) {
                start_char = candidate.end;
                continue;
            }

            return Ok(Some(candidate));
        }
    }

    fn to_range(doc: &dyn Document, m: CharMatch) -> Range {
        Range::new(doc.offset_to_position(m.start), doc.offset_to_position(m.end))
    }
}

impl Searcher for RegexSearcher {
    fn find(
        &self,
        doc: &dyn Document,
        needle: &str,
        from: Position,
        backwards: bool,
    ) -> Result<Option<Range>, SearchError> {
        let text = doc.text();
        let from_char = doc.position_to_offset(from);

        let found = if backwards {
            let matches = self.matches(&text, needle)?;
            matches
                .iter()
                .rev()
                .find(|m| m.end <= from_char)
                .or_else(|| matches.last())
                .copied()
        } else {
            match self.find_next(&text, needle, from_char)? {
                Some(m) => Some(m),
                None => self.find_next(&text, needle, 0)?,
            }
        };

        if found.is_none() {
            tracing::trace!(needle, "no occurrence found");
        }
        Ok(found.map(|m| Self::to_range(doc, m)))
    }

    fn find_all(&self, doc: &dyn Document, needle: &str) -> Result<Vec<Range>, SearchError> {
        let text = doc.text();
        Ok(self
            .matches(&text, needle)?
            .into_iter()
            .map(|m| Self::to_range(doc, m))
            .collect())
    }

    fn set_options(&mut self, options: SearchOptions) {
        self.options = options;
    }
}
