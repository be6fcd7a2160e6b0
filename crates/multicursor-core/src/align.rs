//! Cursor and column alignment.
//!
//! With cursors on several rows, [`MultiSelectEditor::align_cursors`] pads or trims the
//! whitespace after each cursor so that all of them land on the same column. Otherwise it aligns
//! a block of `key = value` / `key: value` lines on their first delimiter, see [`realign_text`].

use crate::editor::MultiSelectEditor;
use crate::range::{Position, Range, RangeId, SelectionDirection};

fn has_delimiter(line: &str) -> bool {
    line.contains(['=', ':'])
}

impl MultiSelectEditor {
    /// Align cursors, or the delimiter column of the lines around the selection.
    pub fn align_cursors(&mut self) {
        let ranges = if self.selection.is_multi() {
            self.selection.range_list().ranges().to_vec()
        } else {
            Vec::new()
        };

        let mut row = None;
        let same_row: Vec<Position> = ranges
            .iter()
            .filter_map(|range| {
                let cursor = range.cursor();
                if row == Some(cursor.row) {
                    Some(cursor)
                } else {
                    row = Some(cursor.row);
                    None
                }
            })
            .collect();

        if ranges.is_empty() || same_row.len() + 1 == ranges.len() {
            self.align_text_block();
        } else {
            for cursor in same_row {
                self.selection.substract_point(cursor);
            }
            self.align_cursor_columns();
        }
    }

    fn align_cursor_columns(&mut self) {
        let ranges: Vec<(RangeId, Position)> = self
            .selection
            .range_list()
            .ranges()
            .iter()
            .map(|range| (range.id, range.cursor()))
            .collect();

        let space_offsets: Vec<usize> = ranges
            .iter()
            .map(|(_, cursor)| {
                self.document
                    .line(cursor.row)
                    .chars()
                    .skip(cursor.column)
                    .position(|ch| !ch.is_whitespace())
                    .unwrap_or(0)
            })
            .collect();
        let max_col = ranges.iter().map(|(_, p)| p.column).max().unwrap_or(0);
        let min_space = space_offsets.iter().copied().min().unwrap_or(0);

        for ((id, cursor), space) in ranges.into_iter().zip(space_offsets) {
            let pad = max_col - cursor.column;
            let excess = space - min_space;
            if pad > excess {
                self.insert_raw(cursor, &" ".repeat(pad - excess));
            } else if excess > pad {
                let end = Position::new(cursor.row, cursor.column + excess - pad);
                let trim = Range::new(cursor, end);
                self.remove_raw(&trim);
            }

            let aligned = Position::new(cursor.row, max_col);
            self.selection.update_range(id, |stored| {
                stored.start = aligned;
                stored.end = aligned;
                stored.direction = SelectionDirection::Forward;
            });
        }

        self.selection.merge_overlapping_ranges();
        if let Some(range) = self.selection.most_recent().cloned() {
            self.selection.set_primary(range);
        }
    }

    /// Realign the lines covered by the primary range, or the run of delimiter lines around it
    /// when it spans a single row.
    fn align_text_block(&mut self) {
        let range = self.selection.to_oriented_range();
        let (mut first, mut last) = (range.start.row, range.end.row);
        let guess = first == last;

        if guess {
            let line_count = self.document.line_count();
            while has_delimiter(&self.document.line(last)) {
                last += 1;
                if last >= line_count {
                    break;
                }
            }
            while has_delimiter(&self.document.line(first)) && first > 0 {
                first -= 1;
                if first == 0 {
                    break;
                }
            }
            last = last.min(line_count.saturating_sub(1));
        }

        let lines: Vec<String> = (first..=last).map(|row| self.document.line(row)).collect();
        let aligned = realign_text(&lines, guess);

        let block = Range::from_coords(first, 0, last, self.document.line_len(last));
        self.replace_raw(&block, &aligned.join("\n"));

        let selection = if guess {
            Range::new(
                self.document.clip_position(range.start),
                self.document.clip_position(range.end),
            )
        } else {
            let last_len = aligned.last().map_or(0, |line| line.chars().count());
            Range::from_coords(first, 0, last, last_len)
        };
        self.selection
            .to_single_range(Some(selection.with_direction(range.direction)));
    }
}

struct DelimitedLine<'a> {
    indent: usize,
    key: &'a str,
    gap: usize,
    rest: &'a str,
}

impl<'a> DelimitedLine<'a> {
    /// Split at the first `=` or `:` into indent / key / gap / delimiter-and-rest.
    fn parse(line: &'a str) -> Option<Self> {
        let split = line.find(['=', ':'])?;
        let (head, rest) = line.split_at(split);

        let key_start = head.len() - head.trim_start().len();
        let body = &head[key_start..];
        let key = body.trim_end();

        Some(Self {
            indent: head[..key_start].chars().count(),
            key,
            gap: body[key.len()..].chars().count(),
            rest,
        })
    }

    fn key_width(&self) -> usize {
        self.key.chars().count()
    }

    /// The delimiter followed by the value, with the whitespace after the delimiter collapsed to
    /// one space.
    fn normalized_rest(&self) -> String {
        let mut chars = self.rest.chars();
        let Some(delimiter) = chars.next() else {
            return String::new();
        };
        let value = chars.as_str();
        let trimmed = value.trim_start();
        if trimmed.len() == value.len() {
            self.rest.to_string()
        } else {
            format!("{delimiter} {trimmed}")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Alignment {
    Left,
    Right,
    Compact,
}

/// Align `lines` on their first `=` / `:` delimiter.
///
/// Lines without a delimiter, and lines whose text before the delimiter is blank, are kept as
/// they are. For the others, the indent becomes the smallest indent seen and the whitespace after
/// the delimiter becomes a single space. Keys are then:
///
/// - right-aligned when every line already had the same indent and the same delimiter column,
/// - left-aligned (delimiters in one column) when only the indent was uniform, or when
///   `force_left` is set,
/// - left as they are, with the gap before the delimiter reduced to the smallest gap seen,
///   otherwise.
pub fn realign_text(lines: &[String], force_left: bool) -> Vec<String> {
    let parsed: Vec<Option<DelimitedLine<'_>>> =
        lines.iter().map(|line| DelimitedLine::parse(line)).collect();

    let mut widths: Option<(usize, usize, usize)> = None;
    let mut left_aligned = true;
    let mut right_aligned = true;
    for line in parsed.iter().flatten() {
        if widths.is_none() {
            widths = Some((line.indent, line.key_width(), line.gap));
            continue;
        }
        let Some((indent, key, gap)) = widths.as_mut() else {
            continue;
        };
        if *indent + *key + *gap != line.indent + line.key_width() + line.gap {
            right_aligned = false;
        }
        if *indent != line.indent {
            left_aligned = false;
        }
        *indent = (*indent).min(line.indent);
        *key = (*key).max(line.key_width());
        *gap = (*gap).min(line.gap);
    }

    let alignment = if force_left || (left_aligned && !right_aligned) {
        Alignment::Left
    } else if left_aligned {
        Alignment::Right
    } else {
        Alignment::Compact
    };
    let (indent, key_width, gap) = widths.unwrap_or_default();

    lines
        .iter()
        .zip(parsed)
        .map(|(line, parsed)| {
            let Some(parsed) = parsed.filter(|p| !p.key.is_empty()) else {
                return line.clone();
            };
            let pad = key_width - parsed.key_width();
            let rest = parsed.normalized_rest();
            match alignment {
                Alignment::Left => format!(
                    "{}{}{}{}",
                    " ".repeat(indent),
                    parsed.key,
                    " ".repeat(pad + gap),
                    rest
                ),
                Alignment::Right => format!(
                    "{}{}{}{}",
                    " ".repeat(indent + pad),
                    parsed.key,
                    " ".repeat(gap),
                    rest
                ),
                Alignment::Compact => format!(
                    "{}{}{}{}",
                    " ".repeat(indent),
                    parsed.key,
                    " ".repeat(gap),
                    rest
                ),
            }
        })
        .collect()
}
