use multicursor_core::{
    CommandArgs, MultiSelectEditor, Position, Range, RecordingViewport, SearchOptions,
    SelectionDirection, SelectionMode, TextDocument,
};
use pretty_assertions::assert_eq;

fn spans(ranges: &[Range]) -> Vec<(Position, Position)> {
    ranges.iter().map(|r| (r.start, r.end)).collect()
}

#[test]
fn test_find_all_selects_every_occurrence() {
    let mut editor = MultiSelectEditor::new(TextDocument::new("foo bar\nbaz foo\nfoo"));
    editor
        .selection_mut()
        .set_primary(Range::from_coords(1, 4, 1, 7));

    let count = editor.find_all(None, None, false).unwrap();

    assert_eq!(count, 3);
    let ranges = editor.selection().all_ranges();
    assert_eq!(
        spans(&ranges),
        vec![
            (Position::new(0, 0), Position::new(0, 3)),
            (Position::new(1, 4), Position::new(1, 7)),
            (Position::new(2, 0), Position::new(2, 3)),
        ]
    );
    for pair in ranges.windows(2) {
        assert!(pair[0].end < pair[1].start);
    }

    // The originally active range is the most recent entry and the primary.
    let recent = editor.selection().ranges_by_recency();
    assert!(recent[0].is_same_span(&Range::from_coords(1, 4, 1, 7)));
    assert!(editor.selection().primary().is_same_span(&recent[0]));
}

#[test]
fn test_find_all_with_explicit_needle_and_options() {
    let mut editor = MultiSelectEditor::new(TextDocument::new("Foo food FOO"));
    let options = SearchOptions {
        case_sensitive: false,
        whole_word: true,
        regex: false,
    };

    let count = editor.find_all(Some("foo"), Some(options), false).unwrap();

    assert_eq!(count, 2);
    assert_eq!(
        spans(&editor.selection().all_ranges()),
        vec![
            (Position::new(0, 0), Position::new(0, 3)),
            (Position::new(0, 9), Position::new(0, 12)),
        ]
    );
}

#[test]
fn test_find_all_without_match_changes_nothing() {
    let mut editor = MultiSelectEditor::new(TextDocument::new("abc"));
    assert_eq!(editor.find_all(Some("zzz"), None, false).unwrap(), 0);
    assert_eq!(editor.selection().mode(), SelectionMode::Single);
}

#[test]
fn test_select_more_reveals_new_range() {
    let viewport = RecordingViewport::new();
    let mut editor =
        MultiSelectEditor::new(TextDocument::new("item\nother\nitem")).with_viewport(viewport.clone());
    editor
        .selection_mut()
        .set_primary(Range::from_coords(0, 0, 0, 4));

    editor
        .select_more(SelectionDirection::Forward, false, false)
        .unwrap();

    let requests = viewport.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].0.is_same_span(&Range::from_coords(2, 0, 2, 4)));
    assert_eq!(requests[0].1, 0.5);
    assert_eq!(editor.selection().range_count(), 2);
}

#[test]
fn test_select_next_skips_current() {
    let mut editor = MultiSelectEditor::new(TextDocument::new("ab ab ab"));
    editor
        .selection_mut()
        .set_primary(Range::from_coords(0, 0, 0, 2));
    editor
        .select_more(SelectionDirection::Forward, false, false)
        .unwrap();

    editor.exec_command("selectNextAfter", &CommandArgs::none()).unwrap();

    assert_eq!(
        spans(&editor.selection().all_ranges()),
        vec![
            (Position::new(0, 0), Position::new(0, 2)),
            (Position::new(0, 6), Position::new(0, 8)),
        ]
    );
}

#[test]
fn test_add_cursor_below_and_skip() {
    let mut editor = MultiSelectEditor::new(TextDocument::new("one\ntwo\nthree\nfour"));
    editor
        .selection_mut()
        .set_primary(Range::caret(Position::new(0, 2)));

    editor.exec_command("addCursorBelow", &CommandArgs::none()).unwrap();
    editor.exec_command("addCursorBelow", &CommandArgs::none()).unwrap();
    editor
        .exec_command("addCursorBelowSkipCurrent", &CommandArgs::none())
        .unwrap();

    let carets: Vec<Position> = editor
        .selection()
        .all_ranges()
        .iter()
        .map(Range::cursor)
        .collect();
    assert_eq!(
        carets,
        vec![Position::new(0, 2), Position::new(1, 2), Position::new(3, 2)]
    );
}

#[test]
fn test_find_all_command_reports_count() {
    let mut editor = MultiSelectEditor::new(TextDocument::new("x y x y x"));
    let output = editor
        .exec_command("findAll", &CommandArgs::none().with("needle", "x"))
        .unwrap();
    assert_eq!(output, Some(serde_json::Value::from(3)));
    assert_eq!(editor.selected_text(), "x\nx\nx");
}
