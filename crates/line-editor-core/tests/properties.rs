use line_editor_core::{CursorPosition, EditorSession, TextSelection};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Insert(String),
    Select(CursorPosition, CursorPosition),
    MoveTo(CursorPosition),
    Backspace(bool),
    ForwardDelete(bool),
    NewLine,
    DeleteLine(usize),
}

fn position() -> impl Strategy<Value = CursorPosition> {
    (0usize..6, 0usize..12).prop_map(|(line, character)| CursorPosition::new(line, character))
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        "[ab \u{e9}\n\r]{1,6}".prop_map(Op::Insert),
        (position(), position()).prop_map(|(a, b)| Op::Select(a, b)),
        position().prop_map(Op::MoveTo),
        any::<bool>().prop_map(Op::Backspace),
        any::<bool>().prop_map(Op::ForwardDelete),
        Just(Op::NewLine),
        (0usize..6).prop_map(Op::DeleteLine),
    ]
}

fn apply(session: &mut EditorSession, op: &Op) {
    match op {
        Op::Insert(text) => {
            session.insert_text(text).unwrap();
        }
        Op::Select(a, b) => session.set_selection(*a, *b),
        Op::MoveTo(pos) => {
            session.clear_selection();
            session.set_cursor_position(*pos);
        }
        Op::Backspace(word) => {
            session.backspace(*word);
        }
        Op::ForwardDelete(word) => {
            session.forward_delete(*word);
        }
        Op::NewLine => {
            session.insert_new_line().unwrap();
        }
        Op::DeleteLine(line) => {
            session.delete_line(*line);
        }
    }
}

fn assert_well_formed(session: &EditorSession) -> Result<(), TestCaseError> {
    prop_assert!(session.line_count() >= 1);
    for line in session.buffer().iter() {
        prop_assert!(!line.contains('\n') && !line.contains('\r'));
    }
    let cursor = session.cursor_position();
    prop_assert!(cursor.line < session.line_count());
    prop_assert!(cursor.character <= session.line_len(cursor.line));
    Ok(())
}

proptest! {
    #[test]
    fn undo_all_then_redo_all_round_trips(
        initial in "[a-c \n]{0,20}",
        ops in proptest::collection::vec(op(), 1..30),
    ) {
        let mut session = EditorSession::from_text(&initial);
        let original = session.text();
        for op in &ops {
            apply(&mut session, op);
            assert_well_formed(&session)?;
        }
        let edited = session.text();

        while session.undo() {}
        prop_assert_eq!(session.text(), original);
        assert_well_formed(&session)?;

        while session.redo() {}
        prop_assert_eq!(session.text(), edited);
        assert_well_formed(&session)?;
    }

    #[test]
    fn ordered_selection_ignores_anchor_order(a in position(), b in position()) {
        prop_assert_eq!(TextSelection::new(a, b).ordered(), TextSelection::new(b, a).ordered());
        let ordered = TextSelection::new(a, b).ordered();
        let (start, end) = (ordered.start(), ordered.end());
        prop_assert!((start.line, start.character) <= (end.line, end.character));
    }

    #[test]
    fn replacing_with_empty_text_equals_remove(
        initial in "[a-c\n]{1,20}",
        a in position(),
        b in position(),
    ) {
        let mut replaced = EditorSession::from_text(&initial);
        replaced.set_selection(a, b);
        replaced.replace_selection("").unwrap();

        let mut removed = EditorSession::from_text(&initial);
        removed.set_selection(a, b);
        removed.remove_selection();

        prop_assert_eq!(replaced.text(), removed.text());
        prop_assert_eq!(replaced.cursor_position(), removed.cursor_position());
    }

    #[test]
    fn inserted_text_reads_back_through_selection(
        text in "[a-c \n]{1,12}",
        at in position(),
    ) {
        let mut session = EditorSession::from_text("xx\nyy\nzz");
        session.set_cursor_position(at);
        let start = session.cursor_position();
        let end = session.insert_text(&text).unwrap();

        session.set_selection(start, end);
        prop_assert_eq!(session.selected_text(), Some(text));
    }
}
