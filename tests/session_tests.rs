/// Trim/restore cycle tests.
///
/// Drives `TrimSession` and `SessionRegistry` the way a host would: apply
/// the deletions, "save", hand the current buffer back to the session and
/// apply whatever insertion it returns.
use std::sync::Arc;

use trimsave::edit::{apply_deletions, apply_insertion};
use trimsave::events::{MemorySink, SessionEvent};
use trimsave::session::{BufferId, SessionState};
use trimsave::{EngineError, SessionRegistry, TextSnapshot, TrimOptions, TrimSession};

fn session() -> TrimSession {
    TrimSession::new(BufferId(1), TrimOptions::default())
}

/// One save: trim, then restore against the trimmed text. Returns the
/// trimmed text, the text after restoring and whether the modified flag
/// should be cleared.
fn save(session: &mut TrimSession, text: &str, cursor: Option<usize>) -> (String, String, bool) {
    let result = session
        .begin_trim(&TextSnapshot::new(text), cursor, None)
        .unwrap();
    let trimmed = apply_deletions(text, &result.deletions).unwrap();
    let restore = session.complete_restore(&TextSnapshot::new(trimmed.as_str()));
    let restored = match &restore.insertion {
        Some(insertion) => apply_insertion(&trimmed, insertion).unwrap(),
        None => trimmed.clone(),
    };
    (trimmed, restored, restore.clear_modified_flag)
}

// ---------------------------------------------------------------------------
// Cursor whitespace round trips
// ---------------------------------------------------------------------------

#[test]
fn cursor_inside_trailing_run_round_trip() {
    let mut session = session();
    let result = session
        .begin_trim(&TextSnapshot::new("foo   "), Some(5), None)
        .unwrap();

    let capture = session.pending_capture().unwrap();
    assert_eq!(capture.line, 0);
    assert_eq!(capture.text, "  ");

    let trimmed = apply_deletions("foo   ", &result.deletions).unwrap();
    assert_eq!(trimmed, "foo");

    let restore = session.complete_restore(&TextSnapshot::new(trimmed.as_str()));
    let insertion = restore.insertion.unwrap();
    assert_eq!(insertion.offset, 3);
    assert_eq!(insertion.text, "  ");
    assert!(restore.clear_modified_flag);
    assert_eq!(session.state(), &SessionState::Idle);
}

#[test]
fn cursor_before_trailing_run_restores_nothing() {
    let (trimmed, restored, clear) = save(&mut session(), "foo   \n", Some(1));
    assert_eq!(trimmed, "foo\n");
    assert_eq!(restored, "foo\n");
    assert!(!clear);
}

#[test]
fn cursor_on_middle_line() {
    let text = "one\ntwo    \nthree\n";
    let (trimmed, restored, clear) = save(&mut session(), text, Some(10));
    assert_eq!(trimmed, "one\ntwo\nthree\n");
    assert_eq!(restored, "one\ntwo   \nthree\n");
    assert!(clear);
}

#[test]
fn whitespace_only_line_before_content() {
    let text = "fn f() {\n    \n}\n";
    let (trimmed, restored, _) = save(&mut session(), text, Some(13));
    assert_eq!(trimmed, "fn f() {\n\n}\n");
    assert_eq!(restored, text);
}

#[test]
fn blank_tail_lines_are_recreated_above_cursor() {
    let text = "a\n\n  \n";
    let (trimmed, restored, clear) = save(&mut session(), text, Some(5));
    assert_eq!(trimmed, "a\n");
    assert_eq!(restored, "a\n\n  ");
    assert!(clear);
}

#[test]
fn crlf_blank_lines_keep_their_terminators() {
    let text = "a\r\n\r\n  \r\n";
    let mut session = session();
    session
        .begin_trim(&TextSnapshot::new(text), Some(7), None)
        .unwrap();
    assert_eq!(session.pending_capture().unwrap().line_delta(), 1);

    let restore = session.complete_restore(&TextSnapshot::new("a\r\n"));
    let restored = apply_insertion("a\r\n", &restore.insertion.unwrap()).unwrap();
    assert_eq!(restored, "a\r\n\r\n  ");
}

#[test]
fn cursor_on_last_line_of_blank_tail() {
    let text = "a\r\n  \r\n";
    let (trimmed, restored, _) = save(&mut session(), text, Some(5));
    assert_eq!(trimmed, "a\r\n");
    assert_eq!(restored, "a\r\n  ");
}

// ---------------------------------------------------------------------------
// Guards
// ---------------------------------------------------------------------------

#[test]
fn changed_line_skips_restore() {
    let sink = Arc::new(MemorySink::new());
    let mut session = TrimSession::with_sink(BufferId(3), TrimOptions::default(), sink.clone());
    session
        .begin_trim(&TextSnapshot::new("foo   "), Some(6), None)
        .unwrap();

    let restore = session.complete_restore(&TextSnapshot::new("bar"));
    assert_eq!(restore.insertion, None);
    assert!(!restore.clear_modified_flag);
    assert!(matches!(
        sink.events_for(3).last(),
        Some(SessionEvent::RestoreSkipped { .. })
    ));
}

#[test]
fn changed_line_count_skips_restore() {
    let mut session = session();
    session
        .begin_trim(&TextSnapshot::new("foo   \nbar"), Some(6), None)
        .unwrap();
    let restore = session.complete_restore(&TextSnapshot::new("foo\nbar\nbaz"));
    assert_eq!(restore.insertion, None);
}

#[test]
fn restore_from_idle_is_a_noop() {
    let mut session = session();
    let restore = session.complete_restore(&TextSnapshot::new("anything  "));
    assert_eq!(restore, trimsave::RestoreResult::none());
}

#[test]
fn out_of_bounds_cursor_is_rejected() {
    let mut session = session();
    let err = session
        .begin_trim(&TextSnapshot::new("abc"), Some(4), None)
        .unwrap_err();
    assert!(matches!(err, EngineError::OutOfBounds { .. }));
    assert_eq!(session.state(), &SessionState::Idle);
}

#[test]
fn cursor_whitespace_kept_out_of_patches() {
    let mut session = session();
    let result = session
        .begin_trim(&TextSnapshot::new("+line  \n"), Some(7), Some("diff"))
        .unwrap();
    assert!(result.language_skipped);
    assert!(result.deletions.is_empty());
    assert!(session.pending_capture().is_none());
}

#[test]
fn preserve_cursor_can_be_disabled() {
    let options = TrimOptions {
        preserve_cursor: false,
        ..TrimOptions::default()
    };
    let mut session = TrimSession::new(BufferId(1), options);
    session
        .begin_trim(&TextSnapshot::new("foo   "), Some(5), None)
        .unwrap();
    assert!(session.pending_capture().is_none());
}

// ---------------------------------------------------------------------------
// Double capture
// ---------------------------------------------------------------------------

#[test]
fn second_trim_replaces_first_capture() {
    let sink = Arc::new(MemorySink::new());
    let mut session = TrimSession::with_sink(BufferId(7), TrimOptions::default(), sink.clone());

    session
        .begin_trim(&TextSnapshot::new("x  "), Some(3), None)
        .unwrap();
    let second = "ab \ncd   ";
    let result = session
        .begin_trim(&TextSnapshot::new(second), Some(9), None)
        .unwrap();

    let capture = session.pending_capture().unwrap();
    assert_eq!((capture.line, capture.text.as_str()), (1, "   "));

    let trimmed = apply_deletions(second, &result.deletions).unwrap();
    assert_eq!(trimmed, "ab\ncd");
    let restore = session.complete_restore(&TextSnapshot::new(trimmed.as_str()));
    assert_eq!(
        apply_insertion(&trimmed, &restore.insertion.unwrap()).unwrap(),
        "ab\ncd   "
    );

    // Nothing left for a later restore.
    assert_eq!(
        session.complete_restore(&TextSnapshot::new("x")),
        trimsave::RestoreResult::none()
    );

    let events = sink.events_for(7);
    let count = |pred: fn(&SessionEvent) -> bool| events.iter().filter(|e| pred(e)).count();
    assert_eq!(count(|e| matches!(e, SessionEvent::CaptureDiscarded { line: 0 })), 1);
    assert_eq!(count(|e| matches!(e, SessionEvent::Restored { .. })), 1);
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[test]
fn buffers_have_independent_sessions() {
    let mut registry = SessionRegistry::default();
    registry.subscribe(BufferId(1));
    registry.subscribe(BufferId(2));

    registry
        .session_mut(BufferId(1))
        .unwrap()
        .begin_trim(&TextSnapshot::new("a  "), Some(3), None)
        .unwrap();

    assert!(registry.session(BufferId(1)).unwrap().pending_capture().is_some());
    assert!(registry.session(BufferId(2)).unwrap().pending_capture().is_none());
}

#[test]
fn registry_sessions_use_registry_options() {
    let options = TrimOptions {
        blank_tail: false,
        ..TrimOptions::default()
    };
    let mut registry = SessionRegistry::new(options);
    registry.subscribe(BufferId(9));
    let result = registry
        .session_mut(BufferId(9))
        .unwrap()
        .begin_trim(&TextSnapshot::new("a\n\n\n"), None, None)
        .unwrap();
    assert!(result.is_noop());
}
