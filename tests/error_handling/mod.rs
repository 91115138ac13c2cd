//! Integration tests for protocol errors and their per-stream isolation

use bulk_engine_rs::SessionState;

use crate::support::harness;

#[test]
fn unexpected_end_silences_the_stream() {
    let h = harness(1, 1);

    let state = h.feed(["}", "a", "b"]);
    assert!(state.is_error());

    h.interpreter.close_stream(state);
    h.interpreter.stop_and_report();

    assert!(h.bulk_lines().is_empty());
    assert!(h.block_files().is_empty());
}

#[test]
fn a_broken_stream_leaves_other_streams_untouched() {
    let h = harness(2, 1);

    let mut broken = SessionState::default();
    let mut healthy = SessionState::default();

    broken = h.interpreter.consume("}", broken);
    healthy = h.interpreter.consume("a", healthy);
    broken = h.interpreter.consume("ignored", broken);
    healthy = h.interpreter.consume("b", healthy);

    assert!(broken.is_error());
    h.interpreter.stop_and_report();

    assert_eq!(h.bulk_lines(), vec!["[t] bulk: a, b"]);
}

#[test]
fn error_state_lines_count_as_lines_only() {
    let h = harness(1, 1);

    h.feed(["}", "a", "b"]);
    h.interpreter.stop_and_report();

    let output = h.sink.contents();
    assert!(
        output.contains("lines - 3; statements - 0; blocks - 0"),
        "unexpected report: {output}"
    );
}
