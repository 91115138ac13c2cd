//! Integration tests for graceful shutdown: nothing queued before stop may
//! be lost, and the interpreter is inert afterwards.

use bulk_engine_rs::SessionState;

use crate::support::harness;

#[test]
fn all_blocks_submitted_before_stop_are_executed() {
    let h = harness(1, 3);

    let count = 200;
    let lines: Vec<String> = (0..count).map(|i| format!("cmd{i}")).collect();
    h.feed(lines.iter().map(|line| line.as_str()));
    h.interpreter.stop_and_report();

    // one block per line; both consumers saw every block exactly once
    assert_eq!(h.bulk_lines().len(), count);
    assert_eq!(h.block_files().len(), count);

    let output = h.sink.contents();
    assert!(
        output.contains(&format!("blocks - {count}; statements - {count}")),
        "unexpected report: {output}"
    );
}

#[test]
fn consume_after_stop_changes_nothing() {
    let h = harness(1, 1);

    h.feed(["a"]);
    h.interpreter.stop_and_report();

    let before = h.sink.contents();
    let state = h.interpreter.consume("late", SessionState::default());
    h.interpreter.close_stream(state);
    h.interpreter.stop_and_report();

    assert_eq!(h.sink.contents(), before);
    assert_eq!(h.block_files().len(), 1);
}

#[test]
fn report_is_emitted_after_all_bulk_lines() {
    let h = harness(1, 1);

    h.feed(["a", "b", "c"]);
    h.interpreter.stop_and_report();

    let output = h.sink.contents();
    let last_bulk = output.rfind("bulk: ").expect("bulk lines present");
    let report = output.find("Metrics").expect("report present");
    assert!(
        last_bulk < report,
        "report emitted before the queue drained: {output}"
    );
}
