//! Integration tests for fixed-size batching

use crate::support::harness;

#[test]
fn third_line_stays_buffered_below_threshold() {
    let h = harness(2, 1);

    h.feed(["a", "b", "c"]);
    h.interpreter.stop_and_report();

    // only the full block was flushed; "c" was never notified
    assert_eq!(h.bulk_lines(), vec!["[t] bulk: a, b"]);
    assert_eq!(h.block_files(), vec!["a\nb\n"]);
}

#[test]
fn every_full_batch_becomes_a_block() {
    let h = harness(2, 2);

    h.feed(["a", "b", "c", "d", "e", "f"]);
    h.interpreter.stop_and_report();

    assert_eq!(
        h.bulk_lines(),
        vec!["[t] bulk: a, b", "[t] bulk: c, d", "[t] bulk: e, f"]
    );

    let mut files = h.block_files();
    files.sort();
    assert_eq!(files, vec!["a\nb\n", "c\nd\n", "e\nf\n"]);
}

#[test]
fn closing_the_stream_flushes_the_remainder() {
    let h = harness(2, 1);

    let state = h.feed(["a", "b", "c"]);
    h.interpreter.close_stream(state);
    h.interpreter.stop_and_report();

    assert_eq!(h.bulk_lines(), vec!["[t] bulk: a, b", "[t] bulk: c"]);
}

#[test]
fn report_reflects_batch_counts() {
    let h = harness(3, 2);

    h.feed(["a", "b", "c", "d", "e", "f", "g"]);
    h.interpreter.stop_and_report();

    let output = h.sink.contents();
    assert!(
        output.contains("lines - 7; statements - 7; blocks - 2"),
        "unexpected report: {output}"
    );
}
