//! Integration tests for many streams sharing one interpreter

use std::sync::Arc;
use std::thread;

use bulk_engine_rs::SessionState;

use crate::support::named_harness;

/// Each thread drives its own stream through the shared interpreter. Blocks
/// must never mix statements from different streams, and each stream's
/// statements must appear in its own arrival order.
#[test]
fn parallel_streams_never_share_blocks() {
    let h = named_harness("mix", 5, 4);
    let streams = 4;
    let lines_per_stream = 40;

    let handles: Vec<_> = (0..streams)
        .map(|stream| {
            let interpreter = Arc::clone(&h.interpreter);
            thread::spawn(move || {
                let mut state = SessionState::default();
                for i in 0..lines_per_stream {
                    state = interpreter.consume(&format!("s{stream}-{i}"), state);
                }
                interpreter.close_stream(state);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    h.interpreter.stop_and_report();

    let bulk_lines = h.bulk_lines();
    assert_eq!(bulk_lines.len(), streams * lines_per_stream / 5);

    let mut next_index = vec![0usize; streams];
    for line in &bulk_lines {
        let batch = line
            .strip_prefix("[mix] bulk: ")
            .expect("bulk line format");
        let statements: Vec<&str> = batch.split(", ").collect();
        assert_eq!(statements.len(), 5);

        // all statements of one block belong to one stream
        let owner: usize = statements[0][1..statements[0].find('-').unwrap()]
            .parse()
            .unwrap();
        for statement in &statements {
            assert!(
                statement.starts_with(&format!("s{owner}-")),
                "statements of different streams in one block: {line}"
            );
        }

        // and they arrive in the stream's own order
        for statement in &statements {
            let index: usize = statement[statement.find('-').unwrap() + 1..].parse().unwrap();
            assert_eq!(index, next_index[owner], "out-of-order block: {line}");
            next_index[owner] += 1;
        }
    }

    // every stream was fully flushed
    assert!(next_index.iter().all(|&n| n == lines_per_stream));
}

#[test]
fn interleaved_delimited_and_sized_streams_coexist() {
    let h = named_harness("two", 2, 2);

    let mut sized = SessionState::default();
    let mut delimited = SessionState::default();

    delimited = h.interpreter.consume("{", delimited);
    sized = h.interpreter.consume("a1", sized);
    delimited = h.interpreter.consume("b1", delimited);
    sized = h.interpreter.consume("a2", sized);
    delimited = h.interpreter.consume("b2", delimited);
    delimited = h.interpreter.consume("b3", delimited);
    delimited = h.interpreter.consume("}", delimited);
    let _ = sized;

    h.interpreter.stop_and_report();

    assert_eq!(
        h.bulk_lines(),
        vec!["[two] bulk: a1, a2", "[two] bulk: b1, b2, b3"]
    );
}
