//! Batches textual command lines arriving over many concurrent streams into
//! ordered blocks and fans each completed block out to asynchronous
//! consumers.
//!
//! A block closes either when a stream accumulates the configured number of
//! statements or when an explicit `{` ... `}` delimiter pair ends. Completed
//! blocks are queued into two worker pools: a single-threaded one writing an
//! audit-log line per block, and a multi-threaded one persisting each block
//! to its own file. Throughput counters are aggregated across all streams
//! and workers and reported on shutdown.
//!
//! # Example
//!
//! ```no_run
//! use bulk_engine_rs::{Interpreter, Logger, SessionState, Settings};
//!
//! let interpreter = Interpreter::new("inrpr", Settings::new(3), Logger::stderr()).unwrap();
//!
//! // each stream owns its state and threads it through every call
//! let mut state = SessionState::default();
//! for line in ["cmd1", "cmd2", "cmd3"] {
//!     state = interpreter.consume(line, state);
//! }
//! interpreter.close_stream(state);
//!
//! interpreter.stop_and_report();
//! ```

mod domain;
mod engine;
mod error;
mod input;
mod interpreter;
mod output;
mod pool;
mod telemetry;

pub use domain::{Block, Executer, Statement};
pub use engine::{BlockSubscriber, Reader, ReaderMetrics, SessionState};
pub use error::Error;
pub use interpreter::{Interpreter, Settings};
pub use output::Logger;
pub use pool::{WorkerMetrics, WorkerPool};
pub use telemetry::setup_logging;
