//! Module binding the reader engine to its consumer pools and serializing
//! all access to the shared engine state.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::engine::{Reader, SessionState};
use crate::error::{Error, config_error};
use crate::output::{Logger, file_job, log_job};
use crate::pool::WorkerPool;


/// Configuration of one interpreter.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Fixed number of statements after which an implicit block is flushed.
    pub block_size: usize,
    /// Worker threads of the file pool. The log pool always has one.
    pub file_workers: usize,
    /// Directory the file consumer writes block files into.
    pub output_dir: PathBuf,
}

impl Settings {
    pub fn new(block_size: usize) -> Self {
        Self {
            block_size,
            file_workers: 2,
            output_dir: PathBuf::from("."),
        }
    }
}

/// Orchestrates one shared [`Reader`] and its two consumer pools.
///
/// All streams funnel their lines through [`Interpreter::consume`], which
/// serializes every advance under one mutex: the per-stream state is owned
/// by the caller, but the reader's parser, subscriber list, and metrics are
/// shared across streams. Pool execution happens fully outside that lock.
pub struct Interpreter {
    name: String,
    logger: Logger,
    reader: Mutex<Reader>,
    stopped: AtomicBool,
    log_pool: Arc<WorkerPool>,
    file_pool: Arc<WorkerPool>,
}

impl Interpreter {
    pub fn new(
        name: impl Into<String>,
        settings: Settings,
        logger: Logger,
    ) -> Result<Self, Error> {
        let name = name.into();
        if settings.file_workers == 0 {
            return Err(config_error("at least one file worker is required"));
        }

        let log_pool = Arc::new(WorkerPool::new("log", 1, {
            let name = name.clone();
            let logger = logger.clone();
            move |block| log_job(&name, &logger, block)
        })?);
        let file_pool = Arc::new(WorkerPool::new("file", settings.file_workers, {
            let dir = settings.output_dir.clone();
            move |block| {
                if let Err(error) = file_job(&dir, block) {
                    // local to this block and this consumer; the worker
                    // carries on with the next block
                    tracing::warn!(%error, "failed to persist block file");
                }
            }
        })?);

        let mut reader = Reader::new(settings.block_size)?;
        reader.subscribe(log_pool.clone());
        reader.subscribe(file_pool.clone());

        Ok(Self {
            name,
            logger,
            reader: Mutex::new(reader),
            stopped: AtomicBool::new(false),
            log_pool,
            file_pool,
        })
    }

    /// Advances one stream by one line. After [`Interpreter::stop_and_report`]
    /// the call is a no-op returning the state unchanged.
    pub fn consume(&self, line: &str, state: SessionState) -> SessionState {
        if self.stopped.load(Ordering::Acquire) {
            return state;
        }

        let mut reader = self.reader.lock().expect("reader lock poisoned");
        if self.stopped.load(Ordering::Acquire) {
            return state;
        }
        reader.consume(line, state)
    }

    /// End-of-stream flush for one stream's trailing partial block. A no-op
    /// after shutdown.
    pub fn close_stream(&self, state: SessionState) {
        if self.stopped.load(Ordering::Acquire) {
            return;
        }

        let mut reader = self.reader.lock().expect("reader lock poisoned");
        if self.stopped.load(Ordering::Acquire) {
            return;
        }
        reader.finish(state);
    }

    /// Stops and drains both pools, then emits the metrics report through
    /// the log sink. One-shot: later calls (and concurrent ones) return
    /// without doing anything.
    pub fn stop_and_report(&self) {
        if self.stopped.load(Ordering::Acquire) {
            return;
        }
        {
            let _reader = self.reader.lock().expect("reader lock poisoned");
            if self.stopped.swap(true, Ordering::AcqRel) {
                return;
            }
        }

        self.log_pool.stop();
        self.file_pool.stop();
        self.log_pool.join();
        self.file_pool.join();

        self.logger.log(&self.compose_report());
    }

    fn compose_report(&self) -> String {
        let reader_metrics = self.reader.lock().expect("reader lock poisoned").metrics();

        let mut report = format!(
            "[{}] Metrics\n\tReader:\n\t\tlines - {}; statements - {}; blocks - {}\n",
            self.name, reader_metrics.lines, reader_metrics.statements, reader_metrics.blocks
        );

        let log_metrics = self
            .log_pool
            .worker_metrics()
            .first()
            .copied()
            .unwrap_or_default();
        report.push_str(&format!(
            "\tLog:\n\t\tblocks - {}; statements - {}\n",
            log_metrics.blocks, log_metrics.statements
        ));

        report.push_str("\tFiles:");
        for (index, metrics) in self.file_pool.worker_metrics().iter().enumerate() {
            report.push_str(&format!(
                "\n\t#{index}\tblocks - {}; statements - {}",
                metrics.blocks, metrics.statements
            ));
        }

        report
    }
}

impl std::fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("name", &self.name)
            .field("stopped", &self.stopped)
            .finish_non_exhaustive()
    }
}
