//! Module for the consumer side: the serialized log sink and the two block
//! consumers (one audit-log line per block, one file per block).

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::{Block, Executer, Statement};
use crate::error::Error;


/// Cloneable handle over an already-serialized line sink.
///
/// All writers share one lock, so messages from concurrent workers never
/// interleave within a line. A failing sink is reported through tracing and
/// otherwise ignored; logging must never take a worker down.
#[derive(Clone)]
pub struct Logger {
    sink: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Logger {
    pub fn new(sink: impl Write + Send + 'static) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(sink))),
        }
    }

    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// Writes one message followed by a newline.
    pub fn log(&self, message: &str) {
        let mut sink = self.sink.lock().expect("log sink lock poisoned");
        if let Err(error) = writeln!(sink, "{message}") {
            tracing::warn!(%error, "log sink write failed");
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::stderr()
    }
}

/// Renders statements joined by `", "` into one line.
#[derive(Default)]
struct JoiningExecuter {
    rendered: String,
}

impl Executer for JoiningExecuter {
    fn execute(&mut self, statement: &Statement) {
        if !self.rendered.is_empty() {
            self.rendered.push_str(", ");
        }
        self.rendered.push_str(statement.value());
    }
}

/// Log consumer: one `[{name}] bulk: a, b, c` line per block.
pub(crate) fn log_job(name: &str, logger: &Logger, block: &Block) {
    let mut joiner = JoiningExecuter::default();
    for statement in block.iter() {
        statement.execute(&mut joiner);
    }
    logger.log(&format!("[{name}] bulk: {}", joiner.rendered));
}

/// Writes one statement rendering per line, remembering the first write
/// failure instead of panicking inside the executer callback.
struct FileExecuter<W: Write> {
    output: W,
    failed: Option<io::Error>,
}

impl<W: Write> Executer for FileExecuter<W> {
    fn execute(&mut self, statement: &Statement) {
        if self.failed.is_some() {
            return;
        }
        if let Err(error) = writeln!(self.output, "{}", statement.value()) {
            self.failed = Some(error);
        }
    }
}

/// File consumer: writes the block into a freshly created file inside `dir`,
/// flushed and closed before returning. A failure affects only this block in
/// this consumer; the caller is expected to log and continue.
pub(crate) fn file_job(dir: &Path, block: &Block) -> Result<(), Error> {
    let path = dir.join(block_file_name());
    let file = File::create(&path)?;

    let mut printer = FileExecuter {
        output: BufWriter::new(file),
        failed: None,
    };
    for statement in block.iter() {
        statement.execute(&mut printer);
    }
    if let Some(error) = printer.failed {
        return Err(error.into());
    }
    printer.output.flush()?;
    Ok(())
}

/// In-memory sink sharing its buffer with tests through a clone.
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct SharedSink {
    buffer: Arc<Mutex<Vec<u8>>>,
}

#[cfg(test)]
impl SharedSink {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8(self.buffer.lock().unwrap().clone()).unwrap()
    }
}

#[cfg(test)]
impl Write for SharedSink {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// `bulk_{epoch_nanos}_{worker}.log`; the worker thread name keeps files
/// from concurrent workers distinct even within one nanosecond tick.
fn block_file_name() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();
    let thread = std::thread::current();
    let worker = thread.name().unwrap_or("worker").to_owned();
    format!("bulk_{nanos}_{worker}.log")
}
