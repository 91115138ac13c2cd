//! Module for the shared reader engine: stream-independent configuration,
//! aggregate counters, and block fan-out to subscribers.

use std::fmt;
use std::sync::Arc;

use crate::domain::{Block, Statement};
use crate::error::{Error, config_error};
use crate::input::StatementParser;

mod logic;

pub use logic::SessionState;

/// Consumer of completed blocks. Notified synchronously, in subscription
/// order, while the orchestrator lock is held; implementations must hand the
/// block off quickly (e.g. into a queue) rather than execute it inline.
pub trait BlockSubscriber: Send + Sync {
    fn on_block(&self, block: &Block);
}

/// Cumulative counters aggregated across all streams of one reader.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderMetrics {
    /// Lines seen, including delimiter lines and lines ignored in the
    /// error state.
    pub lines: usize,
    /// Lines successfully parsed into statements.
    pub statements: usize,
    /// Non-empty blocks flushed (counted once per flush, not per
    /// subscriber).
    pub blocks: usize,
}

/// The stream-independent half of the block-boundary machinery.
///
/// One reader serves any number of streams: each stream threads its own
/// [`SessionState`] through [`Reader::consume`], while the reader holds the
/// parser, the fixed block size, the subscriber list, and the cumulative
/// metrics. Callers are responsible for serializing access (see
/// `Interpreter`); the reader itself does no locking.
pub struct Reader {
    block_size: usize,
    parser: StatementParser,
    subscribers: Vec<Arc<dyn BlockSubscriber>>,
    metrics: ReaderMetrics,
}

impl Reader {
    pub fn new(block_size: usize) -> Result<Self, Error> {
        if block_size == 0 {
            return Err(config_error("block size must be at least 1"));
        }
        Ok(Self {
            block_size,
            parser: StatementParser,
            subscribers: Vec::new(),
            metrics: ReaderMetrics::default(),
        })
    }

    /// Registers a subscriber. Subscribing the same consumer twice is a
    /// no-op: each block is delivered at most once per subscriber.
    pub fn subscribe(&mut self, subscriber: Arc<dyn BlockSubscriber>) {
        let already_subscribed = self.subscribers.iter().any(|existing| {
            Arc::as_ptr(existing) as *const () == Arc::as_ptr(&subscriber) as *const ()
        });
        if !already_subscribed {
            self.subscribers.push(subscriber);
        }
    }

    /// Advances one stream by one newline-stripped line, returning the
    /// stream's next state. Completed blocks are pushed to all subscribers
    /// before this returns.
    pub fn consume(&mut self, line: &str, state: SessionState) -> SessionState {
        self.metrics.lines += 1;
        logic::advance(self, line, state)
    }

    /// End-of-stream flush: emits whatever the stream had accumulated but
    /// not yet flushed, including the contents of an unterminated explicit
    /// block. Consumes the state; the stream is over.
    pub fn finish(&mut self, state: SessionState) {
        match state {
            SessionState::Initial { mut pending } | SessionState::Block { mut pending, .. } => {
                self.notify_block(&mut pending);
            }
            SessionState::Error { .. } => {}
        }
    }

    pub fn metrics(&self) -> ReaderMetrics {
        self.metrics
    }

    pub(crate) fn block_size(&self) -> usize {
        self.block_size
    }

    pub(crate) fn parse(&mut self, line: &str) -> Statement {
        self.metrics.statements += 1;
        self.parser.parse(line)
    }

    /// Flushes a non-empty accumulator to every subscriber and resets it.
    /// Empty accumulators are discarded without notification.
    pub(crate) fn notify_block(&mut self, pending: &mut Block) {
        if pending.is_empty() {
            return;
        }

        self.metrics.blocks += 1;

        let block = std::mem::take(pending);
        for subscriber in &self.subscribers {
            subscriber.on_block(&block);
        }
    }
}

impl fmt::Debug for Reader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reader")
            .field("block_size", &self.block_size)
            .field("subscribers", &self.subscribers.len())
            .field("metrics", &self.metrics)
            .finish()
    }
}
