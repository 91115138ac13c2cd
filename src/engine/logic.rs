//! Module for the per-stream block-boundary state machine.
//!
//! The state is threaded by value through every call so that arbitrarily
//! many streams can advance against the same shared [`Reader`], which only
//! holds the genuinely stream-independent pieces (parser, subscribers,
//! cumulative metrics).

use crate::domain::Block;
use crate::input::{LineKind, classify};

use super::Reader;

/// Parse progress of one input stream.
///
/// Exactly one value exists per stream; it is owned by the stream's caller
/// and never shared. A fresh stream starts in `Initial` with an empty
/// accumulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Accumulating statements toward the fixed block size.
    Initial { pending: Block },
    /// Inside an explicit `{`-opened block; `level` tracks delimiter nesting
    /// and starts at 1.
    Block { level: usize, pending: Block },
    /// Terminal state after malformed input; all further lines of this
    /// stream are silently ignored.
    Error { message: String },
}

impl Default for SessionState {
    fn default() -> Self {
        Self::Initial {
            pending: Block::default(),
        }
    }
}

impl SessionState {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error { message } => Some(message),
            _ => None,
        }
    }

    /// Number of statements accumulated but not yet flushed.
    pub fn buffered(&self) -> usize {
        match self {
            Self::Initial { pending } | Self::Block { pending, .. } => pending.len(),
            Self::Error { .. } => 0,
        }
    }
}

pub(crate) fn advance(reader: &mut Reader, line: &str, state: SessionState) -> SessionState {
    match state {
        SessionState::Initial { pending } => advance_initial(reader, line, pending),
        SessionState::Block { level, pending } => advance_block(reader, line, level, pending),
        // terminally inert
        state @ SessionState::Error { .. } => state,
    }
}

fn advance_initial(reader: &mut Reader, line: &str, mut pending: Block) -> SessionState {
    match classify(line) {
        LineKind::BlockBegin => {
            // a partial fixed-size batch is flushed before the explicit
            // block opens
            reader.notify_block(&mut pending);
            SessionState::Block {
                level: 1,
                pending: Block::default(),
            }
        }
        LineKind::BlockEnd => SessionState::Error {
            message: "unexpected end of block".to_owned(),
        },
        LineKind::Ordinary(text) => {
            pending.push(reader.parse(text));
            if pending.len() == reader.block_size() {
                reader.notify_block(&mut pending);
            }
            SessionState::Initial { pending }
        }
    }
}

fn advance_block(reader: &mut Reader, line: &str, level: usize, mut pending: Block) -> SessionState {
    match classify(line) {
        // nested delimiters only adjust the level; all statements up to the
        // matching outer end belong to the one open block
        LineKind::BlockBegin => SessionState::Block {
            level: level + 1,
            pending,
        },
        LineKind::BlockEnd => {
            if level == 1 {
                reader.notify_block(&mut pending);
                SessionState::Initial {
                    pending: Block::default(),
                }
            } else {
                SessionState::Block {
                    level: level - 1,
                    pending,
                }
            }
        }
        LineKind::Ordinary(text) => {
            pending.push(reader.parse(text));
            SessionState::Block { level, pending }
        }
    }
}
