//! Module defining the parsing logic used to convert raw input lines into
//! domain statements, and the classification of the two reserved delimiter
//! lines that control block boundaries.

use crate::domain::Statement;


const BLOCK_BEGIN: &str = "{";
const BLOCK_END: &str = "}";

/// What a single input line means to the block-boundary state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineKind<'a> {
    /// The reserved `{` line opening an explicit block.
    BlockBegin,
    /// The reserved `}` line closing an explicit block.
    BlockEnd,
    /// Any other line, including the empty line.
    Ordinary(&'a str),
}

/// Classifies a newline-stripped input line. Only the exact single-character
/// lines `{` and `}` are delimiters; everything else is ordinary input.
pub(crate) fn classify(line: &str) -> LineKind<'_> {
    match line {
        BLOCK_BEGIN => LineKind::BlockBegin,
        BLOCK_END => LineKind::BlockEnd,
        other => LineKind::Ordinary(other),
    }
}

/// Turns ordinary lines into statements.
///
/// Parsing is infallible: a garbage line still yields a statement whose
/// rendering is the line itself. Delimiter lines are intercepted by
/// [`classify`] before ever reaching the parser.
#[derive(Debug, Default)]
pub(crate) struct StatementParser;

impl StatementParser {
    pub(crate) fn parse(&self, line: &str) -> Statement {
        Statement::new(line)
    }
}
