//! Module for the types defining the statement domain.

/// A single parsed command statement.
///
/// Statements are opaque to the engine: it only ever batches them and hands
/// them to consumers. The verbatim line text is the statement's stable
/// rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    text: String,
}

impl Statement {
    pub(crate) fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The stable textual rendering of the statement.
    pub fn value(&self) -> &str {
        &self.text
    }

    /// Applies a consumer-supplied capability to this statement.
    pub fn execute(&self, executer: &mut dyn Executer) {
        executer.execute(self);
    }
}

/// Capability object supplied by a consumer, invoked once per statement in a
/// block. Each consumer brings its own implementation (join into one log
/// line, print one line per statement, ...).
pub trait Executer {
    fn execute(&mut self, statement: &Statement);
}

/// An ordered batch of statements assembled from consecutive lines of one
/// stream. Only non-empty blocks are ever dispatched to consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    statements: Vec<Statement>,
}

impl Block {
    pub(crate) fn push(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter()
    }
}

impl FromIterator<Statement> for Block {
    fn from_iter<I: IntoIterator<Item = Statement>>(iter: I) -> Self {
        Self {
            statements: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
impl Block {
    /// Builds a block from plain line texts. Test convenience only.
    pub(crate) fn from_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        lines.into_iter().map(Statement::new).collect()
    }
}
