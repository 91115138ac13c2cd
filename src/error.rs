//! Module defining the errors which are exposed to the users of the crate

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid configuration, e.g. a block size of zero
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O failure in a consumer sink (file creation, write, flush)
    #[error("sink I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub(crate) fn config_error(message: impl Into<String>) -> Error {
    Error::Config(message.into())
}
