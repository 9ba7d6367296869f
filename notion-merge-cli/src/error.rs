use thiserror::Error;

use notion_merge_client::ApiError;
use notion_merge_lib::MergeError;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Notion API or settings error
    #[error("{0}")]
    Api(#[from] ApiError),

    /// The merge itself failed
    #[error("{0}")]
    Merge(#[from] MergeError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Runtime creation or async error
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Missing or unusable interactive input
    #[error("{0}")]
    Input(String),
}

impl CliError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    pub(crate) fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }
}
