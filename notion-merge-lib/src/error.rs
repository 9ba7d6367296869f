use thiserror::Error;

use notion_merge_client::ApiError;
use notion_merge_core::SchemaError;

/// Errors that abort a merge.
///
/// Per-record insert failures are not represented here; they are collected
/// in the [`MergeReport`](crate::MergeReport) instead.
#[derive(Debug, Error)]
pub enum MergeError {
    /// A remote call failed
    #[error("{0}")]
    Api(#[from] ApiError),

    /// A source database could not be read
    #[error("Source database {database_id} is unavailable: {source}")]
    SourceUnavailable {
        database_id: String,
        source: ApiError,
    },

    /// A property definition could not be interpreted
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Nothing to merge
    #[error("No source databases given")]
    NoSources,
}
