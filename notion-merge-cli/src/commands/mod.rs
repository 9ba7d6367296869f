pub(crate) mod config;
pub(crate) mod merge;
pub(crate) mod schema;

/// Build the runtime every networked command runs on.
pub(crate) fn runtime() -> Result<tokio::runtime::Runtime, crate::CliError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| crate::CliError::runtime(format!("Failed to create tokio runtime: {}", e)))
}
