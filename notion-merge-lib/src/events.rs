/// Progress events emitted during a merge, consumed by the CLI.
#[derive(Debug, Clone)]
pub enum MergeEvent {
    /// Reading a database's schema.
    FetchingSchema { database_id: String },
    /// All source schemas reconciled.
    SchemasReconciled { properties: usize, renamed: usize },
    /// The merged database exists.
    TargetCreated { database_id: String },
    /// Copying from a source has begun.
    SourceStarted {
        index: usize,
        total: usize,
        database_id: String,
    },
    /// Another page of source records arrived.
    RecordsFetched { index: usize, records: usize },
    /// Options were added to a target property.
    OptionsSynced { property: String, added: usize },
    /// A record was inserted into the target.
    RecordInserted {
        index: usize,
        position: usize,
        total: usize,
    },
    /// A record could not be inserted (non-fatal).
    RecordFailed {
        index: usize,
        record_id: String,
        message: String,
    },
    /// Every record of a source has been handled.
    SourceFinished {
        index: usize,
        inserted: usize,
        failed: usize,
    },
    /// The merge is complete.
    Done,
}
