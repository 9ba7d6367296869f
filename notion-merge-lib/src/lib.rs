//! Merging several Notion databases into a new one.
//!
//! [`SchemaMerger`] fetches source schemas, reconciles them, creates the
//! target database, and copies every source's records into it, one awaited
//! call at a time.

pub mod async_util;
pub mod error;
pub mod events;
pub mod merger;
pub mod pagination;
pub mod report;

pub use error::MergeError;
pub use events::MergeEvent;
pub use merger::{MergeOptions, MergePlan, SchemaMerger};
pub use pagination::{fetch_all_records, record_pages};
pub use report::{MergeReport, MergeSummary, RecordFailure, Rename, SourceReport};
