//! Data model and merge logic for combining Notion databases.
//!
//! Nothing in this crate talks to the network. The remote client lives in
//! `notion-merge-client` and the orchestration in `notion-merge-lib`.

pub mod error;
pub mod options;
pub mod reconcile;
pub mod record;
pub mod schema;

pub use error::SchemaError;
pub use options::{
    collect_observed_options, merge_options, merged_property_options, missing_options,
};
pub use reconcile::{
    Contribution, MergedSchema, PropertySource, PropertySources, collision_suffix, reconcile,
};
pub use record::{PropertyValues, Record, TransformOptions, carry_forward, reshape, transform_value};
pub use schema::{PropertyConfig, PropertyType, Schema};
