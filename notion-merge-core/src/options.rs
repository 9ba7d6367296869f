//! Option-list merging for select and multi-select properties.

use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

use crate::reconcile::{MergedSchema, PropertySources};
use crate::record::Record;
use crate::schema::{PropertyType, Schema};

/// Union of declared option names for every enumerated property, keyed by
/// property name. Order is first-seen across all schemas.
pub fn merge_options(schemas: &[Schema]) -> IndexMap<String, Vec<String>> {
    let mut merged: IndexMap<String, IndexSet<String>> = IndexMap::new();

    for schema in schemas {
        for (name, config) in schema {
            if !config.kind().is_enumerated() {
                continue;
            }
            merged
                .entry(name.clone())
                .or_default()
                .extend(config.option_names());
        }
    }

    merged
        .into_iter()
        .map(|(name, options)| (name, options.into_iter().collect()))
        .collect()
}

/// Declared options for each enumerated merged property, drawn only from the
/// sources that feed it.
pub fn merged_property_options(
    schemas: &[Schema],
    sources: &PropertySources,
    merged: &MergedSchema,
) -> IndexMap<String, Vec<String>> {
    let mut result = IndexMap::new();

    for (merged_name, config) in merged.iter() {
        if !config.kind().is_enumerated() {
            continue;
        }
        let Some(source) = sources.get(merged_name) else {
            continue;
        };

        let mut options = IndexSet::new();
        for contribution in source.contributions() {
            if let Some(source_config) = schemas
                .get(contribution.source)
                .and_then(|schema| schema.get(&contribution.original_name))
            {
                options.extend(source_config.option_names());
            }
        }
        result.insert(merged_name.to_string(), options.into_iter().collect());
    }

    result
}

/// Names in `desired` that are not in `current`, in `desired` order.
pub fn missing_options(desired: &[String], current: &[String]) -> Vec<String> {
    let current: IndexSet<&str> = current.iter().map(String::as_str).collect();
    let missing: IndexSet<&str> = desired
        .iter()
        .map(String::as_str)
        .filter(|name| !current.contains(name))
        .collect();
    missing.into_iter().map(str::to_string).collect()
}

/// Option names actually used by `records`, per select/multi-select
/// property in `special`. A property appears once any record carries it,
/// even if no value names an option.
pub fn collect_observed_options(
    records: &[Record],
    special: &IndexMap<String, PropertyType>,
) -> IndexMap<String, IndexSet<String>> {
    let mut observed: IndexMap<String, IndexSet<String>> = IndexMap::new();

    for record in records {
        for (name, kind) in special {
            let Some(value) = record.properties.get(name) else {
                continue;
            };
            match kind {
                PropertyType::Select => {
                    let seen = observed.entry(name.clone()).or_default();
                    if let Some(option) = value
                        .get("select")
                        .and_then(|select| select.get("name"))
                        .and_then(Value::as_str)
                        .filter(|option| !option.is_empty())
                    {
                        seen.insert(option.to_string());
                    }
                }
                PropertyType::MultiSelect => {
                    let seen = observed.entry(name.clone()).or_default();
                    let items = value
                        .get("multi_select")
                        .and_then(Value::as_array)
                        .into_iter()
                        .flatten();
                    for item in items {
                        if let Some(option) = item
                            .get("name")
                            .and_then(Value::as_str)
                            .filter(|option| !option.is_empty())
                        {
                            seen.insert(option.to_string());
                        }
                    }
                }
                _ => {}
            }
        }
    }

    observed
}

#[cfg(test)]
#[path = "tests/options_tests.rs"]
mod tests;
