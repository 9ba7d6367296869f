//! Records (database pages) and the reshaping of their values for insertion
//! into the merged database.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::reconcile::PropertySources;
use crate::schema::PropertyType;

/// Property name -> property value document.
pub type PropertyValues = IndexMap<String, Value>;

/// One page of a source database, as returned by a query.
#[derive(Debug, Clone, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub properties: PropertyValues,
}

/// Knobs for [`transform_value`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformOptions {
    /// Drop values of computed types (formula, rollup, created_time, ...)
    /// instead of passing them through.
    pub skip_computed: bool,
}

/// Values under their merged names, for every merged property `index` feeds.
pub fn carry_forward(record: &Record, index: usize, sources: &PropertySources) -> PropertyValues {
    sources
        .contributed_by(index)
        .filter_map(|(merged, original)| {
            record
                .properties
                .get(original)
                .map(|value| (merged.to_string(), value.clone()))
        })
        .collect()
}

/// Transform every carried value, dropping the ones that end up empty.
pub fn reshape(carried: &PropertyValues, options: &TransformOptions) -> PropertyValues {
    carried
        .iter()
        .filter_map(|(name, value)| {
            transform_value(value, options).map(|value| (name.clone(), value))
        })
        .collect()
}

/// Reshape one property value into something the create-page call accepts.
///
/// Select values are reduced to the option name and multi-select values to a
/// list of names; colour and id metadata is dropped. URL values are kept only
/// when non-empty. Other types pass through unchanged. `None` means the
/// property should be left out of the outgoing record.
pub fn transform_value(value: &Value, options: &TransformOptions) -> Option<Value> {
    if is_blank(value) {
        return None;
    }

    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .map(PropertyType::from);

    match kind {
        Some(PropertyType::Select) => value
            .get("select")
            .and_then(|select| select.get("name"))
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .map(|name| json!({ "select": { "name": name } })),
        Some(PropertyType::MultiSelect) => {
            let names: Vec<Value> = value
                .get("multi_select")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(|item| item.get("name").and_then(Value::as_str))
                .filter(|name| !name.is_empty())
                .map(|name| json!({ "name": name }))
                .collect();
            if names.is_empty() {
                None
            } else {
                Some(json!({ "multi_select": names }))
            }
        }
        Some(PropertyType::Url) => value
            .get("url")
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .map(|url| json!({ "url": url })),
        Some(kind) if options.skip_computed && kind.is_computed() => None,
        _ => Some(value.clone()),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
#[path = "tests/record_tests.rs"]
mod tests;
