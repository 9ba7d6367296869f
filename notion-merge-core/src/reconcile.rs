//! Schema reconciliation across source databases.
//!
//! Sources are visited in order. The first source to define a property name
//! claims it for its type; later sources with the same name and type join
//! that property, and later sources with a conflicting type get their own
//! property named `<name>_db<N>` (N is the 1-based source position).
//! A source never feeds one merged property from two of its own properties;
//! the second is renamed the same way.
//! Option lists are not merged here, see [`crate::options`].

use indexmap::IndexMap;
use serde_json::Value;

use crate::schema::{PropertyConfig, Schema};

/// Name given to a property that collides with an earlier one of a different type.
pub fn collision_suffix(name: &str, source_index: usize) -> String {
    format!("{}_db{}", name, source_index + 1)
}

/// The merged target schema, in the order properties were first seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedSchema {
    properties: IndexMap<String, PropertyConfig>,
}

impl MergedSchema {
    pub fn get(&self, name: &str) -> Option<&PropertyConfig> {
        self.properties.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyConfig)> {
        self.properties.iter().map(|(name, config)| (name.as_str(), config))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// The `properties` document for a create-database request, in merged
    /// order.
    pub fn to_request_properties(&self) -> IndexMap<String, Value> {
        self.properties
            .iter()
            .map(|(name, config)| (name.clone(), config.to_value()))
            .collect()
    }
}

/// One source's contribution to a merged property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contribution {
    /// 0-based position of the source database
    pub source: usize,
    /// Property name in that source database
    pub original_name: String,
}

/// The sources feeding one merged property.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertySource {
    contributions: Vec<Contribution>,
}

impl PropertySource {
    /// Source indices in contribution order.
    pub fn indices(&self) -> Vec<usize> {
        self.contributions.iter().map(|c| c.source).collect()
    }

    pub fn contributions(&self) -> &[Contribution] {
        &self.contributions
    }

    /// The property name to read from source `index`, if it contributes.
    pub fn original_name_for(&self, index: usize) -> Option<&str> {
        self.contributions
            .iter()
            .find(|c| c.source == index)
            .map(|c| c.original_name.as_str())
    }
}

/// Merged property name -> contributing sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertySources {
    entries: IndexMap<String, PropertySource>,
}

impl PropertySources {
    /// Source indices contributing to `merged`. Empty if the name is unknown.
    pub fn sources(&self, merged: &str) -> Vec<usize> {
        self.entries
            .get(merged)
            .map(PropertySource::indices)
            .unwrap_or_default()
    }

    pub fn get(&self, merged: &str) -> Option<&PropertySource> {
        self.entries.get(merged)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertySource)> {
        self.entries.iter().map(|(name, source)| (name.as_str(), source))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(merged name, original name)` pairs that source `index` populates.
    pub fn contributed_by(&self, index: usize) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(move |(merged, source)| {
            source
                .original_name_for(index)
                .map(|original| (merged.as_str(), original))
        })
    }

    /// The merged property that source `index`'s property `original` feeds.
    pub fn merged_name_for(&self, original: &str, index: usize) -> Option<&str> {
        self.contributed_by(index)
            .find(|(_, name)| *name == original)
            .map(|(merged, _)| merged)
    }

    fn fed_by(&self, merged: &str, index: usize) -> bool {
        self.entries
            .get(merged)
            .is_some_and(|source| source.original_name_for(index).is_some())
    }

    fn start(&mut self, merged: String, index: usize, original: &str) {
        self.entries.insert(
            merged,
            PropertySource {
                contributions: vec![Contribution {
                    source: index,
                    original_name: original.to_string(),
                }],
            },
        );
    }

    fn join(&mut self, merged: &str, index: usize, original: &str) {
        if let Some(source) = self.entries.get_mut(merged) {
            source.contributions.push(Contribution {
                source: index,
                original_name: original.to_string(),
            });
        }
    }
}

/// Merge `schemas` into one target schema and record where each merged
/// property's values come from.
pub fn reconcile(schemas: &[Schema]) -> (MergedSchema, PropertySources) {
    let mut merged = MergedSchema::default();
    let mut sources = PropertySources::default();

    for (index, schema) in schemas.iter().enumerate() {
        for (name, config) in schema {
            match merged.properties.get(name) {
                None => {
                    merged.properties.insert(name.clone(), config.clone());
                    sources.start(name.clone(), index, name);
                }
                Some(existing)
                    if existing.kind() == config.kind() && !sources.fed_by(name, index) =>
                {
                    sources.join(name, index, name);
                }
                // A type conflict, or a property this source already feeds
                // through a rename.
                Some(_) => {
                    let renamed = unclaimed_name(&merged, collision_suffix(name, index));
                    merged
                        .properties
                        .insert(renamed.clone(), config.with_name(&renamed));
                    sources.start(renamed, index, name);
                }
            }
        }
    }

    (merged, sources)
}

/// `base`, or `base_2`, `base_3`, ... if a source already uses that name.
fn unclaimed_name(merged: &MergedSchema, base: String) -> String {
    if !merged.contains(&base) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}_{}", base, n);
        if !merged.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
#[path = "tests/reconcile_tests.rs"]
mod tests;
