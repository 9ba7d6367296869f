//! Property schema types for Notion databases.
//!
//! A database schema is an ordered map from property name to the full
//! property definition the service returned. Definitions are kept verbatim so
//! they can be sent back unchanged when the merged database is created; only
//! the `type` member is parsed.

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SchemaError;

/// A database schema: property name -> definition, in service order.
pub type Schema = IndexMap<String, PropertyConfig>;

/// The declared type of a database property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PropertyType {
    Title,
    RichText,
    Number,
    Select,
    MultiSelect,
    Status,
    Date,
    People,
    Files,
    Checkbox,
    Url,
    Email,
    PhoneNumber,
    Formula,
    Relation,
    Rollup,
    CreatedTime,
    CreatedBy,
    LastEditedTime,
    LastEditedBy,
    UniqueId,
    Button,
    Verification,
    /// A type name this build does not know about.
    Other(String),
}

impl PropertyType {
    /// The wire name, as used in the `type` member and as the key of the
    /// type-specific configuration.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Title => "title",
            Self::RichText => "rich_text",
            Self::Number => "number",
            Self::Select => "select",
            Self::MultiSelect => "multi_select",
            Self::Status => "status",
            Self::Date => "date",
            Self::People => "people",
            Self::Files => "files",
            Self::Checkbox => "checkbox",
            Self::Url => "url",
            Self::Email => "email",
            Self::PhoneNumber => "phone_number",
            Self::Formula => "formula",
            Self::Relation => "relation",
            Self::Rollup => "rollup",
            Self::CreatedTime => "created_time",
            Self::CreatedBy => "created_by",
            Self::LastEditedTime => "last_edited_time",
            Self::LastEditedBy => "last_edited_by",
            Self::UniqueId => "unique_id",
            Self::Button => "button",
            Self::Verification => "verification",
            Self::Other(name) => name,
        }
    }

    /// Select and multi-select: values come from a server-tracked option list.
    pub fn is_enumerated(&self) -> bool {
        matches!(self, Self::Select | Self::MultiSelect)
    }

    /// Types whose record values must be reshaped before they can be written.
    pub fn needs_reshaping(&self) -> bool {
        matches!(self, Self::Select | Self::MultiSelect | Self::Url)
    }

    /// Types whose values are computed by the service and rejected on write.
    pub fn is_computed(&self) -> bool {
        matches!(
            self,
            Self::Formula
                | Self::Rollup
                | Self::CreatedTime
                | Self::CreatedBy
                | Self::LastEditedTime
                | Self::LastEditedBy
                | Self::UniqueId
                | Self::Button
                | Self::Verification
        )
    }
}

impl From<&str> for PropertyType {
    fn from(name: &str) -> Self {
        match name {
            "title" => Self::Title,
            "rich_text" => Self::RichText,
            "number" => Self::Number,
            "select" => Self::Select,
            "multi_select" => Self::MultiSelect,
            "status" => Self::Status,
            "date" => Self::Date,
            "people" => Self::People,
            "files" => Self::Files,
            "checkbox" => Self::Checkbox,
            "url" => Self::Url,
            "email" => Self::Email,
            "phone_number" => Self::PhoneNumber,
            "formula" => Self::Formula,
            "relation" => Self::Relation,
            "rollup" => Self::Rollup,
            "created_time" => Self::CreatedTime,
            "created_by" => Self::CreatedBy,
            "last_edited_time" => Self::LastEditedTime,
            "last_edited_by" => Self::LastEditedBy,
            "unique_id" => Self::UniqueId,
            "button" => Self::Button,
            "verification" => Self::Verification,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for PropertyType {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl From<PropertyType> for String {
    fn from(kind: PropertyType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One property definition: the parsed type plus the untouched document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct PropertyConfig {
    kind: PropertyType,
    body: Map<String, Value>,
}

impl PropertyConfig {
    /// Parse a property definition, using `property` to label errors.
    pub fn from_value(property: &str, value: Value) -> Result<Self, SchemaError> {
        let Value::Object(body) = value else {
            return Err(SchemaError::NotAnObject {
                property: property.to_string(),
            });
        };
        let kind = body
            .get("type")
            .and_then(Value::as_str)
            .map(PropertyType::from)
            .ok_or_else(|| SchemaError::MissingType {
                property: property.to_string(),
            })?;
        Ok(Self { kind, body })
    }

    pub fn kind(&self) -> &PropertyType {
        &self.kind
    }

    /// The definition's `name` member, when the service supplied one.
    pub fn name(&self) -> Option<&str> {
        self.body.get("name").and_then(Value::as_str)
    }

    /// Declared option names of a select/multi-select property, first-seen
    /// order, duplicates collapsed. Empty for every other type.
    pub fn option_names(&self) -> Vec<String> {
        if !self.kind.is_enumerated() {
            return Vec::new();
        }
        let Some(options) = self
            .body
            .get(self.kind.as_str())
            .and_then(|config| config.get("options"))
            .and_then(Value::as_array)
        else {
            return Vec::new();
        };

        let names: IndexSet<String> = options
            .iter()
            .filter_map(|option| option.get("name").and_then(Value::as_str))
            .map(str::to_string)
            .collect();
        names.into_iter().collect()
    }

    /// A copy carrying `name` in its `name` member.
    pub fn with_name(&self, name: &str) -> Self {
        let mut renamed = self.clone();
        renamed
            .body
            .insert("name".to_string(), Value::String(name.to_string()));
        renamed
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.body.clone())
    }
}

impl TryFrom<Value> for PropertyConfig {
    type Error = SchemaError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let label = value
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("<unnamed>")
            .to_string();
        Self::from_value(&label, value)
    }
}

impl From<PropertyConfig> for Value {
    fn from(config: PropertyConfig) -> Self {
        Value::Object(config.body)
    }
}
