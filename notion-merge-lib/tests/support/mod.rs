//! In-memory stand-in for the Notion API that records every call.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::{Map, Value, json};

use notion_merge_client::types::RichText;
use notion_merge_client::{ApiError, BotUser, Database, QueryPage, WorkspaceApi};
use notion_merge_core::{PropertyConfig, PropertyValues, Record, Schema};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Retrieve(String),
    Create { parent: String, title: String },
    Update { database: String, properties: Value },
    Query { database: String, cursor: Option<String> },
    InsertPage { database: String, properties: Value },
}

#[derive(Default)]
struct State {
    schemas: HashMap<String, Schema>,
    pages: HashMap<String, Vec<QueryPage>>,
    calls: Vec<Call>,
    created: usize,
}

type Rejector = Box<dyn Fn(&PropertyValues) -> bool>;

#[derive(Default)]
pub struct FakeWorkspace {
    state: RefCell<State>,
    reject: Option<Rejector>,
}

impl FakeWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source database with its records in a single page.
    pub fn with_database(self, id: &str, schema: Schema, records: Vec<Record>) -> Self {
        self.with_paged_database(id, schema, vec![records])
    }

    /// Register a source database whose records come back in several pages.
    pub fn with_paged_database(self, id: &str, schema: Schema, pages: Vec<Vec<Record>>) -> Self {
        let count = pages.len();
        let pages = pages
            .into_iter()
            .enumerate()
            .map(|(i, results)| QueryPage {
                results,
                has_more: i + 1 < count,
                next_cursor: (i + 1 < count).then(|| format!("{}-cursor-{}", id, i + 1)),
            })
            .collect();
        self.with_raw_pages(id, schema, pages)
    }

    pub fn with_raw_pages(self, id: &str, schema: Schema, pages: Vec<QueryPage>) -> Self {
        {
            let mut state = self.state.borrow_mut();
            state.schemas.insert(id.to_string(), schema);
            state.pages.insert(id.to_string(), pages);
        }
        self
    }

    /// Make `create_page` fail for payloads matching `reject`.
    pub fn rejecting(mut self, reject: impl Fn(&PropertyValues) -> bool + 'static) -> Self {
        self.reject = Some(Box::new(reject));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn updates(&self) -> Vec<(String, Value)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Update {
                    database,
                    properties,
                } => Some((database, properties)),
                _ => None,
            })
            .collect()
    }

    pub fn inserted(&self, database_id: &str) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::InsertPage {
                    database,
                    properties,
                } if database == database_id => Some(properties),
                _ => None,
            })
            .collect()
    }

    pub fn schema(&self, database_id: &str) -> Option<Schema> {
        self.state.borrow().schemas.get(database_id).cloned()
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl WorkspaceApi for FakeWorkspace {
    async fn retrieve_database(&self, database_id: &str) -> Result<Database, ApiError> {
        self.record(Call::Retrieve(database_id.to_string()));
        let state = self.state.borrow();
        let schema = state
            .schemas
            .get(database_id)
            .ok_or_else(|| ApiError::NotFound(format!("database {}", database_id)))?;
        Ok(Database {
            id: database_id.to_string(),
            title: vec![RichText {
                plain_text: database_id.to_string(),
            }],
            properties: schema.clone(),
            url: None,
        })
    }

    async fn create_database(
        &self,
        parent_page_id: &str,
        title: &str,
        properties: &IndexMap<String, Value>,
    ) -> Result<String, ApiError> {
        self.record(Call::Create {
            parent: parent_page_id.to_string(),
            title: title.to_string(),
        });

        let mut schema = Schema::new();
        for (name, value) in properties {
            let config = PropertyConfig::from_value(name, value.clone())
                .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
            schema.insert(name.clone(), config);
        }

        let mut state = self.state.borrow_mut();
        state.created += 1;
        let id = format!("target-{}", state.created);
        state.schemas.insert(id.clone(), schema);
        state.pages.insert(id.clone(), Vec::new());
        Ok(id)
    }

    async fn update_database(
        &self,
        database_id: &str,
        properties: &Map<String, Value>,
    ) -> Result<(), ApiError> {
        self.record(Call::Update {
            database: database_id.to_string(),
            properties: Value::Object(properties.clone()),
        });

        let mut state = self.state.borrow_mut();
        let schema = state
            .schemas
            .get_mut(database_id)
            .ok_or_else(|| ApiError::NotFound(format!("database {}", database_id)))?;

        // New options are appended to the ones already declared.
        for (name, patch) in properties {
            let Some(config) = schema.get_mut(name) else {
                continue;
            };
            let kind = config.kind().as_str().to_string();
            let mut value = config.to_value();
            let added = patch[&kind]["options"].as_array().cloned().unwrap_or_default();
            let options = &mut value[&kind]["options"];
            if !options.is_array() {
                *options = json!([]);
            }
            if let Some(list) = options.as_array_mut() {
                list.extend(added);
            }
            *config = PropertyConfig::from_value(name, value)
                .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        }
        Ok(())
    }

    async fn query_database(
        &self,
        database_id: &str,
        start_cursor: Option<&str>,
    ) -> Result<QueryPage, ApiError> {
        self.record(Call::Query {
            database: database_id.to_string(),
            cursor: start_cursor.map(str::to_string),
        });

        let state = self.state.borrow();
        let pages = state
            .pages
            .get(database_id)
            .ok_or_else(|| ApiError::NotFound(format!("database {}", database_id)))?;
        let position = match start_cursor {
            None => 0,
            Some(cursor) => cursor
                .rsplit('-')
                .next()
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| ApiError::InvalidResponse(format!("bad cursor {}", cursor)))?,
        };
        Ok(pages.get(position).cloned().unwrap_or_default())
    }

    async fn create_page(
        &self,
        database_id: &str,
        properties: &PropertyValues,
    ) -> Result<String, ApiError> {
        let value = serde_json::to_value(properties).map_err(ApiError::Json)?;
        self.record(Call::InsertPage {
            database: database_id.to_string(),
            properties: value,
        });

        if self.reject.as_ref().is_some_and(|reject| reject(properties)) {
            return Err(ApiError::Service {
                status: 400,
                code: "validation_error".to_string(),
                message: "body failed validation".to_string(),
            });
        }
        let count = self.inserted(database_id).len();
        Ok(format!("{}-page-{}", database_id, count))
    }

    async fn current_user(&self) -> Result<BotUser, ApiError> {
        Ok(BotUser {
            id: "bot".to_string(),
            name: Some("Fake".to_string()),
            user_type: Some("bot".to_string()),
        })
    }
}

// Builders for schemas and records.

pub fn property(name: &str, kind: &str) -> (String, PropertyConfig) {
    let value = json!({"id": format!("{}-id", name), "name": name, "type": kind, kind: {}});
    (name.to_string(), PropertyConfig::from_value(name, value).unwrap())
}

pub fn enumerated(name: &str, kind: &str, options: &[&str]) -> (String, PropertyConfig) {
    let options: Vec<Value> = options
        .iter()
        .map(|o| json!({"name": o, "color": "default"}))
        .collect();
    let value = json!({"name": name, "type": kind, kind: {"options": options}});
    (name.to_string(), PropertyConfig::from_value(name, value).unwrap())
}

pub fn schema(properties: Vec<(String, PropertyConfig)>) -> Schema {
    properties.into_iter().collect()
}

pub fn record(id: &str, values: Vec<(&str, Value)>) -> Record {
    Record {
        id: id.to_string(),
        properties: values
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect(),
    }
}

pub fn title_value(text: &str) -> Value {
    json!({"id": "title", "type": "title", "title": [{"type": "text", "text": {"content": text}, "plain_text": text}]})
}

pub fn select_value(name: &str) -> Value {
    json!({"id": "s", "type": "select", "select": {"id": "opt", "name": name, "color": "red"}})
}

pub fn multi_select_value(names: &[&str]) -> Value {
    let items: Vec<Value> = names
        .iter()
        .map(|n| json!({"id": "opt", "name": n, "color": "blue"}))
        .collect();
    json!({"id": "m", "type": "multi_select", "multi_select": items})
}

pub fn number_value(n: i64) -> Value {
    json!({"id": "n", "type": "number", "number": n})
}

pub fn url_value(url: Option<&str>) -> Value {
    json!({"id": "u", "type": "url", "url": url})
}

pub fn ids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}
