use serde::Deserialize;

use notion_merge_core::{Record, Schema};

/// A database object from `GET /databases/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    pub id: String,
    #[serde(default)]
    pub title: Vec<RichText>,
    #[serde(default)]
    pub properties: Schema,
    #[serde(default)]
    pub url: Option<String>,
}

impl Database {
    /// The title as plain text, segments concatenated.
    pub fn plain_title(&self) -> String {
        self.title.iter().map(|t| t.plain_text.as_str()).collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: String,
}

/// One page of results from `POST /databases/{id}/query`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryPage {
    #[serde(default)]
    pub results: Vec<Record>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Any created object; only the id is needed.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedObject {
    pub id: String,
}

/// The integration's bot user from `GET /users/me`.
#[derive(Debug, Clone, Deserialize)]
pub struct BotUser {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub user_type: Option<String>,
}

/// Error document returned with non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}
