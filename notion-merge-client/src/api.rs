//! The remote operations a merge needs, as a trait so the merger can run
//! against [`NotionClient`](crate::NotionClient) or an in-memory stand-in.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use notion_merge_core::PropertyValues;

use crate::error::ApiError;
use crate::types::{BotUser, Database, QueryPage};

/// Calls are awaited one at a time; implementations need not be `Sync`.
#[allow(async_fn_in_trait)]
pub trait WorkspaceApi {
    /// Fetch a database, including its property schema.
    async fn retrieve_database(&self, database_id: &str) -> Result<Database, ApiError>;

    /// Create a database under a page and return its id. Properties are
    /// created in the order given.
    async fn create_database(
        &self,
        parent_page_id: &str,
        title: &str,
        properties: &IndexMap<String, Value>,
    ) -> Result<String, ApiError>;

    /// Patch property definitions of an existing database.
    async fn update_database(
        &self,
        database_id: &str,
        properties: &Map<String, Value>,
    ) -> Result<(), ApiError>;

    /// Fetch one page of records, starting at `start_cursor` when given.
    async fn query_database(
        &self,
        database_id: &str,
        start_cursor: Option<&str>,
    ) -> Result<QueryPage, ApiError>;

    /// Insert a record into a database and return its id.
    async fn create_page(
        &self,
        database_id: &str,
        properties: &PropertyValues,
    ) -> Result<String, ApiError>;

    /// The bot user the token belongs to.
    async fn current_user(&self) -> Result<BotUser, ApiError>;
}
