use std::sync::Arc;

use indexmap::IndexMap;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use notion_merge_core::PropertyValues;

use crate::api::WorkspaceApi;
use crate::error::ApiError;
use crate::settings::Settings;
use crate::types::{BotUser, CreatedObject, Database, ErrorBody, QueryPage};

/// The API averages about three requests per second per integration.
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(340);
const PAGE_SIZE: u32 = 100;

/// HTTP client for the Notion API with request pacing.
///
/// Every call is attempted once; a 429 surfaces as [`ApiError::RateLimited`].
pub struct NotionClient {
    http: reqwest::Client,
    base_url: String,
    last_request: Arc<Mutex<Instant>>,
}

impl NotionClient {
    /// Build a client. No request is made.
    pub fn new(settings: &Settings) -> Result<Self, ApiError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", settings.token))
            .map_err(|_| ApiError::Config("Notion token contains invalid characters".into()))?;
        auth.set_sensitive(true);
        let version = HeaderValue::from_str(&settings.api_version)
            .map_err(|_| ApiError::Config("Notion API version contains invalid characters".into()))?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(HeaderName::from_static("notion-version"), version);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("notion-merge/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: settings.base_url.clone(),
            last_request: Arc::new(Mutex::new(Instant::now() - MIN_REQUEST_INTERVAL)),
        })
    }

    /// Build a client and check the token by fetching the bot user.
    pub async fn connect(settings: &Settings) -> Result<(Self, BotUser), ApiError> {
        let client = Self::new(settings)?;
        let user = client.current_user().await?;
        Ok((client, user))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send a request and decode the JSON response, mapping error statuses.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<T, ApiError> {
        self.rate_limit().await;

        log::debug!("notion: {}", what);
        let resp = request.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            log::debug!("notion: {} failed with HTTP {}", what, status.as_u16());
            return Err(error_for_status(status.as_u16(), &text, what));
        }

        serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!(
                "Failed to parse {}: {}. Response: {}",
                what,
                e,
                excerpt(&text)
            ))
        })
    }

    /// Wait until at least MIN_REQUEST_INTERVAL has passed since the last request.
    async fn rate_limit(&self) {
        let mut last = self.last_request.lock().await;
        let elapsed = last.elapsed();
        if elapsed < MIN_REQUEST_INTERVAL {
            tokio::time::sleep(MIN_REQUEST_INTERVAL - elapsed).await;
        }
        *last = Instant::now();
    }
}

impl WorkspaceApi for NotionClient {
    async fn retrieve_database(&self, database_id: &str) -> Result<Database, ApiError> {
        let request = self.http.get(self.url(&format!("databases/{}", database_id)));
        self.send(request, &format!("database {}", database_id)).await
    }

    async fn create_database(
        &self,
        parent_page_id: &str,
        title: &str,
        properties: &IndexMap<String, Value>,
    ) -> Result<String, ApiError> {
        let body = CreateDatabaseBody {
            parent: json!({ "type": "page_id", "page_id": parent_page_id }),
            title: json!([{ "type": "text", "text": { "content": title } }]),
            properties,
        };
        let request = self.http.post(self.url("databases")).json(&body);
        let created: CreatedObject = self.send(request, "create database").await?;
        Ok(created.id)
    }

    async fn update_database(
        &self,
        database_id: &str,
        properties: &Map<String, Value>,
    ) -> Result<(), ApiError> {
        let body = json!({ "properties": properties });
        let request = self
            .http
            .patch(self.url(&format!("databases/{}", database_id)))
            .json(&body);
        let _: CreatedObject = self
            .send(request, &format!("update database {}", database_id))
            .await?;
        Ok(())
    }

    async fn query_database(
        &self,
        database_id: &str,
        start_cursor: Option<&str>,
    ) -> Result<QueryPage, ApiError> {
        let body = query_body(start_cursor);
        let request = self
            .http
            .post(self.url(&format!("databases/{}/query", database_id)))
            .json(&body);
        self.send(request, &format!("query database {}", database_id))
            .await
    }

    async fn create_page(
        &self,
        database_id: &str,
        properties: &PropertyValues,
    ) -> Result<String, ApiError> {
        let body = json!({
            "parent": { "database_id": database_id },
            "properties": properties,
        });
        let request = self.http.post(self.url("pages")).json(&body);
        let created: CreatedObject = self.send(request, "create page").await?;
        Ok(created.id)
    }

    async fn current_user(&self) -> Result<BotUser, ApiError> {
        let request = self.http.get(self.url("users/me"));
        self.send(request, "current user").await
    }
}

/// Serialized directly so `properties` keeps its order on the wire; a
/// `serde_json::Value` would sort the keys.
#[derive(Serialize)]
struct CreateDatabaseBody<'a> {
    parent: Value,
    title: Value,
    properties: &'a IndexMap<String, Value>,
}

fn query_body(start_cursor: Option<&str>) -> Value {
    let mut body = json!({ "page_size": PAGE_SIZE });
    if let Some(cursor) = start_cursor {
        body["start_cursor"] = Value::String(cursor.to_string());
    }
    body
}

/// Map an error status and the service's error document to an [`ApiError`].
fn error_for_status(status: u16, body: &str, what: &str) -> ApiError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = if parsed.message.is_empty() {
        format!("{} (HTTP {})", what, status)
    } else {
        parsed.message
    };

    match status {
        401 => ApiError::Unauthorized(message),
        404 => ApiError::NotFound(message),
        429 => ApiError::RateLimited,
        _ => ApiError::Service {
            status,
            code: if parsed.code.is_empty() {
                "unknown".to_string()
            } else {
                parsed.code
            },
            message,
        },
    }
}

fn excerpt(text: &str) -> String {
    text.chars().take(200).collect()
}
