//! DirectoryClient — GraphQL client with bounded retry
//!
//! Every call is a POST with a `{query, variables}` body. Transport failures
//! (connection, timeout, 5xx) are retried with a doubling delay; a top-level
//! `errors` array marks a deterministic application error and is never
//! retried.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use shared::{BreederPayload, RemoteBreeder, RemoteUser, UserPayload};

use crate::error::{DirectoryError, DirectoryResult};
use crate::queries;

/// Fixed page size for snapshot pagination
pub const PAGE_SIZE: usize = 100;
/// Max attempts per request (first try included)
const MAX_ATTEMPTS: u32 = 3;
/// Initial retry delay, doubled after each failed attempt
const INITIAL_RETRY_DELAY_MS: u64 = 500;
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Directory operations the importer depends on
///
/// A trait seam so the orchestrator can run against an in-memory fake in
/// tests. Mutating operations surface application-level rejections as
/// `false`/`None`; only exhausted transport retries return an error.
#[async_trait]
pub trait Directory {
    async fn fetch_all_users(&self) -> DirectoryResult<Vec<RemoteUser>>;

    /// Complete breeder population, keyed by the owning user's document id
    async fn fetch_all_breeders(&self) -> DirectoryResult<HashMap<String, RemoteBreeder>>;

    async fn find_user_by_external_id(&self, external_id: i64) -> DirectoryResult<Option<String>>;

    async fn find_breeder_by_external_id(
        &self,
        external_id: i64,
    ) -> DirectoryResult<Option<String>>;

    /// Create an auth-capable account; returns the new document id
    async fn register_user(&self, username: &str, email: &str) -> DirectoryResult<Option<String>>;

    async fn update_user(&self, document_id: &str, payload: &UserPayload) -> DirectoryResult<bool>;

    async fn create_breeder(&self, payload: &BreederPayload) -> DirectoryResult<Option<String>>;

    async fn update_breeder(
        &self,
        document_id: &str,
        payload: &BreederPayload,
    ) -> DirectoryResult<bool>;
}

/// HTTP implementation of [`Directory`]
pub struct DirectoryClient {
    http: Client,
    endpoint: String,
    token: String,
    register_password: String,
}

impl DirectoryClient {
    pub fn new(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        register_password: impl Into<String>,
    ) -> DirectoryResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            token: token.into(),
            register_password: register_password.into(),
        })
    }

    /// POST one GraphQL document with bounded retry
    ///
    /// Returns the `data` value of a successful response. Connection errors
    /// and 5xx responses count as transient; everything else fails
    /// immediately.
    async fn post(&self, query: &str, variables: Value) -> DirectoryResult<Value> {
        let body = json!({ "query": query, "variables": variables });
        let mut delay = Duration::from_millis(INITIAL_RETRY_DELAY_MS);

        for attempt in 1..=MAX_ATTEMPTS {
            let result = self
                .http
                .post(&self.endpoint)
                .bearer_auth(&self.token)
                .json(&body)
                .send()
                .await;

            let response = match result {
                Ok(response) => response,
                Err(e) if attempt < MAX_ATTEMPTS => {
                    tracing::warn!(
                        attempt,
                        max_attempts = MAX_ATTEMPTS,
                        delay_ms = delay.as_millis() as u64,
                        "Directory request failed, retrying: {e}"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let status = response.status();
            if status.is_server_error() {
                if attempt < MAX_ATTEMPTS {
                    tracing::warn!(
                        attempt,
                        max_attempts = MAX_ATTEMPTS,
                        %status,
                        delay_ms = delay.as_millis() as u64,
                        "Directory returned server error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    continue;
                }
                // Retries exhausted on a server error: terminal transport failure
                if let Err(e) = response.error_for_status_ref() {
                    return Err(DirectoryError::Transport(e));
                }
            }
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(DirectoryError::Api(format!("HTTP {status}: {text}")));
            }

            let payload: Value = response
                .json()
                .await
                .map_err(|e| DirectoryError::InvalidResponse(e.to_string()))?;

            // A structured `errors` array is deterministic, never retried
            if let Some(errors) = payload.get("errors").and_then(Value::as_array) {
                let messages: Vec<&str> = errors
                    .iter()
                    .filter_map(|e| e.get("message").and_then(Value::as_str))
                    .collect();
                return Err(DirectoryError::Api(messages.join("; ")));
            }

            return Ok(payload.get("data").cloned().unwrap_or(Value::Null));
        }

        unreachable!("retry loop always returns")
    }

    /// Run a point-lookup query and pull the first document id out of `field`
    async fn find_document_id(
        &self,
        query: &str,
        external_id: i64,
        field: &str,
    ) -> DirectoryResult<Option<String>> {
        let data = match self.post(query, json!({ "cId": external_id })).await {
            Ok(data) => data,
            Err(DirectoryError::Api(message)) => {
                tracing::warn!(external_id, "Lookup failed: {message}");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        Ok(data
            .get(field)
            .and_then(Value::as_array)
            .and_then(|entries| entries.first())
            .and_then(|entry| entry.get("documentId"))
            .and_then(Value::as_str)
            .map(str::to_string))
    }
}

#[async_trait]
impl Directory for DirectoryClient {
    async fn fetch_all_users(&self) -> DirectoryResult<Vec<RemoteUser>> {
        let mut all_users = Vec::new();
        let mut page = 1u32;

        loop {
            let data = self
                .post(
                    queries::FETCH_USERS_PAGE,
                    json!({ "page": page, "pageSize": PAGE_SIZE }),
                )
                .await?;

            let entries = data
                .get("usersPermissionsUsers")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            if entries.is_empty() {
                break;
            }

            let count = entries.len();
            let users: Vec<RemoteUser> = serde_json::from_value(Value::Array(entries))
                .map_err(|e| DirectoryError::InvalidResponse(e.to_string()))?;
            all_users.extend(users);

            tracing::debug!(page, count, total = all_users.len(), "Fetched user page");
            if count < PAGE_SIZE {
                break;
            }
            page += 1;
        }

        Ok(all_users)
    }

    async fn fetch_all_breeders(&self) -> DirectoryResult<HashMap<String, RemoteBreeder>> {
        let mut breeders = HashMap::new();
        let mut page = 1u32;

        loop {
            let data = self
                .post(
                    queries::FETCH_BREEDERS_PAGE,
                    json!({ "page": page, "pageSize": PAGE_SIZE }),
                )
                .await?;

            let entries = data
                .get("hzdPluginBreeders")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            if entries.is_empty() {
                break;
            }

            let count = entries.len();
            for entry in entries {
                // Breeders without a linked member are unreachable from the
                // import and are skipped
                let Some(user_doc_id) = entry
                    .get("member")
                    .and_then(|m| m.get("documentId"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
                else {
                    continue;
                };
                let breeder: RemoteBreeder = serde_json::from_value(entry)
                    .map_err(|e| DirectoryError::InvalidResponse(e.to_string()))?;
                breeders.insert(user_doc_id, breeder);
            }

            tracing::debug!(page, count, total = breeders.len(), "Fetched breeder page");
            if count < PAGE_SIZE {
                break;
            }
            page += 1;
        }

        Ok(breeders)
    }

    async fn find_user_by_external_id(&self, external_id: i64) -> DirectoryResult<Option<String>> {
        self.find_document_id(
            queries::FIND_USER_BY_EXTERNAL_ID,
            external_id,
            "usersPermissionsUsers",
        )
        .await
    }

    async fn find_breeder_by_external_id(
        &self,
        external_id: i64,
    ) -> DirectoryResult<Option<String>> {
        self.find_document_id(
            queries::FIND_BREEDER_BY_EXTERNAL_ID,
            external_id,
            "hzdPluginBreeders",
        )
        .await
    }

    async fn register_user(&self, username: &str, email: &str) -> DirectoryResult<Option<String>> {
        let variables = json!({
            "input": {
                "username": username,
                "email": email,
                "password": self.register_password,
            }
        });

        let data = match self.post(queries::REGISTER_USER, variables).await {
            Ok(data) => data,
            Err(DirectoryError::Api(message)) => {
                tracing::warn!(username, "Failed to register user: {message}");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        Ok(data
            .pointer("/register/user/documentId")
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    async fn update_user(&self, document_id: &str, payload: &UserPayload) -> DirectoryResult<bool> {
        let variables = json!({ "id": document_id, "data": payload });

        match self.post(queries::UPDATE_USER, variables).await {
            Ok(_) => Ok(true),
            Err(DirectoryError::Api(message)) => {
                tracing::warn!(document_id, "Failed to update user: {message}");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn create_breeder(&self, payload: &BreederPayload) -> DirectoryResult<Option<String>> {
        let variables = json!({ "data": payload });

        let data = match self.post(queries::CREATE_BREEDER, variables).await {
            Ok(data) => data,
            Err(DirectoryError::Api(message)) => {
                tracing::warn!("Failed to create breeder: {message}");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        Ok(data
            .pointer("/createHzdPluginBreeder/documentId")
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    async fn update_breeder(
        &self,
        document_id: &str,
        payload: &BreederPayload,
    ) -> DirectoryResult<bool> {
        let variables = json!({ "documentId": document_id, "data": payload });

        match self.post(queries::UPDATE_BREEDER, variables).await {
            Ok(_) => Ok(true),
            Err(DirectoryError::Api(message)) => {
                tracing::warn!(document_id, "Failed to update breeder: {message}");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
