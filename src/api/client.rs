//! HTTP client for communicating with the Keyshelf server
//!
//! Every request goes through [`ApiClient::send`], which applies the
//! configured timeout and turns non-2xx responses into [`ApiError::Status`]
//! carrying the server's `error` message when there is one.

use super::{ApiError, ApiResult, KeyServiceTrait};
use crate::config::ClientConfig;
use crate::state::{Key, KeyId, Project, ProjectId, ProjectScope};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Body of `PATCH /keys/{id}/reorder` and `PATCH /projects/{id}/reorder`
#[derive(Debug, Serialize)]
struct ReorderRequest {
    new_position: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    project_id: Option<ProjectId>,
}

/// Body of `POST /api/keys/move`
#[derive(Debug, Serialize)]
struct MoveRequest<'a> {
    key_id: KeyId,
    target_project_id: ProjectId,
    is_copy: bool,
    password: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct MoveResponse {
    #[serde(default)]
    key: Option<Key>,
}

/// Body of `POST /keys/encrypt` and `POST /keys/decrypt`
#[derive(Debug, Serialize)]
struct CryptRequest<'a> {
    password: &'a str,
    key_ids: &'a [KeyId],
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Pick the message shown to the operator for a failed response
fn error_message(body: &str, fallback: &str) -> String {
    if let Ok(ErrorBody { error: Some(msg) }) = serde_json::from_str::<ErrorBody>(body) {
        if !msg.trim().is_empty() {
            return msg;
        }
    }
    let text = body.trim();
    if text.is_empty() || text.starts_with('{') || text.starts_with('<') {
        fallback.to_string()
    } else {
        text.to_string()
    }
}

/// Client for the Keyshelf REST API
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client from the loaded configuration
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs()))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.server_url().trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    /// Send a request and map failures; `fallback` is used when the server
    /// gives no message of its own
    async fn send(&self, request: RequestBuilder, fallback: &str) -> ApiResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body, fallback);
        tracing::debug!("Request failed with {status}: {message}");
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl KeyServiceTrait for ApiClient {
    async fn check_connection(&mut self) -> bool {
        match self.request(Method::GET, "/projects").send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("Server unreachable: {e}");
                false
            }
        }
    }

    async fn list_keys(&mut self, scope: ProjectScope) -> ApiResult<Vec<Key>> {
        let request = match scope {
            ProjectScope::All => self
                .request(Method::GET, "/keys")
                .query(&[("show_all", "true")]),
            ProjectScope::Project(id) => self
                .request(Method::GET, "/keys")
                .query(&[("project_id", id.0)]),
        };
        let response = self.send(request, "Failed to fetch keys").await?;
        Ok(response.json().await?)
    }

    async fn get_key(&mut self, key_id: KeyId) -> ApiResult<Key> {
        let request = self.request(Method::GET, &format!("/keys/{key_id}"));
        let response = self.send(request, "Failed to fetch key data").await?;
        Ok(response.json().await?)
    }

    async fn list_projects(&mut self) -> ApiResult<Vec<Project>> {
        let request = self.request(Method::GET, "/projects");
        let response = self.send(request, "Failed to fetch projects").await?;
        Ok(response.json().await?)
    }

    async fn reorder_key(
        &mut self,
        key_id: KeyId,
        new_index: usize,
        project_id: ProjectId,
    ) -> ApiResult<Key> {
        let request = self
            .request(Method::PATCH, &format!("/keys/{key_id}/reorder"))
            .json(&ReorderRequest {
                new_position: new_index,
                project_id: Some(project_id),
            });
        let response = self.send(request, "Failed to reorder key").await?;
        Ok(response.json().await?)
    }

    async fn reorder_project(&mut self, project_id: ProjectId, new_index: usize) -> ApiResult<()> {
        let request = self
            .request(Method::PATCH, &format!("/projects/{project_id}/reorder"))
            .json(&ReorderRequest {
                new_position: new_index,
                project_id: None,
            });
        self.send(request, "Failed to reorder project").await?;
        Ok(())
    }

    async fn move_key(
        &mut self,
        key_id: KeyId,
        target_project: ProjectId,
        copy: bool,
        password: Option<String>,
    ) -> ApiResult<Option<Key>> {
        let request = self.request(Method::POST, "/api/keys/move").json(&MoveRequest {
            key_id,
            target_project_id: target_project,
            is_copy: copy,
            password: password.as_deref(),
        });
        let response = self.send(request, "Failed to move/copy key").await?;
        let body: MoveResponse = response.json().await?;
        Ok(body.key)
    }

    async fn decrypt_keys(&mut self, password: &str, key_ids: &[KeyId]) -> ApiResult<()> {
        let request = self
            .request(Method::POST, "/keys/decrypt")
            .json(&CryptRequest { password, key_ids });
        self.send(request, "Invalid password").await?;
        Ok(())
    }

    async fn encrypt_keys(&mut self, password: &str, key_ids: &[KeyId]) -> ApiResult<()> {
        let request = self
            .request(Method::POST, "/keys/encrypt")
            .json(&CryptRequest { password, key_ids });
        self.send(request, "Failed to encrypt keys").await?;
        Ok(())
    }

    async fn delete_key(&mut self, key_id: KeyId) -> ApiResult<()> {
        let request = self.request(Method::DELETE, &format!("/keys/{key_id}"));
        self.send(request, "Failed to delete key").await?;
        Ok(())
    }

    async fn delete_project(&mut self, project_id: ProjectId, delete_keys: bool) -> ApiResult<()> {
        let request = self
            .request(Method::DELETE, &format!("/projects/{project_id}"))
            .query(&[("delete_keys", delete_keys)]);
        self.send(request, "Failed to delete project").await?;
        Ok(())
    }
}
