//! Trait abstraction for the key service to enable mocking in tests

use super::ApiError;
use crate::state::{Key, KeyId, Project, ProjectId, ProjectScope};
use async_trait::async_trait;

pub type ApiResult<T> = Result<T, ApiError>;

/// Operations the client needs from the backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyServiceTrait: Send + Sync {
    /// Check if the server is reachable
    async fn check_connection(&mut self) -> bool;

    /// List keys for a project, or all keys
    async fn list_keys(&mut self, scope: ProjectScope) -> ApiResult<Vec<Key>>;

    /// Fetch one key (plaintext value if currently decrypted)
    async fn get_key(&mut self, key_id: KeyId) -> ApiResult<Key>;

    /// List all projects
    async fn list_projects(&mut self) -> ApiResult<Vec<Project>>;

    /// Move a key to a zero-based index within its project
    async fn reorder_key(
        &mut self,
        key_id: KeyId,
        new_index: usize,
        project_id: ProjectId,
    ) -> ApiResult<Key>;

    /// Move a project to a zero-based index in the sidebar
    async fn reorder_project(&mut self, project_id: ProjectId, new_index: usize) -> ApiResult<()>;

    /// Move or copy a key into another project.
    /// Returns the resulting record (the new key when copying).
    async fn move_key(
        &mut self,
        key_id: KeyId,
        target_project: ProjectId,
        copy: bool,
        password: Option<String>,
    ) -> ApiResult<Option<Key>>;

    /// Decrypt keys with a password
    async fn decrypt_keys(&mut self, password: &str, key_ids: &[KeyId]) -> ApiResult<()>;

    /// Encrypt keys with a password
    async fn encrypt_keys(&mut self, password: &str, key_ids: &[KeyId]) -> ApiResult<()>;

    /// Delete a single key
    async fn delete_key(&mut self, key_id: KeyId) -> ApiResult<()>;

    /// Delete a project, cascading to its keys or detaching them
    async fn delete_project(&mut self, project_id: ProjectId, delete_keys: bool) -> ApiResult<()>;
}
