//! Keyboard-driven key and project actions: copying a secret to the
//! clipboard, toggling a key's encryption, and deleting keys or projects.

use crate::api::{ApiError, KeyServiceTrait};
use crate::state::{
    AppState, DeleteChoice, ItemRef, KeyId, PasswordAction, PasswordPrompt, PendingKeyDelete,
    PendingProjectDelete, ProjectId,
};
use crate::sync::{refresh_keys, refresh_projects};
use anyhow::Result;
use thiserror::Error;

/// Destination for copied secrets
#[cfg_attr(test, mockall::automock)]
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// System clipboard
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        let mut clipboard = arboard::Clipboard::new()?;
        clipboard.set_text(text)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecretError {
    #[error("Invalid password")]
    InvalidPassword,

    #[error("Password is required")]
    MissingPassword,

    #[error("Failed to unlock key: {0}")]
    Unlock(ApiError),

    #[error("{}", .0.user_message("Failed to fetch key"))]
    Fetch(ApiError),

    #[error("Key #{key_id} was unlocked but re-encryption failed ({source}); it is now stored in plaintext")]
    Relock { key_id: KeyId, source: ApiError },
}

/// Decrypt an encrypted key, read its value and encrypt it again
pub async fn unlock_secret<S>(
    service: &mut S,
    key_id: KeyId,
    password: &str,
) -> Result<String, SecretError>
where
    S: KeyServiceTrait + ?Sized,
{
    if password.is_empty() {
        return Err(SecretError::MissingPassword);
    }

    service
        .decrypt_keys(password, &[key_id])
        .await
        .map_err(|e| {
            if e.is_rejection() {
                SecretError::InvalidPassword
            } else {
                SecretError::Unlock(e)
            }
        })?;

    let fetched = service.get_key(key_id).await;

    // Lock it again whether or not the fetch worked
    service
        .encrypt_keys(password, &[key_id])
        .await
        .map_err(|source| SecretError::Relock { key_id, source })?;

    fetched.map(|key| key.value).map_err(SecretError::Fetch)
}

/// Copy the selected key's secret. Encrypted keys open the password prompt
/// instead; returns true if the secret was copied right away.
pub fn copy_selected(state: &mut AppState, clipboard: &mut dyn ClipboardSink) -> bool {
    let Some(key) = state.selected_key() else {
        return false;
    };
    if key.encrypted {
        let key_id = key.id;
        state.password_prompt = Some(PasswordPrompt::new(PasswordAction::Copy, key_id));
        return false;
    }

    let name = key.name.clone();
    match clipboard.set_text(&key.value) {
        Ok(()) => {
            state.notifications.success(format!("Copied {name} to clipboard"));
            true
        }
        Err(e) => {
            state
                .notifications
                .error(format!("Failed to copy to clipboard: {e}"));
            false
        }
    }
}

/// Submit the copy password prompt
pub async fn copy_encrypted<S>(
    state: &mut AppState,
    service: &mut S,
    clipboard: &mut dyn ClipboardSink,
    password: String,
) where
    S: KeyServiceTrait + ?Sized,
{
    let Some(key_id) = state
        .password_prompt
        .as_ref()
        .filter(|p| p.action == PasswordAction::Copy)
        .map(|p| p.key_id)
    else {
        return;
    };

    let item = ItemRef::Key(key_id);
    state.busy.mark(item);
    let result = unlock_secret(service, key_id, &password).await;
    state.busy.clear(item);

    match result {
        Ok(secret) => {
            state.password_prompt = None;
            match clipboard.set_text(&secret) {
                Ok(()) => {
                    let name = state
                        .keys
                        .get(key_id)
                        .map_or_else(|| format!("key #{key_id}"), |k| k.name.clone());
                    state.notifications.success(format!("Copied {name} to clipboard"));
                }
                Err(e) => state
                    .notifications
                    .error(format!("Failed to copy to clipboard: {e}")),
            }
            refresh_keys(state, service).await;
        }
        Err(e @ (SecretError::InvalidPassword | SecretError::MissingPassword)) => {
            if let Some(prompt) = state.password_prompt.as_mut() {
                prompt.reject(e.to_string());
            }
        }
        Err(e) => {
            state.password_prompt = None;
            state.notifications.error(e.to_string());
            refresh_keys(state, service).await;
        }
    }
}

/// Open the password prompt that flips the selected key's encryption
pub fn request_encryption_toggle(state: &mut AppState) -> bool {
    let Some(key) = state.selected_key() else {
        return false;
    };
    if state.busy.is_busy(ItemRef::Key(key.id)) {
        return false;
    }
    let action = if key.encrypted {
        PasswordAction::Decrypt
    } else {
        PasswordAction::Encrypt
    };
    state.password_prompt = Some(PasswordPrompt::new(action, key.id));
    true
}

/// Submit the encrypt/decrypt prompt for its key
pub async fn toggle_encryption<S>(state: &mut AppState, service: &mut S, password: String)
where
    S: KeyServiceTrait + ?Sized,
{
    let Some((action, key_id)) = state
        .password_prompt
        .as_ref()
        .filter(|p| matches!(p.action, PasswordAction::Encrypt | PasswordAction::Decrypt))
        .map(|p| (p.action, p.key_id))
    else {
        return;
    };
    if password.is_empty() {
        if let Some(prompt) = state.password_prompt.as_mut() {
            prompt.reject(SecretError::MissingPassword.to_string());
        }
        return;
    }

    let item = ItemRef::Key(key_id);
    state.busy.mark(item);
    let result = match action {
        PasswordAction::Encrypt => service.encrypt_keys(&password, &[key_id]).await,
        _ => service.decrypt_keys(&password, &[key_id]).await,
    };
    state.busy.clear(item);

    let name = state
        .keys
        .get(key_id)
        .map_or_else(|| format!("key #{key_id}"), |k| k.name.clone());
    match result {
        Ok(()) => {
            state.password_prompt = None;
            let done = if action == PasswordAction::Encrypt {
                "encrypted"
            } else {
                "decrypted"
            };
            tracing::info!("Key {key_id} {done}");
            state.notifications.success(format!("{name} {done}"));
            state.flash(item);
        }
        Err(e) if action == PasswordAction::Decrypt && e.is_rejection() => {
            if let Some(prompt) = state.password_prompt.as_mut() {
                prompt.reject(SecretError::InvalidPassword.to_string());
            }
            return;
        }
        Err(e) => {
            state.password_prompt = None;
            let fallback = if action == PasswordAction::Encrypt {
                "Failed to encrypt key"
            } else {
                "Failed to decrypt key"
            };
            state.notifications.error(e.user_message(fallback));
        }
    }
    refresh_keys(state, service).await;
}

/// Ask before deleting the selected key
pub fn request_key_delete(state: &mut AppState) -> bool {
    let Some(key) = state.selected_key() else {
        return false;
    };
    if state.busy.is_busy(ItemRef::Key(key.id)) {
        return false;
    }
    state.pending_key_delete = Some(PendingKeyDelete {
        key_id: key.id,
        key_name: key.name.clone(),
        confirmed: false,
    });
    true
}

/// Delete the key named in the confirmation dialog if the operator agreed
pub async fn confirm_key_delete<S>(state: &mut AppState, service: &mut S)
where
    S: KeyServiceTrait + ?Sized,
{
    let Some(pending) = state.pending_key_delete.take() else {
        return;
    };
    if !pending.confirmed {
        return;
    }

    let item = ItemRef::Key(pending.key_id);
    state.busy.mark(item);
    let result = service.delete_key(pending.key_id).await;
    state.busy.clear(item);

    match result {
        Ok(()) => {
            tracing::info!("Deleted key {} ({})", pending.key_id, pending.key_name);
            state
                .notifications
                .success(format!("Key {} deleted", pending.key_name));
        }
        Err(e) => state.notifications.error(e.user_message("Failed to delete key")),
    }
    refresh_keys(state, service).await;
}

/// Open the delete dialog for a project
pub fn request_delete(state: &mut AppState, project_id: ProjectId) -> bool {
    let Some(project) = state.project(project_id) else {
        return false;
    };
    state.pending_delete = Some(PendingProjectDelete {
        project_id,
        project_name: project.name.clone(),
        choice: DeleteChoice::default(),
    });
    true
}

/// Carry out the operator's choice in the delete dialog
pub async fn confirm_delete<S>(state: &mut AppState, service: &mut S)
where
    S: KeyServiceTrait + ?Sized,
{
    let Some(pending) = state.pending_delete.take() else {
        return;
    };
    let delete_keys = match pending.choice {
        DeleteChoice::Cancel => return,
        DeleteChoice::KeepKeys => false,
        DeleteChoice::DeleteKeys => true,
    };

    let project_id = pending.project_id;
    let item = ItemRef::Project(project_id);
    state.busy.mark(item);
    let result = service.delete_project(project_id, delete_keys).await;
    state.busy.clear(item);

    match result {
        Ok(()) => {
            tracing::info!("Deleted project {project_id} (delete_keys={delete_keys})");
            let message = if delete_keys {
                format!("Project {} and its keys deleted", pending.project_name)
            } else {
                format!("Project {} deleted; its keys were kept", pending.project_name)
            };
            state.notifications.success(message);
            if state.interaction.selected_project_id() == Some(project_id) {
                state.interaction.set_selected_project(None);
            }
        }
        Err(e) => {
            state
                .notifications
                .error(e.user_message("Failed to delete project"));
        }
    }

    refresh_projects(state, service).await;
    refresh_keys(state, service).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockKeyServiceTrait;
    use crate::state::{Key, Project};
    use mockall::predicate::eq;
    use mockall::Sequence;
    use pretty_assertions::assert_eq;

    const K: KeyId = KeyId(3);

    fn key(encrypted: bool, value: &str) -> Key {
        Key {
            id: K,
            name: "AWS_SECRET".to_string(),
            value: value.to_string(),
            description: None,
            used_with: None,
            project_id: Some(ProjectId(1)),
            encrypted,
            position: 0,
        }
    }

    fn state_with(key: Key) -> AppState {
        let mut state = AppState::default();
        state.keys.replace(vec![key]);
        state
    }

    #[test]
    fn test_copy_plain_key_goes_straight_to_clipboard() {
        let mut state = state_with(key(false, "abc123"));
        let mut clipboard = MockClipboardSink::new();
        clipboard
            .expect_set_text()
            .withf(|text| text.to_string() == "abc123")
            .times(1)
            .returning(|_| Ok(()));

        assert!(copy_selected(&mut state, &mut clipboard));
        assert_eq!(
            state.notifications.status().map(|n| n.message.as_str()),
            Some("Copied AWS_SECRET to clipboard")
        );
    }

    #[test]
    fn test_copy_encrypted_key_opens_prompt() {
        let mut state = state_with(key(true, "gAAAA..."));
        let mut clipboard = MockClipboardSink::new();
        clipboard.expect_set_text().times(0);

        assert!(!copy_selected(&mut state, &mut clipboard));
        assert_eq!(
            state.password_prompt.as_ref().map(|p| (p.action, p.key_id)),
            Some((PasswordAction::Copy, K))
        );
    }

    #[tokio::test]
    async fn test_unlock_secret_relocks_key() {
        let mut seq = Sequence::new();
        let mut service = MockKeyServiceTrait::new();
        service
            .expect_decrypt_keys()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        service
            .expect_get_key()
            .with(eq(K))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(key(false, "plain-secret")));
        service
            .expect_encrypt_keys()
            .withf(|pw, ids| pw.to_string() == "hunter2" && ids.to_vec() == vec![K])
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let secret = unlock_secret(&mut service, K, "hunter2").await.unwrap();
        assert_eq!(secret, "plain-secret");
    }

    #[tokio::test]
    async fn test_copy_encrypted_with_wrong_password_keeps_prompt() {
        let mut state = state_with(key(true, "gAAAA..."));
        state.password_prompt = Some(PasswordPrompt::new(PasswordAction::Copy, K));

        let mut service = MockKeyServiceTrait::new();
        service.expect_decrypt_keys().returning(|_, _| {
            Err(ApiError::Status {
                status: 401,
                message: "Invalid password".to_string(),
            })
        });
        service.expect_get_key().times(0);
        let mut clipboard = MockClipboardSink::new();
        clipboard.expect_set_text().times(0);

        copy_encrypted(&mut state, &mut service, &mut clipboard, "nope".to_string()).await;

        assert_eq!(
            state.password_prompt.as_ref().and_then(|p| p.error.as_deref()),
            Some("Invalid password")
        );
        assert!(state.busy.is_empty());
    }

    #[tokio::test]
    async fn test_copy_encrypted_success_closes_prompt_and_refetches() {
        let mut state = state_with(key(true, "gAAAA..."));
        state.password_prompt = Some(PasswordPrompt::new(PasswordAction::Copy, K));

        let mut service = MockKeyServiceTrait::new();
        service.expect_decrypt_keys().returning(|_, _| Ok(()));
        service
            .expect_get_key()
            .returning(|_| Ok(key(false, "plain-secret")));
        service.expect_encrypt_keys().returning(|_, _| Ok(()));
        service
            .expect_list_keys()
            .times(1)
            .returning(|_| Ok(vec![key(true, "gAAAA...")]));
        let mut clipboard = MockClipboardSink::new();
        clipboard
            .expect_set_text()
            .withf(|text| text.to_string() == "plain-secret")
            .times(1)
            .returning(|_| Ok(()));

        copy_encrypted(&mut state, &mut service, &mut clipboard, "hunter2".to_string()).await;

        assert!(state.password_prompt.is_none());
        assert!(state.keys.get(K).is_some_and(|k| k.encrypted));
    }

    #[tokio::test]
    async fn test_relock_failure_is_reported() {
        let mut service = MockKeyServiceTrait::new();
        service.expect_decrypt_keys().returning(|_, _| Ok(()));
        service
            .expect_get_key()
            .returning(|_| Ok(key(false, "plain-secret")));
        service
            .expect_encrypt_keys()
            .returning(|_, _| Err(ApiError::Timeout));

        let err = unlock_secret(&mut service, K, "hunter2").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Key #3 was unlocked but re-encryption failed (Request timed out); it is now stored in plaintext"
        );
    }

    #[test]
    fn test_encryption_toggle_picks_action_from_key() {
        let mut state = state_with(key(false, "abc123"));
        assert!(request_encryption_toggle(&mut state));
        assert_eq!(
            state.password_prompt.as_ref().map(|p| p.action),
            Some(PasswordAction::Encrypt)
        );

        let mut state = state_with(key(true, "gAAAA..."));
        assert!(request_encryption_toggle(&mut state));
        assert_eq!(
            state.password_prompt.as_ref().map(|p| p.action),
            Some(PasswordAction::Decrypt)
        );
    }

    #[tokio::test]
    async fn test_encrypt_plain_key() {
        let mut state = state_with(key(false, "abc123"));
        request_encryption_toggle(&mut state);

        let mut service = MockKeyServiceTrait::new();
        service
            .expect_encrypt_keys()
            .withf(|pw, ids| pw.to_string() == "hunter2" && ids.to_vec() == vec![K])
            .times(1)
            .returning(|_, _| Ok(()));
        service.expect_decrypt_keys().times(0);
        service
            .expect_list_keys()
            .times(1)
            .returning(|_| Ok(vec![key(true, "gAAAA...")]));

        toggle_encryption(&mut state, &mut service, "hunter2".to_string()).await;

        assert!(state.password_prompt.is_none());
        assert!(state.busy.is_empty());
        assert!(state.keys.get(K).is_some_and(|k| k.encrypted));
        assert_eq!(
            state.notifications.status().map(|n| n.message.as_str()),
            Some("AWS_SECRET encrypted")
        );
    }

    #[tokio::test]
    async fn test_decrypt_with_wrong_password_keeps_prompt() {
        let mut state = state_with(key(true, "gAAAA..."));
        request_encryption_toggle(&mut state);

        let mut service = MockKeyServiceTrait::new();
        service.expect_decrypt_keys().times(1).returning(|_, _| {
            Err(ApiError::Status {
                status: 401,
                message: "Invalid password".to_string(),
            })
        });
        service.expect_list_keys().times(0);

        toggle_encryption(&mut state, &mut service, "nope".to_string()).await;

        assert_eq!(
            state.password_prompt.as_ref().and_then(|p| p.error.as_deref()),
            Some("Invalid password")
        );
        assert!(state.busy.is_empty());
    }

    #[tokio::test]
    async fn test_toggle_with_empty_password_makes_no_request() {
        let mut state = state_with(key(true, "gAAAA..."));
        request_encryption_toggle(&mut state);

        let mut service = MockKeyServiceTrait::new();
        service.expect_decrypt_keys().times(0);

        toggle_encryption(&mut state, &mut service, String::new()).await;

        assert_eq!(
            state.password_prompt.as_ref().and_then(|p| p.error.as_deref()),
            Some("Password is required")
        );
    }

    #[tokio::test]
    async fn test_key_delete_needs_confirmation() {
        let mut state = state_with(key(false, "abc123"));
        assert!(request_key_delete(&mut state));

        let mut service = MockKeyServiceTrait::new();
        service.expect_delete_key().times(0);

        confirm_key_delete(&mut state, &mut service).await;
        assert!(state.pending_key_delete.is_none());
        assert_eq!(state.keys.len(), 1);
    }

    #[tokio::test]
    async fn test_confirmed_key_delete_refetches() {
        let mut state = state_with(key(false, "abc123"));
        request_key_delete(&mut state);
        if let Some(pending) = state.pending_key_delete.as_mut() {
            pending.confirmed = true;
        }

        let mut service = MockKeyServiceTrait::new();
        service
            .expect_delete_key()
            .with(eq(K))
            .times(1)
            .returning(|_| Ok(()));
        service
            .expect_list_keys()
            .times(1)
            .returning(|_| Ok(Vec::new()));

        confirm_key_delete(&mut state, &mut service).await;

        assert!(state.keys.is_empty());
        assert!(state.busy.is_empty());
        assert_eq!(
            state.notifications.status().map(|n| n.message.as_str()),
            Some("Key AWS_SECRET deleted")
        );
    }

    #[tokio::test]
    async fn test_failed_key_delete_is_reported() {
        let mut state = state_with(key(false, "abc123"));
        request_key_delete(&mut state);
        if let Some(pending) = state.pending_key_delete.as_mut() {
            pending.confirmed = true;
        }

        let mut service = MockKeyServiceTrait::new();
        service.expect_delete_key().returning(|_| {
            Err(ApiError::Status {
                status: 500,
                message: "Failed to delete key".to_string(),
            })
        });
        service
            .expect_list_keys()
            .returning(|_| Ok(vec![key(false, "abc123")]));

        confirm_key_delete(&mut state, &mut service).await;

        assert_eq!(state.keys.len(), 1);
        assert_eq!(state.notifications.current_error(), Some("Failed to delete key"));
    }

    fn projects_state() -> AppState {
        let mut state = AppState::default();
        state.set_projects(vec![Project {
            id: ProjectId(1),
            name: "legacy".to_string(),
            position: 0,
        }]);
        state.interaction.set_selected_project(Some(ProjectId(1)));
        state
    }

    #[tokio::test]
    async fn test_delete_cancel_makes_no_request() {
        let mut state = projects_state();
        request_delete(&mut state, ProjectId(1));

        let mut service = MockKeyServiceTrait::new();
        service.expect_delete_project().times(0);

        confirm_delete(&mut state, &mut service).await;
        assert!(state.pending_delete.is_none());
        assert_eq!(state.interaction.selected_project_id(), Some(ProjectId(1)));
    }

    #[tokio::test]
    async fn test_delete_keep_keys_clears_selection() {
        let mut state = projects_state();
        request_delete(&mut state, ProjectId(1));
        if let Some(pending) = state.pending_delete.as_mut() {
            pending.choice = DeleteChoice::KeepKeys;
        }

        let mut service = MockKeyServiceTrait::new();
        service
            .expect_delete_project()
            .with(eq(ProjectId(1)), eq(false))
            .times(1)
            .returning(|_, _| Ok(()));
        service.expect_list_projects().returning(|| Ok(Vec::new()));
        service
            .expect_list_keys()
            .withf(|scope| *scope == crate::state::ProjectScope::All)
            .returning(|_| Ok(Vec::new()));

        confirm_delete(&mut state, &mut service).await;

        assert_eq!(state.interaction.selected_project_id(), None);
        assert!(state.projects.is_empty());
        assert_eq!(
            state.notifications.status().map(|n| n.message.as_str()),
            Some("Project legacy deleted; its keys were kept")
        );
    }
}
