//! Cross-project move/copy engine
//!
//! A key dropped on another project opens a move/copy choice. Encrypted keys
//! additionally need the password: the key is decrypted to prove it, moved
//! with the password attached, and every resulting record is encrypted again.

use crate::api::{ApiError, KeyServiceTrait};
use crate::state::{
    AppState, ItemRef, KeyId, MoveMode, MoveStage, PasswordAction, PasswordPrompt, PendingMove,
    ProjectId,
};
use crate::sync::refresh_keys;
use thiserror::Error;

/// Records produced by a completed transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveCopyReport {
    pub mode: MoveMode,
    pub key_id: KeyId,
    /// The moved key, or the new copy
    pub result_id: KeyId,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveCopyError {
    #[error("Invalid password")]
    InvalidPassword,

    #[error("Password is required")]
    MissingPassword,

    #[error("Failed to verify password: {0}")]
    Verify(ApiError),

    #[error("{}", .0.user_message("Failed to move/copy key"))]
    Transfer(ApiError),

    #[error(
        "Key was {} but re-encryption failed ({source}); {} now stored in plaintext",
        .mode.past_tense(),
        describe_keys(.plaintext)
    )]
    ReEncrypt {
        mode: MoveMode,
        plaintext: Vec<KeyId>,
        source: ApiError,
    },

    #[error("Key was copied but the server did not return the new key; the copy is stored in plaintext")]
    UnidentifiedCopy,
}

fn describe_keys(ids: &[KeyId]) -> String {
    let list = ids
        .iter()
        .map(|id| format!("#{id}"))
        .collect::<Vec<_>>()
        .join(", ");
    if ids.len() == 1 {
        format!("key {list} is")
    } else {
        format!("keys {list} are")
    }
}

/// Key dropped on a sidebar project. Opens the move/copy dialog unless the
/// key or project is unknown, or the project already owns the key.
pub fn request(state: &mut AppState, key_id: KeyId, target: ProjectId) -> bool {
    let Some(key) = state.keys.get(key_id) else {
        tracing::debug!("Move request for unknown key {key_id}");
        return false;
    };
    if key.project_id == Some(target) {
        return false;
    }
    let Some(project) = state.project(target) else {
        tracing::debug!("Move request to unknown project {target}");
        return false;
    };

    state.pending_move = Some(PendingMove {
        key_id,
        key_name: key.name.clone(),
        source_project: key.project_id,
        target_project: target,
        target_name: project.name.clone(),
        encrypted: key.encrypted,
        mode: MoveMode::default(),
        stage: MoveStage::ChoosingMode,
    });
    true
}

/// Close the move/copy dialog and any password prompt it opened
pub fn cancel(state: &mut AppState) {
    if state.pending_move.take().is_some() {
        tracing::debug!("Move/copy cancelled");
    }
    if state
        .password_prompt
        .as_ref()
        .is_some_and(|p| p.action == PasswordAction::Move)
    {
        state.password_prompt = None;
    }
}

/// Confirm the mode. Returns true when the transfer can run right away;
/// encrypted keys open the password prompt instead.
pub fn choose_mode(state: &mut AppState, mode: MoveMode) -> bool {
    let Some(pending) = state.pending_move.as_mut() else {
        return false;
    };
    pending.mode = mode;
    if pending.encrypted {
        pending.stage = MoveStage::AwaitingPassword;
        state.password_prompt = Some(PasswordPrompt::new(PasswordAction::Move, pending.key_id));
        false
    } else {
        true
    }
}

/// Network sequence for one move or copy. The first failing step aborts
/// the rest; completed steps stay done.
pub async fn transfer<S>(
    service: &mut S,
    pending: &PendingMove,
    password: Option<&str>,
) -> Result<MoveCopyReport, MoveCopyError>
where
    S: KeyServiceTrait + ?Sized,
{
    let key_id = pending.key_id;
    let mode = pending.mode;
    let copy = mode.is_copy();

    if !pending.encrypted {
        let moved = service
            .move_key(key_id, pending.target_project, copy, None)
            .await
            .map_err(MoveCopyError::Transfer)?;
        let result_id = moved.map_or(key_id, |k| k.id);
        return Ok(MoveCopyReport {
            mode,
            key_id,
            result_id,
        });
    }

    let password = password
        .filter(|p| !p.is_empty())
        .ok_or(MoveCopyError::MissingPassword)?;

    service
        .decrypt_keys(password, &[key_id])
        .await
        .map_err(|e| {
            if e.is_rejection() {
                MoveCopyError::InvalidPassword
            } else {
                MoveCopyError::Verify(e)
            }
        })?;

    let moved = service
        .move_key(
            key_id,
            pending.target_project,
            copy,
            Some(password.to_string()),
        )
        .await
        .map_err(MoveCopyError::Transfer)?;

    let result_id = match (mode, moved) {
        (MoveMode::Move, moved) => moved.map_or(key_id, |k| k.id),
        (MoveMode::Copy, Some(new_key)) => new_key.id,
        (MoveMode::Copy, None) => {
            // The copy cannot be addressed; at least lock the original again
            reencrypt(service, password, mode, key_id, vec![key_id]).await?;
            return Err(MoveCopyError::UnidentifiedCopy);
        }
    };

    let unprotected = if copy {
        vec![result_id, key_id]
    } else {
        vec![result_id]
    };
    reencrypt(service, password, mode, result_id, unprotected).await?;
    if copy {
        reencrypt(service, password, mode, key_id, vec![key_id]).await?;
    }

    Ok(MoveCopyReport {
        mode,
        key_id,
        result_id,
    })
}

async fn reencrypt<S>(
    service: &mut S,
    password: &str,
    mode: MoveMode,
    key_id: KeyId,
    unprotected: Vec<KeyId>,
) -> Result<(), MoveCopyError>
where
    S: KeyServiceTrait + ?Sized,
{
    service
        .encrypt_keys(password, &[key_id])
        .await
        .map_err(|source| {
            tracing::error!("Re-encryption of key {key_id} failed: {source}");
            MoveCopyError::ReEncrypt {
                mode,
                plaintext: unprotected,
                source,
            }
        })
}

/// Run the pending move/copy. Encrypted keys take the password from the
/// prompt; an empty password keeps the prompt open without any request.
pub async fn execute<S>(state: &mut AppState, service: &mut S, password: Option<String>)
where
    S: KeyServiceTrait + ?Sized,
{
    let Some(pending) = state.pending_move.clone() else {
        return;
    };

    if pending.encrypted && password.as_deref().map_or(true, str::is_empty) {
        match state.password_prompt.as_mut() {
            Some(prompt) => prompt.reject(MoveCopyError::MissingPassword.to_string()),
            None => {
                state.password_prompt =
                    Some(PasswordPrompt::new(PasswordAction::Move, pending.key_id));
            }
        }
        return;
    }

    let item = ItemRef::Key(pending.key_id);
    state.busy.mark(item);
    let outcome = transfer(service, &pending, password.as_deref()).await;
    state.busy.clear(item);

    finish(state, service, &pending, outcome).await;
}

/// Apply a transfer outcome to the state
pub async fn finish<S>(
    state: &mut AppState,
    service: &mut S,
    pending: &PendingMove,
    outcome: Result<MoveCopyReport, MoveCopyError>,
) where
    S: KeyServiceTrait + ?Sized,
{
    match outcome {
        Ok(report) => {
            tracing::info!(
                "Key {} {} from {:?} to project {} as key {}",
                report.key_id,
                report.mode.past_tense(),
                pending.source_project,
                pending.target_project,
                report.result_id
            );
            state.pending_move = None;
            state.password_prompt = None;
            state
                .notifications
                .success(format!("Key {} successfully", report.mode.past_tense()));
            if report.mode == MoveMode::Move {
                state
                    .interaction
                    .set_selected_project(Some(pending.target_project));
                state.selected_key_index = 0;
            }
            refresh_keys(state, service).await;
        }
        Err(e @ (MoveCopyError::InvalidPassword | MoveCopyError::MissingPassword)) => {
            if let Some(prompt) = state.password_prompt.as_mut() {
                prompt.reject(e.to_string());
            }
        }
        Err(e) => {
            state.pending_move = None;
            state.password_prompt = None;
            state.notifications.error(e.to_string());
            refresh_keys(state, service).await;
        }
    }
}
