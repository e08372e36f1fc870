//! Resynchronize the client caches from the server

use crate::api::KeyServiceTrait;
use crate::state::AppState;

/// Refetch the keys of the current scope. Failures are reported to the
/// operator; the cache is left as it was.
pub async fn refresh_keys<S>(state: &mut AppState, service: &mut S) -> bool
where
    S: KeyServiceTrait + ?Sized,
{
    let scope = state.scope();
    match service.list_keys(scope).await {
        Ok(keys) => {
            tracing::debug!("Loaded {} keys for {scope:?}", keys.len());
            state.keys.replace(keys);
            state.clamp_key_selection();
            true
        }
        Err(e) => {
            state
                .notifications
                .error(e.user_message("Failed to load keys"));
            false
        }
    }
}

/// Refetch the project list
pub async fn refresh_projects<S>(state: &mut AppState, service: &mut S) -> bool
where
    S: KeyServiceTrait + ?Sized,
{
    match service.list_projects().await {
        Ok(projects) => {
            tracing::debug!("Loaded {} projects", projects.len());
            state.set_projects(projects);
            if let Some(selected) = state.interaction.selected_project_id() {
                if state.project(selected).is_none() {
                    state.interaction.set_selected_project(None);
                }
            }
            true
        }
        Err(e) => {
            state
                .notifications
                .error(e.user_message("Failed to load projects"));
            false
        }
    }
}
