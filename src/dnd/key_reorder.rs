//! Key reorder engine
//!
//! Drives a key card drag inside one project: the preview order follows the
//! pointer, and a drop confirms the new index with the server. The cache is
//! only changed after the server accepts; a failure refetches instead.

use super::{advance, apply_placement, resolve, CardRect, DragEvent, DragPhase, LayoutMode, Point};
use crate::api::KeyServiceTrait;
use crate::state::{AppState, DragSession, ItemRef, KeyDrag, KeyId, ProjectId};
use crate::sync::refresh_keys;

/// Result of dropping a key inside the key panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderOutcome {
    /// Nothing to do (no active drag, no project scope, card gone)
    Skipped,
    /// Dropped back at its original index; no request was made
    Unchanged,
    /// Server accepted the new index
    Reordered { from: usize, to: usize },
    /// Server refused or was unreachable; the list was refetched
    Failed,
}

/// Begin dragging a key card
pub fn start(state: &mut AppState, key_id: KeyId, origin_rect: CardRect) -> bool {
    let Some(key) = state.keys.get(key_id) else {
        tracing::debug!("Drag start on unknown key {key_id}");
        return false;
    };
    if state.busy.is_busy(ItemRef::Key(key_id)) {
        return false;
    }

    let drag = KeyDrag {
        key_id,
        origin_project: key.project_id,
        origin_rect,
        phase: DragPhase::Dragging,
        preview: state.keys.ids(),
        placement: None,
        hovered_project: None,
    };
    state.interaction.begin(DragSession::Key(drag));
    tracing::debug!("Started dragging key {key_id}");
    true
}

/// Pointer moved over the key panel. `candidates` are the rendered cards in
/// preview order; the dragged card is skipped. Returns true if the preview
/// order changed.
pub fn drag_over(
    state: &mut AppState,
    pointer: Point,
    candidates: &[(KeyId, CardRect)],
    mode: LayoutMode,
) -> bool {
    let Some(origin) = state.interaction.dragged_key_origin_rect() else {
        return false;
    };
    let Some(drag) = state.interaction.key_drag_mut() else {
        return false;
    };
    // Still over the card that was picked up: nothing to preview yet
    if drag.phase == DragPhase::Dragging && origin.contains(pointer) {
        return false;
    }
    if !advance(&mut drag.phase, DragEvent::Over) {
        return false;
    }

    let dragged = drag.key_id;
    let others: Vec<_> = candidates
        .iter()
        .filter(|(id, _)| *id != dragged)
        .copied()
        .collect();

    let placement = resolve(pointer, &others, mode);
    drag.placement = Some(placement);
    drag.hovered_project = None;
    apply_placement(&mut drag.preview, dragged, placement)
}

/// Pointer moved over the project sidebar. Only projects other than the
/// key's own are remembered as drop targets.
pub fn hover_project(state: &mut AppState, project: Option<ProjectId>) {
    let Some(drag) = state.interaction.key_drag_mut() else {
        return;
    };
    if !advance(&mut drag.phase, DragEvent::Over) {
        return;
    }
    drag.hovered_project = project.filter(|p| Some(*p) != drag.origin_project);
}

/// Drop inside the key panel: confirm the previewed index with the server
pub async fn commit<S>(state: &mut AppState, service: &mut S) -> ReorderOutcome
where
    S: KeyServiceTrait + ?Sized,
{
    let Some(mut drag) = state.interaction.take_key_drag() else {
        return ReorderOutcome::Skipped;
    };
    if !advance(&mut drag.phase, DragEvent::Drop) {
        return ReorderOutcome::Skipped;
    }

    let key_id = drag.key_id;
    let Some(project_id) = state.scope().project_id() else {
        tracing::debug!("Ignoring key reorder outside a project");
        return ReorderOutcome::Skipped;
    };
    let Some(original) = state.keys.index_of(key_id) else {
        return ReorderOutcome::Skipped;
    };
    let Some(new_index) = drag.preview.iter().position(|id| *id == key_id) else {
        return ReorderOutcome::Skipped;
    };

    if new_index == original {
        return ReorderOutcome::Unchanged;
    }

    reorder(state, service, key_id, original, new_index, project_id).await
}

/// Send the reorder request with the card marked busy for its duration
async fn reorder<S>(
    state: &mut AppState,
    service: &mut S,
    key_id: KeyId,
    original: usize,
    new_index: usize,
    project_id: ProjectId,
) -> ReorderOutcome
where
    S: KeyServiceTrait + ?Sized,
{
    let item = ItemRef::Key(key_id);
    state.busy.mark(item);
    let result = service.reorder_key(key_id, new_index, project_id).await;
    state.busy.clear(item);

    match result {
        Ok(_) => {
            tracing::info!("Key {key_id} moved from {original} to {new_index}");
            state.keys.move_to(key_id, new_index);
            state.selected_key_index = new_index;
            state.flash(item);
            ReorderOutcome::Reordered {
                from: original,
                to: new_index,
            }
        }
        Err(e) => {
            state
                .notifications
                .error(e.user_message("Failed to reorder key"));
            refresh_keys(state, service).await;
            ReorderOutcome::Failed
        }
    }
}
