//! Project reorder engine
//!
//! Sidebar rows are dragged onto each other. The hovered row shows whether
//! the dragged project lands above or below it; the drop index is always the
//! target's current index.

use super::{advance, DragEvent, DragPhase, InsertSide};
use crate::api::KeyServiceTrait;
use crate::state::{AppState, DragSession, ItemRef, ProjectDrag, ProjectHover, ProjectId};
use crate::sync::refresh_projects;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectDropOutcome {
    Skipped,
    Unchanged,
    Reordered { from: usize, to: usize },
    Failed,
}

/// Begin dragging a sidebar row
pub fn start(state: &mut AppState, project_id: ProjectId) -> bool {
    if state.project(project_id).is_none() || state.busy.is_busy(ItemRef::Project(project_id)) {
        return false;
    }
    state.interaction.begin(DragSession::Project(ProjectDrag {
        project_id,
        phase: DragPhase::Dragging,
        hover: None,
    }));
    tracing::debug!("Started dragging project {project_id}");
    true
}

/// Pointer over a sidebar row (or off the rows with `None`)
pub fn drag_over(state: &mut AppState, target: Option<ProjectId>) {
    let Some(dragged) = state.interaction.dragged_project_id() else {
        return;
    };
    let from = state.project_index(dragged);
    let hover = target.and_then(|target| {
        let to = state.project_index(target)?;
        let side = match from?.cmp(&to) {
            std::cmp::Ordering::Greater => InsertSide::Before,
            std::cmp::Ordering::Less => InsertSide::After,
            std::cmp::Ordering::Equal => return None,
        };
        Some(ProjectHover { target, side })
    });

    if let Some(drag) = state.interaction.project_drag_mut() {
        if advance(&mut drag.phase, DragEvent::Over) {
            drag.hover = hover;
        }
    }
}

/// Drop on a sidebar row: the dragged project takes the target's index
pub async fn drop<S>(
    state: &mut AppState,
    service: &mut S,
    target: ProjectId,
) -> ProjectDropOutcome
where
    S: KeyServiceTrait + ?Sized,
{
    let Some(mut drag) = state.interaction.take_project_drag() else {
        return ProjectDropOutcome::Skipped;
    };
    if !advance(&mut drag.phase, DragEvent::Drop) {
        return ProjectDropOutcome::Skipped;
    }

    let project_id = drag.project_id;
    if project_id == target {
        return ProjectDropOutcome::Unchanged;
    }
    let (Some(from), Some(to)) = (state.project_index(project_id), state.project_index(target))
    else {
        return ProjectDropOutcome::Skipped;
    };

    let item = ItemRef::Project(project_id);
    state.busy.mark(item);
    let result = service.reorder_project(project_id, to).await;
    state.busy.clear(item);

    match result {
        Ok(()) => {
            tracing::info!("Project {project_id} moved from {from} to {to}");
            state.move_project(project_id, to);
            state.flash(item);
            state.notifications.success("Project order updated");
            ProjectDropOutcome::Reordered { from, to }
        }
        Err(e) => {
            state
                .notifications
                .error(e.user_message("Failed to reorder project"));
            refresh_projects(state, service).await;
            ProjectDropOutcome::Failed
        }
    }
}
