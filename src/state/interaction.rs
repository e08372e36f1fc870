//! Transient drag-and-drop interaction state
//!
//! Holds the single active [`DragSession`] and the selected project. Nothing
//! here talks to the backend; the drag engines in [`crate::dnd`] are the only
//! writers of the session.

use super::{KeyId, ProjectId};
use crate::dnd::{CardRect, DragPhase, InsertSide, Placement};

/// A key card being dragged
#[derive(Debug, Clone, PartialEq)]
pub struct KeyDrag {
    pub key_id: KeyId,
    /// Project that owned the key when the drag started
    pub origin_project: Option<ProjectId>,
    /// Bounding rect of the card at drag start
    pub origin_rect: CardRect,
    pub phase: DragPhase,
    /// Display order while the drag is previewed
    pub preview: Vec<KeyId>,
    /// Last resolver decision, used for the drop indicator
    pub placement: Option<Placement<KeyId>>,
    /// Foreign project currently under the pointer
    pub hovered_project: Option<ProjectId>,
}

/// Hover cue shown on a sidebar row during a project drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectHover {
    pub target: ProjectId,
    pub side: InsertSide,
}

/// A project row being dragged
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDrag {
    pub project_id: ProjectId,
    pub phase: DragPhase,
    pub hover: Option<ProjectHover>,
}

/// The one drag gesture in progress
#[derive(Debug, Clone, PartialEq)]
pub enum DragSession {
    Key(KeyDrag),
    Project(ProjectDrag),
}

impl DragSession {
    pub fn phase(&self) -> DragPhase {
        match self {
            Self::Key(drag) => drag.phase,
            Self::Project(drag) => drag.phase,
        }
    }
}

/// Interaction state store
#[derive(Debug, Default)]
pub struct InteractionState {
    session: Option<DragSession>,
    selected_project: Option<ProjectId>,
}

impl InteractionState {
    /// Install a new drag session, returning any stale one it replaced
    pub fn begin(&mut self, session: DragSession) -> Option<DragSession> {
        let stale = self.session.replace(session);
        if let Some(ref stale) = stale {
            tracing::warn!("Replacing stale drag session: {stale:?}");
        }
        stale
    }

    /// Remove the active session only if it is a key drag
    pub fn take_key_drag(&mut self) -> Option<KeyDrag> {
        match self.session.take() {
            Some(DragSession::Key(drag)) => Some(drag),
            other => {
                self.session = other;
                None
            }
        }
    }

    /// Remove the active session only if it is a project drag
    pub fn take_project_drag(&mut self) -> Option<ProjectDrag> {
        match self.session.take() {
            Some(DragSession::Project(drag)) => Some(drag),
            other => {
                self.session = other;
                None
            }
        }
    }

    /// Forget the active session; safe to call when none exists
    pub fn clear(&mut self) {
        self.session = None;
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn key_drag(&self) -> Option<&KeyDrag> {
        match &self.session {
            Some(DragSession::Key(drag)) => Some(drag),
            _ => None,
        }
    }

    pub fn key_drag_mut(&mut self) -> Option<&mut KeyDrag> {
        match &mut self.session {
            Some(DragSession::Key(drag)) => Some(drag),
            _ => None,
        }
    }

    pub fn project_drag(&self) -> Option<&ProjectDrag> {
        match &self.session {
            Some(DragSession::Project(drag)) => Some(drag),
            _ => None,
        }
    }

    pub fn project_drag_mut(&mut self) -> Option<&mut ProjectDrag> {
        match &mut self.session {
            Some(DragSession::Project(drag)) => Some(drag),
            _ => None,
        }
    }

    pub fn dragged_key_id(&self) -> Option<KeyId> {
        self.key_drag().map(|d| d.key_id)
    }

    pub fn dragged_key_origin_rect(&self) -> Option<CardRect> {
        self.key_drag().map(|d| d.origin_rect)
    }

    pub fn dragged_project_id(&self) -> Option<ProjectId> {
        self.project_drag().map(|d| d.project_id)
    }

    pub fn selected_project_id(&self) -> Option<ProjectId> {
        self.selected_project
    }

    pub fn set_selected_project(&mut self, project: Option<ProjectId>) {
        self.selected_project = project;
    }
}
