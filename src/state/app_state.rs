//! Application state definitions

use super::{
    InteractionState, KeyListCache, Notifications, PasswordPrompt, PendingKeyDelete, PendingMove,
    PendingProjectDelete,
};
use crate::dnd::LayoutMode;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::time::{Duration, Instant};

/// How long a successfully reordered card stays highlighted
pub const FLASH_DURATION: Duration = Duration::from_millis(600);

/// Server-assigned key identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyId(pub i64);

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Server-assigned project identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub i64);

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which keys the key panel shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectScope {
    #[default]
    All,
    Project(ProjectId),
}

impl ProjectScope {
    pub fn project_id(&self) -> Option<ProjectId> {
        match self {
            Self::All => None,
            Self::Project(id) => Some(*id),
        }
    }
}

impl From<Option<ProjectId>> for ProjectScope {
    fn from(id: Option<ProjectId>) -> Self {
        id.map_or(Self::All, Self::Project)
    }
}

/// Project information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub position: i64,
}

/// Project reference embedded in key payloads
#[derive(Debug, Deserialize)]
struct ProjectRef {
    id: ProjectId,
}

/// Wire shape of a key; the backend sends either `project_id` or an embedded `project`
#[derive(Debug, Deserialize)]
struct KeyPayload {
    id: KeyId,
    name: String,
    #[serde(default)]
    key: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    used_with: Option<String>,
    #[serde(default)]
    project_id: Option<ProjectId>,
    #[serde(default)]
    project: Option<ProjectRef>,
    #[serde(default)]
    encrypted: bool,
    #[serde(default)]
    position: i64,
}

impl From<KeyPayload> for Key {
    fn from(p: KeyPayload) -> Self {
        Self {
            id: p.id,
            name: p.name,
            value: p.key,
            description: p.description,
            used_with: p.used_with,
            project_id: p.project_id.or(p.project.map(|r| r.id)),
            encrypted: p.encrypted,
            position: p.position,
        }
    }
}

/// Stored secret with its metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "KeyPayload")]
pub struct Key {
    pub id: KeyId,
    pub name: String,
    #[serde(rename = "key")]
    pub value: String,
    pub description: Option<String>,
    pub used_with: Option<String>,
    pub project_id: Option<ProjectId>,
    pub encrypted: bool,
    pub position: i64,
}

/// A card or row that can be marked busy or flashed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemRef {
    Key(KeyId),
    Project(ProjectId),
}

/// Items with a request in flight; rendered dimmed and ignored by the pointer
#[derive(Debug, Default)]
pub struct BusyMarks {
    items: HashSet<ItemRef>,
}

impl BusyMarks {
    pub fn mark(&mut self, item: ItemRef) {
        self.items.insert(item);
    }

    pub fn clear(&mut self, item: ItemRef) {
        self.items.remove(&item);
    }

    pub fn is_busy(&self, item: ItemRef) -> bool {
        self.items.contains(&item)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Transient success highlight on a card or row
#[derive(Debug, Clone, Copy)]
pub struct Flash {
    pub item: ItemRef,
    pub started: Instant,
}

impl Flash {
    pub fn new(item: ItemRef) -> Self {
        Self {
            item,
            started: Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.started.elapsed() >= FLASH_DURATION
    }
}

/// Main application state
#[derive(Default)]
pub struct AppState {
    // Data
    pub projects: Vec<Project>,
    pub keys: KeyListCache,

    // Drag and drop
    pub interaction: InteractionState,
    pub busy: BusyMarks,
    pub flash: Option<Flash>,

    // Dialogs
    pub pending_move: Option<PendingMove>,
    pub password_prompt: Option<PasswordPrompt>,
    pub pending_delete: Option<PendingProjectDelete>,
    pub pending_key_delete: Option<PendingKeyDelete>,

    // UI state
    pub notifications: Notifications,
    pub key_layout: LayoutMode,
    pub selected_key_index: usize,
    pub server_connected: bool,
}

impl AppState {
    /// Scope of the key panel, derived from the selected project
    pub fn scope(&self) -> ProjectScope {
        self.interaction.selected_project_id().into()
    }

    /// Replace the project list, ordered by position
    pub fn set_projects(&mut self, mut projects: Vec<Project>) {
        projects.sort_by_key(|p| p.position);
        self.projects = projects;
    }

    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Index of a project in display order
    pub fn project_index(&self, id: ProjectId) -> Option<usize> {
        self.projects.iter().position(|p| p.id == id)
    }

    /// Move a project to a new display index and renumber positions.
    /// Returns false if the project is unknown.
    pub fn move_project(&mut self, id: ProjectId, new_index: usize) -> bool {
        let Some(from) = self.project_index(id) else {
            return false;
        };
        let project = self.projects.remove(from);
        let to = new_index.min(self.projects.len());
        self.projects.insert(to, project);
        for (position, p) in self.projects.iter_mut().enumerate() {
            p.position = position as i64;
        }
        true
    }

    /// Start the success highlight on an item
    pub fn flash(&mut self, item: ItemRef) {
        self.flash = Some(Flash::new(item));
    }

    /// Drop the flash once it has run its course
    pub fn update_flash(&mut self) {
        if self.flash.is_some_and(|f| f.is_expired()) {
            self.flash = None;
        }
    }

    pub fn is_flashing(&self, item: ItemRef) -> bool {
        self.flash.is_some_and(|f| f.item == item && !f.is_expired())
    }

    /// Whether a modal dialog currently owns the keyboard
    pub fn is_dialog_open(&self) -> bool {
        self.password_prompt.is_some()
            || self.pending_move.is_some()
            || self.pending_delete.is_some()
            || self.pending_key_delete.is_some()
            || self.notifications.current_error().is_some()
    }

    /// Currently selected key card
    pub fn selected_key(&self) -> Option<&Key> {
        self.keys.keys().get(self.selected_key_index)
    }

    /// Encrypted and total key counts for the current scope
    pub fn encryption_counts(&self) -> (usize, usize) {
        let keys = self.keys.keys();
        (keys.iter().filter(|k| k.encrypted).count(), keys.len())
    }

    /// Keep the key selection inside the list after it changed size
    pub fn clamp_key_selection(&mut self) {
        let len = self.keys.len();
        if len == 0 {
            self.selected_key_index = 0;
        } else if self.selected_key_index >= len {
            self.selected_key_index = len - 1;
        }
    }

    /// Move key selection left in grid
    pub fn move_selection_left(&mut self, columns: usize) {
        if columns == 0 {
            return;
        }
        if self.selected_key_index % columns > 0 {
            self.selected_key_index -= 1;
        }
    }

    /// Move key selection right in grid
    pub fn move_selection_right(&mut self, columns: usize) {
        let total = self.keys.len();
        if columns == 0 || total == 0 {
            return;
        }
        let col = self.selected_key_index % columns;
        if col < columns - 1 && self.selected_key_index + 1 < total {
            self.selected_key_index += 1;
        }
    }

    /// Move key selection up by one row
    pub fn move_selection_up(&mut self, columns: usize) {
        if columns == 0 {
            return;
        }
        if self.selected_key_index >= columns {
            self.selected_key_index -= columns;
        }
    }

    /// Move key selection down by one row, landing on the last card if the
    /// row below is shorter
    pub fn move_selection_down(&mut self, columns: usize) {
        let total = self.keys.len();
        if columns == 0 || total == 0 {
            return;
        }
        let new_index = self.selected_key_index + columns;
        if new_index < total {
            self.selected_key_index = new_index;
        } else if self.selected_key_index / columns < (total - 1) / columns {
            self.selected_key_index = total - 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn project(id: i64, name: &str, position: i64) -> Project {
        Project {
            id: ProjectId(id),
            name: name.to_string(),
            position,
        }
    }

    #[test]
    fn test_key_deserializes_project_id_field() {
        let json = r#"{"id": 7, "name": "STRIPE", "key": "sk_live", "project_id": 3,
                       "encrypted": true, "position": 2}"#;
        let key: Key = serde_json::from_str(json).unwrap();
        assert_eq!(key.id, KeyId(7));
        assert_eq!(key.value, "sk_live");
        assert_eq!(key.project_id, Some(ProjectId(3)));
        assert!(key.encrypted);
        assert_eq!(key.position, 2);
    }

    #[test]
    fn test_key_deserializes_embedded_project() {
        let json = r#"{"id": 1, "name": "GH_TOKEN", "key": "ghp",
                       "project": {"id": 9, "name": "infra"}}"#;
        let key: Key = serde_json::from_str(json).unwrap();
        assert_eq!(key.project_id, Some(ProjectId(9)));
        assert!(!key.encrypted);
        assert_eq!(key.position, 0);
        assert!(key.description.is_none());
    }

    #[test]
    fn test_key_without_project_is_unassigned() {
        let json = r#"{"id": 1, "name": "X", "key": "y", "project": null}"#;
        let key: Key = serde_json::from_str(json).unwrap();
        assert_eq!(key.project_id, None);
    }

    #[test]
    fn test_set_projects_sorts_by_position() {
        let mut state = AppState::default();
        state.set_projects(vec![
            project(1, "c", 2),
            project(2, "a", 0),
            project(3, "b", 1),
        ]);
        let names: Vec<_> = state.projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_move_project_renumbers_positions() {
        let mut state = AppState::default();
        state.set_projects(vec![project(1, "A", 0), project(2, "B", 1), project(3, "C", 2)]);

        assert!(state.move_project(ProjectId(1), 2));

        let order: Vec<_> = state.projects.iter().map(|p| (p.name.as_str(), p.position)).collect();
        assert_eq!(order, vec![("B", 0), ("C", 1), ("A", 2)]);
    }

    #[test]
    fn test_move_unknown_project_is_rejected() {
        let mut state = AppState::default();
        state.set_projects(vec![project(1, "A", 0)]);
        assert!(!state.move_project(ProjectId(42), 0));
    }

    #[test]
    fn test_scope_follows_selected_project() {
        let mut state = AppState::default();
        assert_eq!(state.scope(), ProjectScope::All);
        state.interaction.set_selected_project(Some(ProjectId(4)));
        assert_eq!(state.scope(), ProjectScope::Project(ProjectId(4)));
    }

    #[test]
    fn test_busy_marks_clear_is_idempotent() {
        let mut busy = BusyMarks::default();
        let item = ItemRef::Key(KeyId(1));
        busy.mark(item);
        assert!(busy.is_busy(item));
        busy.clear(item);
        busy.clear(item);
        assert!(!busy.is_busy(item));
        assert!(busy.is_empty());
    }

    #[test]
    fn test_flash_expires() {
        let mut state = AppState::default();
        state.flash = Some(Flash {
            item: ItemRef::Key(KeyId(1)),
            started: Instant::now() - FLASH_DURATION,
        });
        state.update_flash();
        assert!(state.flash.is_none());
    }

    #[test]
    fn test_encryption_counts() {
        let mut state = AppState::default();
        assert_eq!(state.encryption_counts(), (0, 0));
        state.keys.replace(
            (0..3)
                .map(|i| Key {
                    id: KeyId(i),
                    name: format!("k{i}"),
                    value: String::new(),
                    description: None,
                    used_with: None,
                    project_id: None,
                    encrypted: i == 1,
                    position: i,
                })
                .collect(),
        );
        assert_eq!(state.encryption_counts(), (1, 3));
    }

    mod grid_selection {
        use super::*;
        use pretty_assertions::assert_eq;

        fn state_with_keys(count: i64) -> AppState {
            let mut state = AppState::default();
            state.keys.replace(
                (0..count)
                    .map(|i| Key {
                        id: KeyId(i),
                        name: format!("K{i}"),
                        value: String::new(),
                        description: None,
                        used_with: None,
                        project_id: None,
                        encrypted: false,
                        position: i,
                    })
                    .collect(),
            );
            state
        }

        #[test]
        fn test_right_stops_at_row_end() {
            let mut state = state_with_keys(6);
            state.selected_key_index = 2;
            state.move_selection_right(3);
            assert_eq!(state.selected_key_index, 2);
        }

        #[test]
        fn test_down_lands_on_last_card_of_short_row() {
            let mut state = state_with_keys(5);
            state.selected_key_index = 2;
            state.move_selection_down(3);
            assert_eq!(state.selected_key_index, 4);
        }

        #[test]
        fn test_up_moves_one_row() {
            let mut state = state_with_keys(6);
            state.selected_key_index = 4;
            state.move_selection_up(3);
            assert_eq!(state.selected_key_index, 1);
        }

        #[test]
        fn test_clamp_after_shrink() {
            let mut state = state_with_keys(2);
            state.selected_key_index = 5;
            state.clamp_key_selection();
            assert_eq!(state.selected_key_index, 1);
        }
    }
}
