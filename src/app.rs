//! Application state and core logic

use crate::actions::{self, ClipboardSink, SystemClipboard};
use crate::api::{ApiClient, KeyServiceTrait};
use crate::config::ClientConfig;
use crate::dnd::{self, hit_test, key_reorder, move_copy, project_reorder, CardRect};
use crate::state::{AppState, KeyId, MoveMode, NoticeLevel, PasswordAction, ProjectId, ProjectScope};
use crate::sync::{refresh_keys, refresh_projects};
use crate::ui::display_order;
use crate::ui::layout::{
    contains, inner, key_drop_candidates, pointer, sidebar_row_at, GridLayout, ScreenLayout,
    SidebarRow,
};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use std::time::{Duration, Instant};

/// Second Ctrl+C within this window quits
const DOUBLE_TAP_WINDOW: Duration = Duration::from_millis(1000);

/// Second click on the same card within this window copies it
const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(400);

/// What the left button went down on
#[derive(Debug, Clone, Copy, PartialEq)]
enum PressTarget {
    Key { id: KeyId, rect: CardRect },
    Sidebar(SidebarRow),
}

#[derive(Debug, Clone, Copy)]
struct Press {
    target: PressTarget,
    column: u16,
    row: u16,
}

/// Main application struct
pub struct App {
    /// Current application state
    pub state: AppState,
    /// Backend used by every engine
    api: Box<dyn KeyServiceTrait>,
    clipboard: Box<dyn ClipboardSink>,
    config: ClientConfig,
    /// Whether the app should quit
    quit: bool,
    /// Terminal size for layout calculations (height, width)
    pub terminal_size: Option<(u16, u16)>,
    /// Left button press not yet released
    press: Option<Press>,
    /// Last plain click on a key card, for double-click copy
    last_click: Option<(KeyId, Instant)>,
    /// Timestamp of last Ctrl+C press for double-tap quit
    pub last_ctrl_c: Option<Instant>,
}

impl App {
    /// Create the app, connect to the server and load the initial data
    pub async fn new() -> Result<Self> {
        let config = ClientConfig::load().unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable config: {e}");
            ClientConfig::default()
        });
        let api = ApiClient::new(&config)?;
        tracing::info!("Using server {}", config.server_url());

        let mut app = Self::with_service(config, Box::new(api), Box::new(SystemClipboard));
        app.reload().await;
        Ok(app)
    }

    #[allow(clippy::field_reassign_with_default)]
    fn with_service(
        config: ClientConfig,
        api: Box<dyn KeyServiceTrait>,
        clipboard: Box<dyn ClipboardSink>,
    ) -> Self {
        let mut state = AppState::default();
        state.key_layout = config.key_layout();
        state
            .interaction
            .set_selected_project(config.selected_project);

        Self {
            state,
            api,
            clipboard,
            config,
            quit: false,
            terminal_size: None,
            press: None,
            last_click: None,
            last_ctrl_c: None,
        }
    }

    /// Check the connection and refetch projects and keys
    pub async fn reload(&mut self) {
        self.state.server_connected = self.api.check_connection().await;
        if !self.state.server_connected {
            self.state.notifications.error(format!(
                "Cannot reach server at {}",
                self.config.server_url()
            ));
            return;
        }
        refresh_projects(&mut self.state, &mut *self.api).await;
        refresh_keys(&mut self.state, &mut *self.api).await;
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Expire the flash highlight
    pub fn tick(&mut self) {
        self.state.update_flash();
    }

    /// Whether the screen changes without input (drag preview or flash)
    pub fn is_animating(&self) -> bool {
        let dragging = self
            .state
            .interaction
            .session()
            .is_some_and(|session| session.phase().is_active());
        dragging || self.state.flash.is_some()
    }

    /// Persist layout and selected project
    pub fn save_config(&mut self) -> Result<()> {
        self.config.key_layout = Some(self.state.key_layout);
        self.config.selected_project = self.state.interaction.selected_project_id();
        self.config.save()
    }

    fn layout(&self) -> ScreenLayout {
        ScreenLayout::for_size(self.terminal_size)
    }

    /// Number of key card columns at the current size
    fn key_columns(&self) -> usize {
        let keys = inner(self.layout().keys);
        GridLayout::new(keys.width, self.state.key_layout).columns
    }

    fn handle_ctrl_c(&mut self) {
        let now = Instant::now();
        if self
            .last_ctrl_c
            .is_some_and(|t| now.duration_since(t) < DOUBLE_TAP_WINDOW)
        {
            self.quit = true;
        } else {
            self.last_ctrl_c = Some(now);
            self.state.notifications.info("Press Ctrl+C again to quit");
        }
    }

    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.handle_ctrl_c();
            return Ok(());
        }

        // Handle error dialog dismissal first (modal)
        if self.state.notifications.current_error().is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.state.notifications.dismiss_error();
            }
            return Ok(());
        }

        if self.state.password_prompt.is_some() {
            return self.handle_password_key(key).await;
        }
        if self.state.pending_delete.is_some() {
            return self.handle_delete_dialog_key(key).await;
        }
        if self.state.pending_key_delete.is_some() {
            return self.handle_key_delete_dialog_key(key).await;
        }
        if self.state.pending_move.is_some() {
            return self.handle_move_dialog_key(key).await;
        }

        if key.code == KeyCode::Esc && self.state.interaction.is_dragging() {
            dnd::cancel(&mut self.state);
            self.press = None;
            return Ok(());
        }

        let columns = self.key_columns();
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.state.move_selection_left(columns),
            KeyCode::Right | KeyCode::Char('l') => self.state.move_selection_right(columns),
            KeyCode::Up | KeyCode::Char('k') => self.state.move_selection_up(columns),
            KeyCode::Down | KeyCode::Char('j') => self.state.move_selection_down(columns),
            KeyCode::Enter | KeyCode::Char('y') => {
                actions::copy_selected(&mut self.state, &mut *self.clipboard);
            }
            KeyCode::Tab => {
                let next = self.cycle_project(true);
                self.select_scope(next).await;
            }
            KeyCode::BackTab => {
                let prev = self.cycle_project(false);
                self.select_scope(prev).await;
            }
            KeyCode::Char('e') => {
                actions::request_encryption_toggle(&mut self.state);
            }
            KeyCode::Char('d') => {
                actions::request_key_delete(&mut self.state);
            }
            KeyCode::Char('x') => {
                if let Some(project_id) = self.state.interaction.selected_project_id() {
                    actions::request_delete(&mut self.state, project_id);
                }
            }
            KeyCode::Char('r') => self.reload().await,
            KeyCode::Char('v') => {
                self.state.key_layout = self.state.key_layout.toggle();
                tracing::debug!("Key layout: {}", self.state.key_layout.label());
            }
            _ => {}
        }
        Ok(())
    }

    /// Neighbouring sidebar scope, wrapping through "All Projects"
    fn cycle_project(&self, forward: bool) -> Option<ProjectId> {
        let scopes: Vec<Option<ProjectId>> = std::iter::once(None)
            .chain(self.state.projects.iter().map(|p| Some(p.id)))
            .collect();
        let current = self.state.interaction.selected_project_id();
        let index = scopes.iter().position(|s| *s == current).unwrap_or(0);
        let len = scopes.len();
        let next = if forward {
            (index + 1) % len
        } else {
            (index + len - 1) % len
        };
        scopes[next]
    }

    /// Switch the key panel to a project (or all keys)
    async fn select_scope(&mut self, project: Option<ProjectId>) {
        if self.state.interaction.selected_project_id() == project {
            return;
        }
        self.state.interaction.set_selected_project(project);
        self.state.selected_key_index = 0;
        refresh_keys(&mut self.state, &mut *self.api).await;
    }

    async fn handle_password_key(&mut self, key: KeyEvent) -> Result<()> {
        let Some(prompt) = self.state.password_prompt.as_mut() else {
            return Ok(());
        };
        match key.code {
            KeyCode::Esc => {
                if prompt.action == PasswordAction::Move {
                    move_copy::cancel(&mut self.state);
                } else {
                    self.state.password_prompt = None;
                }
            }
            KeyCode::Backspace => prompt.backspace(),
            KeyCode::Char(c) => prompt.push_char(c),
            KeyCode::Enter => {
                let action = prompt.action;
                let Some(password) = prompt.submit() else {
                    return Ok(());
                };
                match action {
                    PasswordAction::Move => {
                        move_copy::execute(&mut self.state, &mut *self.api, Some(password)).await;
                    }
                    PasswordAction::Copy => {
                        actions::copy_encrypted(
                            &mut self.state,
                            &mut *self.api,
                            &mut *self.clipboard,
                            password,
                        )
                        .await;
                    }
                    PasswordAction::Encrypt | PasswordAction::Decrypt => {
                        actions::toggle_encryption(&mut self.state, &mut *self.api, password).await;
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    async fn handle_move_dialog_key(&mut self, key: KeyEvent) -> Result<()> {
        let Some(pending) = self.state.pending_move.as_mut() else {
            return Ok(());
        };
        match key.code {
            KeyCode::Esc => move_copy::cancel(&mut self.state),
            KeyCode::Up | KeyCode::Down | KeyCode::Tab | KeyCode::Char('k') | KeyCode::Char('j') => {
                pending.mode = pending.mode.toggle();
            }
            KeyCode::Char('m') => pending.mode = MoveMode::Move,
            KeyCode::Char('c') => pending.mode = MoveMode::Copy,
            KeyCode::Enter => {
                let mode = pending.mode;
                if move_copy::choose_mode(&mut self.state, mode) {
                    move_copy::execute(&mut self.state, &mut *self.api, None).await;
                }
            }
            _ => {}
        }
        Ok(())
    }

    async fn handle_delete_dialog_key(&mut self, key: KeyEvent) -> Result<()> {
        let Some(pending) = self.state.pending_delete.as_mut() else {
            return Ok(());
        };
        match key.code {
            KeyCode::Esc => self.state.pending_delete = None,
            KeyCode::Up | KeyCode::Char('k') | KeyCode::BackTab => {
                pending.choice = pending.choice.prev();
            }
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => {
                pending.choice = pending.choice.next();
            }
            KeyCode::Enter => actions::confirm_delete(&mut self.state, &mut *self.api).await,
            _ => {}
        }
        Ok(())
    }

    async fn handle_key_delete_dialog_key(&mut self, key: KeyEvent) -> Result<()> {
        let Some(pending) = self.state.pending_key_delete.as_mut() else {
            return Ok(());
        };
        match key.code {
            KeyCode::Esc | KeyCode::Char('n') => self.state.pending_key_delete = None,
            KeyCode::Left
            | KeyCode::Right
            | KeyCode::Tab
            | KeyCode::BackTab
            | KeyCode::Char('h')
            | KeyCode::Char('l') => pending.confirmed = !pending.confirmed,
            KeyCode::Char('y') => {
                pending.confirmed = true;
                actions::confirm_key_delete(&mut self.state, &mut *self.api).await;
            }
            KeyCode::Enter => actions::confirm_key_delete(&mut self.state, &mut *self.api).await,
            _ => {}
        }
        Ok(())
    }

    pub async fn handle_mouse(&mut self, mouse: MouseEvent) -> Result<()> {
        // Pointer input waits for dialogs and in-flight requests
        if self.state.is_dialog_open() || !self.state.busy.is_empty() {
            return Ok(());
        }
        let layout = self.layout();
        let (column, row) = (mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                // The release of the previous gesture may have happened outside the terminal.
                if self.state.interaction.is_dragging() {
                    dnd::cancel(&mut self.state);
                }
                self.press = self.press_target(&layout, column, row).map(|target| Press {
                    target,
                    column,
                    row,
                });
                if let Some(Press {
                    target: PressTarget::Key { id, .. },
                    ..
                }) = self.press
                {
                    if let Some(index) = self.state.keys.index_of(id) {
                        self.state.selected_key_index = index;
                    }
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => self.handle_drag(&layout, column, row),
            MouseEventKind::Up(MouseButton::Left) => {
                self.handle_release(&layout, column, row).await
            }
            MouseEventKind::ScrollUp if contains(layout.keys, column, row) => {
                self.state.move_selection_up(self.key_columns());
            }
            MouseEventKind::ScrollDown if contains(layout.keys, column, row) => {
                self.state.move_selection_down(self.key_columns());
            }
            _ => {}
        }
        Ok(())
    }

    fn press_target(&self, layout: &ScreenLayout, column: u16, row: u16) -> Option<PressTarget> {
        if contains(layout.keys, column, row) {
            let order = display_order(self);
            let candidates = key_drop_candidates(
                layout.keys,
                self.state.key_layout,
                &order,
                self.state.selected_key_index,
            );
            let id = hit_test(pointer(column, row), &candidates)?;
            return candidates
                .into_iter()
                .find(|(candidate, _)| *candidate == id)
                .map(|(id, rect)| PressTarget::Key { id, rect });
        }
        if contains(layout.sidebar, column, row) {
            return sidebar_row_at(layout.sidebar, &self.state.projects, column, row)
                .map(PressTarget::Sidebar);
        }
        None
    }

    fn sidebar_project_at(&self, layout: &ScreenLayout, column: u16, row: u16) -> Option<ProjectId> {
        sidebar_row_at(layout.sidebar, &self.state.projects, column, row)
            .and_then(SidebarRow::project_id)
    }

    fn handle_drag(&mut self, layout: &ScreenLayout, column: u16, row: u16) {
        if !self.state.interaction.is_dragging() {
            let Some(press) = self.press else {
                return;
            };
            if (press.column, press.row) == (column, row) {
                return;
            }
            let started = match press.target {
                PressTarget::Key { id, rect } => key_reorder::start(&mut self.state, id, rect),
                PressTarget::Sidebar(SidebarRow::Project(id)) => {
                    project_reorder::start(&mut self.state, id)
                }
                PressTarget::Sidebar(SidebarRow::AllProjects) => false,
            };
            if !started {
                self.press = None;
                return;
            }
        }

        if self.state.interaction.key_drag().is_some() {
            if contains(layout.keys, column, row) {
                let order = display_order(self);
                let mode = self.state.key_layout;
                let candidates =
                    key_drop_candidates(layout.keys, mode, &order, self.state.selected_key_index);
                key_reorder::drag_over(&mut self.state, pointer(column, row), &candidates, mode);
            } else if contains(layout.sidebar, column, row) {
                let target = self.sidebar_project_at(layout, column, row);
                key_reorder::hover_project(&mut self.state, target);
            }
        } else if self.state.interaction.project_drag().is_some() {
            let target = self.sidebar_project_at(layout, column, row);
            project_reorder::drag_over(&mut self.state, target);
        }
    }

    async fn handle_release(&mut self, layout: &ScreenLayout, column: u16, row: u16) {
        let press = self.press.take();

        if let Some(drag) = self.state.interaction.key_drag() {
            let key_id = drag.key_id;
            let hovered = drag.hovered_project;
            let moved = drag.preview != self.state.keys.ids();
            let over_project = self.sidebar_project_at(layout, column, row);

            if hovered.is_some() && over_project == hovered {
                dnd::cancel(&mut self.state);
                if let Some(target) = hovered {
                    move_copy::request(&mut self.state, key_id, target);
                }
            } else if contains(layout.keys, column, row) {
                match key_reorder::commit(&mut self.state, &mut *self.api).await {
                    key_reorder::ReorderOutcome::Reordered { from, to } => {
                        tracing::debug!("Key card {key_id} moved from slot {from} to {to}");
                    }
                    key_reorder::ReorderOutcome::Skipped
                        if moved && self.state.scope() == ProjectScope::All =>
                    {
                        self.state.notifications.push(
                            NoticeLevel::Warning,
                            "Select a project to reorder its keys",
                        );
                    }
                    _ => {}
                }
            } else {
                dnd::cancel(&mut self.state);
            }
            return;
        }

        if self.state.interaction.project_drag().is_some() {
            match self.sidebar_project_at(layout, column, row) {
                Some(target) => {
                    let outcome = project_reorder::drop(&mut self.state, &mut *self.api, target).await;
                    if let project_reorder::ProjectDropOutcome::Reordered { from, to } = outcome {
                        tracing::debug!("Project dropped on {target}: slot {from} -> {to}");
                    }
                }
                None => dnd::cancel(&mut self.state),
            }
            return;
        }

        // Plain click
        match press.map(|p| p.target) {
            Some(PressTarget::Sidebar(clicked)) => {
                if sidebar_row_at(layout.sidebar, &self.state.projects, column, row) == Some(clicked) {
                    self.select_scope(clicked.project_id()).await;
                }
            }
            Some(PressTarget::Key { id, .. }) => {
                let now = Instant::now();
                let is_double_click = self
                    .last_click
                    .is_some_and(|(last, at)| last == id && now.duration_since(at) < DOUBLE_CLICK_WINDOW);
                if is_double_click {
                    self.last_click = None;
                    actions::copy_selected(&mut self.state, &mut *self.clipboard);
                } else {
                    self.last_click = Some((id, now));
                }
            }
            None => {}
        }
    }
}
