//! UI module for rendering the TUI

mod components;
mod keys;
pub mod layout;
mod sidebar;

use crate::app::App;
use crate::state::MoveStage;
use components::{
    render_delete_key_dialog, render_delete_project_dialog, render_error_dialog,
    render_move_copy_dialog, render_password_dialog,
};
use layout::ScreenLayout;
use ratatui::Frame;

pub use keys::display_order;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let layout = ScreenLayout::new(frame.area());

    sidebar::draw_sidebar(frame, layout.sidebar, app);
    keys::draw(frame, layout.keys, app);
    layout::draw_status_bar(frame, layout.status, app);

    // Modal dialogs, topmost last
    let state = &app.state;
    if let Some(pending) = &state.pending_move {
        if pending.stage == MoveStage::ChoosingMode {
            render_move_copy_dialog(frame, pending);
        }
    }
    if let Some(pending) = &state.pending_delete {
        render_delete_project_dialog(frame, pending);
    }
    if let Some(pending) = &state.pending_key_delete {
        render_delete_key_dialog(frame, pending);
    }
    if let Some(prompt) = &state.password_prompt {
        let key_name = state
            .keys
            .get(prompt.key_id)
            .map_or_else(|| format!("#{}", prompt.key_id), |k| k.name.clone());
        render_password_dialog(frame, prompt, &key_name);
    }
    if let Some(error) = state.notifications.current_error() {
        render_error_dialog(frame, error, state.notifications.error_count());
    }
}
