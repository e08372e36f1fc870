//! Dialog components for TUI

mod base;
mod delete_key_dialog;
mod delete_project_dialog;
mod error_dialog;
mod move_copy_dialog;
mod password_dialog;

pub use delete_key_dialog::render_delete_key_dialog;
pub use delete_project_dialog::render_delete_project_dialog;
pub use error_dialog::render_error_dialog;
pub use move_copy_dialog::render_move_copy_dialog;
pub use password_dialog::render_password_dialog;
