//! Reusable UI components

mod dialog;

pub use dialog::{
    render_delete_key_dialog, render_delete_project_dialog, render_error_dialog,
    render_move_copy_dialog, render_password_dialog,
};
