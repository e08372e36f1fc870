//! Project sidebar

mod draw;

pub use draw::draw_sidebar;

/// Label of the unscoped row
pub const ALL_PROJECTS_LABEL: &str = "All Projects";
