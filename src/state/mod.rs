//! Application state module

mod app_state;
mod interaction;
mod key_cache;
mod notifications;
mod pending;

pub use app_state::*;
pub use interaction::*;
pub use key_cache::*;
pub use notifications::*;
pub use pending::*;
