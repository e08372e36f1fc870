//! Drag and drop engines
//!
//! [`geometry`] and [`phase`] are pure. The reorder and move/copy engines
//! mutate [`AppState`] and talk to the backend through [`KeyServiceTrait`].
//!
//! [`KeyServiceTrait`]: crate::api::KeyServiceTrait

mod geometry;
pub mod key_reorder;
pub mod move_copy;
mod phase;
pub mod project_reorder;

pub use geometry::{
    apply_placement, hit_test, resolve, CardRect, InsertSide, LayoutMode, Placement, Point,
};
pub use phase::{DragEvent, DragPhase};

use crate::state::AppState;

/// Step a phase, logging and refusing illegal transitions
pub(crate) fn advance(phase: &mut DragPhase, event: DragEvent) -> bool {
    match phase.next(event) {
        Ok(next) => {
            *phase = next;
            true
        }
        Err(e) => {
            tracing::debug!("{e}");
            false
        }
    }
}

/// Abandon whatever drag is in progress. Safe to call with no session.
pub fn cancel(state: &mut AppState) {
    let Some(session) = state.interaction.session() else {
        return;
    };
    let mut phase = session.phase();
    advance(&mut phase, DragEvent::End);
    advance(&mut phase, DragEvent::Settle);
    state.interaction.clear();
    tracing::debug!("Drag cancelled");
}
