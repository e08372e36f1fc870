//! Drag gesture state machine
//!
//! ```text
//! Idle --Start--> Dragging --Over--> Previewing --Over--> Previewing
//!                    |                   |
//!                    +----Drop-----------+--> Committing --Settle--> Idle
//!                    +----End------------+--> Cancelled  --Settle--> Idle
//! ```
//!
//! A drag-end delivered after the session already left the active phases is
//! absorbed, since the platform fires it after every drop as well.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging,
    Previewing,
    Committing,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEvent {
    Start,
    Over,
    Drop,
    End,
    Settle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal drag transition: {event:?} while {from:?}")]
pub struct IllegalTransition {
    pub from: DragPhase,
    pub event: DragEvent,
}

impl DragPhase {
    /// The single transition function for drag gestures
    pub fn next(self, event: DragEvent) -> Result<Self, IllegalTransition> {
        use DragEvent as E;
        use DragPhase as P;

        match (self, event) {
            (P::Idle, E::Start) => Ok(P::Dragging),
            (P::Dragging | P::Previewing, E::Over) => Ok(P::Previewing),
            (P::Dragging | P::Previewing, E::Drop) => Ok(P::Committing),
            (P::Dragging | P::Previewing, E::End) => Ok(P::Cancelled),
            (P::Committing | P::Cancelled, E::Settle) => Ok(P::Idle),
            (P::Idle | P::Committing | P::Cancelled, E::End) => Ok(self),
            (from, event) => Err(IllegalTransition { from, event }),
        }
    }

    /// Whether pointer movement should still update the preview
    pub fn is_active(self) -> bool {
        matches!(self, Self::Dragging | Self::Previewing)
    }
}
