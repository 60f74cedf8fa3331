//! Coordination services for the optimistic board.

mod config;
mod coordinator;
mod handoff;
mod live;

pub use config::BoardConfig;
pub use coordinator::{
    MoveError, MoveEvent, MoveResolution, MoveTicket, OptimisticMoveCoordinator,
};
pub use handoff::{HandoffEvent, HandoffPhase, HandoffReport, HandoffTracker};
pub use live::LiveBoard;
