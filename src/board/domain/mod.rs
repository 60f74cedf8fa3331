//! Domain model for the task board.
//!
//! Tasks, board snapshots and pending moves are plain values owned by the
//! caller. The reconciler that merges them is a pure function with no
//! infrastructure dependencies.

mod board_state;
mod error;
mod ids;
mod pending;
mod reconcile;
mod task;

pub use board_state::{BoardState, Column};
pub use error::{BoardDomainError, ParseTaskPriorityError, ParseTaskStatusError};
pub use ids::{AgentId, BoardViewId, TaskId};
pub use pending::{MoveSequence, PendingMove, PendingMoves};
pub use reconcile::{compute_display_tasks, stale_references};
pub use task::{NewTask, Task, TaskPriority, TaskStatus};
