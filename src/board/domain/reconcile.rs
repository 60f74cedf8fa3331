//! Merging authoritative board state with locally pending moves.

use super::{BoardState, MoveSequence, PendingMoves, Task, TaskId, TaskStatus};
use std::collections::HashSet;
use std::sync::Arc;

/// Computes the board that should be rendered.
///
/// With no pending moves the server state is returned as the same `Arc`,
/// so callers can skip work with [`Arc::ptr_eq`]. Otherwise every task with
/// a pending move is taken out of its server column and placed, with its
/// status set to the pending target, at the front of the target column.
/// When several tasks land in one column the most recently requested comes
/// first. Tasks without a pending move keep their server position, and
/// columns that neither lose nor gain a task keep their shared storage.
///
/// Pending moves for tasks missing from `server` are ignored. The inputs
/// are never modified.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use taskboard::board::domain::{compute_display_tasks, BoardState, PendingMoves};
///
/// let server = Arc::new(BoardState::empty());
/// let display = compute_display_tasks(&server, &PendingMoves::new());
/// assert!(Arc::ptr_eq(&server, &display));
/// ```
#[must_use]
pub fn compute_display_tasks(server: &Arc<BoardState>, pending: &PendingMoves) -> Arc<BoardState> {
    if pending.is_empty() {
        return Arc::clone(server);
    }

    let mut display = BoardState::clone(server);
    let mut moved: Vec<(MoveSequence, Task)> = Vec::new();
    let mut seen: HashSet<&TaskId> = HashSet::new();

    for status in TaskStatus::ALL {
        let column = server.column(status);
        if !column.iter().any(|task| pending.contains(task.id())) {
            continue;
        }

        let mut kept = Vec::with_capacity(column.len());
        for task in column {
            match pending.get(task.id()) {
                Some(entry) => {
                    if seen.insert(task.id()) {
                        moved.push((entry.sequence(), task.with_status(entry.target())));
                    }
                }
                None => kept.push(task.clone()),
            }
        }
        display.replace_column(status, kept);
    }

    if moved.is_empty() {
        return Arc::clone(server);
    }

    moved.sort_by(|(left, _), (right, _)| right.cmp(left));
    for status in TaskStatus::ALL {
        let arriving: Vec<Task> = moved
            .iter()
            .filter(|(_, task)| task.status() == status)
            .map(|(_, task)| task.clone())
            .collect();
        display.prepend(status, arriving);
    }

    Arc::new(display)
}

/// Returns the pending moves that reference tasks absent from `server`.
///
/// Such moves have no effect on the display; this only exists so callers
/// can report them.
#[must_use]
pub fn stale_references(server: &BoardState, pending: &PendingMoves) -> Vec<TaskId> {
    let mut stale: Vec<TaskId> = pending
        .iter()
        .map(|(id, _)| id)
        .filter(|id| !server.contains(id))
        .cloned()
        .collect();
    stale.sort();
    stale
}
