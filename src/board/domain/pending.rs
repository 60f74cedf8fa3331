//! Moves requested locally that the remote store has not resolved yet.

use super::{TaskId, TaskStatus};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

/// Monotonic number identifying one move request within a board view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MoveSequence(u64);

impl MoveSequence {
    /// Wraps a raw sequence value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the sequence that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for MoveSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Target column of an unconfirmed move and the request that set it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingMove {
    target: TaskStatus,
    sequence: MoveSequence,
}

impl PendingMove {
    /// Creates a pending move.
    #[must_use]
    pub const fn new(target: TaskStatus, sequence: MoveSequence) -> Self {
        Self { target, sequence }
    }

    /// Returns the column the task is predicted to land in.
    #[must_use]
    pub const fn target(self) -> TaskStatus {
        self.target
    }

    /// Returns the request that recorded this move.
    #[must_use]
    pub const fn sequence(self) -> MoveSequence {
        self.sequence
    }
}

/// Unconfirmed moves keyed by task.
///
/// At most one move per task is pending; recording a new move for a task
/// replaces the earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingMoves {
    entries: HashMap<TaskId, PendingMove>,
}

impl PendingMoves {
    /// Creates an empty set of pending moves.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of pending moves.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns the pending move for a task.
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<PendingMove> {
        self.entries.get(id).copied()
    }

    /// Returns the predicted column for a task.
    #[must_use]
    pub fn target(&self, id: &TaskId) -> Option<TaskStatus> {
        self.get(id).map(PendingMove::target)
    }

    /// Returns `true` when the task has an unconfirmed move.
    #[must_use]
    pub fn contains(&self, id: &TaskId) -> bool {
        self.entries.contains_key(id)
    }

    /// Records a move, returning the one it replaced.
    pub fn insert(&mut self, id: TaskId, pending: PendingMove) -> Option<PendingMove> {
        self.entries.insert(id, pending)
    }

    /// Removes a move only if it still belongs to `sequence`.
    ///
    /// Returns `false` when the task has no pending move or when a later
    /// request replaced it.
    pub fn remove_if_current(&mut self, id: &TaskId, sequence: MoveSequence) -> bool {
        match self.entries.entry(id.clone()) {
            Entry::Occupied(entry) if entry.get().sequence() == sequence => {
                entry.remove();
                true
            }
            Entry::Occupied(_) | Entry::Vacant(_) => false,
        }
    }

    /// Iterates over the pending moves in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&TaskId, PendingMove)> {
        self.entries.iter().map(|(id, pending)| (id, *pending))
    }
}

impl FromIterator<(TaskId, TaskStatus)> for PendingMoves {
    /// Collects moves, numbering them in iteration order so that later
    /// items count as more recent.
    fn from_iter<I: IntoIterator<Item = (TaskId, TaskStatus)>>(iter: I) -> Self {
        let mut sequence = MoveSequence::default();
        let mut moves = Self::new();
        for (id, target) in iter {
            sequence = sequence.next();
            moves.insert(id, PendingMove::new(target, sequence));
        }
        moves
    }
}
