//! Board snapshot: every status column with its ordered tasks.

use super::{Task, TaskId, TaskStatus};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Ordered tasks of one column, shared between snapshots that did not
/// change it.
pub type Column = Arc<[Task]>;

/// Tasks grouped by status column, in display order.
///
/// All six columns always exist, empty or not, and a task identifier
/// appears in at most one column. Untouched columns are shared between a
/// board and the states derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardState {
    planning: Column,
    ready: Column,
    in_progress: Column,
    in_review: Column,
    done: Column,
    blocked: Column,
}

impl Default for BoardState {
    fn default() -> Self {
        Self::empty()
    }
}

impl BoardState {
    /// Creates a board with six empty columns.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            planning: Arc::from([]),
            ready: Arc::from([]),
            in_progress: Arc::from([]),
            in_review: Arc::from([]),
            done: Arc::from([]),
            blocked: Arc::from([]),
        }
    }

    /// Groups tasks into columns by their status, preserving input order.
    ///
    /// Later duplicates of a task identifier are dropped.
    #[must_use]
    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut grouped: BTreeMap<TaskStatus, Vec<Task>> = BTreeMap::new();
        let mut seen = HashSet::new();
        for task in tasks {
            if seen.insert(task.id().clone()) {
                grouped.entry(task.status()).or_default().push(task);
            }
        }
        Self::from_columns(grouped)
    }

    /// Builds a board from explicit columns.
    ///
    /// Columns are taken as authoritative placement: a task is kept in the
    /// column it is listed under even when its own status differs. Missing
    /// columns are empty. A task identifier listed more than once keeps only
    /// its first occurrence in column display order.
    #[must_use]
    pub fn from_columns(columns: impl IntoIterator<Item = (TaskStatus, Vec<Task>)>) -> Self {
        let mut supplied: BTreeMap<TaskStatus, Vec<Task>> = BTreeMap::new();
        for (status, tasks) in columns {
            supplied.entry(status).or_default().extend(tasks);
        }

        let mut board = Self::empty();
        let mut seen = HashSet::new();
        for (status, tasks) in supplied {
            let unique: Vec<Task> = tasks
                .into_iter()
                .filter(|task| seen.insert(task.id().clone()))
                .collect();
            *board.slot_mut(status) = Arc::from(unique);
        }
        board
    }

    /// Returns the tasks of one column in display order.
    #[must_use]
    pub fn column(&self, status: TaskStatus) -> &[Task] {
        self.slot(status)
    }

    /// Returns the shared storage of one column.
    ///
    /// Two boards whose columns are [`Arc::ptr_eq`] share the same
    /// allocation.
    #[must_use]
    pub const fn shared_column(&self, status: TaskStatus) -> &Column {
        self.slot(status)
    }

    /// Iterates over every column in display order.
    pub fn columns(&self) -> impl Iterator<Item = (TaskStatus, &[Task])> {
        TaskStatus::ALL
            .into_iter()
            .map(move |status| (status, self.column(status)))
    }

    /// Iterates over every task, column by column.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.columns().flat_map(|(_, tasks)| tasks.iter())
    }

    /// Returns the number of tasks on the board.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns().map(|(_, tasks)| tasks.len()).sum()
    }

    /// Returns `true` when no column holds a task.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns().all(|(_, tasks)| tasks.is_empty())
    }

    /// Returns the number of tasks in each column.
    #[must_use]
    pub fn column_counts(&self) -> BTreeMap<TaskStatus, usize> {
        self.columns()
            .map(|(status, tasks)| (status, tasks.len()))
            .collect()
    }

    /// Returns the column and index at which a task is displayed.
    #[must_use]
    pub fn locate(&self, id: &TaskId) -> Option<(TaskStatus, usize)> {
        self.columns().find_map(|(status, tasks)| {
            tasks
                .iter()
                .position(|task| task.id() == id)
                .map(|index| (status, index))
        })
    }

    /// Finds a task by identifier.
    #[must_use]
    pub fn find(&self, id: &TaskId) -> Option<&Task> {
        self.tasks().find(|task| task.id() == id)
    }

    /// Returns `true` when the task is on the board.
    #[must_use]
    pub fn contains(&self, id: &TaskId) -> bool {
        self.find(id).is_some()
    }

    /// Returns a board with the task moved to the front of `target`.
    ///
    /// Returns `None` when the task is not on the board.
    #[must_use]
    pub fn with_task_moved(&self, id: &TaskId, target: TaskStatus) -> Option<Self> {
        let moved = self.find(id)?.with_status(target);
        let mut board = self.without_task(id);
        board.prepend(target, vec![moved]);
        Some(board)
    }

    /// Returns a board with the task added to the front of its column,
    /// replacing any task with the same identifier.
    #[must_use]
    pub fn with_task_inserted(&self, task: Task) -> Self {
        let mut board = self.without_task(task.id());
        board.prepend(task.status(), vec![task]);
        board
    }

    /// Returns a board without the given task.
    ///
    /// Columns that did not hold the task keep their shared storage.
    #[must_use]
    pub fn without_task(&self, id: &TaskId) -> Self {
        let mut board = self.clone();
        for status in TaskStatus::ALL {
            let column = self.slot(status);
            if column.iter().any(|task| task.id() == id) {
                let kept: Vec<Task> = column
                    .iter()
                    .filter(|task| task.id() != id)
                    .cloned()
                    .collect();
                *board.slot_mut(status) = Arc::from(kept);
            }
        }
        board
    }

    /// Places `tasks` in front of the current occupants of a column.
    pub(crate) fn prepend(&mut self, status: TaskStatus, mut tasks: Vec<Task>) {
        if tasks.is_empty() {
            return;
        }
        tasks.extend(self.slot(status).iter().cloned());
        *self.slot_mut(status) = Arc::from(tasks);
    }

    /// Replaces the storage of a column.
    pub(crate) fn replace_column(&mut self, status: TaskStatus, tasks: Vec<Task>) {
        *self.slot_mut(status) = Arc::from(tasks);
    }

    const fn slot(&self, status: TaskStatus) -> &Column {
        match status {
            TaskStatus::Planning => &self.planning,
            TaskStatus::Ready => &self.ready,
            TaskStatus::InProgress => &self.in_progress,
            TaskStatus::InReview => &self.in_review,
            TaskStatus::Done => &self.done,
            TaskStatus::Blocked => &self.blocked,
        }
    }

    const fn slot_mut(&mut self, status: TaskStatus) -> &mut Column {
        match status {
            TaskStatus::Planning => &mut self.planning,
            TaskStatus::Ready => &mut self.ready,
            TaskStatus::InProgress => &mut self.in_progress,
            TaskStatus::InReview => &mut self.in_review,
            TaskStatus::Done => &mut self.done,
            TaskStatus::Blocked => &mut self.blocked,
        }
    }
}
