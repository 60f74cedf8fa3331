//! Authoritative in-memory task store with live snapshot subscriptions.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::sync::watch;

use crate::board::{
    domain::{BoardState, Task, TaskId, TaskStatus},
    ports::{
        BoardSubscription, MoveTaskRequest, TaskMutationError, TaskMutationPort,
        TaskMutationResult,
    },
};

/// Thread-safe in-memory task store.
///
/// Accepted moves put the task at the front of its new column and publish a
/// fresh snapshot to every subscription. Rejections and latency can be
/// injected to exercise the failure paths of a board.
#[derive(Debug, Clone)]
pub struct InMemoryTaskStore {
    state: Arc<RwLock<InMemoryStoreState>>,
    snapshots: Arc<watch::Sender<BoardState>>,
}

#[derive(Debug, Default)]
struct InMemoryStoreState {
    board: BoardState,
    rejected_targets: HashSet<TaskStatus>,
    latency: Duration,
    accepted_moves: Vec<MoveTaskRequest>,
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new(BoardState::empty())
    }
}

impl InMemoryTaskStore {
    /// Creates a store holding `board`.
    #[must_use]
    pub fn new(board: BoardState) -> Self {
        let (snapshots, _) = watch::channel(board.clone());
        Self {
            state: Arc::new(RwLock::new(InMemoryStoreState {
                board,
                ..InMemoryStoreState::default()
            })),
            snapshots: Arc::new(snapshots),
        }
    }

    /// Returns the current authoritative board.
    #[must_use]
    pub fn board(&self) -> BoardState {
        self.read_state().board.clone()
    }

    /// Returns the moves accepted so far, oldest first.
    #[must_use]
    pub fn accepted_moves(&self) -> Vec<MoveTaskRequest> {
        self.read_state().accepted_moves.clone()
    }

    /// Makes every move into `status` fail with a rejection.
    pub fn reject_moves_to(&self, status: TaskStatus) {
        self.write_state().rejected_targets.insert(status);
    }

    /// Accepts moves into `status` again.
    pub fn accept_moves_to(&self, status: TaskStatus) {
        self.write_state().rejected_targets.remove(&status);
    }

    /// Delays every mutation by `latency` before it is applied.
    pub fn set_latency(&self, latency: Duration) {
        self.write_state().latency = latency;
    }

    /// Adds or replaces a task and publishes the new board.
    pub fn upsert_task(&self, task: Task) {
        let mut state = self.write_state();
        state.board = state.board.with_task_inserted(task);
        self.publish(&state.board);
    }

    /// Removes a task and publishes the new board.
    ///
    /// Returns `false` when the task was not stored.
    pub fn remove_task(&self, id: &TaskId) -> bool {
        let mut state = self.write_state();
        if !state.board.contains(id) {
            return false;
        }
        state.board = state.board.without_task(id);
        self.publish(&state.board);
        true
    }

    /// Replaces the whole board and publishes it.
    pub fn replace_board(&self, board: BoardState) {
        let mut state = self.write_state();
        state.board = board;
        self.publish(&state.board);
    }

    /// Opens a live query over the board.
    ///
    /// The first snapshot is the board as it is now; each later one follows
    /// a change.
    #[must_use]
    pub fn subscribe(&self) -> WatchSubscription {
        WatchSubscription {
            receiver: self.snapshots.subscribe(),
            delivered_initial: false,
        }
    }

    fn publish(&self, board: &BoardState) {
        self.snapshots.send_replace(board.clone());
    }

    fn read_state(&self) -> RwLockReadGuard<'_, InMemoryStoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, InMemoryStoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl TaskMutationPort for InMemoryTaskStore {
    async fn move_task(&self, request: MoveTaskRequest) -> TaskMutationResult<()> {
        let latency = self.read_state().latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.write_state();
        if state.rejected_targets.contains(&request.target_status()) {
            return Err(TaskMutationError::rejected(format!(
                "moves to {} are not allowed",
                request.target_status()
            )));
        }

        let moved = state
            .board
            .with_task_moved(request.task_id(), request.target_status())
            .ok_or_else(|| {
                TaskMutationError::rejected(format!("task not found: {}", request.task_id()))
            })?;
        state.board = moved;
        state.accepted_moves.push(request);
        self.publish(&state.board);
        Ok(())
    }
}

/// Subscription backed by the store's snapshot channel.
#[derive(Debug)]
pub struct WatchSubscription {
    receiver: watch::Receiver<BoardState>,
    delivered_initial: bool,
}

#[async_trait]
impl BoardSubscription for WatchSubscription {
    async fn next_snapshot(&mut self) -> Option<BoardState> {
        if self.delivered_initial {
            self.receiver.changed().await.ok()?;
        } else {
            self.delivered_initial = true;
        }
        Some(self.receiver.borrow_and_update().clone())
    }
}
