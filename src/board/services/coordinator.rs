//! Optimistic move coordination against the remote store.
//!
//! The coordinator owns the pending moves of one board view. A requested
//! move is recorded before the caller regains control, so the next display
//! state already shows it. The remote mutation then runs on the Tokio
//! runtime, and its outcome removes the pending entry again: on success the
//! store's own snapshots carry the move from then on, on failure the display
//! falls back to the last authoritative placement.
//!
//! Mutations for one task go through a per-task lane: a request is only
//! checked and sent once the previous request for that task has resolved, so
//! the last call the store sees is always the newest request.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::{Mutex as AsyncMutex, broadcast, watch};
use tokio::task::{JoinError, JoinHandle};

use crate::board::{
    domain::{
        BoardState, BoardViewId, MoveSequence, PendingMove, PendingMoves, TaskId, TaskStatus,
        compute_display_tasks, stale_references,
    },
    ports::{MoveTaskRequest, TaskMutationError, TaskMutationPort},
    services::BoardConfig,
};

/// Why a move was rolled back.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MoveError {
    /// The store refused the move.
    #[error("move of task {task_id} rejected: {reason}")]
    MutationRejected {
        /// Task whose move was refused.
        task_id: TaskId,
        /// Reason given by the store.
        reason: String,
    },

    /// The store did not answer in time.
    #[error("move of task {task_id} timed out after {timeout:?}")]
    MutationTimeout {
        /// Task whose move timed out.
        task_id: TaskId,
        /// Configured mutation timeout.
        timeout: Duration,
    },

    /// The store could not be reached.
    #[error("move of task {task_id} failed: {message}")]
    MutationUnavailable {
        /// Task whose move failed.
        task_id: TaskId,
        /// Transport error description.
        message: String,
    },
}

impl MoveError {
    /// Returns the task whose move failed.
    #[must_use]
    pub const fn task_id(&self) -> &TaskId {
        match self {
            Self::MutationRejected { task_id, .. }
            | Self::MutationTimeout { task_id, .. }
            | Self::MutationUnavailable { task_id, .. } => task_id,
        }
    }
}

/// How a move request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveResolution {
    /// The store accepted the move.
    Committed,
    /// The move failed and the display reverted to the store's placement.
    RolledBack(MoveError),
    /// A later request for the same task took over; this one changed
    /// nothing when it resolved.
    Superseded,
}

/// Notification about the lifecycle of a move, for user feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveEvent {
    /// A move was recorded as pending.
    Requested {
        /// Moved task.
        task_id: TaskId,
        /// Predicted column.
        target: TaskStatus,
        /// Request number.
        sequence: MoveSequence,
    },
    /// The store accepted a move.
    Committed {
        /// Moved task.
        task_id: TaskId,
        /// Accepted column.
        target: TaskStatus,
        /// Request number.
        sequence: MoveSequence,
    },
    /// A move failed and was rolled back.
    RolledBack {
        /// Task that stays in its authoritative column.
        task_id: TaskId,
        /// Column the move aimed for.
        target: TaskStatus,
        /// Request number.
        sequence: MoveSequence,
        /// Failure cause.
        error: MoveError,
    },
    /// A request resolved after a newer request for the same task.
    Superseded {
        /// Moved task.
        task_id: TaskId,
        /// Request number of the stale request.
        sequence: MoveSequence,
    },
}

/// Handle to a move whose remote mutation is in flight.
#[derive(Debug)]
pub struct MoveTicket {
    task_id: TaskId,
    target: TaskStatus,
    sequence: MoveSequence,
    handle: JoinHandle<MoveResolution>,
}

impl MoveTicket {
    /// Returns the moved task.
    #[must_use]
    pub const fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    /// Returns the requested column.
    #[must_use]
    pub const fn target(&self) -> TaskStatus {
        self.target
    }

    /// Returns the request number.
    #[must_use]
    pub const fn sequence(&self) -> MoveSequence {
        self.sequence
    }

    /// Waits until the move has been resolved.
    ///
    /// # Errors
    ///
    /// Returns the [`JoinError`] of the background task if it panicked or
    /// the runtime shut down first.
    pub async fn resolution(self) -> Result<MoveResolution, JoinError> {
        self.handle.await
    }
}

#[derive(Debug)]
struct CoordinatorState {
    server: Arc<BoardState>,
    pending: PendingMoves,
    last_sequence: MoveSequence,
}

impl CoordinatorState {
    fn display(&self) -> Arc<BoardState> {
        compute_display_tasks(&self.server, &self.pending)
    }
}

/// Dispatch lanes keyed by task; an entry lives while a request holds it.
type DispatchLanes = HashMap<TaskId, Arc<AsyncMutex<()>>>;

/// Owner of the pending moves of one board view.
///
/// Clones share the same pending moves and display; construct one
/// coordinator per mounted board.
pub struct OptimisticMoveCoordinator<M>
where
    M: TaskMutationPort + 'static,
{
    board: BoardViewId,
    mutations: Arc<M>,
    config: BoardConfig,
    runtime: Handle,
    state: Arc<Mutex<CoordinatorState>>,
    lanes: Arc<Mutex<DispatchLanes>>,
    display: Arc<watch::Sender<Arc<BoardState>>>,
    events: broadcast::Sender<MoveEvent>,
}

impl<M> Clone for OptimisticMoveCoordinator<M>
where
    M: TaskMutationPort + 'static,
{
    fn clone(&self) -> Self {
        Self {
            board: self.board,
            mutations: Arc::clone(&self.mutations),
            config: self.config.clone(),
            runtime: self.runtime.clone(),
            state: Arc::clone(&self.state),
            lanes: Arc::clone(&self.lanes),
            display: Arc::clone(&self.display),
            events: self.events.clone(),
        }
    }
}

impl<M> OptimisticMoveCoordinator<M>
where
    M: TaskMutationPort + 'static,
{
    /// Creates a coordinator whose first display is `initial`.
    ///
    /// Remote mutations are spawned on `runtime`.
    #[must_use]
    pub fn new(
        initial: BoardState,
        mutations: Arc<M>,
        config: BoardConfig,
        runtime: Handle,
    ) -> Self {
        let server = Arc::new(initial);
        let (display, _) = watch::channel(Arc::clone(&server));
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            board: BoardViewId::new(),
            mutations,
            config,
            runtime,
            state: Arc::new(Mutex::new(CoordinatorState {
                server,
                pending: PendingMoves::new(),
                last_sequence: MoveSequence::default(),
            })),
            lanes: Arc::new(Mutex::new(DispatchLanes::new())),
            display: Arc::new(display),
            events,
        }
    }

    /// Returns the identity of this board view.
    #[must_use]
    pub const fn board(&self) -> BoardViewId {
        self.board
    }

    /// Returns the configuration in use.
    #[must_use]
    pub const fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Records a move and sends it to the remote store.
    ///
    /// The pending entry is in place when this returns, so the display
    /// already shows the task in `target`. A second request for a task
    /// whose first move is still in flight replaces the pending entry; the
    /// earlier request then resolves as [`MoveResolution::Superseded`].
    pub fn request_move(&self, task_id: TaskId, target: TaskStatus) -> MoveTicket {
        let sequence = {
            let mut state = self.lock_state();
            let sequence = state.last_sequence.next();
            state.last_sequence = sequence;
            let replaced = state
                .pending
                .insert(task_id.clone(), PendingMove::new(target, sequence));
            if let Some(previous) = replaced {
                tracing::debug!(
                    board = %self.board,
                    task_id = %task_id,
                    previous_sequence = %previous.sequence(),
                    sequence = %sequence,
                    "pending move replaced by a newer request"
                );
            }
            self.publish(&state);
            sequence
        };

        tracing::debug!(
            board = %self.board,
            task_id = %task_id,
            target_status = %target,
            sequence = %sequence,
            "move requested"
        );
        self.emit(MoveEvent::Requested {
            task_id: task_id.clone(),
            target,
            sequence,
        });

        let coordinator = self.clone();
        let dispatched_id = task_id.clone();
        let handle = self.runtime.spawn(async move {
            coordinator.dispatch(dispatched_id, target, sequence).await
        });

        MoveTicket {
            task_id,
            target,
            sequence,
            handle,
        }
    }

    /// Replaces the authoritative state with a snapshot from the store.
    ///
    /// Pending moves are kept: they only go away when their mutation
    /// resolves. Returns the resulting display state.
    pub fn apply_server_snapshot(&self, snapshot: BoardState) -> Arc<BoardState> {
        let mut state = self.lock_state();
        state.server = Arc::new(snapshot);

        let stale = stale_references(&state.server, &state.pending);
        if !stale.is_empty() {
            tracing::debug!(
                board = %self.board,
                stale = ?stale,
                "pending moves reference tasks missing from the snapshot"
            );
        }

        self.publish(&state)
    }

    /// Returns the state to render right now.
    #[must_use]
    pub fn display_state(&self) -> Arc<BoardState> {
        self.display.borrow().clone()
    }

    /// Returns the last authoritative state.
    #[must_use]
    pub fn server_state(&self) -> Arc<BoardState> {
        Arc::clone(&self.lock_state().server)
    }

    /// Returns `true` while a task has an unconfirmed move.
    #[must_use]
    pub fn is_pending(&self, task_id: &TaskId) -> bool {
        self.lock_state().pending.contains(task_id)
    }

    /// Returns the predicted column of a task with an unconfirmed move.
    #[must_use]
    pub fn pending_target(&self, task_id: &TaskId) -> Option<TaskStatus> {
        self.lock_state().pending.target(task_id)
    }

    /// Returns the number of unconfirmed moves.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.lock_state().pending.len()
    }

    /// Returns a receiver notified whenever the display state changes.
    #[must_use]
    pub fn watch_display(&self) -> watch::Receiver<Arc<BoardState>> {
        self.display.subscribe()
    }

    /// Returns a receiver for move lifecycle events.
    #[must_use]
    pub fn subscribe_events(&self) -> broadcast::Receiver<MoveEvent> {
        self.events.subscribe()
    }

    async fn dispatch(
        self,
        task_id: TaskId,
        target: TaskStatus,
        sequence: MoveSequence,
    ) -> MoveResolution {
        let lane = self.enter_lane(&task_id);
        let outcome = {
            let _turn = lane.lock().await;
            if self.is_current(&task_id, sequence) {
                Some(self.send(&task_id, target).await)
            } else {
                None
            }
        };
        drop(lane);
        self.leave_lane(&task_id);

        let Some(outcome) = outcome else {
            tracing::debug!(
                board = %self.board,
                task_id = %task_id,
                sequence = %sequence,
                "move superseded before dispatch"
            );
            self.emit(MoveEvent::Superseded { task_id, sequence });
            return MoveResolution::Superseded;
        };
        self.resolve(task_id, target, sequence, outcome)
    }

    /// Calls the store; the timeout covers the call only, not the wait for
    /// the lane.
    async fn send(&self, task_id: &TaskId, target: TaskStatus) -> Result<(), MoveError> {
        let timeout = self.config.mutation_timeout;
        let request = MoveTaskRequest::new(task_id.clone(), target);
        match tokio::time::timeout(timeout, self.mutations.move_task(request)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(TaskMutationError::Rejected { reason })) => Err(MoveError::MutationRejected {
                task_id: task_id.clone(),
                reason,
            }),
            Ok(Err(err @ TaskMutationError::Unavailable(_))) => {
                Err(MoveError::MutationUnavailable {
                    task_id: task_id.clone(),
                    message: err.to_string(),
                })
            }
            Err(_) => Err(MoveError::MutationTimeout {
                task_id: task_id.clone(),
                timeout,
            }),
        }
    }

    fn enter_lane(&self, task_id: &TaskId) -> Arc<AsyncMutex<()>> {
        Arc::clone(self.lock_lanes().entry(task_id.clone()).or_default())
    }

    /// Drops the lane once no request holds it any more.
    fn leave_lane(&self, task_id: &TaskId) {
        let mut lanes = self.lock_lanes();
        if lanes
            .get(task_id)
            .is_some_and(|lane| Arc::strong_count(lane) == 1)
        {
            lanes.remove(task_id);
        }
    }

    fn resolve(
        &self,
        task_id: TaskId,
        target: TaskStatus,
        sequence: MoveSequence,
        outcome: Result<(), MoveError>,
    ) -> MoveResolution {
        {
            let mut state = self.lock_state();
            if !state.pending.remove_if_current(&task_id, sequence) {
                drop(state);
                tracing::debug!(
                    board = %self.board,
                    task_id = %task_id,
                    sequence = %sequence,
                    "stale move resolution ignored"
                );
                self.emit(MoveEvent::Superseded { task_id, sequence });
                return MoveResolution::Superseded;
            }
            self.publish(&state);
        }

        match outcome {
            Ok(()) => {
                tracing::info!(
                    board = %self.board,
                    task_id = %task_id,
                    target_status = %target,
                    sequence = %sequence,
                    "move committed"
                );
                self.emit(MoveEvent::Committed {
                    task_id,
                    target,
                    sequence,
                });
                MoveResolution::Committed
            }
            Err(error) => {
                tracing::warn!(
                    board = %self.board,
                    task_id = %task_id,
                    target_status = %target,
                    sequence = %sequence,
                    error = %error,
                    "move rolled back"
                );
                self.emit(MoveEvent::RolledBack {
                    task_id,
                    target,
                    sequence,
                    error: error.clone(),
                });
                MoveResolution::RolledBack(error)
            }
        }
    }

    fn is_current(&self, task_id: &TaskId, sequence: MoveSequence) -> bool {
        self.lock_state()
            .pending
            .get(task_id)
            .is_some_and(|pending| pending.sequence() == sequence)
    }

    /// Recomputes the display and notifies watchers if it changed.
    fn publish(&self, state: &CoordinatorState) -> Arc<BoardState> {
        let next = state.display();
        self.display.send_if_modified(|current| {
            if Arc::ptr_eq(current, &next) || **current == *next {
                return false;
            }
            *current = Arc::clone(&next);
            true
        });
        self.display.borrow().clone()
    }

    fn emit(&self, event: MoveEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!(board = %self.board, "no move event listeners");
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, CoordinatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_lanes(&self) -> MutexGuard<'_, DispatchLanes> {
        self.lanes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
