//! Driving a board from a static snapshot into a live subscription.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use mockable::Clock;
use tokio::runtime::Handle;

use crate::board::{
    domain::BoardState,
    ports::{BoardSubscription, TaskMutationPort},
    services::{
        BoardConfig, HandoffEvent, HandoffPhase, HandoffReport, HandoffTracker,
        OptimisticMoveCoordinator,
    },
};

/// A mounted board: coordinator, handoff tracking and subscription pump.
///
/// The static snapshot is rendered first. Every snapshot pulled from the
/// subscription replaces the authoritative state in the coordinator, so
/// the display changes at most once per snapshot and only when its content
/// differs.
pub struct LiveBoard<M, C>
where
    M: TaskMutationPort + 'static,
    C: Clock + Send + Sync,
{
    coordinator: OptimisticMoveCoordinator<M>,
    tracker: Arc<Mutex<HandoffTracker<C>>>,
}

impl<M, C> Clone for LiveBoard<M, C>
where
    M: TaskMutationPort + 'static,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            coordinator: self.coordinator.clone(),
            tracker: Arc::clone(&self.tracker),
        }
    }
}

impl<M, C> LiveBoard<M, C>
where
    M: TaskMutationPort + 'static,
    C: Clock + Send + Sync,
{
    /// Mounts a board showing `static_snapshot`; moves run on `runtime`.
    #[must_use]
    pub fn mount(
        static_snapshot: BoardState,
        mutations: Arc<M>,
        clock: Arc<C>,
        config: BoardConfig,
        runtime: Handle,
    ) -> Self {
        let mut tracker = HandoffTracker::new(clock, config.handoff_ceiling);
        let coordinator =
            OptimisticMoveCoordinator::new(static_snapshot, mutations, config, runtime);
        if let Some(HandoffEvent::StaticRendered { after }) = tracker.observe_static_render() {
            tracing::debug!(
                board = %coordinator.board(),
                after = ?after,
                "static snapshot rendered"
            );
        }
        Self {
            coordinator,
            tracker: Arc::new(Mutex::new(tracker)),
        }
    }

    /// Returns the coordinator used for moves and display state.
    #[must_use]
    pub const fn coordinator(&self) -> &OptimisticMoveCoordinator<M> {
        &self.coordinator
    }

    /// Returns the handoff milestones recorded so far.
    #[must_use]
    pub fn handoff_report(&self) -> HandoffReport {
        self.lock_tracker().report()
    }

    /// Returns whether live data has taken over.
    #[must_use]
    pub fn phase(&self) -> HandoffPhase {
        self.lock_tracker().phase()
    }

    /// Feeds one authoritative snapshot into the board.
    ///
    /// Returns the handoff event when this was the first live snapshot.
    pub fn accept_snapshot(&self, snapshot: BoardState) -> Option<HandoffEvent> {
        let event = self.lock_tracker().observe_live_update();
        self.coordinator.apply_server_snapshot(snapshot);
        event
    }

    /// Pulls snapshots until the subscription closes.
    ///
    /// While waiting for the first snapshot the handoff ceiling is
    /// enforced: once it passes, the handoff is flagged as overdue and the
    /// wait continues.
    pub async fn run<S>(&self, mut subscription: S)
    where
        S: BoardSubscription,
    {
        let ceiling = self.lock_tracker().ceiling();
        let within_ceiling = tokio::time::timeout(ceiling, subscription.next_snapshot()).await;
        let first = match within_ceiling {
            Ok(snapshot) => snapshot,
            Err(_) => {
                self.lock_tracker().check_overdue();
                subscription.next_snapshot().await
            }
        };

        let Some(snapshot) = first else {
            tracing::warn!(
                board = %self.coordinator.board(),
                "subscription closed before the first live snapshot"
            );
            return;
        };
        self.accept_snapshot(snapshot);

        while let Some(snapshot) = subscription.next_snapshot().await {
            self.accept_snapshot(snapshot);
        }
        tracing::debug!(board = %self.coordinator.board(), "subscription closed");
    }

    fn lock_tracker(&self) -> MutexGuard<'_, HandoffTracker<C>> {
        self.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
