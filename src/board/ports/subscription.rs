//! Subscription port delivering authoritative board snapshots.

use crate::board::domain::BoardState;
use async_trait::async_trait;

/// Live query over the remote store's board.
///
/// A subscription is a lazy sequence that cannot be restarted: every call
/// yields the next full snapshot once the store has one, and `None` once the
/// subscription has closed for good.
///
/// `next_snapshot` must be cancel safe: dropping the future before it
/// completes must not lose a snapshot.
#[async_trait]
pub trait BoardSubscription: Send {
    /// Waits for the next authoritative snapshot.
    async fn next_snapshot(&mut self) -> Option<BoardState>;
}
