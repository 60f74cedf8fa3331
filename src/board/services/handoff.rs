//! Timing of the switch from a static snapshot to live updates.
//!
//! The tracker only observes; it never changes what is rendered.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use mockable::Clock;

/// Which snapshot source currently drives the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffPhase {
    /// The statically provided snapshot is on screen.
    Static,
    /// At least one subscription snapshot has replaced it.
    Live,
}

/// Diagnostic event emitted at each handoff milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffEvent {
    /// The static snapshot became the rendered state.
    StaticRendered {
        /// Time since mount.
        after: Duration,
    },
    /// The first subscription snapshot replaced the static one.
    LiveReceived {
        /// Time since mount.
        after: Duration,
    },
}

/// Offsets of the handoff milestones relative to mount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandoffReport {
    /// When the static snapshot was rendered.
    pub static_rendered_after: Option<Duration>,
    /// When the first live snapshot arrived.
    pub live_after: Option<Duration>,
    /// Whether the live snapshot was late against the configured ceiling.
    pub overdue: bool,
}

impl HandoffReport {
    /// Returns `true` once the handoff happened within `ceiling`.
    #[must_use]
    pub fn completed_within(&self, ceiling: Duration) -> bool {
        self.live_after.is_some_and(|after| after <= ceiling)
    }
}

/// Records when a board moved from its static snapshot to live data.
#[derive(Debug)]
pub struct HandoffTracker<C>
where
    C: Clock + Send + Sync,
{
    clock: Arc<C>,
    ceiling: Duration,
    mounted_at: DateTime<Utc>,
    static_rendered_at: Option<DateTime<Utc>>,
    live_at: Option<DateTime<Utc>>,
    overdue: bool,
}

impl<C> HandoffTracker<C>
where
    C: Clock + Send + Sync,
{
    /// Starts tracking; the current clock time counts as mount time.
    #[must_use]
    pub fn new(clock: Arc<C>, ceiling: Duration) -> Self {
        let mounted_at = clock.utc();
        Self {
            clock,
            ceiling,
            mounted_at,
            static_rendered_at: None,
            live_at: None,
            overdue: false,
        }
    }

    /// Records that the static snapshot is on screen.
    ///
    /// Only the first call records anything.
    pub fn observe_static_render(&mut self) -> Option<HandoffEvent> {
        if self.static_rendered_at.is_some() {
            return None;
        }
        let now = self.clock.utc();
        self.static_rendered_at = Some(now);
        Some(HandoffEvent::StaticRendered {
            after: self.offset(now),
        })
    }

    /// Records a subscription snapshot.
    ///
    /// Returns an event for the first snapshot only; later snapshots are
    /// ordinary updates.
    pub fn observe_live_update(&mut self) -> Option<HandoffEvent> {
        if self.live_at.is_some() {
            return None;
        }
        let now = self.clock.utc();
        self.live_at = Some(now);
        let after = self.offset(now);
        if after > self.ceiling {
            self.overdue = true;
            tracing::warn!(
                after = ?after,
                ceiling = ?self.ceiling,
                "live snapshot arrived after the handoff ceiling"
            );
        } else {
            tracing::info!(after = ?after, "live snapshot took over");
        }
        Some(HandoffEvent::LiveReceived { after })
    }

    /// Flags the handoff as overdue if no live snapshot arrived in time.
    ///
    /// Returns `true` when the handoff is overdue.
    pub fn check_overdue(&mut self) -> bool {
        if self.live_at.is_none() && !self.overdue {
            let waited = self.offset(self.clock.utc());
            if waited > self.ceiling {
                self.overdue = true;
                tracing::warn!(
                    waited = ?waited,
                    ceiling = ?self.ceiling,
                    "still rendering the static snapshot"
                );
            }
        }
        self.overdue
    }

    /// Returns the current phase.
    #[must_use]
    pub const fn phase(&self) -> HandoffPhase {
        if self.live_at.is_some() {
            HandoffPhase::Live
        } else {
            HandoffPhase::Static
        }
    }

    /// Returns the configured ceiling.
    #[must_use]
    pub const fn ceiling(&self) -> Duration {
        self.ceiling
    }

    /// Returns the milestones recorded so far.
    #[must_use]
    pub fn report(&self) -> HandoffReport {
        HandoffReport {
            static_rendered_after: self.static_rendered_at.map(|at| self.offset(at)),
            live_after: self.live_at.map(|at| self.offset(at)),
            overdue: self.overdue,
        }
    }

    /// Time since mount; a clock that went backwards counts as zero.
    fn offset(&self, at: DateTime<Utc>) -> Duration {
        (at - self.mounted_at).to_std().unwrap_or(Duration::ZERO)
    }
}
