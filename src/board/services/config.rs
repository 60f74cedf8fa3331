//! Tunables for a board view.

use std::time::Duration;

/// Configuration shared by the coordinator and the handoff tracker.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use taskboard::board::services::BoardConfig;
///
/// let config = BoardConfig::default().with_mutation_timeout(Duration::from_secs(2));
/// assert_eq!(config.mutation_timeout, Duration::from_secs(2));
/// assert_eq!(config.handoff_ceiling, Duration::from_millis(300));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    /// How long a remote mutation may take before the move is rolled back.
    pub mutation_timeout: Duration,
    /// Longest acceptable wait for the first live snapshot.
    pub handoff_ceiling: Duration,
    /// Number of move events buffered for slow listeners.
    pub event_capacity: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            mutation_timeout: Duration::from_secs(10),
            handoff_ceiling: Duration::from_millis(300),
            event_capacity: 64,
        }
    }
}

impl BoardConfig {
    /// Sets the mutation timeout.
    #[must_use]
    pub const fn with_mutation_timeout(mut self, timeout: Duration) -> Self {
        self.mutation_timeout = timeout;
        self
    }

    /// Sets the handoff ceiling.
    #[must_use]
    pub const fn with_handoff_ceiling(mut self, ceiling: Duration) -> Self {
        self.handoff_ceiling = ceiling;
        self
    }

    /// Sets the event buffer size. Zero is raised to one.
    #[must_use]
    pub const fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = if capacity == 0 { 1 } else { capacity };
        self
    }
}
