//! Optimistic task-board state for a remote reactive task store.
//!
//! The board renders tasks grouped by status column. Moves requested by the
//! user are overlaid on the authoritative snapshots delivered by the remote
//! store until the remote mutation resolves, and the first live snapshot
//! takes over from a statically rendered one without flicker. The module
//! follows hexagonal architecture:
//!
//! - Domain types and the pure reconciler in [`domain`]
//! - Port contracts for the remote store in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Coordination services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
