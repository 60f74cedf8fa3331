//! Taskboard: optimistic state for a task board backed by a remote store.
//!
//! The board renders tasks grouped by status column and feels instant when a
//! task is dragged between columns, even though the authoritative state lives
//! in a remote reactive store reachable only through asynchronous
//! subscriptions and mutations.
//!
//! # Architecture
//!
//! Taskboard follows hexagonal architecture principles:
//!
//! - **Domain**: Tasks, board snapshots, pending moves and the pure
//!   reconciler that merges them
//! - **Ports**: Abstract trait interfaces for the remote store
//! - **Adapters**: Concrete implementations of ports (in-memory store, JSON
//!   snapshot decoding)
//! - **Services**: The optimistic move coordinator and the static-to-live
//!   handoff
//!
//! # Modules
//!
//! - [`board`]: Board state, reconciliation, move coordination and handoff

pub mod board;
