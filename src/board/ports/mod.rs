//! Port contracts for the remote task store.
//!
//! The board only needs two things from the store: a way to request a
//! status change and a stream of authoritative snapshots.

pub mod mutation;
pub mod subscription;

pub use mutation::{MoveTaskRequest, TaskMutationError, TaskMutationPort, TaskMutationResult};
pub use subscription::BoardSubscription;
