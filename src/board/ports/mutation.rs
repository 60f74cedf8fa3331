//! Mutation port for moving tasks between columns on the remote store.

use crate::board::domain::{TaskId, TaskStatus};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for remote mutations.
pub type TaskMutationResult<T> = Result<T, TaskMutationError>;

/// Request to place a task in another column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveTaskRequest {
    task_id: TaskId,
    target_status: TaskStatus,
}

impl MoveTaskRequest {
    /// Creates a move request.
    #[must_use]
    pub const fn new(task_id: TaskId, target_status: TaskStatus) -> Self {
        Self {
            task_id,
            target_status,
        }
    }

    /// Returns the task to move.
    #[must_use]
    pub const fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    /// Returns the column to move the task to.
    #[must_use]
    pub const fn target_status(&self) -> TaskStatus {
        self.target_status
    }
}

/// Remote mutation contract.
#[async_trait]
pub trait TaskMutationPort: Send + Sync {
    /// Asks the store to move a task.
    ///
    /// Resolving `Ok` means the store accepted the change; the new placement
    /// arrives separately through the snapshot subscription.
    ///
    /// # Errors
    ///
    /// Returns [`TaskMutationError::Rejected`] when the store refuses the
    /// move or [`TaskMutationError::Unavailable`] when it cannot be reached.
    async fn move_task(&self, request: MoveTaskRequest) -> TaskMutationResult<()>;
}

/// Errors returned by remote mutation implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskMutationError {
    /// The store refused the move, for example an illegal transition.
    #[error("move rejected: {reason}")]
    Rejected {
        /// Reason given by the store.
        reason: String,
    },

    /// Transport-level failure.
    #[error("store unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskMutationError {
    /// Creates a rejection with the store's reason.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    /// Wraps a transport error.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
