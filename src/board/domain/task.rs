//! Task record and the enumerations that classify it.

use super::{AgentId, BoardDomainError, ParseTaskPriorityError, ParseTaskStatusError, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Board column a task belongs to.
///
/// Declaration order is display order, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is being scoped.
    Planning,
    /// Task is ready to be picked up.
    Ready,
    /// Task is being worked on.
    InProgress,
    /// Task is awaiting review.
    InReview,
    /// Task has been completed.
    Done,
    /// Task cannot progress until something else happens.
    Blocked,
}

impl TaskStatus {
    /// Every status, in column display order.
    pub const ALL: [Self; 6] = [
        Self::Planning,
        Self::Ready,
        Self::InProgress,
        Self::InReview,
        Self::Done,
        Self::Blocked,
    ];

    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Ready => "ready",
            Self::InProgress => "in_progress",
            Self::InReview => "in_review",
            Self::Done => "done",
            Self::Blocked => "blocked",
        }
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "planning" => Ok(Self::Planning),
            "ready" => Ok(Self::Ready),
            "in_progress" => Ok(Self::InProgress),
            "in_review" => Ok(Self::InReview),
            "done" => Ok(Self::Done),
            "blocked" => Ok(Self::Blocked),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task urgency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    /// Can wait.
    Low,
    /// Default priority.
    #[default]
    Normal,
    /// Should be handled soon.
    High,
    /// Needs attention now.
    Urgent,
}

impl TaskPriority {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl TryFrom<&str> for TaskPriority {
    type Error = ParseTaskPriorityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(ParseTaskPriorityError(value.to_owned())),
        }
    }
}

/// A task as delivered by the remote store.
///
/// The board never edits a task in place: a status change produces a new
/// value through [`Task::with_status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: String,
    assigned_agent: AgentId,
    status: TaskStatus,
    #[serde(default)]
    priority: TaskPriority,
    #[serde(default)]
    project: Option<String>,
    created_by: String,
    created_at: DateTime<Utc>,
}

/// Parameter object for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    id: TaskId,
    title: String,
    assigned_agent: AgentId,
    created_by: String,
    status: TaskStatus,
    priority: TaskPriority,
    project: Option<String>,
}

impl NewTask {
    /// Creates a task request in the `planning` column with normal priority.
    #[must_use]
    pub fn new(
        id: TaskId,
        title: impl Into<String>,
        assigned_agent: AgentId,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            assigned_agent,
            created_by: created_by.into(),
            status: TaskStatus::Planning,
            priority: TaskPriority::Normal,
            project: None,
        }
    }

    /// Sets the initial status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the project tag.
    #[must_use]
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }
}

impl Task {
    /// Creates a task stamped with the clock's current time.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::EmptyTitle`] if the title is empty after
    /// trimming.
    pub fn create(data: NewTask, clock: &impl Clock) -> Result<Self, BoardDomainError> {
        let title = data.title.trim();
        if title.is_empty() {
            return Err(BoardDomainError::EmptyTitle);
        }

        Ok(Self {
            id: data.id,
            title: title.to_owned(),
            assigned_agent: data.assigned_agent,
            status: data.status,
            priority: data.priority,
            project: data.project,
            created_by: data.created_by,
            created_at: clock.utc(),
        })
    }

    /// Returns a copy of this task placed in another column.
    #[must_use]
    pub fn with_status(&self, status: TaskStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> &TaskId {
        &self.id
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the assigned agent.
    #[must_use]
    pub const fn assigned_agent(&self) -> &AgentId {
        &self.assigned_agent
    }

    /// Returns the task status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the task priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the project tag, if any.
    #[must_use]
    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    /// Returns who created the task.
    #[must_use]
    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
