//! Decoding board snapshots from the store's JSON payloads.
//!
//! The store delivers a query result as a JSON array of task documents.

use crate::board::domain::{BoardState, Task};
use thiserror::Error;

/// Errors returned while decoding a snapshot payload.
#[derive(Debug, Error)]
pub enum SnapshotDecodeError {
    /// The payload is not a valid array of tasks.
    #[error("invalid snapshot payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decodes a snapshot payload into a board.
///
/// Tasks are grouped by their `status` field in payload order. A task
/// identifier that appears twice keeps its first occurrence.
///
/// # Errors
///
/// Returns [`SnapshotDecodeError::Json`] when the payload is malformed or a
/// task document has an invalid field, such as an empty identifier or an
/// unknown status.
pub fn decode_snapshot(payload: &str) -> Result<BoardState, SnapshotDecodeError> {
    let tasks: Vec<Task> = serde_json::from_str(payload)?;
    Ok(BoardState::from_tasks(tasks))
}
