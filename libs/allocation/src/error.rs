//! Allocation errors.

use dayplan_id::TaskId;
use thiserror::Error;

/// Result type for planner operations.
pub type AllocationResult<T> = Result<T, AllocationError>;

/// Errors surfaced by the planner's public operations.
///
/// Placement itself never fails: the engine can always open another day.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// No live task has this ID.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// A task with this ID is already scheduled.
    #[error("task already exists: {0}")]
    DuplicateTask(TaskId),

    /// The task cannot be scheduled as described.
    #[error("invalid task: {0}")]
    InvalidTask(String),
}

impl AllocationError {
    /// Returns true if this error refers to an unknown task.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::TaskNotFound(_))
    }
}
