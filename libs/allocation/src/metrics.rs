//! Derived per-day figures.
//!
//! Everything here is computed from the assignment list on demand; nothing is
//! cached on `Day`, so engine passes can mutate rows freely.

use dayplan_id::TaskId;

use crate::model::{Assignment, BREAK_MINUTES, DAY_CAPACITY_MINUTES};

/// Sum of assigned minutes.
pub fn total_minutes(assignments: &[Assignment]) -> u32 {
    assignments.iter().map(|a| a.minutes).sum()
}

/// Assigned minutes plus one break between each pair of adjacent rows.
pub fn effective_load(assignments: &[Assignment]) -> u32 {
    let breaks = assignments.len().saturating_sub(1) as u32;
    total_minutes(assignments) + breaks * BREAK_MINUTES
}

/// Capacity left on the day. Saturates at zero for overloaded days.
pub fn remaining_minutes(assignments: &[Assignment]) -> u32 {
    DAY_CAPACITY_MINUTES.saturating_sub(effective_load(assignments))
}

/// Minutes by which the day exceeds capacity.
pub fn overflow_minutes(assignments: &[Assignment]) -> u32 {
    effective_load(assignments).saturating_sub(DAY_CAPACITY_MINUTES)
}

/// Marginal room for one more distinct row: the remaining capacity minus the
/// break that row would introduce on a non-empty day.
pub fn available_minutes(assignments: &[Assignment]) -> u32 {
    let remaining = remaining_minutes(assignments);
    if assignments.is_empty() {
        remaining
    } else {
        remaining.saturating_sub(BREAK_MINUTES)
    }
}

/// Break cost of adding minutes for `task_id`: zero when the task already has
/// a row (minutes merge) or the day is empty.
pub fn break_cost_for(assignments: &[Assignment], task_id: &TaskId) -> u32 {
    if assignments.is_empty() || assignments.iter().any(|a| &a.task_id == task_id) {
        0
    } else {
        BREAK_MINUTES
    }
}

/// Minutes `task_id` could still add without exceeding capacity.
pub fn slack_for(assignments: &[Assignment], task_id: &TaskId) -> u32 {
    remaining_minutes(assignments).saturating_sub(break_cost_for(assignments, task_id))
}
