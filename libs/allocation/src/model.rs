//! Schedule data model: tasks, days and per-day assignments.

use dayplan_id::TaskId;
use serde::{Deserialize, Serialize};

use crate::metrics;

/// Minutes of work a single day can hold, breaks included.
pub const DAY_CAPACITY_MINUTES: u32 = 600;

/// Overhead charged between two assignment rows on the same day.
pub const BREAK_MINUTES: u32 = 15;

/// A unit of work to be scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Stable identity, assigned at creation.
    pub id: TaskId,

    /// Display name.
    pub name: String,

    /// Total duration in whole minutes.
    pub total_minutes: u32,

    /// Number of consecutive days the task may be spread over.
    pub available_days: u32,
}

impl Task {
    /// Create a task with a fresh ID.
    pub fn new(name: impl Into<String>, total_minutes: u32, available_days: u32) -> Self {
        Self::with_id(TaskId::new(), name, total_minutes, available_days)
    }

    /// Create a task with a known ID.
    pub fn with_id(
        id: TaskId,
        name: impl Into<String>,
        total_minutes: u32,
        available_days: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            total_minutes,
            available_days,
        }
    }

    /// Returns true if the task may be split across days.
    pub fn is_divisible(&self) -> bool {
        self.available_days > 1
    }

    /// Most minutes this task could ever receive inside its window.
    pub fn window_capacity(&self) -> u32 {
        DAY_CAPACITY_MINUTES.saturating_mul(self.available_days.max(1))
    }

    /// Returns true if the task fits its window when every day is empty.
    pub fn fits_window(&self) -> bool {
        self.total_minutes <= self.window_capacity()
    }
}

/// The day range a divisible task was committed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayWindow {
    /// First day of the window (1-based).
    pub start_day: u32,

    /// Window length in days.
    pub available_days: u32,
}

impl DayWindow {
    pub fn new(start_day: u32, available_days: u32) -> Self {
        Self {
            start_day,
            available_days,
        }
    }

    /// Exclusive upper bound of the window.
    pub fn end_day(&self) -> u32 {
        self.start_day.saturating_add(self.available_days)
    }

    /// Returns true if `day_number` lies inside the window.
    pub fn contains(&self, day_number: u32) -> bool {
        day_number >= self.start_day && day_number < self.end_day()
    }
}

/// The share of one task placed on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub task_id: TaskId,

    /// Task name, copied for display.
    pub task_name: String,

    /// Minutes of the task scheduled on this day.
    pub minutes: u32,

    /// Window bounds; present only for divisible tasks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<DayWindow>,
}

impl Assignment {
    /// Returns true if the row belongs to a divisible task.
    pub fn is_divisible(&self) -> bool {
        self.window.is_some()
    }
}

/// One capacity-bounded bucket in the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Day {
    /// Position in the schedule, starting at 1.
    pub day_number: u32,

    /// Rows in insertion order.
    pub assignments: Vec<Assignment>,
}

impl Day {
    /// Create an empty day.
    pub fn new(day_number: u32) -> Self {
        Self {
            day_number,
            assignments: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// The row for `task_id`, if the task has minutes on this day.
    pub fn assignment_for(&self, task_id: &TaskId) -> Option<&Assignment> {
        self.assignments.iter().find(|a| &a.task_id == task_id)
    }

    pub fn total_minutes(&self) -> u32 {
        metrics::total_minutes(&self.assignments)
    }

    pub fn effective_load(&self) -> u32 {
        metrics::effective_load(&self.assignments)
    }

    pub fn remaining_minutes(&self) -> u32 {
        metrics::remaining_minutes(&self.assignments)
    }

    pub fn available_minutes(&self) -> u32 {
        metrics::available_minutes(&self.assignments)
    }

    pub fn overflow_minutes(&self) -> u32 {
        metrics::overflow_minutes(&self.assignments)
    }

    /// Minutes `task_id` could still add here without exceeding capacity.
    pub fn slack_for(&self, task_id: &TaskId) -> u32 {
        metrics::slack_for(&self.assignments, task_id)
    }

    /// Add minutes for a task, merging into its existing row if present.
    pub(crate) fn add_minutes(
        &mut self,
        task_id: TaskId,
        task_name: &str,
        minutes: u32,
        window: Option<DayWindow>,
    ) {
        if minutes == 0 {
            return;
        }
        match self.assignments.iter_mut().find(|a| a.task_id == task_id) {
            Some(existing) => existing.minutes += minutes,
            None => self.assignments.push(Assignment {
                task_id,
                task_name: task_name.to_string(),
                minutes,
                window,
            }),
        }
    }

    /// Remove up to `minutes` from the row at `index`, dropping the row when
    /// it reaches zero. Returns the removed row's data.
    pub(crate) fn take_minutes(&mut self, index: usize, minutes: u32) -> Option<Assignment> {
        let row = self.assignments.get_mut(index)?;
        let taken = minutes.min(row.minutes);
        row.minutes -= taken;
        let mut moved = row.clone();
        moved.minutes = taken;
        if row.minutes == 0 {
            self.assignments.remove(index);
        }
        Some(moved)
    }
}
