//! Task list plus the schedule computed from it.

use std::sync::Arc;

use dayplan_id::TaskId;
use tracing::info;

use crate::engine::AllocationEngine;
use crate::error::{AllocationError, AllocationResult};
use crate::model::{Day, Task};
use crate::repair::RepairReport;

/// Owns the live tasks and the current schedule.
///
/// Every mutation rebuilds the whole schedule and swaps it in only once it is
/// complete, so [`snapshot`] never observes a half-built schedule.
///
/// [`snapshot`]: Planner::snapshot
#[derive(Debug)]
pub struct Planner {
    engine: AllocationEngine,
    tasks: Vec<Task>,
    days: Arc<[Day]>,
    last_report: RepairReport,
}

impl Planner {
    /// Create an empty planner; the schedule starts as a single empty day.
    pub fn new(engine: AllocationEngine) -> Self {
        Self {
            engine,
            tasks: Vec::new(),
            days: Arc::from(vec![Day::new(1)]),
            last_report: RepairReport::default(),
        }
    }

    pub fn engine(&self) -> &AllocationEngine {
        &self.engine
    }

    /// Live tasks in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get_task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    /// The current schedule.
    pub fn snapshot(&self) -> Arc<[Day]> {
        Arc::clone(&self.days)
    }

    /// What the repair pipeline did on the last rebuild.
    pub fn last_report(&self) -> &RepairReport {
        &self.last_report
    }

    /// Add a task and rebuild.
    pub fn add_task(&mut self, task: Task) -> AllocationResult<()> {
        validate(&task)?;
        if self.get_task(&task.id).is_some() {
            return Err(AllocationError::DuplicateTask(task.id));
        }
        info!(task_id = %task.id, minutes = task.total_minutes, "adding task");
        self.tasks.push(task);
        self.recompute();
        Ok(())
    }

    /// Replace a task's name, duration and window, then rebuild.
    pub fn update_task(&mut self, task: Task) -> AllocationResult<()> {
        validate(&task)?;
        let existing = self
            .tasks
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or(AllocationError::TaskNotFound(task.id))?;
        info!(task_id = %task.id, minutes = task.total_minutes, "updating task");
        *existing = task;
        self.recompute();
        Ok(())
    }

    /// Remove a task and rebuild. Returns false if no task has this ID.
    pub fn delete_task(&mut self, id: &TaskId) -> bool {
        let Some(index) = self.tasks.iter().position(|t| &t.id == id) else {
            return false;
        };
        info!(task_id = %id, "deleting task");
        self.tasks.remove(index);
        self.recompute();
        true
    }

    fn recompute(&mut self) {
        let (days, report) = self.engine.schedule(&self.tasks);
        self.days = Arc::from(days);
        self.last_report = report;
    }
}

impl Default for Planner {
    fn default() -> Self {
        Self::new(AllocationEngine::default())
    }
}

fn validate(task: &Task) -> AllocationResult<()> {
    if task.total_minutes == 0 {
        return Err(AllocationError::InvalidTask(
            "duration must be at least one minute".to_string(),
        ));
    }
    if task.available_days == 0 {
        return Err(AllocationError::InvalidTask(
            "available days must be at least 1".to_string(),
        ));
    }
    Ok(())
}
