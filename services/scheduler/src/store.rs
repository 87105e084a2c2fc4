//! In-memory schedule store.
//!
//! Holds the single [`Planner`] behind an async read-write lock. Mutations
//! take the write lock, so they are applied one at a time; readers clone the
//! current snapshot and release the lock before serializing.

use std::sync::Arc;

use dayplan_allocation::{AllocationEngine, AllocationResult, Day, Planner, Task};
use dayplan_id::TaskId;
use tokio::sync::RwLock;
use tracing::debug;

/// Counts reported by the readiness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub tasks: usize,
    pub days: usize,
}

pub struct ScheduleStore {
    planner: RwLock<Planner>,
}

impl ScheduleStore {
    pub fn new(engine: AllocationEngine) -> Self {
        Self {
            planner: RwLock::new(Planner::new(engine)),
        }
    }

    /// The current schedule.
    pub async fn snapshot(&self) -> Arc<[Day]> {
        self.planner.read().await.snapshot()
    }

    /// Live tasks in insertion order.
    pub async fn tasks(&self) -> Vec<Task> {
        self.planner.read().await.tasks().to_vec()
    }

    pub async fn stats(&self) -> StoreStats {
        let planner = self.planner.read().await;
        StoreStats {
            tasks: planner.tasks().len(),
            days: planner.snapshot().len(),
        }
    }

    /// Add a task and return it as stored.
    pub async fn add_task(&self, task: Task) -> AllocationResult<Task> {
        let mut planner = self.planner.write().await;
        planner.add_task(task.clone())?;
        debug!(report = ?planner.last_report(), "schedule rebuilt after add");
        Ok(task)
    }

    /// Replace a task and return it as stored.
    pub async fn update_task(&self, task: Task) -> AllocationResult<Task> {
        let mut planner = self.planner.write().await;
        planner.update_task(task.clone())?;
        debug!(report = ?planner.last_report(), "schedule rebuilt after update");
        Ok(task)
    }

    /// Remove a task. Returns false if it did not exist.
    pub async fn delete_task(&self, id: &TaskId) -> bool {
        self.planner.write().await.delete_task(id)
    }
}

impl Default for ScheduleStore {
    fn default() -> Self {
        Self::new(AllocationEngine::default())
    }
}
