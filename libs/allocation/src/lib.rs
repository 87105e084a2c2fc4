//! Task allocation engine.
//!
//! Places tasks (whole minutes of work) onto a sequence of capacity-bounded
//! days. Key concepts:
//!
//! - **Day**: a 600-minute bucket; every extra row on a day costs a 15-minute
//!   break.
//! - **Divisible task**: a task with a window of more than one day, which may
//!   be split across consecutive days inside that window.
//! - **Rebuild**: every mutation recomputes the whole schedule from the task
//!   list, then runs the repair pipeline (cleanup, rebalance, capacity repair).
//!
//! # Invariants
//!
//! - Every task's minutes are placed exactly once across all days
//! - Day numbers are contiguous from 1 and there is always at least one day
//! - No day exceeds capacity after repair
//! - Divisible rows never leave the window they were committed into

pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod model;
pub mod planner;
pub mod repair;
pub mod solver;

pub use config::{AllocationConfig, Strategy};
pub use engine::AllocationEngine;
pub use error::{AllocationError, AllocationResult};
pub use model::{Assignment, Day, DayWindow, Task, BREAK_MINUTES, DAY_CAPACITY_MINUTES};
pub use planner::Planner;
pub use repair::{RepairPass, RepairReport};
pub use solver::{Distributor, GreedySplit, Placement, WindowSearch};
