//! Per-task distribution strategies.
//!
//! A [`Distributor`] looks at the current days and decides how many minutes
//! of one task go on each day of a contiguous range. It never mutates the
//! schedule; the engine applies the returned [`Placement`].
//!
//! Both strategies must place exactly `task.total_minutes` and never give a
//! day more than its marginal slack for the task, so a placement applied to
//! the days it was computed against cannot overload them.

mod greedy;
mod window;

use dayplan_id::TaskId;

use crate::metrics;
use crate::model::{Day, Task, DAY_CAPACITY_MINUTES};

pub use greedy::GreedySplit;
pub use window::WindowSearch;

/// Minutes per day for one task, starting at `start_day`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Day number receiving `minutes[0]`.
    pub start_day: u32,

    /// Minutes for consecutive days; zero entries are skipped.
    pub minutes: Vec<u32>,
}

impl Placement {
    /// Total minutes in the placement.
    pub fn total(&self) -> u32 {
        self.minutes.iter().sum()
    }

    /// Number of days receiving minutes.
    pub fn days_touched(&self) -> usize {
        self.minutes.iter().filter(|m| **m > 0).count()
    }

    /// Days from `start_day` through the last day receiving minutes.
    pub fn span(&self) -> u32 {
        self.minutes
            .iter()
            .rposition(|m| *m > 0)
            .map_or(0, |last| last as u32 + 1)
    }

    /// Non-zero `(day_number, minutes)` pairs.
    pub fn entries(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.minutes
            .iter()
            .enumerate()
            .filter(|(_, m)| **m > 0)
            .map(|(offset, m)| (self.start_day + offset as u32, *m))
    }
}

/// A strategy that splits one task across days.
pub trait Distributor: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Compute where the task's minutes go given the current days.
    fn place(&self, task: &Task, days: &[Day]) -> Placement;
}

/// What one day offers a specific task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Slot {
    /// Current effective load.
    pub load: u32,

    /// Break charged if the task opens a row here.
    pub break_cost: u32,

    /// Most minutes the task may add.
    pub capacity: u32,
}

impl Slot {
    pub fn of(day: &Day, task_id: &TaskId) -> Self {
        Self {
            load: day.effective_load(),
            break_cost: metrics::break_cost_for(&day.assignments, task_id),
            capacity: day.slack_for(task_id),
        }
    }

    /// A day past the end of the schedule.
    pub fn fresh() -> Self {
        Self {
            load: 0,
            break_cost: 0,
            capacity: DAY_CAPACITY_MINUTES,
        }
    }

    /// Minutes this slot takes when the water level is `level`.
    fn take_at(&self, level: u32) -> u32 {
        level
            .saturating_sub(self.load + self.break_cost)
            .min(self.capacity)
    }

    /// Record `minutes` of the task landing here.
    pub fn assign(&mut self, minutes: u32) {
        self.load += self.break_cost + minutes;
        self.capacity -= minutes.min(self.capacity);
        self.break_cost = 0;
    }
}

/// Slots for every existing day, in day order.
pub(crate) fn slots_for(days: &[Day], task_id: &TaskId) -> Vec<Slot> {
    days.iter().map(|day| Slot::of(day, task_id)).collect()
}

/// Split `total` across `slots` so the resulting loads are as level as the
/// capacities allow. Returns `None` when the slots cannot hold `total`.
///
/// Finds the lowest water level whose fill covers `total`, fills every slot to
/// one below that level, then hands the last few minutes out one at a time
/// in slot order.
pub(crate) fn water_fill(slots: &[Slot], total: u32) -> Option<Vec<u32>> {
    let fill = |level: u32| -> u64 { slots.iter().map(|s| u64::from(s.take_at(level))).sum() };

    if total == 0 {
        return Some(vec![0; slots.len()]);
    }

    let mut hi = slots
        .iter()
        .map(|s| s.load + s.break_cost + s.capacity)
        .max()?;
    if fill(hi) < u64::from(total) {
        return None;
    }

    let mut lo = 0;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if fill(mid) >= u64::from(total) {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }

    // fill(0) is zero, so the level is at least 1 for a non-zero total.
    let level = lo;
    let mut minutes: Vec<u32> = slots.iter().map(|s| s.take_at(level - 1)).collect();
    let mut short = u64::from(total) - fill(level - 1);
    for (slot, assigned) in slots.iter().zip(minutes.iter_mut()) {
        if short == 0 {
            break;
        }
        if slot.take_at(level) > *assigned {
            *assigned += 1;
            short -= 1;
        }
    }

    Some(minutes)
}

/// Place the task on fresh days after the schedule, one full day at a time.
///
/// Used only when the task cannot fit its own window; boundary validation
/// keeps such tasks out of the server.
pub(crate) fn spill(task: &Task, first_day: u32) -> Placement {
    let mut minutes = Vec::new();
    let mut remaining = task.total_minutes;
    while remaining > 0 {
        let chunk = remaining.min(DAY_CAPACITY_MINUTES);
        minutes.push(chunk);
        remaining -= chunk;
    }
    Placement {
        start_day: first_day,
        minutes,
    }
}
