//! Schedule-wide repair passes.
//!
//! After a rebuild the engine runs [`PIPELINE`] over the days in order:
//! empty days are dropped, divisible rows are shifted toward lighter days, and
//! any day still over capacity sheds minutes inside its rows' windows.
//!
//! Only rows of divisible tasks ever move, and only to days inside the window
//! recorded on the row.

use std::fmt;

use tracing::{debug, warn};

use crate::config::AllocationConfig;
use crate::metrics;
use crate::model::Day;

/// One schedule-wide pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairPass {
    /// Drop empty days (never day 1), renumber, remap window starts.
    CleanupEmptyDays,

    /// Move divisible minutes from the heaviest days to lighter ones.
    GlobalRebalance,

    /// Shed minutes from days over capacity.
    EnsureCapacityLimit,
}

/// Passes run after every rebuild, in order.
pub const PIPELINE: [RepairPass; 3] = [
    RepairPass::CleanupEmptyDays,
    RepairPass::GlobalRebalance,
    RepairPass::EnsureCapacityLimit,
];

impl RepairPass {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CleanupEmptyDays => "cleanup_empty_days",
            Self::GlobalRebalance => "global_rebalance",
            Self::EnsureCapacityLimit => "ensure_capacity_limit",
        }
    }

    /// Run this pass, recording what it did in `report`.
    pub fn apply(&self, days: &mut Vec<Day>, config: &AllocationConfig, report: &mut RepairReport) {
        match self {
            Self::CleanupEmptyDays => {
                report.days_removed += cleanup_empty_days(days);
            }
            Self::GlobalRebalance => {
                let outcome = global_rebalance(days, config.max_rebalance_moves);
                report.rebalance_passes += outcome.passes;
                report.rebalance_settled = outcome.settled;
                report.rebalance_moves += outcome.moves;
                report.days_removed += outcome.days_removed;
            }
            Self::EnsureCapacityLimit => {
                let outcome = ensure_capacity_limit(days);
                report.capacity_moves += outcome.moves;
                report.overloaded_days = outcome.overloaded_days;
            }
        }
    }
}

impl fmt::Display for RepairPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Summary of one run of the repair pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Empty days removed, across every cleanup.
    pub days_removed: u32,

    /// Rebalance passes attempted.
    pub rebalance_passes: u32,

    /// The last rebalance reached a state no further pass changes.
    pub rebalance_settled: bool,

    /// Row moves made while rebalancing.
    pub rebalance_moves: u32,

    /// Row moves made while clearing overloaded days.
    pub capacity_moves: u32,

    /// Days still over capacity at the end.
    pub overloaded_days: u32,
}

/// Result of a rebalance run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebalanceOutcome {
    pub passes: u32,
    pub moves: u32,
    pub days_removed: u32,
    /// No further pass would move anything.
    pub settled: bool,
}

/// Result of a capacity repair run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapacityOutcome {
    pub moves: u32,
    pub overloaded_days: u32,
}

/// Drop every empty day except day 1 and renumber from 1.
///
/// Window starts follow their day to its new number; a start that pointed at
/// a removed day moves to the next surviving day. Returns the number of days
/// removed.
pub fn cleanup_empty_days(days: &mut Vec<Day>) -> u32 {
    let before = days.len();
    days.retain(|day| day.day_number == 1 || !day.is_empty());
    if days.is_empty() {
        days.push(Day::new(1));
    }

    let kept: Vec<u32> = days.iter().map(|day| day.day_number).collect();
    let renumber = |old: u32| kept.partition_point(|n| *n < old).min(kept.len() - 1) as u32 + 1;

    for (index, day) in days.iter_mut().enumerate() {
        day.day_number = index as u32 + 1;
        for row in &mut day.assignments {
            if let Some(window) = row.window.as_mut() {
                window.start_day = renumber(window.start_day);
            }
        }
    }

    let removed = before.saturating_sub(days.len()) as u32;
    if removed > 0 {
        debug!(removed, days = days.len(), "dropped empty days");
    }
    removed
}

/// Level the schedule by moving divisible minutes off the heaviest days.
///
/// Each pass stops at its first move. A move from a day with load `L` to a
/// day that would reach `D` before the move is at most `(L - D) / 2`, so both
/// days end below `L`: every move lowers the peak or the number of days at
/// the peak, and the loop reaches a state where no pass can move anything.
/// `max_moves` bounds the run; the outcome records whether it settled before
/// the bound. Days emptied by the moves are dropped at the end.
pub fn global_rebalance(days: &mut Vec<Day>, max_moves: u32) -> RebalanceOutcome {
    let mut outcome = RebalanceOutcome::default();

    loop {
        let Some((peak, trough)) = load_extremes(days) else {
            outcome.settled = true;
            break;
        };
        if peak - trough <= 1 {
            outcome.settled = true;
            break;
        }
        if outcome.moves >= max_moves {
            break;
        }

        outcome.passes += 1;
        if !rebalance_step(days, peak) {
            outcome.settled = true;
            break;
        }
        outcome.moves += 1;
    }

    if outcome.settled {
        debug!(
            passes = outcome.passes,
            moves = outcome.moves,
            "rebalance settled"
        );
    } else {
        warn!(
            moves = outcome.moves,
            "rebalance stopped at the move limit before settling"
        );
    }
    outcome.days_removed = cleanup_empty_days(days);
    outcome
}

/// Move the first feasible share off a day carrying the `peak` load.
fn rebalance_step(days: &mut [Day], peak: u32) -> bool {
    let sources: Vec<usize> = (0..days.len())
        .filter(|&i| days[i].effective_load() == peak)
        .collect();

    for from in sources {
        for row in rows_largest_first(&days[from]) {
            let assignment = &days[from].assignments[row];
            let Some(window) = assignment.window else {
                continue;
            };
            let task_id = assignment.task_id;
            let row_minutes = assignment.minutes;

            for to in destinations(days, from, |day| window.contains(day.day_number)) {
                let dest = &days[to];
                let reach =
                    dest.effective_load() + metrics::break_cost_for(&dest.assignments, &task_id);
                let gap = peak.saturating_sub(reach);
                let minutes = row_minutes.min(dest.slack_for(&task_id)).min(gap / 2);
                if minutes == 0 {
                    continue;
                }
                if transfer(days, from, row, to, minutes) {
                    return true;
                }
            }
        }
    }
    false
}

/// Shed minutes from every day over capacity into days with slack inside
/// each row's window. Days that cannot be cleared are counted and logged.
pub fn ensure_capacity_limit(days: &mut [Day]) -> CapacityOutcome {
    let mut outcome = CapacityOutcome::default();

    for from in 0..days.len() {
        loop {
            let excess = days[from].overflow_minutes();
            if excess == 0 || !shed_once(days, from, excess) {
                break;
            }
            outcome.moves += 1;
        }

        let remaining = days[from].overflow_minutes();
        if remaining > 0 {
            outcome.overloaded_days += 1;
            warn!(
                day = days[from].day_number,
                excess = remaining,
                "day remains over capacity"
            );
        }
    }

    outcome
}

fn shed_once(days: &mut [Day], from: usize, excess: u32) -> bool {
    for row in rows_largest_first(&days[from]) {
        let assignment = &days[from].assignments[row];
        let Some(window) = assignment.window else {
            continue;
        };
        let task_id = assignment.task_id;
        let row_minutes = assignment.minutes;

        let candidates = destinations(days, from, |day| {
            window.contains(day.day_number) && day.slack_for(&task_id) > 0
        });
        if let Some(&to) = candidates.first() {
            let minutes = row_minutes.min(days[to].slack_for(&task_id)).min(excess);
            return transfer(days, from, row, to, minutes);
        }
    }
    false
}

/// Row indices on `day`, largest minutes first.
fn rows_largest_first(day: &Day) -> Vec<usize> {
    let mut rows: Vec<usize> = (0..day.assignments.len()).collect();
    rows.sort_by_key(|&i| std::cmp::Reverse(day.assignments[i].minutes));
    rows
}

/// Day indices other than `from` accepted by `allowed`, lightest first.
fn destinations(days: &[Day], from: usize, allowed: impl Fn(&Day) -> bool) -> Vec<usize> {
    let mut targets: Vec<usize> = (0..days.len())
        .filter(|&i| i != from && allowed(&days[i]))
        .collect();
    targets.sort_by_key(|&i| (days[i].effective_load(), days[i].day_number));
    targets
}

fn load_extremes(days: &[Day]) -> Option<(u32, u32)> {
    let peak = days.iter().map(Day::effective_load).max()?;
    let trough = days.iter().map(Day::effective_load).min()?;
    Some((peak, trough))
}

/// Move `minutes` of the row at `row` on day `from` to day `to`, merging into
/// an existing row for the same task.
fn transfer(days: &mut [Day], from: usize, row: usize, to: usize, minutes: u32) -> bool {
    if minutes == 0 || from == to {
        return false;
    }
    let Some(moved) = days[from].take_minutes(row, minutes) else {
        return false;
    };
    days[to].add_minutes(moved.task_id, &moved.task_name, moved.minutes, moved.window);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MAX_REBALANCE_MOVES;
    use crate::model::{DayWindow, Task};

    fn place(day: &mut Day, task: &Task, minutes: u32, window: Option<DayWindow>) {
        day.add_minutes(task.id, &task.name, minutes, window);
    }

    fn loads(days: &[Day]) -> Vec<u32> {
        days.iter().map(Day::effective_load).collect()
    }

    #[test]
    fn test_cleanup_renumbers_and_remaps_windows() {
        let c = Task::new("c", 400, 2);
        let d = Task::new("d", 100, 1);
        let mut days: Vec<Day> = (1..=5).map(Day::new).collect();
        place(&mut days[2], &c, 400, Some(DayWindow::new(3, 2)));
        place(&mut days[4], &d, 100, None);

        let removed = cleanup_empty_days(&mut days);

        assert_eq!(removed, 2);
        let numbers: Vec<u32> = days.iter().map(|d| d.day_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert!(days[0].is_empty());
        let window = days[1].assignments[0].window.unwrap();
        assert_eq!(window.start_day, 2);
    }

    #[test]
    fn test_cleanup_moves_removed_start_to_next_day() {
        let c = Task::new("c", 200, 3);
        let mut days: Vec<Day> = (1..=3).map(Day::new).collect();
        place(&mut days[0], &Task::new("a", 50, 1), 50, None);
        place(&mut days[2], &c, 200, Some(DayWindow::new(2, 3)));

        cleanup_empty_days(&mut days);

        assert_eq!(days.len(), 2);
        let window = days[1].assignments[0].window.unwrap();
        assert_eq!(window.start_day, 2);
        assert!(window.contains(days[1].day_number));
    }

    #[test]
    fn test_cleanup_keeps_day_one() {
        let mut days: Vec<Day> = (1..=3).map(Day::new).collect();
        assert_eq!(cleanup_empty_days(&mut days), 2);
        assert_eq!(days, vec![Day::new(1)]);

        let mut none = Vec::new();
        cleanup_empty_days(&mut none);
        assert_eq!(none, vec![Day::new(1)]);
    }

    #[test]
    fn test_rebalance_moves_half_the_gap() {
        let x = Task::new("x", 400, 2);
        let y = Task::new("y", 100, 1);
        let mut days = vec![Day::new(1), Day::new(2)];
        place(&mut days[0], &x, 400, Some(DayWindow::new(1, 2)));
        place(&mut days[1], &y, 100, None);

        let outcome = global_rebalance(&mut days, 25);

        // Gap 400 - (100 + 15) = 285, so 142 minutes move.
        assert_eq!(outcome.moves, 1);
        assert_eq!(loads(&days), vec![258, 257]);
        assert_eq!(days[1].assignment_for(&x.id).unwrap().minutes, 142);
    }

    #[test]
    fn test_rebalance_leaves_indivisible_rows() {
        let a = Task::new("a", 500, 1);
        let b = Task::new("b", 100, 1);
        let mut days = vec![Day::new(1), Day::new(2)];
        place(&mut days[0], &a, 500, None);
        place(&mut days[1], &b, 100, None);

        let outcome = global_rebalance(&mut days, 25);

        assert_eq!(outcome.moves, 0);
        assert_eq!(loads(&days), vec![500, 100]);
    }

    #[test]
    fn test_rebalance_stays_in_window() {
        let x = Task::new("x", 500, 2);
        let z = Task::new("z", 450, 1);
        let mut days = vec![Day::new(1), Day::new(2), Day::new(3)];
        place(&mut days[0], &x, 500, Some(DayWindow::new(1, 2)));
        place(&mut days[1], &z, 450, None);

        global_rebalance(&mut days, 25);

        // Day 3 is outside the window, stays empty and is dropped.
        assert_eq!(days.len(), 2);
        assert_eq!(loads(&days), vec![483, 482]);
    }

    #[test]
    fn test_rebalance_second_run_is_idle() {
        let x = Task::new("x", 900, 3);
        let mut days: Vec<Day> = (1..=3).map(Day::new).collect();
        place(&mut days[0], &x, 600, Some(DayWindow::new(1, 3)));
        place(&mut days[1], &x, 300, Some(DayWindow::new(1, 3)));

        global_rebalance(&mut days, 1_000);
        let settled = days.clone();
        let again = global_rebalance(&mut days, 1_000);

        assert_eq!(again.moves, 0);
        assert_eq!(days, settled);
        let total: u32 = days.iter().map(Day::total_minutes).sum();
        assert_eq!(total, 900);
    }

    #[test]
    fn test_rebalance_reports_move_limit() {
        let x = Task::new("x", 900, 3);
        let mut days: Vec<Day> = (1..=3).map(Day::new).collect();
        place(&mut days[0], &x, 600, Some(DayWindow::new(1, 3)));
        place(&mut days[1], &x, 300, Some(DayWindow::new(1, 3)));

        let stopped = global_rebalance(&mut days, 0);
        assert!(!stopped.settled);
        assert_eq!(stopped.moves, 0);
        assert_eq!(loads(&days), vec![600, 300, 0]);

        let finished = global_rebalance(&mut days, DEFAULT_MAX_REBALANCE_MOVES);
        assert!(finished.settled);
        assert_eq!(loads(&days), vec![300, 300, 300]);
    }

    #[test]
    fn test_capacity_repair_sheds_excess() {
        let x = Task::new("x", 500, 2);
        let y = Task::new("y", 200, 1);
        let z = Task::new("z", 100, 1);
        let mut days = vec![Day::new(1), Day::new(2)];
        place(&mut days[0], &x, 500, Some(DayWindow::new(1, 2)));
        place(&mut days[0], &y, 200, None);
        place(&mut days[1], &z, 100, None);
        assert_eq!(days[0].overflow_minutes(), 115);

        let outcome = ensure_capacity_limit(&mut days);

        assert_eq!(outcome.moves, 1);
        assert_eq!(outcome.overloaded_days, 0);
        assert_eq!(loads(&days), vec![600, 230]);
    }

    #[test]
    fn test_capacity_repair_reports_stuck_day() {
        let mut days = vec![Day::new(1), Day::new(2)];
        place(&mut days[0], &Task::new("a", 400, 1), 400, None);
        place(&mut days[0], &Task::new("b", 300, 1), 300, None);

        let outcome = ensure_capacity_limit(&mut days);

        assert_eq!(outcome.moves, 0);
        assert_eq!(outcome.overloaded_days, 1);
        assert_eq!(days[0].effective_load(), 715);
    }

    #[test]
    fn test_pipeline_order() {
        let names: Vec<&str> = PIPELINE.iter().map(RepairPass::name).collect();
        assert_eq!(
            names,
            vec!["cleanup_empty_days", "global_rebalance", "ensure_capacity_limit"]
        );
    }
}
