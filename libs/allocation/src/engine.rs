//! Full-rebuild allocation engine.

use std::fmt;

use tracing::{debug, info, instrument};

use crate::config::{AllocationConfig, Strategy};
use crate::model::{Day, DayWindow, Task, DAY_CAPACITY_MINUTES};
use crate::repair::{RepairReport, PIPELINE};
use crate::solver::{Distributor, GreedySplit, Placement, WindowSearch};

/// Builds a schedule from a complete task list.
///
/// The engine holds no schedule state. Each call to [`schedule`] starts from
/// empty days, so the result depends only on the tasks and their order.
///
/// [`schedule`]: AllocationEngine::schedule
pub struct AllocationEngine {
    config: AllocationConfig,
    distributor: Box<dyn Distributor>,
}

impl AllocationEngine {
    /// Create an engine using the distributor named by `config.strategy`.
    pub fn new(config: AllocationConfig) -> Self {
        let distributor: Box<dyn Distributor> = match config.strategy {
            Strategy::WindowSearch => Box::new(WindowSearch::new(config.fragment_penalty)),
            Strategy::GreedySplit => Box::new(GreedySplit::new()),
        };
        Self {
            config,
            distributor,
        }
    }

    /// Create an engine with a custom distributor.
    pub fn with_distributor(config: AllocationConfig, distributor: Box<dyn Distributor>) -> Self {
        Self {
            config,
            distributor,
        }
    }

    pub fn config(&self) -> &AllocationConfig {
        &self.config
    }

    pub fn distributor_name(&self) -> &'static str {
        self.distributor.name()
    }

    /// Rebuild from `tasks` and run the repair pipeline.
    pub fn schedule(&self, tasks: &[Task]) -> (Vec<Day>, RepairReport) {
        let mut days = self.rebuild(tasks);
        let report = self.repair(&mut days);
        (days, report)
    }

    /// Place every task on fresh days, trying a few day counts and keeping
    /// the most level result.
    #[instrument(skip_all, fields(tasks = tasks.len(), strategy = self.distributor.name()))]
    pub fn rebuild(&self, tasks: &[Task]) -> Vec<Day> {
        let ordered = sort_for_placement(tasks);
        let estimated = estimated_days(tasks);

        let mut best: Option<(u32, Vec<Day>)> = None;
        for candidate in estimated..=estimated + self.config.extra_candidate_days {
            let mut days: Vec<Day> = (1..=candidate).map(Day::new).collect();
            for task in &ordered {
                self.distribute_task(task, &mut days);
            }

            let score = balance_score(&days);
            debug!(candidate, days = days.len(), score, "candidate built");
            if best.as_ref().is_none_or(|(best_score, _)| score < *best_score) {
                best = Some((score, days));
            }
        }

        let (score, days) = best.unwrap_or_else(|| (0, vec![Day::new(1)]));
        info!(days = days.len(), score, "schedule rebuilt");
        days
    }

    /// Place one task onto `days`, appending days when the placement runs
    /// past the end.
    pub fn distribute_task(&self, task: &Task, days: &mut Vec<Day>) {
        let placement = self.distributor.place(task, days);
        debug_assert_eq!(placement.total(), task.total_minutes);
        apply_placement(task, &placement, days);
    }

    /// Run every repair pass in order.
    pub fn repair(&self, days: &mut Vec<Day>) -> RepairReport {
        let mut report = RepairReport::default();
        for pass in PIPELINE {
            pass.apply(days, &self.config, &mut report);
            debug!(pass = %pass, days = days.len(), "repair pass done");
        }
        report
    }
}

impl Default for AllocationEngine {
    fn default() -> Self {
        Self::new(AllocationConfig::default())
    }
}

impl fmt::Debug for AllocationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllocationEngine")
            .field("config", &self.config)
            .field("distributor", &self.distributor.name())
            .finish()
    }
}

/// Tasks in placement order: fewest available days first, then shortest.
/// The sort is stable, so equal tasks keep their list order.
pub fn sort_for_placement(tasks: &[Task]) -> Vec<&Task> {
    let mut ordered: Vec<&Task> = tasks.iter().collect();
    ordered.sort_by_key(|task| (task.available_days, task.total_minutes));
    ordered
}

/// Fewest days that could hold every task, ignoring breaks; at least one.
pub fn estimated_days(tasks: &[Task]) -> u32 {
    let total: u64 = tasks.iter().map(|t| u64::from(t.total_minutes)).sum();
    let days = total.div_ceil(u64::from(DAY_CAPACITY_MINUTES));
    u32::try_from(days).unwrap_or(u32::MAX).max(1)
}

/// Difference between the heaviest and lightest day.
pub fn balance_score(days: &[Day]) -> u32 {
    let loads = days.iter().map(Day::effective_load);
    let peak = loads.clone().max().unwrap_or(0);
    let trough = loads.min().unwrap_or(0);
    peak - trough
}

fn apply_placement(task: &Task, placement: &Placement, days: &mut Vec<Day>) {
    let window = task.is_divisible().then(|| {
        DayWindow::new(
            placement.start_day,
            task.available_days.max(placement.span()),
        )
    });

    for (day_number, minutes) in placement.entries() {
        while (days.len() as u32) < day_number {
            days.push(Day::new(days.len() as u32 + 1));
        }
        days[day_number as usize - 1].add_minutes(task.id, &task.name, minutes, window);
    }
}
