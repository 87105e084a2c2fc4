//! Window search: try every contiguous day range the task may use.

use crate::config::DEFAULT_FRAGMENT_PENALTY;
use crate::model::{Day, Task};

use super::{slots_for, spill, water_fill, Distributor, Placement, Slot};

/// Evaluates every window of `k = 1..=available_days` consecutive days
/// starting anywhere from day 1 to one past the last day, water-fills the
/// task inside it and keeps the best-scoring candidate.
///
/// Score is `peak + (peak - trough) + fragment_penalty * days_touched`,
/// measured over the schedule through the furthest touched day. Ties keep the
/// first candidate, i.e. the smallest window, then the earliest start.
#[derive(Debug, Clone)]
pub struct WindowSearch {
    fragment_penalty: u32,
}

impl Default for WindowSearch {
    fn default() -> Self {
        Self::new(DEFAULT_FRAGMENT_PENALTY)
    }
}

impl WindowSearch {
    pub fn new(fragment_penalty: u32) -> Self {
        Self { fragment_penalty }
    }

    fn score(&self, existing: &[Slot], start_day: u32, minutes: &[u32], window: &[Slot]) -> u64 {
        let last_touched = minutes
            .iter()
            .rposition(|m| *m > 0)
            .map_or(0, |offset| start_day + offset as u32);
        let horizon = (existing.len() as u32).max(last_touched);

        let mut peak = 0u32;
        let mut trough = u32::MAX;
        for day_number in 1..=horizon {
            let mut load = existing
                .get(day_number as usize - 1)
                .map_or(0, |slot| slot.load);
            if day_number >= start_day {
                let offset = (day_number - start_day) as usize;
                if let (Some(&m), Some(slot)) = (minutes.get(offset), window.get(offset)) {
                    if m > 0 {
                        load = slot.load + slot.break_cost + m;
                    }
                }
            }
            peak = peak.max(load);
            trough = trough.min(load);
        }
        if horizon == 0 {
            trough = 0;
        }

        let fragments = minutes.iter().filter(|m| **m > 0).count() as u64;
        u64::from(peak) + u64::from(peak - trough) + u64::from(self.fragment_penalty) * fragments
    }
}

impl Distributor for WindowSearch {
    fn name(&self) -> &'static str {
        "window"
    }

    fn place(&self, task: &Task, days: &[Day]) -> Placement {
        let existing = slots_for(days, &task.id);
        let last_start = existing.len() as u32 + 1;
        let widest = if task.is_divisible() {
            task.available_days
        } else {
            1
        };

        let mut best: Option<(u64, Placement)> = None;
        for width in 1..=widest {
            for start_day in 1..=last_start {
                let window: Vec<Slot> = (0..width)
                    .map(|offset| {
                        existing
                            .get((start_day + offset) as usize - 1)
                            .copied()
                            .unwrap_or_else(Slot::fresh)
                    })
                    .collect();

                let Some(minutes) = water_fill(&window, task.total_minutes) else {
                    continue;
                };

                let score = self.score(&existing, start_day, &minutes, &window);
                if best.as_ref().is_none_or(|(best_score, _)| score < *best_score) {
                    best = Some((score, Placement { start_day, minutes }));
                }
            }
        }

        match best {
            Some((_, placement)) => placement,
            None => spill(task, last_start),
        }
    }
}
