//! Greedy minute-exhaustion placement.

use crate::model::{Day, Task};

use super::{slots_for, spill, Distributor, Placement, Slot};

/// Places a task by repeatedly taking the least-loaded day.
///
/// While a divisible task still has more than one split left, each step puts
/// `min(remaining, slack)` on the least-loaded day with any slack. The last
/// split, and every step of an indivisible task, looks for the least-loaded
/// day that can take the whole remainder, then a new day, then whatever fits.
///
/// The first chosen day anchors the task's window; later steps stay inside
/// `[anchor, anchor + available_days)`. If that window fills up the plan is
/// recomputed on fresh days after the schedule.
#[derive(Debug, Clone, Default)]
pub struct GreedySplit;

impl GreedySplit {
    pub fn new() -> Self {
        Self
    }

    fn plan(task: &Task, existing: &[Slot], anchor: Option<u32>) -> Option<Placement> {
        let span = task.available_days.max(1);
        let mut slots = existing.to_vec();
        let mut planned = vec![0u32; slots.len()];
        let mut anchor = anchor;
        let mut remaining = task.total_minutes;
        let mut splits_left = span;

        while remaining > 0 {
            let in_window =
                |day_number: u32| anchor.is_none_or(|a| day_number >= a && day_number < a + span);
            let splitting = task.is_divisible() && splits_left > 1;
            let needed = if splitting { 1 } else { remaining };

            let index = match least_loaded(&slots, needed, in_window) {
                Some(index) => index,
                None if in_window(slots.len() as u32 + 1) => {
                    slots.push(Slot::fresh());
                    planned.push(0);
                    slots.len() - 1
                }
                None if !splitting => least_loaded(&slots, 1, in_window)?,
                None => return None,
            };

            let minutes = remaining.min(slots[index].capacity);
            if minutes == 0 {
                return None;
            }
            slots[index].assign(minutes);
            planned[index] += minutes;
            remaining -= minutes;
            if splitting {
                splits_left -= 1;
            }
            anchor.get_or_insert(index as u32 + 1);
        }

        let start_day = anchor?;
        let last = planned.iter().rposition(|m| *m > 0)?;
        Some(Placement {
            start_day,
            minutes: planned[start_day as usize - 1..=last].to_vec(),
        })
    }
}

/// Least-loaded slot with at least `needed` minutes of capacity; ties go to
/// the earliest day.
fn least_loaded(slots: &[Slot], needed: u32, in_window: impl Fn(u32) -> bool) -> Option<usize> {
    slots
        .iter()
        .enumerate()
        .filter(|(index, slot)| in_window(*index as u32 + 1) && slot.capacity >= needed)
        .min_by_key(|(index, slot)| (slot.load, *index))
        .map(|(index, _)| index)
}

impl Distributor for GreedySplit {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn place(&self, task: &Task, days: &[Day]) -> Placement {
        let first_fresh = days.len() as u32 + 1;
        if !task.fits_window() {
            return spill(task, first_fresh);
        }

        let existing = slots_for(days, &task.id);
        Self::plan(task, &existing, None)
            .or_else(|| Self::plan(task, &existing, Some(first_fresh)))
            .unwrap_or_else(|| spill(task, first_fresh))
    }
}
