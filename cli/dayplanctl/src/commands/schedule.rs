//! Schedule view.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::output::{format_minutes, print_output, print_single, OutputFormat};

use super::CommandContext;

/// Minutes of remaining capacity below which a day is shown as nearly full.
const NEARLY_FULL_MINUTES: u32 = 60;

/// Show the computed schedule.
#[derive(Debug, Args)]
pub struct ScheduleCommand {
    /// Hide days without tasks.
    #[arg(long)]
    hide_empty: bool,
}

/// One day from the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DayResponse {
    pub day_number: u32,
    pub total_minutes: u32,
    pub effective_load: u32,
    pub remaining_minutes: u32,
    pub assignments: Vec<AssignmentResponse>,
}

/// One task's share of a day from the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AssignmentResponse {
    pub task_id: String,
    pub task_name: String,
    pub minutes: u32,
    pub is_divisible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_start_day: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_available_days: Option<u32>,
}

/// Table row for one day.
#[derive(Debug, Serialize, Tabled)]
struct DayRow {
    #[tabled(rename = "Day")]
    day: u32,

    #[tabled(rename = "Load")]
    load: String,

    #[tabled(rename = "Remaining")]
    remaining: String,

    #[tabled(rename = "Tasks")]
    tasks: String,
}

impl ScheduleCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        let client = ctx.client()?;
        let mut days: Vec<DayResponse> = client.get("/scheduler").await?;

        if self.hide_empty {
            days.retain(|day| !day.assignments.is_empty());
        }

        match ctx.format {
            OutputFormat::Json => print_single(&days),
            OutputFormat::Table => {
                let rows: Vec<DayRow> = days.iter().map(day_row).collect();
                print_output(&rows, ctx.format);
            }
        }

        Ok(())
    }
}

fn day_row(day: &DayResponse) -> DayRow {
    let remaining = format_minutes(day.remaining_minutes);
    let remaining = if day.remaining_minutes == 0 {
        remaining.red().to_string()
    } else if day.remaining_minutes < NEARLY_FULL_MINUTES {
        remaining.yellow().to_string()
    } else {
        remaining
    };

    DayRow {
        day: day.day_number,
        load: format_minutes(day.effective_load),
        remaining,
        tasks: describe_assignments(&day.assignments),
    }
}

/// `Report 5h, Thesis 3h 20m (days 2-4)`; one line per task.
fn describe_assignments(assignments: &[AssignmentResponse]) -> String {
    if assignments.is_empty() {
        return "-".to_string();
    }
    assignments
        .iter()
        .map(|row| {
            let mut line = format!("{} {}", row.task_name, format_minutes(row.minutes));
            if let (Some(start), Some(days)) = (row.task_start_day, row.task_available_days) {
                let end = start + days.saturating_sub(1);
                line.push_str(&format!(" (days {start}-{end})"));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}
