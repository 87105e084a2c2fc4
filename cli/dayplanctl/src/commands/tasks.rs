//! Task management commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::error::CliError;
use crate::output::{print_output, print_single, print_success, OutputFormat};

use super::CommandContext;

/// Manage tasks.
#[derive(Debug, Args)]
pub struct TasksCommand {
    #[command(subcommand)]
    command: TasksSubcommand,
}

#[derive(Debug, Subcommand)]
enum TasksSubcommand {
    /// List all tasks.
    List,

    /// Add a task and rebuild the schedule.
    Add(AddArgs),

    /// Change a task and rebuild the schedule.
    Update(UpdateArgs),

    /// Remove a task and rebuild the schedule.
    Delete {
        /// Task ID.
        id: String,
    },
}

#[derive(Debug, Args)]
struct AddArgs {
    /// Task name.
    name: String,

    /// Total hours of work.
    #[arg(long)]
    hours: i64,

    /// Consecutive days the task may be spread over.
    #[arg(long, default_value_t = 1)]
    days: i64,
}

#[derive(Debug, Args)]
struct UpdateArgs {
    /// Task ID.
    id: String,

    /// New name.
    #[arg(long)]
    name: Option<String>,

    /// New total hours.
    #[arg(long)]
    hours: Option<i64>,

    /// New number of available days.
    #[arg(long)]
    days: Option<i64>,
}

/// Body for create requests.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateTaskRequest {
    name: String,
    total_hours: i64,
    available_days: i64,
}

/// Body for update requests.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
struct UpdateTaskRequest {
    id: String,
    name: String,
    total_hours: i64,
    available_days: i64,
}

/// A task from the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskResponse {
    id: String,
    name: String,
    total_hours: u32,
    total_minutes: u32,
    available_days: u32,
    is_divisible: bool,
}

/// Table row for one task.
#[derive(Debug, Serialize, Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,

    #[tabled(rename = "NAME")]
    name: String,

    #[tabled(rename = "HOURS")]
    hours: u32,

    #[tabled(rename = "DAYS")]
    days: u32,

    #[tabled(rename = "SPLIT")]
    split: &'static str,
}

impl From<&TaskResponse> for TaskRow {
    fn from(task: &TaskResponse) -> Self {
        Self {
            id: task.id.clone(),
            name: task.name.clone(),
            hours: task.total_hours,
            days: task.available_days,
            split: if task.is_divisible { "yes" } else { "no" },
        }
    }
}

impl TasksCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            TasksSubcommand::List => list_tasks(ctx).await,
            TasksSubcommand::Add(args) => add_task(ctx, args).await,
            TasksSubcommand::Update(args) => update_task(ctx, args).await,
            TasksSubcommand::Delete { id } => delete_task(ctx, id).await,
        }
    }
}

async fn list_tasks(ctx: CommandContext) -> Result<()> {
    let client = ctx.client()?;
    let tasks: Vec<TaskResponse> = client.get("/scheduler/tasks").await?;

    match ctx.format {
        OutputFormat::Json => print_single(&tasks),
        OutputFormat::Table => {
            let rows: Vec<TaskRow> = tasks.iter().map(TaskRow::from).collect();
            print_output(&rows, ctx.format);
        }
    }

    Ok(())
}

async fn add_task(ctx: CommandContext, args: AddArgs) -> Result<()> {
    let client = ctx.client()?;
    let request = CreateTaskRequest {
        name: args.name,
        total_hours: args.hours,
        available_days: args.days,
    };

    let task: TaskResponse = client.post("/scheduler", &request).await?;

    match ctx.format {
        OutputFormat::Json => print_single(&task),
        OutputFormat::Table => {
            print_success(&format!("Added task '{}' ({})", task.name, task.id));
        }
    }

    Ok(())
}

async fn update_task(ctx: CommandContext, args: UpdateArgs) -> Result<()> {
    let client = ctx.client()?;

    // The API replaces the whole task, so unset flags keep their current value.
    let tasks: Vec<TaskResponse> = client.get("/scheduler/tasks").await?;
    let current = tasks
        .iter()
        .find(|task| task.id == args.id)
        .ok_or_else(|| CliError::NotFound(args.id.clone()))?;
    let request = merge_update(current, args);

    let path = format!("/scheduler/{}", request.id);
    let task: TaskResponse = client.put(&path, &request).await?;

    match ctx.format {
        OutputFormat::Json => print_single(&task),
        OutputFormat::Table => {
            print_success(&format!("Updated task '{}' ({})", task.name, task.id));
        }
    }

    Ok(())
}

async fn delete_task(ctx: CommandContext, id: String) -> Result<()> {
    let client = ctx.client()?;
    client.delete(&format!("/scheduler/{}", id)).await?;

    print_success(&format!("Deleted task {}", id));
    Ok(())
}

fn merge_update(current: &TaskResponse, args: UpdateArgs) -> UpdateTaskRequest {
    UpdateTaskRequest {
        id: args.id,
        name: args.name.unwrap_or_else(|| current.name.clone()),
        total_hours: args.hours.unwrap_or(i64::from(current.total_hours)),
        available_days: args.days.unwrap_or(i64::from(current.available_days)),
    }
}
