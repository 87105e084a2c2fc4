//! Schedule API endpoints.
//!
//! `/scheduler` exposes the computed days and CRUD operations on tasks. Every
//! task mutation rebuilds the whole schedule before the response is sent.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use dayplan_allocation::{Assignment, Day, Task, DAY_CAPACITY_MINUTES};
use dayplan_id::{IdError, TaskId};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::ApiError;
use crate::api::request_context::RequestContext;
use crate::state::AppState;

/// Longest accepted task name.
pub const MAX_NAME_LEN: usize = 100;

/// Widest accepted window.
pub const MAX_AVAILABLE_DAYS: i64 = 30;

/// Create schedule routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_schedule).post(create_task))
        .route("/tasks", get(list_tasks))
        .route("/{task_id}", put(update_task).delete(delete_task))
}

// =============================================================================
// Request/Response Types
// =============================================================================

/// Request to create a task.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub name: String,

    /// Whole hours of work.
    pub total_hours: i64,

    /// Consecutive days the task may be spread over.
    pub available_days: i64,
}

/// Request to replace a task.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    /// Must match the ID in the path.
    pub id: String,

    pub name: String,

    pub total_hours: i64,

    pub available_days: i64,
}

/// A task as stored.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: String,
    pub name: String,
    pub total_hours: u32,
    pub total_minutes: u32,
    pub available_days: u32,
    pub is_divisible: bool,
}

impl From<&Task> for TaskResponse {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.to_string(),
            name: task.name.clone(),
            total_hours: task.total_minutes / 60,
            total_minutes: task.total_minutes,
            available_days: task.available_days,
            is_divisible: task.is_divisible(),
        }
    }
}

/// One day of the schedule.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayResponse {
    pub day_number: u32,
    pub total_minutes: u32,
    pub effective_load: u32,
    pub remaining_minutes: u32,
    pub assignments: Vec<AssignmentResponse>,
}

/// One task's share of a day.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResponse {
    pub task_id: String,
    pub task_name: String,
    pub minutes: u32,
    pub is_divisible: bool,

    /// Window start; divisible tasks only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_start_day: Option<u32>,

    /// Window length; divisible tasks only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_available_days: Option<u32>,
}

impl From<&Assignment> for AssignmentResponse {
    fn from(row: &Assignment) -> Self {
        Self {
            task_id: row.task_id.to_string(),
            task_name: row.task_name.clone(),
            minutes: row.minutes,
            is_divisible: row.is_divisible(),
            task_start_day: row.window.map(|w| w.start_day),
            task_available_days: row.window.map(|w| w.available_days),
        }
    }
}

impl From<&Day> for DayResponse {
    fn from(day: &Day) -> Self {
        Self {
            day_number: day.day_number,
            total_minutes: day.total_minutes(),
            effective_load: day.effective_load(),
            remaining_minutes: day.remaining_minutes(),
            assignments: day.assignments.iter().map(AssignmentResponse::from).collect(),
        }
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Validated task fields, before an ID is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFields {
    pub name: String,
    pub total_minutes: u32,
    pub available_days: u32,
}

impl TaskFields {
    fn into_task(self, id: TaskId) -> Task {
        Task::with_id(id, self.name, self.total_minutes, self.available_days)
    }
}

/// Check a task's shape and whether it can fit its own window.
pub fn validate_task(
    name: &str,
    total_hours: i64,
    available_days: i64,
) -> Result<TaskFields, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("invalid_name", "Task name cannot be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ApiError::bad_request(
            "invalid_name",
            format!("Task name cannot exceed {MAX_NAME_LEN} characters"),
        ));
    }

    if !(1..=MAX_AVAILABLE_DAYS).contains(&available_days) {
        return Err(ApiError::bad_request(
            "invalid_available_days",
            format!("Available days must be between 1 and {MAX_AVAILABLE_DAYS}"),
        ));
    }
    if total_hours < 1 {
        return Err(ApiError::bad_request(
            "invalid_total_hours",
            "Total hours must be at least 1",
        ));
    }

    let capacity = i64::from(DAY_CAPACITY_MINUTES);
    let total_minutes = total_hours.saturating_mul(60);
    if available_days == 1 && total_minutes > capacity {
        return Err(ApiError::bad_request(
            "task_too_long",
            format!(
                "The task is too long, with a maximum of {} hours allowed per day.",
                DAY_CAPACITY_MINUTES / 60
            ),
        ));
    }
    if available_days > 1 && total_minutes > capacity * available_days {
        return Err(ApiError::bad_request(
            "task_does_not_fit",
            "The task does not fit on the number of days given.",
        ));
    }

    // Both bounds were checked above, so the conversions cannot fail.
    Ok(TaskFields {
        name: name.to_string(),
        total_minutes: u32::try_from(total_minutes).unwrap_or(u32::MAX),
        available_days: u32::try_from(available_days).unwrap_or(1),
    })
}

fn parse_task_id(raw: &str, request_id: &str) -> Result<TaskId, ApiError> {
    raw.parse().map_err(|e: IdError| {
        ApiError::bad_request("invalid_task_id", format!("Invalid task ID: {e}"))
            .with_request_id(request_id.to_string())
    })
}

// =============================================================================
// Handlers
// =============================================================================

/// Get the computed schedule.
///
/// GET /scheduler
async fn get_schedule(State(state): State<AppState>) -> impl IntoResponse {
    let days = state.store().snapshot().await;
    let body: Vec<DayResponse> = days.iter().map(DayResponse::from).collect();
    Json(body)
}

/// List live tasks.
///
/// GET /scheduler/tasks
async fn list_tasks(State(state): State<AppState>) -> impl IntoResponse {
    let tasks = state.store().tasks().await;
    let body: Vec<TaskResponse> = tasks.iter().map(TaskResponse::from).collect();
    Json(body)
}

/// Add a task and rebuild the schedule.
///
/// POST /scheduler
async fn create_task(
    State(state): State<AppState>,
    ctx: RequestContext,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request_id = ctx.request_id;
    let Json(req) = payload.map_err(|e| ApiError::from(e).with_request_id(request_id.clone()))?;

    let fields = validate_task(&req.name, req.total_hours, req.available_days)
        .map_err(|e| e.with_request_id(request_id.clone()))?;
    let task = fields.into_task(TaskId::new());

    let task = state
        .store()
        .add_task(task)
        .await
        .map_err(|e| ApiError::from(e).with_request_id(request_id.clone()))?;

    info!(task_id = %task.id, request_id = %request_id, "Task created");
    Ok((StatusCode::CREATED, Json(TaskResponse::from(&task))).into_response())
}

/// Replace a task and rebuild the schedule.
///
/// PUT /scheduler/{task_id}
async fn update_task(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(task_id): Path<String>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request_id = ctx.request_id;
    let Json(req) = payload.map_err(|e| ApiError::from(e).with_request_id(request_id.clone()))?;
    let task_id = parse_task_id(&task_id, &request_id)?;

    let body_id = parse_task_id(&req.id, &request_id)?;
    if body_id != task_id {
        return Err(ApiError::bad_request(
            "id_mismatch",
            "Task ID in the body does not match the path",
        )
        .with_request_id(request_id));
    }

    let fields = validate_task(&req.name, req.total_hours, req.available_days)
        .map_err(|e| e.with_request_id(request_id.clone()))?;

    let task = state
        .store()
        .update_task(fields.into_task(task_id))
        .await
        .map_err(|e| ApiError::from(e).with_request_id(request_id.clone()))?;

    info!(task_id = %task.id, request_id = %request_id, "Task updated");
    Ok(Json(TaskResponse::from(&task)).into_response())
}

/// Remove a task and rebuild the schedule.
///
/// DELETE /scheduler/{task_id}
async fn delete_task(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(task_id): Path<String>,
) -> Result<Response, ApiError> {
    let request_id = ctx.request_id;
    let task_id = parse_task_id(&task_id, &request_id)?;

    if !state.store().delete_task(&task_id).await {
        return Err(ApiError::not_found(
            "task_not_found",
            format!("task not found: {task_id}"),
        )
        .with_request_id(request_id));
    }

    info!(task_id = %task_id, request_id = %request_id, "Task deleted");
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_validate_accepts_full_day() {
        let fields = validate_task("  Report  ", 10, 1).unwrap();
        assert_eq!(fields.name, "Report");
        assert_eq!(fields.total_minutes, 600);
        assert_eq!(fields.available_days, 1);
    }

    #[test]
    fn test_validate_accepts_full_window() {
        let fields = validate_task("Thesis", 30, 3).unwrap();
        assert_eq!(fields.total_minutes, 1800);
    }

    #[rstest]
    #[case::empty_name("", 1, 1, "invalid_name")]
    #[case::blank_name("   ", 1, 1, "invalid_name")]
    #[case::zero_days("a", 1, 0, "invalid_available_days")]
    #[case::too_many_days("a", 1, 31, "invalid_available_days")]
    #[case::zero_hours("a", 0, 1, "invalid_total_hours")]
    #[case::negative_hours("a", -3, 2, "invalid_total_hours")]
    #[case::too_long_for_one_day("a", 11, 1, "task_too_long")]
    #[case::too_long_for_window("a", 31, 3, "task_does_not_fit")]
    fn test_validate_rejects(
        #[case] name: &str,
        #[case] hours: i64,
        #[case] days: i64,
        #[case] code: &str,
    ) {
        let err = validate_task(name, hours, days).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), code);
    }

    #[test]
    fn test_validate_rejects_long_name() {
        let name = "x".repeat(MAX_NAME_LEN + 1);
        let err = validate_task(&name, 1, 1).unwrap_err();
        assert_eq!(err.code(), "invalid_name");
    }

    #[test]
    fn test_too_long_message() {
        let err = validate_task("a", 12, 1).unwrap_err();
        assert_eq!(
            err.problem.detail,
            "The task is too long, with a maximum of 10 hours allowed per day."
        );
    }

    #[test]
    fn test_parse_task_id_explains_rejection() {
        let err = parse_task_id("req_01HV4Z2WQXKJNM8GPQY6VBKC3D", "req_1").unwrap_err();
        assert_eq!(err.code(), "invalid_task_id");
        assert!(err.problem.detail.contains("expected a 'task_' ID"));
        assert_eq!(err.problem.request_id, "req_1");
    }

    #[test]
    fn test_assignment_response_carries_window() {
        let task = Task::new("c", 900, 3);
        let mut days = dayplan_allocation::AllocationEngine::default()
            .schedule(std::slice::from_ref(&task))
            .0;
        let day = days.remove(0);
        let body = DayResponse::from(&day);
        let row = &body.assignments[0];
        assert!(row.is_divisible);
        assert_eq!(row.task_start_day, Some(1));
        assert_eq!(row.task_available_days, Some(3));
    }
}
