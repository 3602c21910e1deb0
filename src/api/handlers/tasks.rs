//! Task API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Local;
use serde::{Deserialize, Serialize};

use super::error_status;
use crate::api::auth::CurrentUser;
use crate::model::{SortHint, ViewSelector};
use crate::operations::{filter, tasks as task_ops};
use crate::storage::tasks::{self, GroupRef, NewTask, Task, TaskUpdate};
use crate::storage::Database;

// ============================================================================
// Request/Response DTOs
// ============================================================================

/// Query parameters for listing tasks
#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    /// `all` | `important` | `completed` | `today` | `tomorrow` | `later` | `group:<id>`
    pub view: Option<String>,
    /// `default` | `recent` | `due`
    pub sort: Option<String>,
}

/// Task list response
#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub view: String,
    pub tasks: Vec<Task>,
}

/// Create task request
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    /// Keyword (`today`, `tomorrow`, `later`) or `YYYY-MM-DD`; blank means today
    pub due: Option<String>,
    #[serde(default)]
    pub important: bool,
    pub group_id: Option<i64>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/v1/tasks
pub async fn list_tasks(
    State(db): State<Arc<Database>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<TaskListQuery>,
) -> Result<Json<TaskListResponse>, StatusCode> {
    let view: ViewSelector = query
        .view
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(error_status)?;
    let sort: SortHint = query
        .sort
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(error_status)?;

    let tasks = filter::filter_tasks(&db, user.id, view, sort).map_err(error_status)?;
    Ok(Json(TaskListResponse {
        view: view.to_string(),
        tasks,
    }))
}

/// POST /api/v1/tasks
pub async fn create_task(
    State(db): State<Arc<Database>>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), StatusCode> {
    let due = match req.due.as_deref().map(str::trim) {
        Some(literal) if !literal.is_empty() => Some(
            task_ops::resolve_due(literal, Local::now().date_naive()).map_err(error_status)?,
        ),
        _ => None,
    };

    let new_task = NewTask {
        description: req.description,
        due,
        important: req.important,
        group: req.group_id.map(GroupRef::Id),
        ..NewTask::new(req.title)
    };

    let task = tasks::create_task(&db, user.id, &new_task).map_err(error_status)?;
    tracing::info!(user = user.id, task = task.id, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /api/v1/tasks/{id}
pub async fn get_task(
    State(db): State<Arc<Database>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Task>, StatusCode> {
    tasks::get_task(&db, user.id, id)
        .map_err(error_status)?
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// PATCH /api/v1/tasks/{id}
pub async fn update_task(
    State(db): State<Arc<Database>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(update): Json<TaskUpdate>,
) -> Result<Json<Task>, StatusCode> {
    let task = tasks::update_task(&db, user.id, id, &update).map_err(error_status)?;
    Ok(Json(task))
}

/// DELETE /api/v1/tasks/{id}
pub async fn delete_task(
    State(db): State<Arc<Database>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, StatusCode> {
    tasks::delete_task(&db, user.id, id).map_err(error_status)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/tasks/{id}/complete
/// Toggle completion
pub async fn complete_task(
    State(db): State<Arc<Database>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Task>, StatusCode> {
    let task = task_ops::toggle_completed(&db, user.id, id).map_err(error_status)?;
    Ok(Json(task))
}
