//! Group API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::error_status;
use crate::api::auth::CurrentUser;
use crate::model::SortHint;
use crate::operations::tasks::{group_detail, GroupDetail};
use crate::storage::groups::{self, Group};
use crate::storage::Database;

/// Group list response
#[derive(Debug, Serialize)]
pub struct GroupListResponse {
    pub groups: Vec<Group>,
}

/// Create group request
#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
}

/// Query parameters for a group's tasks
#[derive(Debug, Default, Deserialize)]
pub struct GroupDetailQuery {
    pub sort: Option<String>,
}

/// GET /api/v1/groups
pub async fn list_groups(
    State(db): State<Arc<Database>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<GroupListResponse>, StatusCode> {
    let groups = groups::list_groups(&db, user.id).map_err(error_status)?;
    Ok(Json(GroupListResponse { groups }))
}

/// POST /api/v1/groups
pub async fn create_group(
    State(db): State<Arc<Database>>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<Group>), StatusCode> {
    let group = groups::create_group(&db, user.id, &req.name).map_err(error_status)?;
    tracing::info!(user = user.id, group = group.id, "group created");
    Ok((StatusCode::CREATED, Json(group)))
}

/// GET /api/v1/groups/{id}
/// Group with its open tasks
pub async fn get_group(
    State(db): State<Arc<Database>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Query(query): Query<GroupDetailQuery>,
) -> Result<Json<GroupDetail>, StatusCode> {
    let sort: SortHint = query
        .sort
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(error_status)?;
    let detail = group_detail(&db, user.id, id, sort).map_err(error_status)?;
    Ok(Json(detail))
}

/// DELETE /api/v1/groups/{id}
pub async fn delete_group(
    State(db): State<Arc<Database>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, StatusCode> {
    groups::delete_group(&db, user.id, id).map_err(error_status)?;
    Ok(StatusCode::NO_CONTENT)
}
