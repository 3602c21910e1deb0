//! Core task operations shared between the Web API, Slack and the CLI
//!
//! ## Architecture
//!
//! ```text
//! Web (handlers)  ──┐
//! Slack commands  ──┼──> operations::tasks (this module) ──> storage
//! CLI             ──┘
//! ```

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::error::{DoltError, Result};
use crate::model::{DueBucket, SortHint, ViewSelector};
use crate::storage::groups::{self, Group};
use crate::storage::tasks::{self, Task, TaskUpdate};
use crate::storage::Database;

use super::filter;

/// Resolve a due value typed by a user.
///
/// Accepts the bucket keywords (`today`, `tomorrow`, `later` = two days out)
/// and ISO dates (`2026-05-01`).
pub fn resolve_due(literal: &str, today: NaiveDate) -> Result<NaiveDate> {
    let literal = literal.trim();
    if let Some(bucket) = DueBucket::from_keyword(&literal.to_lowercase()) {
        return bucket
            .anchor(today)
            .ok_or_else(|| DoltError::validation(format!("due date '{}' out of range", literal)));
    }
    if literal.eq_ignore_ascii_case("yesterday") {
        return today
            .checked_sub_days(Days::new(1))
            .ok_or_else(|| DoltError::validation("due date out of range"));
    }
    NaiveDate::parse_from_str(literal, "%Y-%m-%d")
        .map_err(|_| DoltError::validation(format!("unrecognised due date '{}'", literal)))
}

/// Flip a task between open and completed.
pub fn toggle_completed(db: &Database, user_id: i64, task_id: i64) -> Result<Task> {
    let task = tasks::get_task(db, user_id, task_id)?
        .ok_or_else(|| DoltError::not_found(format!("task {}", task_id)))?;

    tasks::update_task(
        db,
        user_id,
        task_id,
        &TaskUpdate {
            completed: Some(!task.completed),
            ..Default::default()
        },
    )
}

/// A group together with its open tasks.
#[derive(Debug, Clone, Serialize)]
pub struct GroupDetail {
    #[serde(flatten)]
    pub group: Group,
    pub tasks: Vec<Task>,
}

/// Load a group and its open tasks.
pub fn group_detail(
    db: &Database,
    user_id: i64,
    group_id: i64,
    sort: SortHint,
) -> Result<GroupDetail> {
    let group = groups::get_group(db, user_id, group_id)?
        .ok_or_else(|| DoltError::not_found(format!("group {}", group_id)))?;
    let tasks = filter::filter_tasks(db, user_id, ViewSelector::Group(group.id), sort)?;
    Ok(GroupDetail { group, tasks })
}
