//! 任务存储
//!
//! 所有读写都带 `user_id`，不属于该用户的任务视为不存在。

use chrono::{DateTime, Local, NaiveDate, Utc};
use rusqlite::types::ToSql;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::groups::{find_group, find_group_by_name};
use super::Database;
use crate::error::{DoltError, Result};
use crate::model::SortHint;

/// 任务数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    /// 截止日期（日历日）
    pub due: NaiveDate,
    pub important: bool,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub user_id: i64,
    pub group_id: Option<i64>,
}

/// 新任务指向的分组
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupRef {
    /// 按 ID
    Id(i64),
    /// 按名称（完全匹配，取第一个）
    Name(String),
}

/// 新任务字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    /// `None` 表示今天
    pub due: Option<NaiveDate>,
    pub important: bool,
    pub group: Option<GroupRef>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            due: None,
            important: false,
            group: None,
        }
    }
}

/// 任务修改（`None` 表示不改）
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskUpdate {
    pub title: Option<String>,
    /// `Some(None)` 清空描述
    #[serde(default, with = "double_option")]
    pub description: Option<Option<String>>,
    pub due: Option<NaiveDate>,
    pub important: Option<bool>,
    pub completed: Option<bool>,
    /// `Some(None)` 移出分组
    #[serde(default, with = "double_option")]
    pub group_id: Option<Option<i64>>,
}

/// 区分 "字段缺省" 与 "显式 null"
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

/// 列表查询谓词，各条件之间为 AND
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPredicate {
    pub completed: Option<bool>,
    pub important: Option<bool>,
    pub due_on_or_before: Option<NaiveDate>,
    pub due_on: Option<NaiveDate>,
    pub due_on_or_after: Option<NaiveDate>,
    pub group_id: Option<i64>,
}

impl TaskPredicate {
    /// 未完成任务
    pub fn open() -> Self {
        Self {
            completed: Some(false),
            ..Default::default()
        }
    }

    fn to_sql(&self) -> (String, Vec<Box<dyn ToSql>>) {
        let mut clauses = vec!["user_id = ?".to_string()];
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(completed) = self.completed {
            clauses.push("completed = ?".to_string());
            values.push(Box::new(completed));
        }
        if let Some(important) = self.important {
            clauses.push("important = ?".to_string());
            values.push(Box::new(important));
        }
        if let Some(date) = self.due_on_or_before {
            clauses.push("due <= ?".to_string());
            values.push(Box::new(date));
        }
        if let Some(date) = self.due_on {
            clauses.push("due = ?".to_string());
            values.push(Box::new(date));
        }
        if let Some(date) = self.due_on_or_after {
            clauses.push("due >= ?".to_string());
            values.push(Box::new(date));
        }
        if let Some(group_id) = self.group_id {
            clauses.push("group_id = ?".to_string());
            values.push(Box::new(group_id));
        }

        (clauses.join(" AND "), values)
    }
}

const TASK_COLUMNS: &str =
    "id, title, description, due, important, completed, created_at, user_id, group_id";

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        due: row.get(3)?,
        important: row.get(4)?,
        completed: row.get(5)?,
        created_at: row.get(6)?,
        user_id: row.get(7)?,
        group_id: row.get(8)?,
    })
}

fn order_clause(sort: SortHint) -> &'static str {
    match sort {
        SortHint::Default => "ORDER BY id",
        SortHint::Recent => "ORDER BY created_at DESC, id DESC",
        SortHint::Due => "ORDER BY due, id",
    }
}

fn find_task(conn: &Connection, user_id: i64, id: i64) -> Result<Option<Task>> {
    let sql = format!(
        "SELECT {} FROM tasks WHERE id = ?1 AND user_id = ?2",
        TASK_COLUMNS
    );
    Ok(conn
        .query_row(&sql, params![id, user_id], task_from_row)
        .optional()?)
}

/// 按谓词列出用户任务
pub fn list_tasks(
    db: &Database,
    user_id: i64,
    predicate: &TaskPredicate,
    sort: SortHint,
) -> Result<Vec<Task>> {
    let (where_clause, filters) = predicate.to_sql();
    let sql = format!(
        "SELECT {} FROM tasks WHERE {} {}",
        TASK_COLUMNS,
        where_clause,
        order_clause(sort)
    );

    let mut values: Vec<Box<dyn ToSql>> = vec![Box::new(user_id)];
    values.extend(filters);

    let conn = db.conn()?;
    let mut stmt = conn.prepare(&sql)?;
    let tasks = stmt
        .query_map(params_from_iter(values.iter()), task_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(tasks)
}

/// 获取单个任务
pub fn get_task(db: &Database, user_id: i64, id: i64) -> Result<Option<Task>> {
    let conn = db.conn()?;
    find_task(&conn, user_id, id)
}

/// 创建任务
///
/// 分组解析与插入在同一事务内完成，任何一步失败都不会留下记录。
pub fn create_task(db: &Database, user_id: i64, new_task: &NewTask) -> Result<Task> {
    let title = new_task.title.trim();
    if title.is_empty() {
        return Err(DoltError::validation("task title is required"));
    }

    let mut conn = db.conn()?;
    let tx = conn.transaction()?;

    let group_id = match &new_task.group {
        None => None,
        Some(GroupRef::Id(id)) => Some(
            find_group(&tx, user_id, *id)?
                .ok_or_else(|| DoltError::not_found(format!("group {}", id)))?
                .id,
        ),
        Some(GroupRef::Name(name)) => Some(
            find_group_by_name(&tx, user_id, name)?
                .ok_or_else(|| DoltError::not_found(format!("group '{}'", name)))?
                .id,
        ),
    };

    let task = Task {
        id: 0,
        title: title.to_string(),
        description: new_task
            .description
            .as_ref()
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
        due: new_task.due.unwrap_or_else(|| Local::now().date_naive()),
        important: new_task.important,
        completed: false,
        created_at: Utc::now(),
        user_id,
        group_id,
    };

    tx.execute(
        "INSERT INTO tasks (title, description, due, important, completed, created_at, user_id, group_id) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            task.title,
            task.description,
            task.due,
            task.important,
            task.completed,
            task.created_at,
            task.user_id,
            task.group_id
        ],
    )?;
    let id = tx.last_insert_rowid();
    tx.commit()?;

    Ok(Task { id, ..task })
}

/// 修改任务
pub fn update_task(db: &Database, user_id: i64, id: i64, update: &TaskUpdate) -> Result<Task> {
    let mut conn = db.conn()?;
    let tx = conn.transaction()?;

    let mut task =
        find_task(&tx, user_id, id)?.ok_or_else(|| DoltError::not_found(format!("task {}", id)))?;

    if let Some(title) = &update.title {
        let title = title.trim();
        if title.is_empty() {
            return Err(DoltError::validation("task title is required"));
        }
        task.title = title.to_string();
    }
    if let Some(description) = &update.description {
        task.description = description
            .as_ref()
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
    }
    if let Some(due) = update.due {
        task.due = due;
    }
    if let Some(important) = update.important {
        task.important = important;
    }
    if let Some(completed) = update.completed {
        task.completed = completed;
    }
    if let Some(group_id) = update.group_id {
        if let Some(gid) = group_id {
            find_group(&tx, user_id, gid)?
                .ok_or_else(|| DoltError::not_found(format!("group {}", gid)))?;
        }
        task.group_id = group_id;
    }

    tx.execute(
        "UPDATE tasks SET title = ?1, description = ?2, due = ?3, important = ?4, \
         completed = ?5, group_id = ?6 WHERE id = ?7 AND user_id = ?8",
        params![
            task.title,
            task.description,
            task.due,
            task.important,
            task.completed,
            task.group_id,
            task.id,
            user_id
        ],
    )?;
    tx.commit()?;

    Ok(task)
}

/// 删除任务
pub fn delete_task(db: &Database, user_id: i64, id: i64) -> Result<()> {
    let conn = db.conn()?;
    let affected = conn.execute(
        "DELETE FROM tasks WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
    )?;
    if affected == 0 {
        return Err(DoltError::not_found(format!("task {}", id)));
    }
    Ok(())
}
