//! 任务分组存储
//!
//! 分组名只在同一用户内按完全匹配查找；同名分组允许存在，取 id 最小的一个。

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::Database;
use crate::error::{DoltError, Result};

/// 分组名最大长度
pub const MAX_GROUP_NAME_LEN: usize = 50;

/// 分组数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub user_id: i64,
}

fn group_from_row(row: &Row<'_>) -> rusqlite::Result<Group> {
    Ok(Group {
        id: row.get(0)?,
        name: row.get(1)?,
        user_id: row.get(2)?,
    })
}

pub(crate) fn find_group(conn: &Connection, user_id: i64, id: i64) -> Result<Option<Group>> {
    Ok(conn
        .query_row(
            "SELECT id, name, user_id FROM task_groups WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
            group_from_row,
        )
        .optional()?)
}

pub(crate) fn find_group_by_name(
    conn: &Connection,
    user_id: i64,
    name: &str,
) -> Result<Option<Group>> {
    Ok(conn
        .query_row(
            "SELECT id, name, user_id FROM task_groups WHERE user_id = ?1 AND name = ?2 \
             ORDER BY id LIMIT 1",
            params![user_id, name],
            group_from_row,
        )
        .optional()?)
}

/// 列出用户的所有分组（按创建顺序）
pub fn list_groups(db: &Database, user_id: i64) -> Result<Vec<Group>> {
    let conn = db.conn()?;
    let mut stmt =
        conn.prepare("SELECT id, name, user_id FROM task_groups WHERE user_id = ?1 ORDER BY id")?;
    let groups = stmt
        .query_map([user_id], group_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(groups)
}

/// 获取单个分组（不属于该用户视为不存在）
pub fn get_group(db: &Database, user_id: i64, id: i64) -> Result<Option<Group>> {
    let conn = db.conn()?;
    find_group(&conn, user_id, id)
}

/// 按名称查找分组
pub fn get_group_by_name(db: &Database, user_id: i64, name: &str) -> Result<Option<Group>> {
    let conn = db.conn()?;
    find_group_by_name(&conn, user_id, name)
}

/// 创建分组
pub fn create_group(db: &Database, user_id: i64, name: &str) -> Result<Group> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DoltError::validation("group name is required"));
    }
    if name.chars().count() > MAX_GROUP_NAME_LEN {
        return Err(DoltError::validation(format!(
            "group name longer than {} characters",
            MAX_GROUP_NAME_LEN
        )));
    }

    let conn = db.conn()?;
    conn.execute(
        "INSERT INTO task_groups (name, user_id) VALUES (?1, ?2)",
        params![name, user_id],
    )?;

    Ok(Group {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        user_id,
    })
}

/// 删除分组；组内任务保留，`group_id` 置空
pub fn delete_group(db: &Database, user_id: i64, id: i64) -> Result<()> {
    let conn = db.conn()?;
    let affected = conn.execute(
        "DELETE FROM task_groups WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
    )?;
    if affected == 0 {
        return Err(DoltError::not_found(format!("group {}", id)));
    }
    Ok(())
}
