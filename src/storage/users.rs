//! 用户存储
//!
//! 用户只通过 Slack 身份登记，不做密码 / 会话管理。

use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::Database;
use crate::error::{DoltError, Result};

/// 用户数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    /// 显示名
    pub name: String,
    pub email: String,
    /// Slack 用户 ID (如 "U024BE7LH")
    pub slack_user_id: String,
    /// Slack workspace ID (如 "T024BE7LD")
    pub slack_team_id: String,
    /// 头像 URL
    pub slack_img_url: String,
}

/// 新用户字段
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub slack_user_id: String,
    pub slack_team_id: String,
    #[serde(default)]
    pub slack_img_url: String,
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        slack_user_id: row.get(3)?,
        slack_team_id: row.get(4)?,
        slack_img_url: row.get(5)?,
    })
}

const USER_COLUMNS: &str = "id, name, email, slack_user_id, slack_team_id, slack_img_url";

/// 登记用户；同一 Slack 用户已存在时直接返回已有记录
pub fn register_user(db: &Database, new_user: &NewUser) -> Result<User> {
    if new_user.name.trim().is_empty() {
        return Err(DoltError::validation("user name is required"));
    }
    if new_user.slack_user_id.trim().is_empty() || new_user.slack_team_id.trim().is_empty() {
        return Err(DoltError::validation("slack user id and team id are required"));
    }

    if let Some(existing) = get_user_by_slack_id(db, &new_user.slack_user_id)? {
        return Ok(existing);
    }

    let conn = db.conn()?;
    conn.execute(
        "INSERT INTO users (name, email, slack_user_id, slack_team_id, slack_img_url) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            new_user.name.trim(),
            new_user.email,
            new_user.slack_user_id,
            new_user.slack_team_id,
            new_user.slack_img_url
        ],
    )?;

    Ok(User {
        id: conn.last_insert_rowid(),
        name: new_user.name.trim().to_string(),
        email: new_user.email.clone(),
        slack_user_id: new_user.slack_user_id.clone(),
        slack_team_id: new_user.slack_team_id.clone(),
        slack_img_url: new_user.slack_img_url.clone(),
    })
}

/// 按 Slack 用户 ID 查找
pub fn get_user_by_slack_id(db: &Database, slack_user_id: &str) -> Result<Option<User>> {
    let conn = db.conn()?;
    let sql = format!(
        "SELECT {} FROM users WHERE slack_user_id = ?1 ORDER BY id LIMIT 1",
        USER_COLUMNS
    );
    Ok(conn
        .query_row(&sql, [slack_user_id], user_from_row)
        .optional()?)
}

/// 列出所有用户
pub fn list_users(db: &Database) -> Result<Vec<User>> {
    let conn = db.conn()?;
    let sql = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let users = stmt
        .query_map([], user_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(users)
}
