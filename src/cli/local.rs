//! Commands that act on one user's data without the server:
//! `dolt tasks` and `dolt command`.

use crate::error::{DoltError, Result};
use crate::model::{SortHint, ViewSelector};
use crate::operations::filter;
use crate::slack::blocks::render_message;
use crate::slack::{interpret_slash_command, CommandKind};
use crate::storage::tasks::Task;
use crate::storage::users::{self, User};
use crate::storage::Database;

fn find_user(db: &Database, slack_user_id: &str) -> Result<User> {
    users::get_user_by_slack_id(db, slack_user_id)?
        .ok_or_else(|| DoltError::not_found(format!("user {}", slack_user_id)))
}

/// `dolt tasks`
pub fn list_tasks(db: &Database, slack_user_id: &str, view: &str, sort: &str) -> Result<()> {
    let user = find_user(db, slack_user_id)?;
    let view: ViewSelector = view.parse()?;
    let sort: SortHint = sort.parse()?;

    let tasks = filter::filter_tasks(db, user.id, view, sort)?;
    if tasks.is_empty() {
        println!("No tasks in view '{}'.", view);
    }
    for task in &tasks {
        println!("{}", format_task(task));
    }
    Ok(())
}

fn format_task(task: &Task) -> String {
    let mut line = format!(
        "[{}] #{:<4} {}  due {}",
        if task.completed { "x" } else { " " },
        task.id,
        task.title,
        task.due
    );
    if task.important {
        line.push_str("  !");
    }
    if let Some(group_id) = task.group_id {
        line.push_str(&format!("  (group {})", group_id));
    }
    line
}

/// `dolt command`: prints the Block Kit JSON Slack would receive.
pub fn run_command(
    db: &Database,
    slack_user_id: &str,
    kind: CommandKind,
    text: &str,
) -> Result<()> {
    let user = find_user(db, slack_user_id)?;
    let descriptor = interpret_slash_command(db, user.id, kind, text);
    println!("{}", serde_json::to_string_pretty(&render_message(&descriptor))?);
    Ok(())
}
