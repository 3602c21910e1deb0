//! Slash-command interpreter
//!
//! Executes a parsed [`SlashCommand`] for an already-resolved user and produces a
//! transport-neutral [`ResponseDescriptor`]. Failures never reach the caller: the
//! cause is logged and the user gets the fixed apology text.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};
use serde::Serialize;

use super::command::{self, CommandKind, CreateTask, SlashCommand, TaskQuery};
use crate::error::Result;
use crate::model::{DueBucket, SortHint, ViewSelector};
use crate::operations::{filter, tasks::resolve_due};
use crate::storage::tasks::{GroupRef, NewTask, Task};
use crate::storage::{groups, tasks, Database};

pub const TASKS_HEADER: &str = "Here are all of your open tasks";
pub const NO_OPEN_TASKS: &str = "You currently have no open tasks. Nice work! :thumbsup:";
pub const GROUPS_HEADER: &str = "Here are all of your groups";
pub const NO_GROUPS: &str =
    "You currently have no groups. Feel free to create one with /dolt.group :pray:";
pub const TASK_CREATED: &str = "Success! Your new task is added, now get to work :muscle:";
pub const GROUP_CREATED: &str =
    "Success! Your new group is added. Start adding tasks to it with /dolt.task :pencil:";
pub const SOMETHING_WENT_WRONG: &str =
    "Sorry, something went wrong :worried: Please check your parameters and try again!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    Success,
    Empty,
    Error,
}

/// What to tell the user, before transport formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseDescriptor {
    pub kind: ResponseKind,
    /// Present for non-empty listings
    pub header: Option<String>,
    pub items: Vec<String>,
}

impl ResponseDescriptor {
    fn message(kind: ResponseKind, text: &str) -> Self {
        Self {
            kind,
            header: None,
            items: vec![text.to_string()],
        }
    }

    fn listing(header: &str, items: Vec<String>, when_empty: &str) -> Self {
        if items.is_empty() {
            Self::message(ResponseKind::Empty, when_empty)
        } else {
            Self {
                kind: ResponseKind::Success,
                header: Some(header.to_string()),
                items,
            }
        }
    }

    pub fn failure() -> Self {
        Self::message(ResponseKind::Error, SOMETHING_WENT_WRONG)
    }
}

/// Interpret a slash command relative to today's date.
pub fn interpret_slash_command(
    db: &Database,
    user_id: i64,
    kind: CommandKind,
    text: &str,
) -> ResponseDescriptor {
    interpret_slash_command_on(db, user_id, kind, text, Local::now().date_naive())
}

/// Interpret a slash command relative to an explicit `today`.
pub fn interpret_slash_command_on(
    db: &Database,
    user_id: i64,
    kind: CommandKind,
    text: &str,
    today: NaiveDate,
) -> ResponseDescriptor {
    match execute(db, user_id, kind, text, today) {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(user_id, command = %kind, text, error = %e, "slash command failed");
            ResponseDescriptor::failure()
        }
    }
}

fn execute(
    db: &Database,
    user_id: i64,
    kind: CommandKind,
    text: &str,
    today: NaiveDate,
) -> Result<ResponseDescriptor> {
    match command::parse(kind, text)? {
        SlashCommand::QueryTasks(query) => {
            let titles = query_tasks(db, user_id, &query, today)?
                .into_iter()
                .map(|t| t.title)
                .collect();
            Ok(ResponseDescriptor::listing(TASKS_HEADER, titles, NO_OPEN_TASKS))
        }
        SlashCommand::CreateTask(create) => {
            let task = create_task(db, user_id, &create, today)?;
            tracing::info!(user_id, task_id = task.id, "task created from slack");
            Ok(ResponseDescriptor::message(ResponseKind::Success, TASK_CREATED))
        }
        SlashCommand::QueryGroups => {
            let names = groups::list_groups(db, user_id)?
                .into_iter()
                .map(|g| g.name)
                .collect();
            Ok(ResponseDescriptor::listing(GROUPS_HEADER, names, NO_GROUPS))
        }
        SlashCommand::CreateGroup { name } => {
            let group = groups::create_group(db, user_id, &name)?;
            tracing::info!(user_id, group_id = group.id, "group created from slack");
            Ok(ResponseDescriptor::message(ResponseKind::Success, GROUP_CREATED))
        }
    }
}

/// Union of the views selected by each marker, deduplicated, in id order.
///
/// No markers means every open task.
pub fn query_tasks(
    db: &Database,
    user_id: i64,
    query: &TaskQuery,
    today: NaiveDate,
) -> Result<Vec<Task>> {
    if !query.has_markers() {
        return filter::filter_tasks_on(db, user_id, ViewSelector::All, SortHint::Default, today);
    }

    let mut views = Vec::new();
    if let Some(due) = &query.due {
        match DueBucket::from_keyword(&due.to_lowercase()) {
            Some(bucket) => views.push(ViewSelector::Due(bucket)),
            None => tracing::debug!(user_id, due = %due, "ignoring unknown due keyword"),
        }
    }
    if query.important {
        views.push(ViewSelector::Important);
    }
    if let Some(name) = &query.group {
        if let Some(group) = groups::get_group_by_name(db, user_id, name)? {
            views.push(ViewSelector::Group(group.id));
        }
    }

    let mut merged = BTreeMap::new();
    for view in views {
        for task in filter::filter_tasks_on(db, user_id, view, SortHint::Default, today)? {
            merged.entry(task.id).or_insert(task);
        }
    }
    Ok(merged.into_values().collect())
}

fn create_task(db: &Database, user_id: i64, create: &CreateTask, today: NaiveDate) -> Result<Task> {
    let due = create
        .due
        .as_deref()
        .map(|literal| resolve_due(literal, today))
        .transpose()?;

    let new_task = NewTask {
        title: create.title.clone(),
        description: create.description.clone(),
        due: Some(due.unwrap_or(today)),
        important: create.important,
        group: create.group.clone().map(GroupRef::Name),
    };
    tasks::create_task(db, user_id, &new_task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::groups::create_group;
    use crate::storage::tasks::{list_tasks, TaskPredicate};
    use crate::storage::users::tests::{janice, marcus};
    use chrono::Days;

    fn today() -> NaiveDate {
        NaiveDate::parse_from_str("2026-09-01", "%Y-%m-%d").unwrap()
    }

    fn run(db: &Database, user_id: i64, kind: CommandKind, text: &str) -> ResponseDescriptor {
        interpret_slash_command_on(db, user_id, kind, text, today())
    }

    fn all_tasks(db: &Database, user_id: i64) -> Vec<Task> {
        list_tasks(db, user_id, &TaskPredicate::default(), SortHint::Default).unwrap()
    }

    #[test]
    fn test_create_task_from_command() {
        let db = Database::open_in_memory().unwrap();
        let user = janice(&db);

        let response = run(
            &db,
            user.id,
            CommandKind::Task,
            "\"Buy milk\" <for the party> $tomorrow *",
        );
        assert_eq!(
            response,
            ResponseDescriptor {
                kind: ResponseKind::Success,
                header: None,
                items: vec![TASK_CREATED.to_string()],
            }
        );

        let tasks = all_tasks(&db, user.id);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Buy milk");
        assert_eq!(tasks[0].description.as_deref(), Some("for the party"));
        assert_eq!(tasks[0].due, today().checked_add_days(Days::new(1)).unwrap());
        assert!(tasks[0].important);
    }

    #[test]
    fn test_create_task_defaults_due_to_today() {
        let db = Database::open_in_memory().unwrap();
        let user = janice(&db);

        run(&db, user.id, CommandKind::Task, "\"Clean the garage\"");
        let tasks = all_tasks(&db, user.id);
        assert_eq!(tasks[0].due, today());
        assert!(!tasks[0].important);
        assert_eq!(tasks[0].group_id, None);
    }

    #[test]
    fn test_create_task_in_existing_group() {
        let db = Database::open_in_memory().unwrap();
        let user = janice(&db);
        let group = create_group(&db, user.id, "Errands").unwrap();

        let response = run(&db, user.id, CommandKind::Task, "\"Post letter\" (Errands)");
        assert_eq!(response.kind, ResponseKind::Success);
        assert_eq!(all_tasks(&db, user.id)[0].group_id, Some(group.id));
    }

    #[test]
    fn test_create_task_in_missing_group_fails_cleanly() {
        let db = Database::open_in_memory().unwrap();
        let user = janice(&db);

        let response = run(&db, user.id, CommandKind::Task, "\"Post letter\" (Errands)");
        assert_eq!(response, ResponseDescriptor::failure());
        assert_eq!(response.items, vec![SOMETHING_WENT_WRONG.to_string()]);
        assert!(all_tasks(&db, user.id).is_empty());
    }

    #[test]
    fn test_another_users_group_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let owner = janice(&db);
        let other = marcus(&db);
        create_group(&db, owner.id, "Errands").unwrap();

        let response = run(&db, other.id, CommandKind::Task, "\"Post letter\" (Errands)");
        assert_eq!(response.kind, ResponseKind::Error);
        assert!(all_tasks(&db, other.id).is_empty());
    }

    #[test]
    fn test_create_failures_use_generic_message() {
        let db = Database::open_in_memory().unwrap();
        let user = janice(&db);

        for text in ["<no title here>", "\"Bad date\" $someday", "\"unterminated"] {
            assert_eq!(
                run(&db, user.id, CommandKind::Task, text),
                ResponseDescriptor::failure(),
                "{}",
                text
            );
        }
        assert!(all_tasks(&db, user.id).is_empty());
    }

    #[test]
    fn test_query_without_markers_lists_open_tasks() {
        let db = Database::open_in_memory().unwrap();
        let user = janice(&db);
        run(&db, user.id, CommandKind::Task, "\"first\"");
        run(&db, user.id, CommandKind::Task, "\"second\" $later");

        assert_eq!(
            run(&db, user.id, CommandKind::Task, ""),
            ResponseDescriptor {
                kind: ResponseKind::Success,
                header: Some(TASKS_HEADER.to_string()),
                items: vec!["first".to_string(), "second".to_string()],
            }
        );
    }

    #[test]
    fn test_query_markers_union_and_dedupe() {
        let db = Database::open_in_memory().unwrap();
        let user = janice(&db);
        run(&db, user.id, CommandKind::Task, "\"due today\"");
        run(&db, user.id, CommandKind::Task, "\"both\" *");
        run(&db, user.id, CommandKind::Task, "\"important later\" $later *");
        run(&db, user.id, CommandKind::Task, "\"plain later\" $later");

        let response = run(&db, user.id, CommandKind::Task, "$today *");
        assert_eq!(
            response.items,
            vec![
                "due today".to_string(),
                "both".to_string(),
                "important later".to_string()
            ]
        );
    }

    #[test]
    fn test_query_by_group_name() {
        let db = Database::open_in_memory().unwrap();
        let user = janice(&db);
        create_group(&db, user.id, "Work").unwrap();
        run(&db, user.id, CommandKind::Task, "\"Ship release\" (Work)");
        run(&db, user.id, CommandKind::Task, "\"Feed cat\"");

        let response = run(&db, user.id, CommandKind::Task, "(Work)");
        assert_eq!(response.items, vec!["Ship release".to_string()]);

        // 未知分组 → 没有任务
        let response = run(&db, user.id, CommandKind::Task, "(Home)");
        assert_eq!(response.kind, ResponseKind::Empty);
    }

    #[test]
    fn test_empty_task_query() {
        let db = Database::open_in_memory().unwrap();
        let user = janice(&db);

        let response = run(&db, user.id, CommandKind::Task, "$tomorrow");
        assert_eq!(
            response,
            ResponseDescriptor {
                kind: ResponseKind::Empty,
                header: None,
                items: vec![NO_OPEN_TASKS.to_string()],
            }
        );
    }

    #[test]
    fn test_group_commands() {
        let db = Database::open_in_memory().unwrap();
        let user = janice(&db);

        let response = run(&db, user.id, CommandKind::Group, "");
        assert_eq!(response.kind, ResponseKind::Empty);
        assert_eq!(response.items, vec![NO_GROUPS.to_string()]);

        let response = run(&db, user.id, CommandKind::Group, "Shopping list");
        assert_eq!(response.items, vec![GROUP_CREATED.to_string()]);
        run(&db, user.id, CommandKind::Group, "Work");

        assert_eq!(
            run(&db, user.id, CommandKind::Group, "   "),
            ResponseDescriptor {
                kind: ResponseKind::Success,
                header: Some(GROUPS_HEADER.to_string()),
                items: vec!["Shopping list".to_string(), "Work".to_string()],
            }
        );
    }

    #[test]
    fn test_overlong_group_name_fails_cleanly() {
        let db = Database::open_in_memory().unwrap();
        let user = janice(&db);

        let name = "g".repeat(groups::MAX_GROUP_NAME_LEN + 1);
        let response = run(&db, user.id, CommandKind::Group, &name);
        assert_eq!(response, ResponseDescriptor::failure());
        assert!(groups::list_groups(&db, user.id).unwrap().is_empty());

        let name = "g".repeat(groups::MAX_GROUP_NAME_LEN);
        let response = run(&db, user.id, CommandKind::Group, &name);
        assert_eq!(response.items, vec![GROUP_CREATED.to_string()]);
    }

    #[test]
    fn test_large_listing_fits_in_one_message() {
        use crate::slack::blocks::{render_blocks, MAX_BLOCKS};

        let db = Database::open_in_memory().unwrap();
        let user = janice(&db);
        for i in 1..=60 {
            let text = format!("\"Chore {}\"", i);
            assert_eq!(
                run(&db, user.id, CommandKind::Task, &text).items,
                vec![TASK_CREATED.to_string()]
            );
        }

        let response = run(&db, user.id, CommandKind::Task, "");
        assert_eq!(response.items.len(), 60);
        let blocks = render_blocks(&response);
        assert!(blocks.len() <= MAX_BLOCKS);
    }
}
