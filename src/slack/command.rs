//! Slash-command text parsing
//!
//! Task commands use a small marker grammar, each marker found by scanning for
//! the first opening delimiter and the first closing delimiter after it:
//!
//! | Marker        | Meaning                                  |
//! |---------------|------------------------------------------|
//! | `"text"`      | title                                    |
//! | `<text>`      | description                              |
//! | `$token`      | due keyword / date, up to the next space |
//! | `*`           | important                                |
//! | `(text)`      | group name                               |
//!
//! A missing delimiter simply leaves the field out. Group commands take the whole
//! text as the group name.

use std::fmt;
use std::str::FromStr;

use crate::error::{DoltError, Result};

/// Which slash command was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// `/dolt.task`
    Task,
    /// `/dolt.group`
    Group,
}

impl CommandKind {
    pub const TASK_COMMAND: &'static str = "/dolt.task";
    pub const GROUP_COMMAND: &'static str = "/dolt.group";

    /// Map the `command` field of a Slack payload.
    pub fn from_command_name(name: &str) -> Option<Self> {
        match name.trim() {
            Self::TASK_COMMAND => Some(Self::Task),
            Self::GROUP_COMMAND => Some(Self::Group),
            _ => None,
        }
    }

    pub fn command_name(&self) -> &'static str {
        match self {
            Self::Task => Self::TASK_COMMAND,
            Self::Group => Self::GROUP_COMMAND,
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command_name())
    }
}

impl FromStr for CommandKind {
    type Err = DoltError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "task" => Ok(Self::Task),
            "group" => Ok(Self::Group),
            other => Self::from_command_name(other)
                .ok_or_else(|| DoltError::validation(format!("unknown command '{}'", other))),
        }
    }
}

/// Raw markers found in a task command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markers {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due: Option<String>,
    pub important: bool,
    pub group: Option<String>,
}

impl Markers {
    /// Scan `text` for every marker.
    pub fn scan(text: &str) -> Self {
        Self {
            title: delimited(text, '"', '"'),
            description: delimited(text, '<', '>'),
            due: due_token(text),
            important: text.contains('*'),
            group: delimited(text, '(', ')'),
        }
    }

    /// Does the text look like a task to create?
    fn is_creation(text: &str) -> bool {
        text.contains('"') || text.contains('<')
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// Text between the first `open` and the first `close` after it.
fn delimited(text: &str, open: char, close: char) -> Option<String> {
    let start = text.find(open)? + open.len_utf8();
    let len = text[start..].find(close)?;
    non_empty(&text[start..start + len])
}

/// Token following the first `$`, up to the next whitespace.
fn due_token(text: &str) -> Option<String> {
    let start = text.find('$')? + 1;
    let rest = &text[start..];
    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    non_empty(&rest[..end])
}

/// Fields of a task to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    /// Literal due value, `None` means today
    pub due: Option<String>,
    pub important: bool,
    pub group: Option<String>,
}

/// Markers of a task query; each present marker selects tasks on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub due: Option<String>,
    pub important: bool,
    pub group: Option<String>,
}

impl TaskQuery {
    pub fn has_markers(&self) -> bool {
        self.due.is_some() || self.important || self.group.is_some()
    }
}

/// A parsed slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    CreateTask(CreateTask),
    QueryTasks(TaskQuery),
    CreateGroup { name: String },
    QueryGroups,
}

/// Parse the text of a slash command.
///
/// Task text containing a title or description delimiter is a creation, and
/// fails without a complete title.
pub fn parse(kind: CommandKind, text: &str) -> Result<SlashCommand> {
    match kind {
        CommandKind::Group => Ok(match non_empty(text) {
            Some(name) => SlashCommand::CreateGroup { name },
            None => SlashCommand::QueryGroups,
        }),
        CommandKind::Task => {
            let markers = Markers::scan(text);
            if Markers::is_creation(text) {
                let title = markers
                    .title
                    .ok_or_else(|| DoltError::validation("task title is required"))?;
                Ok(SlashCommand::CreateTask(CreateTask {
                    title,
                    description: markers.description,
                    due: markers.due,
                    important: markers.important,
                    group: markers.group,
                }))
            } else {
                Ok(SlashCommand::QueryTasks(TaskQuery {
                    due: markers.due,
                    important: markers.important,
                    group: markers.group,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(text: &str) -> CreateTask {
        match parse(CommandKind::Task, text).unwrap() {
            SlashCommand::CreateTask(c) => c,
            other => panic!("expected CreateTask, got {:?}", other),
        }
    }

    fn query(text: &str) -> TaskQuery {
        match parse(CommandKind::Task, text).unwrap() {
            SlashCommand::QueryTasks(q) => q,
            other => panic!("expected QueryTasks, got {:?}", other),
        }
    }

    #[test]
    fn test_title_only() {
        assert_eq!(
            create("\"Clean the garage\""),
            CreateTask {
                title: "Clean the garage".to_string(),
                description: None,
                due: None,
                important: false,
                group: None,
            }
        );
    }

    #[test]
    fn test_all_markers() {
        let c = create("\"Buy milk\" <for the party> $today *");
        assert_eq!(c.title, "Buy milk");
        assert_eq!(c.description.as_deref(), Some("for the party"));
        assert_eq!(c.due.as_deref(), Some("today"));
        assert!(c.important);
        assert_eq!(c.group, None);
    }

    #[test]
    fn test_group_and_date_markers() {
        let c = create("(Errands) $2026-04-01 \"Return library books\"");
        assert_eq!(c.title, "Return library books");
        assert_eq!(c.due.as_deref(), Some("2026-04-01"));
        assert_eq!(c.group.as_deref(), Some("Errands"));
        assert!(!c.important);
    }

    #[test]
    fn test_first_pair_wins() {
        let c = create("\"one\" \"two\" <a> <b>");
        assert_eq!(c.title, "one");
        assert_eq!(c.description.as_deref(), Some("a"));
    }

    #[test]
    fn test_unclosed_delimiters_are_omitted() {
        let c = create("\"Call mom\" <about sunday");
        assert_eq!(c.description, None);

        let q = query("(Errands $tomorrow");
        assert_eq!(q.group, None);
        assert_eq!(q.due.as_deref(), Some("tomorrow"));
    }

    #[test]
    fn test_creation_without_title_fails() {
        assert!(matches!(
            parse(CommandKind::Task, "<just a description>").unwrap_err(),
            DoltError::Validation(_)
        ));
        assert!(matches!(
            parse(CommandKind::Task, "\"never closed").unwrap_err(),
            DoltError::Validation(_)
        ));
        assert!(parse(CommandKind::Task, "\"   \"").is_err());
    }

    #[test]
    fn test_query_markers() {
        assert_eq!(query(""), TaskQuery::default());
        assert!(!query("   ").has_markers());

        let q = query("$today *");
        assert_eq!(q.due.as_deref(), Some("today"));
        assert!(q.important);
        assert!(q.has_markers());

        assert_eq!(query("(Work)").group.as_deref(), Some("Work"));
        assert_eq!(query("$").due, None);
    }

    #[test]
    fn test_group_command() {
        assert_eq!(
            parse(CommandKind::Group, "  Shopping list ").unwrap(),
            SlashCommand::CreateGroup {
                name: "Shopping list".to_string()
            }
        );
        assert_eq!(
            parse(CommandKind::Group, "").unwrap(),
            SlashCommand::QueryGroups
        );
        // 分组命令不解析标记
        assert_eq!(
            parse(CommandKind::Group, "\"Quoted\" *").unwrap(),
            SlashCommand::CreateGroup {
                name: "\"Quoted\" *".to_string()
            }
        );
    }

    #[test]
    fn test_command_kind_names() {
        assert_eq!(
            CommandKind::from_command_name("/dolt.task"),
            Some(CommandKind::Task)
        );
        assert_eq!(
            CommandKind::from_command_name("/dolt.group"),
            Some(CommandKind::Group)
        );
        assert_eq!(CommandKind::from_command_name("/todo"), None);
        assert_eq!("group".parse::<CommandKind>().unwrap(), CommandKind::Group);
        assert_eq!("/dolt.task".parse::<CommandKind>().unwrap(), CommandKind::Task);
    }
}
