//! View selectors, due buckets and sort hints
//!
//! These are the vocabulary shared by the web API, the CLI and the slash-command
//! interpreter when asking for "a subset of my tasks".

use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::DoltError;

/// Derived classification of a due date relative to today.
///
/// The windows are not a partition: `Today` covers everything overdue,
/// `Tomorrow` is exactly one day out and `Later` is two or more days out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DueBucket {
    Today,
    Tomorrow,
    Later,
}

impl DueBucket {
    /// Parse a bucket keyword (`today` / `tomorrow` / `later`).
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "today" => Some(Self::Today),
            "tomorrow" => Some(Self::Tomorrow),
            "later" => Some(Self::Later),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Tomorrow => "tomorrow",
            Self::Later => "later",
        }
    }

    /// Offset in days from today that the bucket starts at.
    pub fn offset_days(&self) -> u64 {
        match self {
            Self::Today => 0,
            Self::Tomorrow => 1,
            Self::Later => 2,
        }
    }

    /// The first calendar day of the bucket, `None` past the end of the calendar.
    pub fn anchor(&self, today: NaiveDate) -> Option<NaiveDate> {
        today.checked_add_days(Days::new(self.offset_days()))
    }

    /// Does `due` fall into this bucket?
    pub fn contains(&self, due: NaiveDate, today: NaiveDate) -> bool {
        match self {
            Self::Today => due <= today,
            Self::Tomorrow => due.checked_sub_days(Days::new(1)) == Some(today),
            Self::Later => due
                .checked_sub_days(Days::new(2))
                .is_some_and(|d| d >= today),
        }
    }
}

impl fmt::Display for DueBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Named subset of a user's tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewSelector {
    /// Every open task
    #[default]
    All,
    /// Open tasks flagged important
    Important,
    /// Completed tasks only
    Completed,
    /// Open tasks in a due bucket
    Due(DueBucket),
    /// Open tasks in a group
    Group(i64),
}

impl FromStr for ViewSelector {
    type Err = DoltError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(id) = s.strip_prefix("group:") {
            return id
                .trim()
                .parse::<i64>()
                .map(Self::Group)
                .map_err(|_| DoltError::validation(format!("invalid group id in view '{}'", s)));
        }
        match s {
            "" | "all" => Ok(Self::All),
            "important" => Ok(Self::Important),
            "completed" => Ok(Self::Completed),
            other => DueBucket::from_keyword(other)
                .map(Self::Due)
                .ok_or_else(|| DoltError::validation(format!("unknown view '{}'", other))),
        }
    }
}

impl fmt::Display for ViewSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Important => f.write_str("important"),
            Self::Completed => f.write_str("completed"),
            Self::Due(bucket) => write!(f, "{}", bucket),
            Self::Group(id) => write!(f, "group:{}", id),
        }
    }
}

/// Display ordering hint supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortHint {
    /// Primary-key (insertion) order
    #[default]
    Default,
    /// Newest first
    Recent,
    /// Earliest due date first
    Due,
}

impl FromStr for SortHint {
    type Err = DoltError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "default" | "id" => Ok(Self::Default),
            "recent" => Ok(Self::Recent),
            "due" => Ok(Self::Due),
            other => Err(DoltError::validation(format!("unknown sort '{}'", other))),
        }
    }
}
