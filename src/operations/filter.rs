//! Task filter engine
//!
//! Turns a `(user, view, sort)` request into the list of tasks to display.
//!
//! ## Rules
//!
//! - Always scoped to the owning user.
//! - Every view except `completed` hides completed tasks; `completed` shows only them.
//! - Due buckets compare calendar dates against today's local date, computed
//!   on every call.
//! - A group that does not exist (or belongs to someone else) is an empty view,
//!   not an error.

use chrono::{Local, NaiveDate};

use crate::error::Result;
use crate::model::{DueBucket, SortHint, ViewSelector};
use crate::storage::tasks::{self, Task, TaskPredicate};
use crate::storage::{groups, Database};

/// Build the storage predicate for a view.
///
/// Returns `None` when the view can never match (a bucket past the end of the
/// calendar).
pub fn predicate_for(view: ViewSelector, today: NaiveDate) -> Option<TaskPredicate> {
    let open = TaskPredicate::open();
    let predicate = match view {
        ViewSelector::All => open,
        ViewSelector::Important => TaskPredicate {
            important: Some(true),
            ..open
        },
        ViewSelector::Completed => TaskPredicate {
            completed: Some(true),
            ..Default::default()
        },
        ViewSelector::Due(bucket) => {
            let anchor = bucket.anchor(today)?;
            match bucket {
                DueBucket::Today => TaskPredicate {
                    due_on_or_before: Some(anchor),
                    ..open
                },
                DueBucket::Tomorrow => TaskPredicate {
                    due_on: Some(anchor),
                    ..open
                },
                DueBucket::Later => TaskPredicate {
                    due_on_or_after: Some(anchor),
                    ..open
                },
            }
        }
        ViewSelector::Group(group_id) => TaskPredicate {
            group_id: Some(group_id),
            ..open
        },
    };
    Some(predicate)
}

/// Filter a user's tasks with today's date.
pub fn filter_tasks(
    db: &Database,
    user_id: i64,
    view: ViewSelector,
    sort: SortHint,
) -> Result<Vec<Task>> {
    filter_tasks_on(db, user_id, view, sort, Local::now().date_naive())
}

/// Filter a user's tasks relative to an explicit `today`.
pub fn filter_tasks_on(
    db: &Database,
    user_id: i64,
    view: ViewSelector,
    sort: SortHint,
    today: NaiveDate,
) -> Result<Vec<Task>> {
    if let ViewSelector::Group(group_id) = view {
        if groups::get_group(db, user_id, group_id)?.is_none() {
            return Ok(Vec::new());
        }
    }

    let Some(predicate) = predicate_for(view, today) else {
        return Ok(Vec::new());
    };
    let tasks = tasks::list_tasks(db, user_id, &predicate, sort)?;

    if let ViewSelector::Due(bucket) = view {
        debug_assert!(
            tasks.iter().all(|t| bucket.contains(t.due, today)),
            "{} predicate disagrees with bucket membership",
            bucket
        );
    }
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::groups::create_group;
    use crate::storage::tasks::{create_task, update_task, GroupRef, NewTask, TaskUpdate};
    use crate::storage::users::tests::{janice, marcus};
    use chrono::Days;
    use std::collections::HashSet;

    const TODAY: &str = "2026-06-15";

    fn today() -> NaiveDate {
        NaiveDate::parse_from_str(TODAY, "%Y-%m-%d").unwrap()
    }

    fn add(db: &Database, user_id: i64, title: &str, offset: i64, important: bool) -> Task {
        let due = if offset >= 0 {
            today().checked_add_days(Days::new(offset as u64))
        } else {
            today().checked_sub_days(Days::new((-offset) as u64))
        };
        let mut new_task = NewTask::new(title);
        new_task.due = due;
        new_task.important = important;
        create_task(db, user_id, &new_task).unwrap()
    }

    fn complete(db: &Database, user_id: i64, task: &Task) {
        update_task(
            db,
            user_id,
            task.id,
            &TaskUpdate {
                completed: Some(true),
                ..Default::default()
            },
        )
        .unwrap();
    }

    fn ids(tasks: &[Task]) -> Vec<i64> {
        tasks.iter().map(|t| t.id).collect()
    }

    fn view(db: &Database, user_id: i64, view: ViewSelector) -> Vec<Task> {
        filter_tasks_on(db, user_id, view, SortHint::Default, today()).unwrap()
    }

    /// 覆盖逾期 / 今天 / 明天 / 后天 / 更远，以及已完成任务
    fn seed(db: &Database, user_id: i64) -> Vec<Task> {
        let overdue = add(db, user_id, "overdue", -3, false);
        let today_task = add(db, user_id, "today", 0, true);
        let tomorrow = add(db, user_id, "tomorrow", 1, false);
        let in_two = add(db, user_id, "in two days", 2, true);
        let far = add(db, user_id, "far", 30, false);
        let done_today = add(db, user_id, "done today", 0, true);
        let done_later = add(db, user_id, "done later", 10, false);
        complete(db, user_id, &done_today);
        complete(db, user_id, &done_later);
        vec![overdue, today_task, tomorrow, in_two, far, done_today, done_later]
    }

    #[test]
    fn test_due_buckets() {
        let db = Database::open_in_memory().unwrap();
        let user = janice(&db);
        let t = seed(&db, user.id);

        assert_eq!(
            ids(&view(&db, user.id, ViewSelector::Due(DueBucket::Today))),
            vec![t[0].id, t[1].id]
        );
        assert_eq!(
            ids(&view(&db, user.id, ViewSelector::Due(DueBucket::Tomorrow))),
            vec![t[2].id]
        );
        assert_eq!(
            ids(&view(&db, user.id, ViewSelector::Due(DueBucket::Later))),
            vec![t[3].id, t[4].id]
        );
    }

    #[test]
    fn test_buckets_are_subsets_of_all() {
        let db = Database::open_in_memory().unwrap();
        let user = janice(&db);
        seed(&db, user.id);

        let all: HashSet<i64> = ids(&view(&db, user.id, ViewSelector::All))
            .into_iter()
            .collect();
        for bucket in [DueBucket::Today, DueBucket::Tomorrow, DueBucket::Later] {
            for task in view(&db, user.id, ViewSelector::Due(bucket)) {
                assert!(all.contains(&task.id), "{} leaked {}", bucket, task.title);
                assert!(!task.completed);
            }
        }
    }

    #[test]
    fn test_completed_and_all_are_disjoint() {
        let db = Database::open_in_memory().unwrap();
        let user = janice(&db);
        let t = seed(&db, user.id);

        let completed = view(&db, user.id, ViewSelector::Completed);
        assert_eq!(ids(&completed), vec![t[5].id, t[6].id]);

        let all: HashSet<i64> = ids(&view(&db, user.id, ViewSelector::All))
            .into_iter()
            .collect();
        assert!(completed.iter().all(|task| !all.contains(&task.id)));
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn test_important_excludes_completed() {
        let db = Database::open_in_memory().unwrap();
        let user = janice(&db);
        let t = seed(&db, user.id);

        assert_eq!(
            ids(&view(&db, user.id, ViewSelector::Important)),
            vec![t[1].id, t[3].id]
        );
    }

    #[test]
    fn test_filter_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        let user = janice(&db);
        seed(&db, user.id);

        for v in [
            ViewSelector::All,
            ViewSelector::Important,
            ViewSelector::Completed,
            ViewSelector::Due(DueBucket::Later),
        ] {
            assert_eq!(view(&db, user.id, v), view(&db, user.id, v));
        }
    }

    #[test]
    fn test_scoped_to_owner() {
        let db = Database::open_in_memory().unwrap();
        let owner = janice(&db);
        let other = marcus(&db);
        seed(&db, owner.id);

        assert!(view(&db, other.id, ViewSelector::All).is_empty());
        assert!(view(&db, other.id, ViewSelector::Completed).is_empty());
    }

    #[test]
    fn test_group_view() {
        let db = Database::open_in_memory().unwrap();
        let owner = janice(&db);
        let other = marcus(&db);
        let group = create_group(&db, owner.id, "Garden").unwrap();

        let mut in_group = NewTask::new("Weed beds");
        in_group.group = Some(GroupRef::Id(group.id));
        let in_group = create_task(&db, owner.id, &in_group).unwrap();
        let mut done_in_group = NewTask::new("Mow lawn");
        done_in_group.group = Some(GroupRef::Id(group.id));
        let done_in_group = create_task(&db, owner.id, &done_in_group).unwrap();
        complete(&db, owner.id, &done_in_group);
        add(&db, owner.id, "ungrouped", 0, false);

        assert_eq!(
            ids(&view(&db, owner.id, ViewSelector::Group(group.id))),
            vec![in_group.id]
        );
        // 他人的分组 / 不存在的分组 → 空
        assert!(view(&db, other.id, ViewSelector::Group(group.id)).is_empty());
        assert!(view(&db, owner.id, ViewSelector::Group(9999)).is_empty());
    }

    #[test]
    fn test_recent_sort_reverses_insertion() {
        let db = Database::open_in_memory().unwrap();
        let user = janice(&db);
        let first = add(&db, user.id, "first", 0, false);
        let second = add(&db, user.id, "second", 0, false);

        let recent =
            filter_tasks_on(&db, user.id, ViewSelector::All, SortHint::Recent, today()).unwrap();
        assert_eq!(ids(&recent), vec![second.id, first.id]);
    }

    #[test]
    fn test_predicate_past_calendar_end_is_empty() {
        assert!(predicate_for(ViewSelector::Due(DueBucket::Later), NaiveDate::MAX).is_none());
        assert!(predicate_for(ViewSelector::Due(DueBucket::Today), NaiveDate::MAX).is_some());
    }
}
