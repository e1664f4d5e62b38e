use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

use crate::error::{optional_text, required_text, ValidationError};

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TaskStatus {
    #[default]
    Todo,
    Doing,
    Done,
}

impl TaskStatus {
    /// The list and board checkboxes only flip between `done` and `todo`.
    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Done => TaskStatus::Todo,
            TaskStatus::Todo | TaskStatus::Doing => TaskStatus::Done,
        }
    }

    pub fn is_done(self) -> bool {
        self == TaskStatus::Done
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Display,
    EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum TaskPriority {
    #[serde(rename = "Urgent & Important")]
    #[strum(to_string = "Urgent & Important", serialize = "urgent-important")]
    UrgentImportant,
    Urgent,
    Important,
    #[default]
    Normal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
}

impl NewProject {
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self {
            name: required_text(name, "project name")?,
            description: None,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = optional_text(Some(description.into()));
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub project_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Calendar day of the due date as seen from `tz`.
    pub fn due_day<Tz: TimeZone>(&self, tz: &Tz) -> Option<NaiveDate> {
        self.due_date
            .map(|due| due.with_timezone(tz).date_naive())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub project_id: Option<Uuid>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Self {
            title: required_text(title, "task title")?,
            description: None,
            project_id: None,
            priority: TaskPriority::default(),
            status: TaskStatus::default(),
            due_date: None,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = optional_text(Some(description.into()));
        self
    }

    pub fn in_project(mut self, project_id: Uuid) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn due_at(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(due);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListBucket {
    Today,
    ThisWeek,
    ThisMonth,
}

impl ListBucket {
    pub fn title(self) -> &'static str {
        match self {
            ListBucket::Today => "Today",
            ListBucket::ThisWeek => "This Week",
            ListBucket::ThisMonth => "This Month",
        }
    }
}

/// Tasks partitioned for the list view.
///
/// `unbucketed` holds tasks that fall in none of the three sections (no due
/// date, or due outside the current month). The list view itself does not
/// render them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListView {
    pub today: Vec<Task>,
    pub this_week: Vec<Task>,
    pub this_month: Vec<Task>,
    pub unbucketed: Vec<Task>,
}

impl TaskListView {
    pub fn sections(&self) -> [(ListBucket, &[Task]); 3] {
        [
            (ListBucket::Today, self.today.as_slice()),
            (ListBucket::ThisWeek, self.this_week.as_slice()),
            (ListBucket::ThisMonth, self.this_month.as_slice()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardColumn {
    pub date: NaiveDate,
    pub label: String,
    pub is_today: bool,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DueTasks {
    pub count: usize,
    pub preview: Vec<Task>,
}

/// Monday of the week containing `day`.
pub fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.weekday().num_days_from_monday()))
}

/// Sunday of the week containing `day`. The list view groups by Sunday weeks.
pub fn list_week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.weekday().num_days_from_sunday()))
}

pub fn week_days(day: NaiveDate) -> Vec<NaiveDate> {
    let monday = week_start(day);
    (0..7).map(|offset| monday + Duration::days(offset)).collect()
}

/// Bucket for a single task. Today wins over this week, which wins over this month.
pub fn list_bucket<Tz: TimeZone>(task: &Task, now: &DateTime<Tz>) -> Option<ListBucket> {
    let due = task.due_day(&now.timezone())?;
    let today = now.date_naive();
    if due == today {
        Some(ListBucket::Today)
    } else if list_week_start(due) == list_week_start(today) {
        Some(ListBucket::ThisWeek)
    } else if due.year() == today.year() && due.month() == today.month() {
        Some(ListBucket::ThisMonth)
    } else {
        None
    }
}

pub fn group_for_list<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>) -> TaskListView {
    let mut view = TaskListView::default();
    for task in tasks {
        let slot = match list_bucket(task, now) {
            Some(ListBucket::Today) => &mut view.today,
            Some(ListBucket::ThisWeek) => &mut view.this_week,
            Some(ListBucket::ThisMonth) => &mut view.this_month,
            None => &mut view.unbucketed,
        };
        slot.push(task.clone());
    }
    tracing::debug!(
        today = view.today.len(),
        this_week = view.this_week.len(),
        this_month = view.this_month.len(),
        unbucketed = view.unbucketed.len(),
        "grouped tasks for list view"
    );
    view
}

/// One column per day of the current Monday-based week.
pub fn group_for_board<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>) -> Vec<BoardColumn> {
    let tz = now.timezone();
    let today = now.date_naive();
    week_days(today)
        .into_iter()
        .map(|date| BoardColumn {
            date,
            label: date.format("%a, %b %-d").to_string(),
            is_today: date == today,
            tasks: tasks
                .iter()
                .filter(|task| task.due_day(&tz) == Some(date))
                .cloned()
                .collect(),
        })
        .collect()
}

/// Open tasks due at or before `now`, earliest first.
pub fn due_now(tasks: &[Task], now: DateTime<Utc>, limit: usize) -> DueTasks {
    let mut due: Vec<&Task> = tasks
        .iter()
        .filter(|task| task.status == TaskStatus::Todo)
        .filter(|task| task.due_date.is_some_and(|date| date <= now))
        .collect();
    due.sort_by_key(|task| task.due_date);
    DueTasks {
        count: due.len(),
        preview: due.into_iter().take(limit).cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use chrono::FixedOffset;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn task(title: &str, due: Option<DateTime<Utc>>) -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            project_id: None,
            title: title.to_string(),
            description: None,
            priority: TaskPriority::Normal,
            status: TaskStatus::Todo,
            due_date: due,
            created_at: now,
            updated_at: now,
        }
    }

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|task| task.title.as_str()).collect()
    }

    // Monday 2026-10-19.
    fn now() -> DateTime<Utc> {
        at(2026, 10, 19, 9)
    }

    #[test]
    fn list_buckets_follow_precedence() {
        let tasks = vec![
            task("today", Some(at(2026, 10, 19, 18))),
            task("thursday", Some(at(2026, 10, 22, 8))),
            task("later this month", Some(at(2026, 10, 30, 8))),
            task("next month", Some(at(2026, 11, 2, 8))),
            task("someday", None),
        ];
        let view = group_for_list(&tasks, &now());
        assert_eq!(titles(&view.today), vec!["today"]);
        assert_eq!(titles(&view.this_week), vec!["thursday"]);
        assert_eq!(titles(&view.this_month), vec!["later this month"]);
        assert_eq!(titles(&view.unbucketed), vec!["next month", "someday"]);
    }

    #[test]
    fn task_due_today_lands_in_one_board_column() {
        let tasks = vec![task("today", Some(at(2026, 10, 19, 23)))];
        let view = group_for_list(&tasks, &now());
        assert_eq!(view.today.len(), 1);
        assert!(view.this_week.is_empty());
        assert!(view.this_month.is_empty());

        let board = group_for_board(&tasks, &now());
        assert_eq!(board.len(), 7);
        let hits: Vec<&BoardColumn> = board.iter().filter(|col| !col.tasks.is_empty()).collect();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].is_today);
        assert_eq!(hits[0].label, "Mon, Oct 19");
    }

    #[test]
    fn task_without_due_date_is_never_listed() {
        let tasks = vec![task("someday", None)];
        let view = group_for_list(&tasks, &now());
        assert!(view.sections().iter().all(|(_, tasks)| tasks.is_empty()));
        let board = group_for_board(&tasks, &now());
        assert!(board.iter().all(|col| col.tasks.is_empty()));
    }

    #[test]
    fn week_crossing_month_boundary_counts_as_this_week() {
        // Thursday 2026-10-01; the list week runs Sunday 2026-09-27 to Saturday 2026-10-03.
        let now = at(2026, 10, 1, 9);
        let tasks = vec![
            task("saturday", Some(at(2026, 10, 3, 9))),
            task("monday before", Some(at(2026, 9, 28, 9))),
            task("next sunday", Some(at(2026, 10, 4, 9))),
        ];
        let view = group_for_list(&tasks, &now);
        assert_eq!(titles(&view.this_week), vec!["saturday", "monday before"]);
        assert_eq!(titles(&view.this_month), vec!["next sunday"]);
    }

    #[test]
    fn list_week_starts_on_sunday_while_board_starts_on_monday() {
        let sunday = at(2026, 10, 25, 12);
        let tasks = vec![
            task("19", Some(at(2026, 10, 19, 9))),
            task("31", Some(at(2026, 10, 31, 9))),
        ];
        let view = group_for_list(&tasks, &sunday);
        assert_eq!(titles(&view.this_week), vec!["31"]);
        assert_eq!(titles(&view.this_month), vec!["19"]);

        let board = group_for_board(&tasks, &sunday);
        assert_eq!(titles(&board[0].tasks), vec!["19"]);
        let saturday_after = NaiveDate::from_ymd_opt(2026, 10, 31).unwrap();
        assert!(board.iter().all(|col| col.date != saturday_after));
    }

    #[test]
    fn board_starts_on_monday() {
        let sunday = at(2026, 10, 25, 12);
        let board = group_for_board(&[], &sunday);
        assert_eq!(board[0].date, NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        assert_eq!(board[6].date, NaiveDate::from_ymd_opt(2026, 10, 25).unwrap());
        assert!(board[6].is_today);
    }

    #[test]
    fn due_day_uses_callers_time_zone() {
        let tz = FixedOffset::east_opt(9 * 3600).unwrap();
        let now = at(2026, 10, 19, 20).with_timezone(&tz); // 2026-10-20 05:00 local
        let tasks = vec![task("late utc", Some(at(2026, 10, 19, 22)))];
        let view = group_for_list(&tasks, &now);
        assert_eq!(titles(&view.today), vec!["late utc"]);
    }

    #[test]
    fn toggle_never_produces_doing() {
        assert_eq!(TaskStatus::Done.toggled(), TaskStatus::Todo);
        assert_eq!(TaskStatus::Todo.toggled(), TaskStatus::Done);
        assert_eq!(TaskStatus::Doing.toggled(), TaskStatus::Done);
    }

    #[test]
    fn due_now_filters_open_overdue_tasks() {
        let mut done = task("done", Some(at(2026, 10, 18, 9)));
        done.status = TaskStatus::Done;
        let tasks = vec![
            task("b", Some(at(2026, 10, 19, 8))),
            task("a", Some(at(2026, 10, 17, 8))),
            task("future", Some(at(2026, 10, 20, 8))),
            task("none", None),
            done,
        ];
        let due = due_now(&tasks, now(), 1);
        assert_eq!(due.count, 2);
        assert_eq!(titles(&due.preview), vec!["a"]);
    }

    #[test]
    fn enums_use_stored_spellings() {
        assert_eq!(TaskPriority::UrgentImportant.to_string(), "Urgent & Important");
        assert_eq!(
            TaskPriority::from_str("urgent-important").unwrap(),
            TaskPriority::UrgentImportant
        );
        assert_eq!(TaskPriority::from_str("normal").unwrap(), TaskPriority::Normal);
        assert_eq!(TaskStatus::from_str("Doing").unwrap(), TaskStatus::Doing);
        assert_eq!(
            serde_json::to_string(&TaskPriority::UrgentImportant).unwrap(),
            "\"Urgent & Important\""
        );
        assert_eq!(serde_json::to_string(&TaskStatus::Done).unwrap(), "\"done\"");
    }
}
