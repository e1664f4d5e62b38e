//! Plain-text views printed by the `brain` binary.

use brain_domain::{
    dashboard::Dashboard,
    finance::{FinanceSummary, LedgerEntry, MonthRange},
    goal::{Goal, GoalTerm},
    habit::{CompletionPoint, Habit},
    task::{BoardColumn, Task, TaskListView, TaskStatus},
};
use chrono::TimeZone;

/// One row of the habit list.
pub struct HabitLine<'a> {
    pub habit: &'a Habit,
    pub done_today: bool,
    pub streak: u32,
}

pub fn dashboard(board: &Dashboard) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Habits today: {}/{} ({}%)\n",
        board.habits.completed,
        board.habits.total,
        board.habits.percentage()
    ));
    out.push_str(&format!("Tasks due: {}\n", board.due.count));
    for task in &board.due.preview {
        out.push_str(&format!("  - {}\n", task.title));
    }
    out.push_str(&format!("{}: ", board.month.label()));
    out.push_str(&summary_line(&board.finance));
    out.push('\n');
    if board.goals.is_empty() {
        out.push_str("Goals: none\n");
    } else {
        out.push_str("Goals:\n");
        for goal in &board.goals {
            out.push_str(&format!("  - {} {}%\n", goal.title, goal.percent));
        }
    }
    out
}

pub fn habits(lines: &[HabitLine<'_>], series: &[CompletionPoint]) -> String {
    if lines.is_empty() {
        return "No habits yet. Add one with `brain habit add <name>`.\n".to_string();
    }
    let mut out = String::new();
    for line in lines {
        let mark = if line.done_today { "x" } else { " " };
        let name = match &line.habit.icon {
            Some(icon) => format!("{icon} {}", line.habit.name),
            None => line.habit.name.clone(),
        };
        out.push_str(&format!(
            "[{mark}] {name} ({}) streak {} {}\n",
            line.habit.frequency.join(", "),
            line.streak,
            line.habit.id
        ));
    }
    if let (Some(first), Some(last)) = (series.first(), series.last()) {
        let average = series.iter().map(|point| point.percentage).sum::<u32>() as f64
            / series.len() as f64;
        out.push_str(&format!(
            "Completion {} to {}: today {}%, average {:.0}%\n",
            first.label, last.label, last.percentage, average
        ));
    }
    out
}

fn task_line(task: &Task) -> String {
    let mark = match task.status {
        TaskStatus::Done => "x",
        TaskStatus::Doing => "~",
        TaskStatus::Todo => " ",
    };
    format!("[{mark}] {} ({}) {}", task.title, task.priority, task.id)
}

pub fn task_list(view: &TaskListView) -> String {
    let mut out = String::new();
    for (bucket, tasks) in view.sections() {
        out.push_str(&format!("{}\n", bucket.title()));
        if tasks.is_empty() {
            out.push_str("  (nothing)\n");
        }
        for task in tasks {
            out.push_str(&format!("  {}\n", task_line(task)));
        }
    }
    if !view.unbucketed.is_empty() {
        out.push_str(&format!("Later or undated: {}\n", view.unbucketed.len()));
    }
    out
}

pub fn task_board(columns: &[BoardColumn]) -> String {
    let mut out = String::new();
    for column in columns {
        let marker = if column.is_today { " (today)" } else { "" };
        out.push_str(&format!("{}{marker}\n", column.label));
        for task in &column.tasks {
            out.push_str(&format!("  {}\n", task_line(task)));
        }
    }
    out
}

pub fn ledger(month: MonthRange, entries: &[LedgerEntry], summary: &FinanceSummary) -> String {
    let mut out = format!("{}\n", month.label());
    for entry in entries {
        let note = entry.transaction.note.as_deref().unwrap_or("");
        out.push_str(&format!(
            "  {} {:>+10.2} {} {}\n",
            entry.transaction.date,
            entry.signed_amount(),
            entry.category_name(),
            note
        ));
    }
    out.push_str(&summary_line(summary));
    out.push('\n');
    out
}

fn summary_line(summary: &FinanceSummary) -> String {
    format!(
        "income {:.2}, expense {:.2}, balance {:.2}",
        summary.income, summary.expense, summary.balance
    )
}

pub fn goals(term: GoalTerm, goals: &[Goal]) -> String {
    let mut out = format!("{term} term goals\n");
    if goals.is_empty() {
        out.push_str("  (none)\n");
    }
    for goal in goals {
        out.push_str(&format!(
            "  {} {}/{} {} ({}%) {}\n",
            goal.title,
            goal.current_value,
            goal.target_value,
            goal.unit,
            goal.rounded_progress(),
            goal.id
        ));
    }
    out
}

/// Short confirmation after a task mutation, in the caller's time zone.
pub fn task_saved<Tz: TimeZone>(task: &Task, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let due = task
        .due_date
        .map(|due| due.with_timezone(tz).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "no due date".to_string());
    format!("{} [{}] due {} {}\n", task.title, task.status, due, task.id)
}
