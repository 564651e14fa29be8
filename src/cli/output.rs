use chrono::NaiveDate;
use serde::Serialize;

use crate::model::task::Task;
use crate::ops::store::{Change, ChangeKind};
use crate::ops::view::{Dashboard, Stats};
use crate::util::unicode::{fit_to_width, single_line};

/// Width of the title column in list output
const TITLE_CELLS: usize = 32;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub id: String,
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub completed: bool,
    pub overdue: bool,
}

#[derive(Serialize)]
pub struct StatsJson {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub overdue: usize,
}

#[derive(Serialize)]
pub struct DashboardJson {
    pub query: String,
    pub stats: StatsJson,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct ChangeJson {
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    pub version: u64,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(task: &Task, today: NaiveDate) -> TaskJson {
    TaskJson {
        id: task.id.to_string(),
        title: task.title.clone(),
        description: task.description.clone(),
        due_date: task.due_date,
        completed: task.completed,
        overdue: task.is_overdue(today),
    }
}

pub fn stats_to_json(stats: &Stats) -> StatsJson {
    StatsJson {
        total: stats.total,
        completed: stats.completed,
        pending: stats.pending,
        overdue: stats.overdue,
    }
}

pub fn dashboard_to_json(dash: &Dashboard<'_>, today: NaiveDate) -> DashboardJson {
    DashboardJson {
        query: dash.query.clone(),
        stats: stats_to_json(&dash.stats),
        tasks: dash.tasks.iter().map(|t| task_to_json(t, today)).collect(),
    }
}

pub fn change_to_json(change: &Change) -> ChangeJson {
    let mut out = ChangeJson {
        action: change_verb(&change.kind),
        id: None,
        completed: None,
        filter: None,
        version: change.version,
    };
    match &change.kind {
        ChangeKind::Added(id) | ChangeKind::Edited(id) | ChangeKind::Deleted(id) => {
            out.id = Some(id.to_string());
        }
        ChangeKind::Toggled { id, completed } => {
            out.id = Some(id.to_string());
            out.completed = Some(*completed);
        }
        ChangeKind::FilterChanged(filter) => out.filter = Some(filter.to_string()),
        ChangeKind::Reordered => {}
    }
    out
}

fn change_verb(kind: &ChangeKind) -> &'static str {
    match kind {
        ChangeKind::Added(_) => "added",
        ChangeKind::Edited(_) => "edited",
        ChangeKind::Deleted(_) => "deleted",
        ChangeKind::Toggled { .. } => "toggled",
        ChangeKind::FilterChanged(_) => "filter",
        ChangeKind::Reordered => "reordered",
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// One row: checkbox, id, title column, due date, overdue marker
pub fn format_task_line(task: &Task, today: NaiveDate) -> String {
    let check = if task.completed { 'x' } else { ' ' };
    let flag = if task.is_overdue(today) { "  overdue" } else { "" };
    format!(
        "[{}] {}  {}  {}{}",
        check,
        task.id,
        fit_to_width(&single_line(&task.title), TITLE_CELLS),
        task.due_date,
        flag
    )
}

pub fn format_task_list(tasks: &[&Task], today: NaiveDate) -> Vec<String> {
    if tasks.is_empty() {
        return vec!["(no tasks)".to_string()];
    }
    tasks.iter().map(|t| format_task_line(t, today)).collect()
}

/// Detailed task view
pub fn format_task_detail(task: &Task, today: NaiveDate) -> Vec<String> {
    let status = if task.completed {
        "completed"
    } else if task.is_overdue(today) {
        "overdue"
    } else {
        "pending"
    };
    let mut lines = vec![
        format!("{} {}", task.id, task.title),
        format!("due: {}", task.due_date),
        format!("status: {}", status),
    ];
    if !task.description.is_empty() {
        lines.push("description:".to_string());
        for line in task.description.lines() {
            lines.push(format!("  {}", line));
        }
    }
    lines
}

pub fn format_stats(stats: &Stats) -> String {
    format!(
        "total {}  completed {}  pending {}  overdue {}",
        stats.total, stats.completed, stats.pending, stats.overdue
    )
}

/// Stats line, then the searched list numbered from 1 for `mv`
pub fn format_dashboard(dash: &Dashboard<'_>, today: NaiveDate) -> Vec<String> {
    let mut lines = vec![format_stats(&dash.stats)];
    if !dash.query.trim().is_empty() {
        lines.push(format!("search: {}", dash.query));
    }
    lines.push(String::new());
    if dash.tasks.is_empty() {
        lines.push("(no tasks)".to_string());
    }
    for (i, task) in dash.tasks.iter().enumerate() {
        lines.push(format!("{:>3}. {}", i + 1, format_task_line(task, today)));
    }
    lines
}

/// One-line confirmation for a mutation
pub fn format_change(change: &Change) -> String {
    match &change.kind {
        ChangeKind::Added(id) => format!("added {}", id),
        ChangeKind::Edited(id) => format!("edited {}", id),
        ChangeKind::Deleted(id) => format!("deleted {}", id),
        ChangeKind::Toggled { id, completed } => {
            let state = if *completed { "completed" } else { "pending" };
            format!("{} is now {}", id, state)
        }
        ChangeKind::FilterChanged(filter) => format!("filter set to {}", filter),
        ChangeKind::Reordered => "order updated".to_string(),
    }
}
