//! Read-only projections over a task sequence.
//!
//! Nothing here mutates: the same tasks and the same `today` always give the
//! same result. Overdue status is relative to the `today` passed in, so callers
//! sample it from a [`Clock`](crate::model::Clock) at projection time.

use chrono::NaiveDate;

use crate::model::filter::Filter;
use crate::model::task::Task;

/// Aggregate counts over one snapshot and one `today`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub overdue: usize,
}

/// Dashboard view: stats over everything, list narrowed by the search query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard<'a> {
    pub query: String,
    pub stats: Stats,
    /// Searched tasks in collection order; this is the drag target
    pub tasks: Vec<&'a Task>,
}

/// Whether `task` belongs in the `filter` view as of `today`
pub fn matches_filter(task: &Task, filter: Filter, today: NaiveDate) -> bool {
    match filter {
        Filter::All => true,
        Filter::Completed => task.completed,
        Filter::Pending => !task.completed,
        Filter::Overdue => task.is_overdue(today),
    }
}

/// Tasks passing `filter`, in input order.
pub fn by_filter<'a, I>(tasks: I, filter: Filter, today: NaiveDate) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    let out: Vec<&Task> = tasks
        .into_iter()
        .filter(|t| matches_filter(t, filter, today))
        .collect();
    tracing::trace!(%filter, %today, matched = out.len(), "filter projection");
    out
}

/// Tasks whose title contains `query`, ignoring case.
///
/// The query is matched as typed, surrounding spaces included. An empty or
/// whitespace-only query matches everything.
pub fn by_search<'a, I>(tasks: I, query: &str) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    let needle = query.to_lowercase();
    let match_all = needle.trim().is_empty();
    let out: Vec<&Task> = tasks
        .into_iter()
        .filter(|t| match_all || t.title.to_lowercase().contains(&needle))
        .collect();
    tracing::trace!(query = %needle, matched = out.len(), "search projection");
    out
}

/// Count totals in a single pass.
pub fn stats<'a, I>(tasks: I, today: NaiveDate) -> Stats
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut stats = Stats::default();
    for task in tasks {
        stats.total += 1;
        if task.completed {
            stats.completed += 1;
        } else {
            stats.pending += 1;
        }
        if task.is_overdue(today) {
            stats.overdue += 1;
        }
    }
    stats
}

/// Stats over the whole collection plus the title-searched list.
pub fn dashboard<'a, I>(tasks: I, query: &str, today: NaiveDate) -> Dashboard<'a>
where
    I: IntoIterator<Item = &'a Task>,
    I::IntoIter: Clone,
{
    let iter = tasks.into_iter();
    Dashboard {
        query: query.to_string(),
        stats: stats(iter.clone(), today),
        tasks: by_search(iter, query),
    }
}
