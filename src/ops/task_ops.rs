use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use crate::model::filter::UnknownFilter;
use crate::model::task::{Task, TaskId};

/// The ordered collection: iteration order is display order
pub type TaskList = IndexMap<TaskId, Task>;

/// Error type for task operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("task not found: {0}")]
    NotFound(TaskId),
    #[error("unknown filter '{0}' (expected: all, completed, pending, overdue)")]
    InvalidFilter(String),
    #[error("invalid reorder: {0}")]
    InvalidReorder(#[from] ReorderError),
    #[error("task title cannot be empty")]
    EmptyTitle,
}

impl From<UnknownFilter> for TaskError {
    fn from(e: UnknownFilter) -> Self {
        TaskError::InvalidFilter(e.0)
    }
}

/// Why a reorder payload was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReorderError {
    #[error("{0} is missing from the new order")]
    Missing(TaskId),
    #[error("{0} is not in the collection")]
    Unknown(TaskId),
    #[error("{0} appears more than once")]
    Duplicate(TaskId),
    #[error("position {index} is out of range for {len} visible tasks")]
    OutOfRange { index: usize, len: usize },
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Titles must contain something other than whitespace.
pub fn validate_title(title: &str) -> Result<(), TaskError> {
    if title.trim().is_empty() {
        Err(TaskError::EmptyTitle)
    } else {
        Ok(())
    }
}

/// Check that `order` is a bijection on the ids of `tasks`.
pub fn check_permutation(tasks: &TaskList, order: &[TaskId]) -> Result<(), ReorderError> {
    let mut seen = HashSet::with_capacity(order.len());
    for id in order {
        if !tasks.contains_key(id) {
            return Err(ReorderError::Unknown(*id));
        }
        if !seen.insert(*id) {
            return Err(ReorderError::Duplicate(*id));
        }
    }
    // Every entry is a distinct live id, so a short payload means a missing id.
    match tasks.keys().find(|id| !seen.contains(id)) {
        Some(missing) => Err(ReorderError::Missing(*missing)),
        None => Ok(()),
    }
}

/// Check that `ids` are distinct and all live.
fn check_subset(tasks: &TaskList, ids: &[TaskId]) -> Result<(), ReorderError> {
    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if !tasks.contains_key(id) {
            return Err(ReorderError::Unknown(*id));
        }
        if !seen.insert(*id) {
            return Err(ReorderError::Duplicate(*id));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Reordering
// ---------------------------------------------------------------------------

/// Replace the iteration order with `order`, which must be a permutation of
/// the current ids. On error the list is untouched.
pub fn apply_order(tasks: &mut TaskList, order: &[TaskId]) -> Result<(), ReorderError> {
    check_permutation(tasks, order)?;
    sort_by_rank(tasks, order);
    Ok(())
}

/// Reposition `ids` among the slots they currently occupy, leaving every
/// other task where it is.
///
/// With `[A, B, C, D]` and `ids = [D, B]`, the slots of B and D (1 and 3)
/// are refilled in the given order, giving `[A, D, C, B]`.
pub fn reposition_subset(tasks: &mut TaskList, ids: &[TaskId]) -> Result<(), ReorderError> {
    check_subset(tasks, ids)?;

    let mut slots: Vec<usize> = ids.iter().filter_map(|id| tasks.get_index_of(id)).collect();
    slots.sort_unstable();

    let mut order: Vec<TaskId> = tasks.keys().copied().collect();
    for (slot, id) in slots.into_iter().zip(ids) {
        order[slot] = *id;
    }
    sort_by_rank(tasks, &order);
    Ok(())
}

/// Drag-and-drop on a visible list: move the entry at `from` to `to` and
/// return the resulting view order.
pub fn move_within(view: &[TaskId], from: usize, to: usize) -> Result<Vec<TaskId>, ReorderError> {
    let len = view.len();
    for index in [from, to] {
        if index >= len {
            return Err(ReorderError::OutOfRange { index, len });
        }
    }
    let mut order = view.to_vec();
    let moved = order.remove(from);
    order.insert(to, moved);
    Ok(order)
}

fn sort_by_rank(tasks: &mut TaskList, order: &[TaskId]) {
    let rank: HashMap<TaskId, usize> = order.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    let rank_of = |id: &TaskId| rank.get(id).copied().unwrap_or(usize::MAX);
    tasks.sort_by(|a, _, b, _| rank_of(a).cmp(&rank_of(b)));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
