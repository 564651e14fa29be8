use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;

use crate::model::config::DeckConfig;
use crate::model::filter::Filter;
use crate::model::task::{default_seed, Task, TaskDraft, TaskId, TaskPatch};
use crate::ops::task_ops::{self, TaskError, TaskList};
use crate::ops::view;

/// What a successful mutation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    Added(TaskId),
    Edited(TaskId),
    Deleted(TaskId),
    Toggled { id: TaskId, completed: bool },
    FilterChanged(Filter),
    Reordered,
}

/// Published to subscribers after every successful mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    /// Store version after the change
    pub version: u64,
    pub kind: ChangeKind,
}

/// Receiving end of [`TaskStore::subscribe`].
pub struct Subscription {
    rx: mpsc::Receiver<Change>,
}

impl Subscription {
    /// Drain pending changes without blocking.
    pub fn poll(&self) -> Vec<Change> {
        self.rx.try_iter().collect()
    }
}

/// Owned copy of the store's observable state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub version: u64,
    pub filter: Filter,
    pub tasks: Vec<Task>,
}

/// The task collection and the only place it is mutated.
///
/// Every operation either applies fully or leaves the store untouched. A
/// successful mutation bumps [`version`](Self::version) and publishes a
/// [`Change`]; a rejected one does neither.
pub struct TaskStore {
    tasks: TaskList,
    /// High-water mark; ids are never handed out twice
    next_id: u64,
    filter: Filter,
    version: u64,
    subscribers: Vec<mpsc::Sender<Change>>,
}

impl Default for TaskStore {
    fn default() -> Self {
        TaskStore::new()
    }
}

impl TaskStore {
    /// An empty store with the `all` filter
    pub fn new() -> Self {
        TaskStore {
            tasks: TaskList::new(),
            next_id: 1,
            filter: Filter::All,
            version: 0,
            subscribers: Vec::new(),
        }
    }

    /// The built-in two-task seed
    pub fn seeded() -> Self {
        let mut store = TaskStore::new();
        for draft in default_seed() {
            store.insert_seed(draft, false);
        }
        store
    }

    /// Initial tasks and filter from the config. Seeding is not a change:
    /// the store starts at version 0.
    pub fn from_config(config: &DeckConfig) -> Result<Self, TaskError> {
        let mut store = TaskStore::new();
        for (draft, completed) in config.seed_tasks() {
            task_ops::validate_title(&draft.title)?;
            store.insert_seed(draft, completed);
        }
        store.filter = config.view.default_filter;
        Ok(store)
    }

    fn insert_seed(&mut self, draft: TaskDraft, completed: bool) {
        let id = self.allocate_id();
        let mut task = Task::from_draft(id, draft);
        task.completed = completed;
        self.tasks.insert(id, task);
    }

    fn allocate_id(&mut self) -> TaskId {
        let id = TaskId::new(self.next_id);
        self.next_id += 1;
        id
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Tasks in display order
    pub fn tasks(&self) -> impl ExactSizeIterator<Item = &Task> + Clone + '_ {
        self.tasks.values()
    }

    pub fn ids(&self) -> Vec<TaskId> {
        self.tasks.keys().copied().collect()
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    /// Like [`get`](Self::get), reporting a missing id as `NotFound`
    pub fn require(&self, id: TaskId) -> Result<&Task, TaskError> {
        self.tasks.get(&id).ok_or(TaskError::NotFound(id))
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: self.version,
            filter: self.filter,
            tasks: self.tasks.values().cloned().collect(),
        }
    }

    /// Tasks passing the active filter as of `today`
    pub fn visible(&self, today: NaiveDate) -> Vec<&Task> {
        view::by_filter(self.tasks.values(), self.filter, today)
    }

    /// Register for change notifications. Dropping the subscription unregisters it.
    pub fn subscribe(&mut self) -> Subscription {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        Subscription { rx }
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Append a new pending task and return its id.
    pub fn add(&mut self, draft: TaskDraft) -> Result<TaskId, TaskError> {
        task_ops::validate_title(&draft.title)?;
        let id = self.allocate_id();
        self.tasks.insert(id, Task::from_draft(id, draft));
        self.commit(ChangeKind::Added(id));
        Ok(id)
    }

    /// Merge `patch` into the task. Fields left unset are untouched.
    pub fn edit(&mut self, id: TaskId, patch: TaskPatch) -> Result<&Task, TaskError> {
        if !self.tasks.contains_key(&id) {
            return Err(TaskError::NotFound(id));
        }
        if let Some(title) = &patch.title {
            task_ops::validate_title(title)?;
        }
        if let Some(task) = self.tasks.get_mut(&id) {
            task.apply(patch);
        }
        self.commit(ChangeKind::Edited(id));
        self.require(id)
    }

    /// Remove the task, keeping the relative order of the rest.
    pub fn delete(&mut self, id: TaskId) -> Result<Task, TaskError> {
        let task = self.tasks.shift_remove(&id).ok_or(TaskError::NotFound(id))?;
        self.commit(ChangeKind::Deleted(id));
        Ok(task)
    }

    /// Flip the completion flag and return the new value.
    pub fn toggle_complete(&mut self, id: TaskId) -> Result<bool, TaskError> {
        let task = self.tasks.get_mut(&id).ok_or(TaskError::NotFound(id))?;
        task.completed = !task.completed;
        let completed = task.completed;
        self.commit(ChangeKind::Toggled { id, completed });
        Ok(completed)
    }

    /// Set the active filter by name. Unknown names leave the filter as it was.
    pub fn set_filter(&mut self, name: &str) -> Result<Filter, TaskError> {
        let filter: Filter = name.parse()?;
        self.set_filter_to(filter);
        Ok(filter)
    }

    pub fn set_filter_to(&mut self, filter: Filter) {
        self.filter = filter;
        self.commit(ChangeKind::FilterChanged(filter));
    }

    /// Replace the display order. `order` must name every live task exactly once.
    pub fn reorder(&mut self, order: &[TaskId]) -> Result<(), TaskError> {
        task_ops::apply_order(&mut self.tasks, order)?;
        self.commit(ChangeKind::Reordered);
        Ok(())
    }

    /// Reorder some tasks among the positions they already hold.
    pub fn reorder_subset(&mut self, ids: &[TaskId]) -> Result<(), TaskError> {
        task_ops::reposition_subset(&mut self.tasks, ids)?;
        self.commit(ChangeKind::Reordered);
        Ok(())
    }

    /// Drag within the title-searched list: move view entry `from` to `to`.
    ///
    /// Tasks hidden by the search keep their positions.
    pub fn move_in_view(&mut self, query: &str, from: usize, to: usize) -> Result<(), TaskError> {
        let view_ids: Vec<TaskId> = view::by_search(self.tasks.values(), query)
            .into_iter()
            .map(|t| t.id)
            .collect();
        let new_view = task_ops::move_within(&view_ids, from, to)?;
        if from == to {
            return Ok(());
        }
        self.reorder_subset(&new_view)
    }

    fn commit(&mut self, kind: ChangeKind) {
        self.version += 1;
        tracing::debug!(version = self.version, change = ?kind, tasks = self.tasks.len(), "store updated");
        let change = Change {
            version: self.version,
            kind,
        };
        self.subscribers.retain(|tx| tx.send(change.clone()).is_ok());
    }
}

/// Cloneable handle for hosts that touch the store from several threads.
///
/// One lock is held per logical operation.
#[derive(Clone, Default)]
pub struct SharedStore {
    inner: Arc<Mutex<TaskStore>>,
}

impl SharedStore {
    pub fn new(store: TaskStore) -> Self {
        SharedStore {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Run a read-only closure against the store.
    pub fn with<R>(&self, f: impl FnOnce(&TaskStore) -> R) -> R {
        f(&*self.lock())
    }

    /// Run one mutation (or a sequence that must not interleave) under the lock.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut TaskStore) -> R) -> R {
        f(&mut *self.lock())
    }

    pub fn snapshot(&self) -> Snapshot {
        self.with(TaskStore::snapshot)
    }

    // Operations never leave the store half-updated, so a poisoned lock still
    // guards consistent data.
    fn lock(&self) -> MutexGuard<'_, TaskStore> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<TaskStore> for SharedStore {
    fn from(store: TaskStore) -> Self {
        SharedStore::new(store)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
