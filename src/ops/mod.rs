pub mod task_ops;
pub mod store;
pub mod view;

pub use store::{Change, ChangeKind, SharedStore, Snapshot, Subscription, TaskStore};
pub use task_ops::{ReorderError, TaskError};
pub use view::{Dashboard, Stats};
