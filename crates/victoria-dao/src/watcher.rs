//! Lifecycle notification around DAO operations.
//!
//! A [`LifecycleWatcher`] is a best-effort sink. The DAO calls its hooks
//! around saves, removals and loads, but a failing hook never fails or
//! rolls back the storage operation. Failures are logged and published as
//! [`WatcherFailure`]s instead.
//!
//! Every hook has a no-op default, so a watcher only overrides the hooks it
//! cares about.

use std::fmt;

use tracing::debug;

use crate::error::WatcherResult;

/// Hooks invoked by a [`Dao`](crate::Dao).
pub trait LifecycleWatcher<E>: Send + Sync {
    /// Before the element is written under `id`.
    fn before_save(&self, _element: &E, _id: &str) -> WatcherResult {
        Ok(())
    }

    /// After the element was written under `id`.
    fn after_save(&self, _element: &E, _id: &str) -> WatcherResult {
        Ok(())
    }

    /// Before the document for `id` is deleted.
    fn before_remove(&self, _id: &str) -> WatcherResult {
        Ok(())
    }

    /// After the document for `id` was deleted (or found absent).
    fn after_remove(&self, _id: &str) -> WatcherResult {
        Ok(())
    }

    /// After an element was loaded and decoded.
    fn after_load(&self, _element: &E) -> WatcherResult {
        Ok(())
    }
}

/// The default watcher: ignores every hook.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopWatcher;

impl<E> LifecycleWatcher<E> for NoopWatcher {}

/// Logs every hook at debug level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingWatcher;

impl<E> LifecycleWatcher<E> for TracingWatcher {
    fn before_save(&self, _element: &E, id: &str) -> WatcherResult {
        debug!(hook = %Hook::BeforeSave, id, "lifecycle");
        Ok(())
    }

    fn after_save(&self, _element: &E, id: &str) -> WatcherResult {
        debug!(hook = %Hook::AfterSave, id, "lifecycle");
        Ok(())
    }

    fn before_remove(&self, id: &str) -> WatcherResult {
        debug!(hook = %Hook::BeforeRemove, id, "lifecycle");
        Ok(())
    }

    fn after_remove(&self, id: &str) -> WatcherResult {
        debug!(hook = %Hook::AfterRemove, id, "lifecycle");
        Ok(())
    }

    fn after_load(&self, _element: &E) -> WatcherResult {
        debug!(hook = %Hook::AfterLoad, "lifecycle");
        Ok(())
    }
}

/// Identifies a lifecycle hook.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Hook {
    BeforeSave,
    AfterSave,
    BeforeRemove,
    AfterRemove,
    AfterLoad,
}

impl Hook {
    pub fn as_str(&self) -> &'static str {
        match self {
            Hook::BeforeSave => "before_save",
            Hook::AfterSave => "after_save",
            Hook::BeforeRemove => "before_remove",
            Hook::AfterRemove => "after_remove",
            Hook::AfterLoad => "after_load",
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A hook failure isolated from the operation that triggered it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatcherFailure {
    pub entity: &'static str,
    pub hook: Hook,
    /// The element id, when the hook has one.
    pub id: Option<String>,
    pub message: String,
}
