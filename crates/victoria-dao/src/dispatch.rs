use std::future::Future;

use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::task::{self, JoinHandle};

use crate::error::{DaoError, DaoResult};

/// Drives DAO futures on a tokio runtime, either to completion on the
/// calling thread or in the background with a continuation.
#[derive(Clone, Debug)]
pub(crate) struct Dispatcher {
    handle: Handle,
}

impl Dispatcher {
    pub(crate) fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Block the calling thread until `future` resolves.
    ///
    /// Outside any runtime context the thread blocks directly. Inside a
    /// multi-threaded runtime, on a worker or a blocking-pool thread alike,
    /// the call goes through [`task::block_in_place`]. Inside a
    /// current-thread runtime the call fails instead: its single worker
    /// cannot hand off its tasks.
    pub(crate) fn block_on<F, T>(&self, future: F) -> DaoResult<T>
    where
        F: Future<Output = DaoResult<T>>,
    {
        let Ok(current) = Handle::try_current() else {
            return self.handle.block_on(future);
        };
        match current.runtime_flavor() {
            RuntimeFlavor::MultiThread => {
                task::block_in_place(|| self.handle.block_on(future))
            }
            _ => Err(DaoError::Runtime(
                "blocking call made from within a current-thread runtime".into(),
            )),
        }
    }

    /// Run `future` on the runtime and hand its result, success or failure,
    /// to `callback`.
    pub(crate) fn spawn_with<F, T, C>(&self, future: F, callback: C) -> JoinHandle<()>
    where
        F: Future<Output = DaoResult<T>> + Send + 'static,
        T: Send + 'static,
        C: FnOnce(DaoResult<T>) + Send + 'static,
    {
        self.handle.spawn(async move { callback(future.await) })
    }
}
