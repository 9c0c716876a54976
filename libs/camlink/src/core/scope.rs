// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::future::Future;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinSet;

/// Shared scope that owns every dispatched bridge operation.
///
/// Tasks spawned here are children of the scope: dropping it (or calling
/// [`TaskScope::shutdown`]) aborts everything still running, which is how
/// module teardown cancels in-flight dispatches. Operations scheduled on
/// the scope run concurrently with each other; the scope imposes no
/// ordering between them.
pub struct TaskScope {
    handle: Handle,
    tasks: Mutex<JoinSet<()>>,
}

impl TaskScope {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            tasks: Mutex::new(JoinSet::new()),
        }
    }

    /// Scope backed by the currently running tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime context.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// Schedule `future` as an independent child of the scope. Never blocks
    /// the calling thread.
    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.tasks.lock();
        tasks.spawn_on(future, &self.handle);

        // Reap whatever already finished so the set doesn't grow without
        // bound across a long-lived module.
        while tasks.try_join_next().is_some() {}
    }

    /// Abort every task still running in the scope.
    pub fn shutdown(&self) {
        self.tasks.lock().abort_all();
    }
}
