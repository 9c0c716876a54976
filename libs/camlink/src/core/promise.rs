// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::core::error::ErrorRecord;

/// Outcome of one dispatched bridge operation.
pub type Outcome<T> = std::result::Result<T, ErrorRecord>;

/// Completion handle for one dispatched operation.
///
/// Resolves exactly once with either the operation's value or the mapped
/// error record. If the owning module is torn down first, the dispatched
/// task is aborted and the promise resolves with the catch-all record
/// carrying a cancellation cause; teardown is the only path that can drop
/// a completion sender.
pub struct Promise<T> {
    receiver: oneshot::Receiver<Outcome<T>>,
}

impl<T> Promise<T> {
    pub(crate) fn new(receiver: oneshot::Receiver<Outcome<T>>) -> Self {
        Self { receiver }
    }
}

impl<T> Future for Promise<T> {
    type Output = Outcome<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.receiver).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => Poll::Ready(Err(ErrorRecord::unknown(Some(
                "operation cancelled before completion".into(),
            )))),
            Poll::Pending => Poll::Pending,
        }
    }
}
