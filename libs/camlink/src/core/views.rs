// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::core::error::Result;
use crate::core::types::{
    FocusPoint, PhotoOptions, PhotoResult, RecordingOptions, RecordingResult, SnapshotOptions,
    SnapshotResult,
};

/// Boxed future type for async trait methods (required for dyn compatibility).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A node in the embedder's UI tree.
///
/// The registry stores every registered node behind this trait. Only nodes
/// that identify themselves as camera views resolve successfully; anything
/// else is indistinguishable from a missing node to the dispatch path.
pub trait UiNode: Send + Sync {
    fn as_camera_view(self: Arc<Self>) -> Option<Arc<dyn CameraViewOps>> {
        None
    }
}

/// Operations surface of the camera view component.
///
/// The view owns the device session, capture pipeline, and recording state
/// machine. The bridge holds a reference only for the duration of one
/// dispatched operation and never caches it across calls: methods take
/// `self: Arc<Self>` so each operation owns its reference for exactly as
/// long as it runs.
///
/// `start_recording` resolves when the recording *finishes* (or fails), not
/// when it begins; pause/resume/stop act on the in-flight recording.
pub trait CameraViewOps: Send + Sync {
    fn take_photo(self: Arc<Self>, options: PhotoOptions) -> BoxFuture<'static, Result<PhotoResult>>;

    fn take_snapshot(
        self: Arc<Self>,
        options: SnapshotOptions,
    ) -> BoxFuture<'static, Result<SnapshotResult>>;

    fn start_recording(
        self: Arc<Self>,
        options: RecordingOptions,
    ) -> BoxFuture<'static, Result<RecordingResult>>;

    fn pause_recording(self: Arc<Self>) -> BoxFuture<'static, Result<()>>;

    fn resume_recording(self: Arc<Self>) -> BoxFuture<'static, Result<()>>;

    fn stop_recording(self: Arc<Self>) -> BoxFuture<'static, Result<()>>;

    fn focus(self: Arc<Self>, point: FocusPoint) -> BoxFuture<'static, Result<()>>;
}
