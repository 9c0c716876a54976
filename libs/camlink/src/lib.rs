// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Asynchronous bridge between an embedding UI runtime and the native
//! camera subsystem.
//!
//! Boundary calls enter [`CameraModule`], are dispatched onto a shared task
//! scope, resolve their target view on the UI-owning thread, and complete a
//! promise or callback exactly once, with the operation's value or with a
//! structured [`ErrorRecord`]. See `core::permissions` for the concurrent
//! permission-prompt multiplexer.

pub mod core;

pub use crate::core::{
    BoxFuture, CameraError, CameraModule, CameraModuleBuilder, CameraViewOps, DeviceDescriptor,
    DeviceEnumerator, DeviceFormat, DevicePosition, ErrorRecord, FlashMode, FocusPoint, Orientation,
    Outcome, PermissionHost, PermissionKind, PermissionMultiplexer, PermissionPrompter,
    PermissionStatus, PhotoOptions, PhotoResult, Promise, QualityPrioritization, RecordingOptions,
    RecordingResult, Result, RuntimeBindings, SnapshotOptions, SnapshotResult, TaskScope, UiNode,
    UiThread, VideoCodec, VideoFileType, ViewHandle, ViewResolver,
};
