// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! The bridge module: every boundary operation enters here.
//!
//! Each call is dispatched as an independent unit of work on the module's
//! task scope, resolves its target view through the UI thread, runs the
//! operation, and completes the caller's promise or callback exactly once.
//! No fault crosses the boundary unconverted.

use std::sync::Arc;

use futures_util::FutureExt;
use tokio::sync::oneshot;

use crate::core::devices::{DefaultDeviceEnumerator, DeviceDescriptor, DeviceEnumerator};
use crate::core::error::{CameraError, ErrorRecord, Result};
use crate::core::permissions::{
    DefaultPermissionHost, PermissionHost, PermissionKind, PermissionMultiplexer, PermissionStatus,
};
use crate::core::promise::{Outcome, Promise};
use crate::core::scope::TaskScope;
use crate::core::types::{
    FocusPoint, PhotoOptions, PhotoResult, RecordingOptions, RecordingResult, SnapshotOptions,
    SnapshotResult, ViewHandle,
};
use crate::core::ui::{UiThread, ViewResolver};
use crate::core::views::{BoxFuture, CameraViewOps, UiNode};

/// Installs the host capability hook (e.g. frame-processor bindings) into
/// the embedding runtime.
pub trait RuntimeBindings: Send + Sync {
    fn install(&self) -> Result<()>;
}

/// Bindings stand-in for hosts without a frame-processor runtime linked in.
pub struct DefaultBindings;

impl RuntimeBindings for DefaultBindings {
    fn install(&self) -> Result<()> {
        Err(CameraError::Other(anyhow::anyhow!(
            "frame-processor runtime not linked into this host"
        )))
    }
}

/// Asynchronous camera bridge between the embedding runtime and the native
/// camera views.
///
/// # Thread Safety
///
/// All methods take `&self`; the module is shared via `Arc` without
/// external synchronization. Dispatched operations run concurrently with
/// each other and with the UI thread; callers needing ordering (e.g.
/// pause-then-resume) must serialize their own calls.
pub struct CameraModule {
    // Field order matters on teardown: the scope aborts dispatched tasks
    // before the UI thread stops.
    scope: TaskScope,
    permissions: Arc<PermissionMultiplexer>,
    devices: Arc<dyn DeviceEnumerator>,
    bindings: Arc<dyn RuntimeBindings>,
    resolver: ViewResolver,
    ui: UiThread,
}

impl CameraModule {
    pub fn builder() -> CameraModuleBuilder {
        CameraModuleBuilder::new()
    }

    // =========================================================================
    // Capability hook
    // =========================================================================

    /// Install the host capability hook. Synchronous; a failed install is
    /// logged and reported as `false`, never propagated.
    pub fn install_bindings(&self) -> bool {
        match self.bindings.install() {
            Ok(()) => {
                tracing::info!("[module] runtime bindings installed");
                true
            }
            Err(e) => {
                tracing::warn!("[module] failed to install runtime bindings: {}", e);
                false
            }
        }
    }

    // =========================================================================
    // View operations
    // =========================================================================

    pub fn take_photo(&self, handle: ViewHandle, options: PhotoOptions) -> Promise<PhotoResult> {
        self.dispatch(handle, move |view| view.take_photo(options))
    }

    pub fn take_snapshot(
        &self,
        handle: ViewHandle,
        options: SnapshotOptions,
    ) -> Promise<SnapshotResult> {
        self.dispatch(handle, move |view| view.take_snapshot(options))
    }

    /// Start a recording. The callback fires exactly once when the
    /// recording finishes: `(Some(result), None)` on success,
    /// `(None, Some(record))` on failure.
    pub fn start_recording<F>(&self, handle: ViewHandle, options: RecordingOptions, on_recorded: F)
    where
        F: FnOnce(Option<RecordingResult>, Option<ErrorRecord>) + Send + 'static,
    {
        let resolver = self.resolver.clone();
        self.scope.spawn(async move {
            match Self::run(resolver, handle, move |view| view.start_recording(options)).await {
                Ok(result) => on_recorded(Some(result), None),
                Err(record) => on_recorded(None, Some(record)),
            }
        });
    }

    pub fn pause_recording(&self, handle: ViewHandle) -> Promise<()> {
        self.dispatch(handle, |view| view.pause_recording())
    }

    pub fn resume_recording(&self, handle: ViewHandle) -> Promise<()> {
        self.dispatch(handle, |view| view.resume_recording())
    }

    pub fn stop_recording(&self, handle: ViewHandle) -> Promise<()> {
        self.dispatch(handle, |view| view.stop_recording())
    }

    pub fn focus(&self, handle: ViewHandle, point: FocusPoint) -> Promise<()> {
        self.dispatch(handle, move |view| view.focus(point))
    }

    // =========================================================================
    // Devices
    // =========================================================================

    pub fn get_available_camera_devices(&self) -> Promise<Vec<DeviceDescriptor>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let devices = Arc::clone(&self.devices);
        self.scope.spawn(async move {
            let outcome = devices.enumerate().map_err(|e| ErrorRecord::from(&e));
            let _ = reply_tx.send(outcome);
        });
        Promise::new(reply_rx)
    }

    // =========================================================================
    // Permissions
    // =========================================================================

    pub fn get_camera_permission_status(&self) -> PermissionStatus {
        self.permissions.status(PermissionKind::Camera)
    }

    pub fn get_microphone_permission_status(&self) -> PermissionStatus {
        self.permissions.status(PermissionKind::Microphone)
    }

    pub fn request_camera_permission(&self) -> Promise<PermissionStatus> {
        self.request_permission(PermissionKind::Camera)
    }

    pub fn request_microphone_permission(&self) -> Promise<PermissionStatus> {
        self.request_permission(PermissionKind::Microphone)
    }

    /// Route a platform permission-result callback into the multiplexer.
    /// Returns `true` when one of this module's pending requests consumed
    /// it; `false` tells the host to keep dispatching to other listeners.
    pub fn on_permission_result(&self, request_code: i32, granted: bool) -> bool {
        self.permissions.on_permission_result(request_code, granted)
    }

    fn request_permission(&self, kind: PermissionKind) -> Promise<PermissionStatus> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let permissions = Arc::clone(&self.permissions);
        self.scope.spawn(async move {
            let outcome = permissions
                .request(kind)
                .await
                .map_err(|e| ErrorRecord::from(&e));
            let _ = reply_tx.send(outcome);
        });
        Promise::new(reply_rx)
    }

    // =========================================================================
    // View registry (embedder side)
    // =========================================================================

    /// Attach a node to the view tree under `handle`.
    pub fn register_view(&self, handle: ViewHandle, node: Arc<dyn UiNode>) {
        self.ui.register_view(handle, node);
    }

    /// Detach the node registered under `handle`, if any.
    pub fn unregister_view(&self, handle: ViewHandle) {
        self.ui.unregister_view(handle);
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Cancel every in-flight dispatched operation. Dropping the module
    /// does this implicitly and also stops the UI thread. Already-issued
    /// permission prompts are not retracted; their late callbacks report
    /// unhandled.
    pub fn shutdown(&self) {
        tracing::info!("[module] shutting down, aborting in-flight dispatches");
        self.scope.shutdown();
    }

    // =========================================================================
    // Dispatch core
    // =========================================================================

    /// Schedule `op` against the view behind `handle` and hand back the
    /// completion promise. The calling thread never blocks.
    fn dispatch<T, F>(&self, handle: ViewHandle, op: F) -> Promise<T>
    where
        T: Send + 'static,
        F: FnOnce(Arc<dyn CameraViewOps>) -> BoxFuture<'static, Result<T>> + Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let resolver = self.resolver.clone();
        self.scope.spawn(async move {
            let outcome = Self::run(resolver, handle, op).await;
            // Completion can race module teardown; a dropped receiver is
            // the only way this send fails.
            let _ = reply_tx.send(outcome);
        });
        Promise::new(reply_rx)
    }

    /// Resolve, invoke, convert. Every fault (typed, unclassified, or a
    /// panic inside the operation) comes back as an `ErrorRecord`.
    async fn run<T, F>(resolver: ViewResolver, handle: ViewHandle, op: F) -> Outcome<T>
    where
        T: Send + 'static,
        F: FnOnce(Arc<dyn CameraViewOps>) -> BoxFuture<'static, Result<T>> + Send + 'static,
    {
        let view = match resolver.resolve(handle).await {
            Ok(view) => view,
            Err(e) => {
                tracing::warn!("[module] dispatch against handle {} failed: {}", handle, e);
                return Err(ErrorRecord::from(&e));
            }
        };

        match std::panic::AssertUnwindSafe(op(view)).catch_unwind().await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(fault)) => Err(ErrorRecord::from(&fault)),
            Err(panic) => {
                let cause = panic_cause(panic.as_ref());
                tracing::error!(
                    "[module] operation against handle {} panicked: {}",
                    handle,
                    cause
                );
                Err(ErrorRecord::unknown(Some(cause)))
            }
        }
    }
}

fn panic_cause(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "operation panicked with a non-string payload".to_string()
    }
}

/// Builder for configuring and constructing a [`CameraModule`].
pub struct CameraModuleBuilder {
    permission_host: Option<Arc<dyn PermissionHost>>,
    devices: Option<Arc<dyn DeviceEnumerator>>,
    bindings: Option<Arc<dyn RuntimeBindings>>,
    runtime: Option<tokio::runtime::Handle>,
}

impl Default for CameraModuleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraModuleBuilder {
    pub fn new() -> Self {
        Self {
            permission_host: None,
            devices: None,
            bindings: None,
            runtime: None,
        }
    }

    /// Set the host-side permission machinery.
    pub fn with_permission_host<H: PermissionHost + 'static>(mut self, host: H) -> Self {
        self.permission_host = Some(Arc::new(host));
        self
    }

    /// Set the host-side permission machinery from an Arc.
    pub fn with_permission_host_arc(mut self, host: Arc<dyn PermissionHost>) -> Self {
        self.permission_host = Some(host);
        self
    }

    /// Set the platform device enumerator.
    pub fn with_device_enumerator<D: DeviceEnumerator + 'static>(mut self, devices: D) -> Self {
        self.devices = Some(Arc::new(devices));
        self
    }

    /// Set the platform device enumerator from an Arc.
    pub fn with_device_enumerator_arc(mut self, devices: Arc<dyn DeviceEnumerator>) -> Self {
        self.devices = Some(devices);
        self
    }

    /// Set the capability-hook installer.
    pub fn with_bindings<B: RuntimeBindings + 'static>(mut self, bindings: B) -> Self {
        self.bindings = Some(Arc::new(bindings));
        self
    }

    /// Set the capability-hook installer from an Arc.
    pub fn with_bindings_arc(mut self, bindings: Arc<dyn RuntimeBindings>) -> Self {
        self.bindings = Some(bindings);
        self
    }

    /// Run dispatched operations on a specific tokio runtime instead of
    /// the one current at build time.
    pub fn with_runtime_handle(mut self, handle: tokio::runtime::Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Build the module with the configured collaborators, spawning its UI
    /// thread.
    ///
    /// # Panics
    ///
    /// Panics when no runtime handle was provided and the builder runs
    /// outside a tokio runtime context.
    pub fn build(self) -> CameraModule {
        let permission_host = self
            .permission_host
            .unwrap_or_else(|| Arc::new(DefaultPermissionHost));
        let devices = self
            .devices
            .unwrap_or_else(|| Arc::new(DefaultDeviceEnumerator));
        let bindings = self.bindings.unwrap_or_else(|| Arc::new(DefaultBindings));
        let scope = match self.runtime {
            Some(handle) => TaskScope::new(handle),
            None => TaskScope::current(),
        };

        let ui = UiThread::spawn();
        let resolver = ui.resolver();

        CameraModule {
            scope,
            permissions: Arc::new(PermissionMultiplexer::new(permission_host)),
            devices,
            bindings,
            resolver,
            ui,
        }
    }
}
