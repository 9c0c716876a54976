// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! UI-thread ownership of the view registry.
//!
//! The registry lives on a dedicated thread; every lookup and mutation
//! marshals through the command channel and executes there, regardless of
//! which thread asked. Resolution is a one-shot rendezvous: the caller
//! suspends on a reply channel and is resumed exactly once with the result.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::Sender;
use tokio::sync::oneshot;

use crate::core::error::{CameraError, Result};
use crate::core::types::ViewHandle;
use crate::core::views::{CameraViewOps, UiNode};

enum UiCommand {
    Resolve {
        handle: ViewHandle,
        reply: oneshot::Sender<Option<Arc<dyn CameraViewOps>>>,
    },
    Register {
        handle: ViewHandle,
        node: Arc<dyn UiNode>,
        reply: Sender<()>,
    },
    Unregister {
        handle: ViewHandle,
        reply: Sender<()>,
    },
    Shutdown,
}

/// Owns the UI-affine view registry and its command loop.
pub struct UiThread {
    command_tx: Sender<UiCommand>,
    join: Option<JoinHandle<()>>,
}

impl UiThread {
    pub fn spawn() -> Self {
        let (command_tx, command_rx) = crossbeam_channel::unbounded();

        let join = std::thread::Builder::new()
            .name("camlink-ui".into())
            .spawn(move || {
                let mut registry: HashMap<ViewHandle, Arc<dyn UiNode>> = HashMap::new();

                for command in command_rx {
                    match command {
                        UiCommand::Resolve { handle, reply } => {
                            let view = registry
                                .get(&handle)
                                .cloned()
                                .and_then(|node| node.as_camera_view());
                            // Receiver may have been cancelled mid-rendezvous.
                            let _ = reply.send(view);
                        }
                        UiCommand::Register {
                            handle,
                            node,
                            reply,
                        } => {
                            if registry.insert(handle, node).is_some() {
                                tracing::debug!("[ui] handle {} re-registered", handle);
                            }
                            let _ = reply.send(());
                        }
                        UiCommand::Unregister { handle, reply } => {
                            registry.remove(&handle);
                            let _ = reply.send(());
                        }
                        UiCommand::Shutdown => break,
                    }
                }

                tracing::debug!("[ui] command loop exited ({} views live)", registry.len());
            })
            .expect("failed to spawn camlink-ui thread");

        Self {
            command_tx,
            join: Some(join),
        }
    }

    /// Cloneable lookup handle for the dispatch path.
    pub fn resolver(&self) -> ViewResolver {
        ViewResolver {
            command_tx: self.command_tx.clone(),
        }
    }

    /// Attach a node to the view tree. Blocks briefly while the UI thread
    /// applies the change.
    pub fn register_view(&self, handle: ViewHandle, node: Arc<dyn UiNode>) {
        self.send_and_recv(|reply| UiCommand::Register {
            handle,
            node,
            reply,
        });
    }

    /// Detach a node from the view tree. In-flight operations that already
    /// resolved this handle keep their reference until they finish.
    pub fn unregister_view(&self, handle: ViewHandle) {
        self.send_and_recv(|reply| UiCommand::Unregister { handle, reply });
    }

    fn send_and_recv(&self, make_cmd: impl FnOnce(Sender<()>) -> UiCommand) {
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        if self.command_tx.send(make_cmd(reply_tx)).is_ok() {
            let _ = reply_rx.recv();
        }
    }
}

impl Drop for UiThread {
    fn drop(&mut self) {
        let _ = self.command_tx.send(UiCommand::Shutdown);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Performs the cross-thread view lookup rendezvous.
#[derive(Clone)]
pub struct ViewResolver {
    command_tx: Sender<UiCommand>,
}

impl ViewResolver {
    /// Resolve `handle` to a live camera view.
    ///
    /// The lookup itself runs on the UI thread; the caller suspends until
    /// the one-shot reply arrives. A single attempt per call; callers
    /// needing retry must re-invoke. A missing node or a node that is not a
    /// camera view both resolve to `ViewNotFound`.
    pub async fn resolve(&self, handle: ViewHandle) -> Result<Arc<dyn CameraViewOps>> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(UiCommand::Resolve {
                handle,
                reply: reply_tx,
            })
            .map_err(|_| anyhow::anyhow!("UI thread command channel closed"))?;

        match reply_rx.await {
            Ok(Some(view)) => Ok(view),
            Ok(None) => Err(CameraError::ViewNotFound(handle)),
            Err(_) => Err(CameraError::from(anyhow::anyhow!(
                "UI thread dropped the lookup reply"
            ))),
        }
    }
}
