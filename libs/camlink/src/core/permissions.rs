// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Permission prompts and the request-code multiplexer.
//!
//! The platform delivers one `onRequestPermissionsResult`-style callback per
//! prompt, on an arbitrary thread, carrying the request code of whichever
//! prompt finished. With several prompts in flight the bridge must route
//! each callback to exactly the request that issued that code; a listener
//! that does not recognize a code reports it unhandled so the host keeps
//! dispatching.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::core::error::{CameraError, Result};

/// First API level with runtime permission prompts. Below this, grants are
/// install-time and every query reports granted.
pub const RUNTIME_PERMISSIONS_API_LEVEL: u32 = 23;

/// Request codes start here so bridge-issued prompts stand out from other
/// request sources in host logs.
const FIRST_REQUEST_CODE: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionKind {
    Camera,
    Microphone,
}

impl PermissionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Camera => "camera",
            Self::Microphone => "microphone",
        }
    }
}

/// Tri-state permission status as reported across the boundary.
///
/// A denial the user can still be re-prompted for reports as
/// `NotDetermined`, not `Denied`; only a hard refusal is `Denied`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PermissionStatus {
    Granted,
    Denied,
    NotDetermined,
}

/// Host-side permission machinery (the embedding activity).
pub trait PermissionHost: Send + Sync {
    /// Platform API level; decides whether runtime prompts exist at all.
    fn api_level(&self) -> u32;

    /// Current grant state as the platform reports it.
    fn is_granted(&self, kind: PermissionKind) -> bool;

    /// Whether a denied permission can still be prompted for (the user has
    /// not permanently blocked it).
    fn can_prompt_again(&self, kind: PermissionKind) -> bool;

    /// The prompt-capable activity, if one is in the foreground.
    fn prompter(&self) -> Option<Arc<dyn PermissionPrompter>>;
}

/// Issues one native permission prompt, tagged with a request code.
pub trait PermissionPrompter: Send + Sync {
    fn prompt(&self, request_code: i32, kind: PermissionKind);
}

/// Host stand-in for embeddings without permission machinery: a modern API
/// level, nothing granted, no foreground activity.
pub struct DefaultPermissionHost;

impl PermissionHost for DefaultPermissionHost {
    fn api_level(&self) -> u32 {
        34
    }

    fn is_granted(&self, _kind: PermissionKind) -> bool {
        false
    }

    fn can_prompt_again(&self, _kind: PermissionKind) -> bool {
        true
    }

    fn prompter(&self) -> Option<Arc<dyn PermissionPrompter>> {
        None
    }
}

/// Correlates concurrent permission prompts with their platform callbacks.
///
/// Each request moves Idle -> Requested(code) -> Resolved: a unique request
/// code is allocated immediately before the prompt is issued and consumed
/// exactly once when the matching callback fires. Codes are never reused.
pub struct PermissionMultiplexer {
    host: Arc<dyn PermissionHost>,
    next_request_code: AtomicI32,
    pending: Mutex<HashMap<i32, oneshot::Sender<bool>>>,
}

impl PermissionMultiplexer {
    pub fn new(host: Arc<dyn PermissionHost>) -> Self {
        Self {
            host,
            next_request_code: AtomicI32::new(FIRST_REQUEST_CODE),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Tri-state status without prompting. Applies the same re-promptable
    /// reclassification as the request flow.
    pub fn status(&self, kind: PermissionKind) -> PermissionStatus {
        if self.host.api_level() < RUNTIME_PERMISSIONS_API_LEVEL {
            return PermissionStatus::Granted;
        }

        if self.host.is_granted(kind) {
            PermissionStatus::Granted
        } else if self.host.can_prompt_again(kind) {
            PermissionStatus::NotDetermined
        } else {
            PermissionStatus::Denied
        }
    }

    /// Prompt the user and suspend until the correlated callback fires.
    ///
    /// No prompt is issued (and no code allocated) when the platform
    /// predates runtime prompts or when no prompt-capable activity exists.
    /// There is no timeout: the request waits indefinitely for its one-shot
    /// callback.
    pub async fn request(&self, kind: PermissionKind) -> Result<PermissionStatus> {
        if self.host.api_level() < RUNTIME_PERMISSIONS_API_LEVEL {
            tracing::debug!(
                "[permissions] API level predates runtime prompts, {} implicitly granted",
                kind.as_str()
            );
            return Ok(PermissionStatus::Granted);
        }

        let prompter = self.host.prompter().ok_or(CameraError::NoActivity)?;

        let request_code = self.allocate_request_code();
        let (reply_tx, reply_rx) = oneshot::channel();
        self.pending.lock().insert(request_code, reply_tx);

        tracing::debug!(
            "[permissions] prompting for {} (request code {})",
            kind.as_str(),
            request_code
        );
        prompter.prompt(request_code, kind);

        let granted = reply_rx
            .await
            .map_err(|_| anyhow::anyhow!("permission listener dropped before a result arrived"))?;

        Ok(if granted {
            PermissionStatus::Granted
        } else if self.host.can_prompt_again(kind) {
            PermissionStatus::NotDetermined
        } else {
            PermissionStatus::Denied
        })
    }

    /// Platform result entry point. Returns `true` when the code matched a
    /// pending request (which is consumed and deregistered); `false` tells
    /// the host to keep dispatching to other listeners. A callback arriving
    /// after the requester was torn down also reports unhandled: the
    /// prompt was never retracted, but nobody is listening anymore.
    pub fn on_permission_result(&self, request_code: i32, granted: bool) -> bool {
        match self.pending.lock().remove(&request_code) {
            Some(reply) => {
                tracing::debug!(
                    "[permissions] request code {} resolved (granted={})",
                    request_code,
                    granted
                );
                reply.send(granted).is_ok()
            }
            None => false,
        }
    }

    fn allocate_request_code(&self) -> i32 {
        self.next_request_code.fetch_add(1, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct GrantedHost;

    impl PermissionHost for GrantedHost {
        fn api_level(&self) -> u32 {
            33
        }
        fn is_granted(&self, _kind: PermissionKind) -> bool {
            true
        }
        fn can_prompt_again(&self, _kind: PermissionKind) -> bool {
            false
        }
        fn prompter(&self) -> Option<Arc<dyn PermissionPrompter>> {
            None
        }
    }

    struct LegacyHost;

    impl PermissionHost for LegacyHost {
        fn api_level(&self) -> u32 {
            21
        }
        fn is_granted(&self, _kind: PermissionKind) -> bool {
            false
        }
        fn can_prompt_again(&self, _kind: PermissionKind) -> bool {
            false
        }
        fn prompter(&self) -> Option<Arc<dyn PermissionPrompter>> {
            None
        }
    }

    #[test]
    fn test_request_codes_are_unique_under_concurrent_allocation() {
        let mux = Arc::new(PermissionMultiplexer::new(Arc::new(GrantedHost)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let mux = Arc::clone(&mux);
                std::thread::spawn(move || {
                    (0..100).map(|_| mux.allocate_request_code()).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for code in handle.join().unwrap() {
                assert!(seen.insert(code), "request code {} allocated twice", code);
            }
        }
        assert_eq!(seen.len(), 800);
    }

    #[test]
    fn test_first_request_code_is_ten() {
        let mux = PermissionMultiplexer::new(Arc::new(GrantedHost));
        assert_eq!(mux.allocate_request_code(), 10);
        assert_eq!(mux.allocate_request_code(), 11);
    }

    #[tokio::test]
    async fn test_legacy_api_level_short_circuits_without_allocating_a_code() {
        let mux = PermissionMultiplexer::new(Arc::new(LegacyHost));

        let status = mux.request(PermissionKind::Camera).await.unwrap();
        assert_eq!(status, PermissionStatus::Granted);
        assert_eq!(
            mux.next_request_code.load(Ordering::SeqCst),
            FIRST_REQUEST_CODE,
            "no request code should be allocated below the prompt threshold"
        );
        assert!(mux.pending.lock().is_empty());
    }

    #[tokio::test]
    async fn test_no_activity_fails_without_allocating_a_code() {
        let mux = PermissionMultiplexer::new(Arc::new(GrantedHost));

        let err = mux.request(PermissionKind::Microphone).await.unwrap_err();
        assert!(matches!(err, CameraError::NoActivity));
        assert_eq!(
            mux.next_request_code.load(Ordering::SeqCst),
            FIRST_REQUEST_CODE
        );
    }

    #[test]
    fn test_unknown_request_code_reports_unhandled() {
        let mux = PermissionMultiplexer::new(Arc::new(GrantedHost));
        assert!(!mux.on_permission_result(999, true));
    }

    #[test]
    fn test_status_reclassifies_repromptable_denial() {
        let mux = PermissionMultiplexer::new(Arc::new(DefaultPermissionHost));
        assert_eq!(
            mux.status(PermissionKind::Camera),
            PermissionStatus::NotDetermined
        );
    }

    #[test]
    fn test_status_reports_granted_below_prompt_threshold() {
        let mux = PermissionMultiplexer::new(Arc::new(LegacyHost));
        assert_eq!(
            mux.status(PermissionKind::Camera),
            PermissionStatus::Granted
        );
    }
}
