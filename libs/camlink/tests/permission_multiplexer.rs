//! Integration tests for the permission request flow: request-code
//! correlation across concurrent prompts, the short-circuit paths, and
//! tri-state reclassification at the boundary.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use camlink::{
    CameraModule, PermissionHost, PermissionKind, PermissionPrompter, PermissionStatus, Promise,
};

/// Records every prompt the bridge issues instead of showing UI.
#[derive(Default)]
struct RecordingPrompter {
    issued: Mutex<Vec<(i32, PermissionKind)>>,
}

impl PermissionPrompter for RecordingPrompter {
    fn prompt(&self, request_code: i32, kind: PermissionKind) {
        self.issued.lock().push((request_code, kind));
    }
}

/// Scriptable permission host: API level, grant state, and activity
/// presence are all adjustable mid-test.
struct ScriptedHost {
    api_level: AtomicU32,
    granted: AtomicBool,
    repromptable: AtomicBool,
    prompter: Mutex<Option<Arc<RecordingPrompter>>>,
}

impl ScriptedHost {
    fn new(api_level: u32, prompter: Option<Arc<RecordingPrompter>>) -> Self {
        Self {
            api_level: AtomicU32::new(api_level),
            granted: AtomicBool::new(false),
            repromptable: AtomicBool::new(true),
            prompter: Mutex::new(prompter),
        }
    }
}

impl PermissionHost for ScriptedHost {
    fn api_level(&self) -> u32 {
        self.api_level.load(Ordering::SeqCst)
    }

    fn is_granted(&self, _kind: PermissionKind) -> bool {
        self.granted.load(Ordering::SeqCst)
    }

    fn can_prompt_again(&self, _kind: PermissionKind) -> bool {
        self.repromptable.load(Ordering::SeqCst)
    }

    fn prompter(&self) -> Option<Arc<dyn PermissionPrompter>> {
        self.prompter
            .lock()
            .clone()
            .map(|prompter| prompter as Arc<dyn PermissionPrompter>)
    }
}

/// Let the dispatched request tasks run until `count` prompts are visible.
async fn wait_for_prompts(prompter: &RecordingPrompter, count: usize) -> Vec<(i32, PermissionKind)> {
    for _ in 0..200 {
        {
            let issued = prompter.issued.lock();
            if issued.len() >= count {
                return issued.clone();
            }
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("expected {} prompts, saw {:?}", count, prompter.issued.lock());
}

async fn assert_pending(promise: &mut Promise<PermissionStatus>) {
    let poll = tokio::time::timeout(Duration::from_millis(50), promise).await;
    assert!(poll.is_err(), "promise should still be pending");
}

#[tokio::test]
async fn test_concurrent_requests_get_distinct_codes_and_resolve_out_of_order() {
    let prompter = Arc::new(RecordingPrompter::default());
    let host = ScriptedHost::new(33, Some(prompter.clone()));
    let module = CameraModule::builder().with_permission_host(host).build();

    let mut first = module.request_camera_permission();
    let mut second = module.request_camera_permission();

    let issued = wait_for_prompts(&prompter, 2).await;
    assert_eq!(
        issued.iter().map(|(code, _)| *code).collect::<Vec<_>>(),
        vec![10, 11],
        "each in-flight request gets its own monotonically allocated code"
    );

    // The second prompt finishes first.
    assert!(module.on_permission_result(11, true));
    assert_eq!((&mut second).await, Ok(PermissionStatus::Granted));

    // The first request is untouched by the other request's callback.
    assert_pending(&mut first).await;

    assert!(module.on_permission_result(10, false));
    assert_eq!(
        first.await,
        Ok(PermissionStatus::NotDetermined),
        "a re-promptable denial reports not-determined"
    );
}

#[tokio::test]
async fn test_mismatched_request_code_resolves_nothing() {
    let prompter = Arc::new(RecordingPrompter::default());
    let host = ScriptedHost::new(33, Some(prompter.clone()));
    let module = CameraModule::builder().with_permission_host(host).build();

    let mut request = module.request_microphone_permission();
    wait_for_prompts(&prompter, 1).await;

    assert!(
        !module.on_permission_result(99, true),
        "a foreign request code must be reported unhandled"
    );
    assert_pending(&mut request).await;

    assert!(module.on_permission_result(10, true));
    assert_eq!(request.await, Ok(PermissionStatus::Granted));
}

#[tokio::test]
async fn test_below_prompt_threshold_resolves_granted_without_prompting() {
    let prompter = Arc::new(RecordingPrompter::default());
    let host = Arc::new(ScriptedHost::new(21, Some(prompter.clone())));
    let module = CameraModule::builder()
        .with_permission_host_arc(host.clone())
        .build();

    let status = module
        .request_camera_permission()
        .await
        .expect("legacy platforms grant implicitly");
    assert_eq!(status, PermissionStatus::Granted);
    assert!(
        prompter.issued.lock().is_empty(),
        "no native prompt may be issued below the threshold"
    );

    // No request code was consumed either: the first real prompt still
    // carries the initial code.
    host.api_level.store(33, Ordering::SeqCst);
    let _request = module.request_camera_permission();
    let issued = wait_for_prompts(&prompter, 1).await;
    assert_eq!(issued[0].0, 10);
}

#[tokio::test]
async fn test_request_without_activity_rejects_immediately() {
    let host = ScriptedHost::new(33, None);
    let module = CameraModule::builder().with_permission_host(host).build();

    let record = module
        .request_camera_permission()
        .await
        .expect_err("no activity means no prompt to wait for");
    assert_eq!(record.code, "system/no-activity");
}

#[tokio::test]
async fn test_hard_denial_reports_denied() {
    let prompter = Arc::new(RecordingPrompter::default());
    let host = ScriptedHost::new(33, Some(prompter.clone()));
    host.repromptable.store(false, Ordering::SeqCst);
    let module = CameraModule::builder().with_permission_host(host).build();

    let request = module.request_microphone_permission();
    wait_for_prompts(&prompter, 1).await;

    assert!(module.on_permission_result(10, false));
    assert_eq!(request.await, Ok(PermissionStatus::Denied));
}

#[tokio::test]
async fn test_status_queries_apply_the_same_reclassification() {
    let host = Arc::new(ScriptedHost::new(33, None));
    let module = CameraModule::builder()
        .with_permission_host_arc(host.clone())
        .build();

    assert_eq!(
        module.get_camera_permission_status(),
        PermissionStatus::NotDetermined,
        "denied-but-re-promptable reports not-determined, never denied"
    );

    host.repromptable.store(false, Ordering::SeqCst);
    assert_eq!(
        module.get_microphone_permission_status(),
        PermissionStatus::Denied
    );

    host.granted.store(true, Ordering::SeqCst);
    assert_eq!(
        module.get_camera_permission_status(),
        PermissionStatus::Granted
    );

    host.granted.store(false, Ordering::SeqCst);
    host.api_level.store(22, Ordering::SeqCst);
    assert_eq!(
        module.get_camera_permission_status(),
        PermissionStatus::Granted,
        "install-time platforms always report granted"
    );
}
