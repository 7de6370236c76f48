//! End-to-end session flow over the loopback wearable

use std::sync::Arc;
use std::time::Duration;

use wearbridge::{BridgeConfig, ErrorCode, EventSink, LoopbackClient, SessionCoordinator};

mod common;
use common::CollectingSink;

#[tokio::test]
async fn full_session_round_trip() {
    let (loopback, events) = LoopbackClient::new();
    let sink = Arc::new(CollectingSink::default());
    let coordinator = SessionCoordinator::new(
        loopback.capability_client(),
        Arc::clone(&sink) as Arc<dyn EventSink>,
        BridgeConfig::default(),
    );
    coordinator.attach_transport(events).await;

    let env = coordinator.discover_node().await;
    assert!(env.success);
    assert_eq!(env.data.as_ref().unwrap()["id"], "loopback-01");

    let env = coordinator.request_permissions().await;
    assert!(env.success);

    let env = coordinator.start_listening().await;
    assert!(env.success);
    assert_eq!(env.data.as_ref().unwrap()["nodeName"], "Loopback Band");

    // Sent messages are echoed back and relayed to the sink as text
    let env = coordinator.send_message("ping").await;
    assert!(env.success);
    for _ in 0..100 {
        if !sink.messages().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(sink.messages(), vec!["ping".to_string()]);

    // The loopback transport announced connectivity at startup
    assert!(coordinator.state().await.service_connected);

    let env = coordinator.check_remote_app_installed().await;
    assert!(env.success);

    let env = coordinator.launch_remote_app("").await;
    assert_eq!(env.data.as_ref().unwrap()["path"], "/");

    let env = coordinator.stop_listening().await;
    assert!(env.success);
    assert_eq!(env.code, ErrorCode::Ok);

    coordinator.shutdown().await;
}
