//! Shared test doubles for session coordinator tests
#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use wearbridge::{
    AuthClient, BridgeConfig, CapabilityClient, Error, EventSink, MessageClient, Node, NodeClient,
    NotifyClient, PackageQuery, Permission, Result, ServiceStatus, SessionCoordinator,
};

/// Scripted capability client recording every call it receives
#[derive(Default)]
pub struct RecordingClient {
    pub nodes: Mutex<Vec<Node>>,

    pub fail_discovery: AtomicBool,
    pub fail_request: AtomicBool,
    pub fail_send: AtomicBool,
    pub fail_notify: AtomicBool,
    pub fail_subscribe: AtomicBool,
    pub fail_unsubscribe: AtomicBool,
    pub fail_permission_check: AtomicBool,
    pub fail_install_query: AtomicBool,
    pub fail_package_query: AtomicBool,
    pub fail_launch: AtomicBool,

    /// Whether check_permissions reports the device-manager grant
    pub permission_granted: AtomicBool,
    /// Whether the remote app is reported installed
    pub remote_installed: AtomicBool,
    /// Whether the companion package is reported installed
    pub companion_installed: AtomicBool,

    pub discovery_calls: AtomicUsize,
    pub subscribe_calls: AtomicUsize,
    pub unsubscribe_calls: AtomicUsize,
    pub send_calls: AtomicUsize,
    pub notify_calls: AtomicUsize,
    pub permission_check_calls: AtomicUsize,
    pub install_query_calls: AtomicUsize,
    pub package_calls: AtomicUsize,
    pub launch_calls: AtomicUsize,

    pub sent: Mutex<Vec<Vec<u8>>>,
    pub launched_paths: Mutex<Vec<String>>,
}

impl RecordingClient {
    /// Client with one discoverable node and every outcome succeeding
    pub fn with_node(id: &str, name: &str) -> Arc<Self> {
        let client = Self {
            nodes: Mutex::new(vec![Node::new(id, name)]),
            permission_granted: AtomicBool::new(true),
            remote_installed: AtomicBool::new(true),
            companion_installed: AtomicBool::new(true),
            ..Self::default()
        };
        Arc::new(client)
    }

    /// Client whose discovery returns no nodes
    pub fn empty() -> Arc<Self> {
        let client = Self {
            permission_granted: AtomicBool::new(true),
            remote_installed: AtomicBool::new(true),
            companion_installed: AtomicBool::new(true),
            ..Self::default()
        };
        Arc::new(client)
    }

    /// Aggregate with every handle pointing at this recording instance
    pub fn client(self: &Arc<Self>) -> CapabilityClient {
        CapabilityClient::new()
            .with_node(Arc::clone(self) as Arc<dyn NodeClient>)
            .with_auth(Arc::clone(self) as Arc<dyn AuthClient>)
            .with_message(Arc::clone(self) as Arc<dyn MessageClient>)
            .with_notify(Arc::clone(self) as Arc<dyn NotifyClient>)
            .with_package(Arc::clone(self) as Arc<dyn PackageQuery>)
    }
}

fn scripted(flag: &AtomicBool, err: Error) -> Result<()> {
    if flag.load(Ordering::SeqCst) {
        Err(err)
    } else {
        Ok(())
    }
}

#[async_trait]
impl NodeClient for RecordingClient {
    async fn connected_nodes(&self) -> Result<Vec<Node>> {
        self.discovery_calls.fetch_add(1, Ordering::SeqCst);
        scripted(
            &self.fail_discovery,
            Error::Node("discovery unavailable".to_string()),
        )?;
        Ok(self.nodes.lock().unwrap().clone())
    }

    async fn is_remote_app_installed(&self, _node_id: &str) -> Result<bool> {
        self.install_query_calls.fetch_add(1, Ordering::SeqCst);
        scripted(
            &self.fail_install_query,
            Error::Node("install query failed".to_string()),
        )?;
        Ok(self.remote_installed.load(Ordering::SeqCst))
    }

    async fn launch_remote_app(&self, _node_id: &str, path: &str) -> Result<()> {
        self.launch_calls.fetch_add(1, Ordering::SeqCst);
        scripted(&self.fail_launch, Error::Node("launch failed".to_string()))?;
        self.launched_paths.lock().unwrap().push(path.to_string());
        Ok(())
    }
}

#[async_trait]
impl AuthClient for RecordingClient {
    async fn request_permissions(
        &self,
        _node_id: &str,
        permissions: &[Permission],
    ) -> Result<Vec<Permission>> {
        scripted(
            &self.fail_request,
            Error::Auth("permission request rejected".to_string()),
        )?;
        Ok(permissions.to_vec())
    }

    async fn check_permissions(
        &self,
        _node_id: &str,
        permissions: &[Permission],
    ) -> Result<Vec<bool>> {
        self.permission_check_calls.fetch_add(1, Ordering::SeqCst);
        scripted(
            &self.fail_permission_check,
            Error::Auth("permission check unavailable".to_string()),
        )?;
        let granted = self.permission_granted.load(Ordering::SeqCst);
        Ok(vec![granted; permissions.len()])
    }
}

#[async_trait]
impl MessageClient for RecordingClient {
    async fn send_message(&self, _node_id: &str, payload: &[u8]) -> Result<()> {
        self.send_calls.fetch_add(1, Ordering::SeqCst);
        scripted(&self.fail_send, Error::Message("send rejected".to_string()))?;
        self.sent.lock().unwrap().push(payload.to_vec());
        Ok(())
    }

    async fn subscribe(&self, _node_id: &str) -> Result<()> {
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        scripted(
            &self.fail_subscribe,
            Error::Message("subscribe rejected".to_string()),
        )
    }

    async fn unsubscribe(&self, _node_id: &str) -> Result<()> {
        self.unsubscribe_calls.fetch_add(1, Ordering::SeqCst);
        scripted(
            &self.fail_unsubscribe,
            Error::Message("unsubscribe rejected".to_string()),
        )
    }
}

#[async_trait]
impl NotifyClient for RecordingClient {
    async fn send_notification(&self, _node_id: &str, _title: &str, _body: &str) -> Result<String> {
        self.notify_calls.fetch_add(1, Ordering::SeqCst);
        scripted(
            &self.fail_notify,
            Error::Notify("notification rejected".to_string()),
        )?;
        Ok("DELIVERED".to_string())
    }
}

#[async_trait]
impl PackageQuery for RecordingClient {
    async fn is_installed(&self, _package_id: &str) -> Result<bool> {
        self.package_calls.fetch_add(1, Ordering::SeqCst);
        scripted(
            &self.fail_package_query,
            Error::Package("package manager unavailable".to_string()),
        )?;
        Ok(self.companion_installed.load(Ordering::SeqCst))
    }
}

/// Sink collecting every relayed event
#[derive(Default)]
pub struct CollectingSink {
    pub messages: Mutex<Vec<String>>,
    pub statuses: Mutex<Vec<ServiceStatus>>,
}

impl CollectingSink {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn statuses(&self) -> Vec<ServiceStatus> {
        self.statuses.lock().unwrap().clone()
    }
}

impl EventSink for CollectingSink {
    fn on_message_received(&self, text: String) {
        self.messages.lock().unwrap().push(text);
    }

    fn on_service_status_changed(&self, status: ServiceStatus) {
        self.statuses.lock().unwrap().push(status);
    }
}

/// Coordinator wired to a recording client and a collecting sink
pub fn coordinator(client: &Arc<RecordingClient>) -> (SessionCoordinator, Arc<CollectingSink>) {
    let sink = Arc::new(CollectingSink::default());
    let coordinator = SessionCoordinator::new(
        client.client(),
        Arc::clone(&sink) as Arc<dyn EventSink>,
        BridgeConfig::default(),
    );
    (coordinator, sink)
}
