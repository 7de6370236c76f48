//! In-memory capability client simulating an echo wearable
//!
//! Backs the demo CLI and tests without a radio link: discovery reports one
//! deterministic node, every permission is granted, and messages sent while
//! subscribed are echoed back as transport events.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{Error, Result};

use super::{
    AuthClient, CapabilityClient, MessageClient, Node, NodeClient, NotifyClient, PackageQuery,
    Permission, TransportEvent,
};

/// Simulated wearable that echoes messages back while subscribed
pub struct LoopbackClient {
    node: Node,
    events: mpsc::UnboundedSender<TransportEvent>,
    subscribed: AtomicBool,
}

impl LoopbackClient {
    /// Create a loopback client and the transport event stream it feeds
    ///
    /// Emits an initial `ServiceConnected` event.
    #[must_use]
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<TransportEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        // The simulated transport is always up
        let _ = tx.send(TransportEvent::ServiceConnected);
        let client = Arc::new(Self {
            node: Node::new("loopback-01", "Loopback Band"),
            events: tx,
            subscribed: AtomicBool::new(false),
        });
        (client, rx)
    }

    /// Aggregate with every handle pointing at this loopback instance
    #[must_use]
    pub fn capability_client(self: &Arc<Self>) -> CapabilityClient {
        CapabilityClient::new()
            .with_node(Arc::clone(self) as Arc<dyn NodeClient>)
            .with_auth(Arc::clone(self) as Arc<dyn AuthClient>)
            .with_message(Arc::clone(self) as Arc<dyn MessageClient>)
            .with_notify(Arc::clone(self) as Arc<dyn NotifyClient>)
            .with_package(Arc::clone(self) as Arc<dyn PackageQuery>)
    }

    fn ensure_known_node(&self, node_id: &str) -> Result<()> {
        if node_id == self.node.id {
            Ok(())
        } else {
            Err(Error::Node(format!("unknown node: {node_id}")))
        }
    }
}

#[async_trait]
impl NodeClient for LoopbackClient {
    async fn connected_nodes(&self) -> Result<Vec<Node>> {
        Ok(vec![self.node.clone()])
    }

    async fn is_remote_app_installed(&self, node_id: &str) -> Result<bool> {
        self.ensure_known_node(node_id)?;
        Ok(true)
    }

    async fn launch_remote_app(&self, node_id: &str, path: &str) -> Result<()> {
        self.ensure_known_node(node_id)?;
        tracing::debug!(node_id = %node_id, path = %path, "loopback remote-app launch");
        Ok(())
    }
}

#[async_trait]
impl AuthClient for LoopbackClient {
    async fn request_permissions(
        &self,
        node_id: &str,
        permissions: &[Permission],
    ) -> Result<Vec<Permission>> {
        self.ensure_known_node(node_id)?;
        Ok(permissions.to_vec())
    }

    async fn check_permissions(
        &self,
        node_id: &str,
        permissions: &[Permission],
    ) -> Result<Vec<bool>> {
        self.ensure_known_node(node_id)?;
        Ok(vec![true; permissions.len()])
    }
}

#[async_trait]
impl MessageClient for LoopbackClient {
    async fn send_message(&self, node_id: &str, payload: &[u8]) -> Result<()> {
        self.ensure_known_node(node_id)?;
        if self.subscribed.load(Ordering::SeqCst) {
            let _ = self.events.send(TransportEvent::Message {
                node_id: node_id.to_string(),
                payload: payload.to_vec(),
            });
        }
        Ok(())
    }

    async fn subscribe(&self, node_id: &str) -> Result<()> {
        self.ensure_known_node(node_id)?;
        self.subscribed.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn unsubscribe(&self, node_id: &str) -> Result<()> {
        self.ensure_known_node(node_id)?;
        self.subscribed.store(false, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl NotifyClient for LoopbackClient {
    async fn send_notification(&self, node_id: &str, title: &str, body: &str) -> Result<String> {
        self.ensure_known_node(node_id)?;
        tracing::debug!(node_id = %node_id, title = %title, body = %body, "loopback notification");
        Ok(Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl PackageQuery for LoopbackClient {
    async fn is_installed(&self, _package_id: &str) -> Result<bool> {
        Ok(true)
    }
}
