//! Device-session coordinator
//!
//! Owns the single bound node, the listening flag, and the last known
//! transport connectivity. Every operation resolves to an [`Envelope`];
//! failures never cross the boundary as errors. Unsolicited transport events
//! are relayed to the caller-owned [`EventSink`] by a dedicated task, giving
//! the sink single-threaded delivery semantics.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Value, json};
use tokio::sync::{Mutex, RwLock, mpsc};
use tokio::task::JoinHandle;

use crate::capability::{CapabilityClient, Node, Permission, TransportEvent};
use crate::catalog::{Catalog, ErrorCode};
use crate::config::BridgeConfig;
use crate::response::{Envelope, Responder};

/// Transport connectivity snapshot delivered to the event sink
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ServiceStatus {
    /// Whether the transport service is reachable
    pub connected: bool,
    /// Epoch milliseconds at which the transition was observed
    pub timestamp: i64,
}

impl ServiceStatus {
    fn now(connected: bool) -> Self {
        Self {
            connected,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Receives unsolicited events relayed from the transport
///
/// Owned by the caller (e.g. a UI bridge). Callbacks are invoked
/// sequentially from the coordinator's relay task.
pub trait EventSink: Send + Sync {
    /// An incoming message from the accessory, decoded as UTF-8
    fn on_message_received(&self, text: String);

    /// The transport service connected or disconnected
    fn on_service_status_changed(&self, status: ServiceStatus);
}

/// Mutable session state, guarded by the coordinator's lock
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// The currently bound node, populated only by successful discovery
    pub current_node: Option<Node>,
    /// Whether a message subscription is registered; implies a bound node
    pub listening: bool,
    /// Last known transport connectivity, updated only by unsolicited events
    pub service_connected: bool,
}

/// Coordinates session operations against a single paired wearable
pub struct SessionCoordinator {
    client: CapabilityClient,
    responder: Responder,
    config: BridgeConfig,
    state: Arc<RwLock<SessionState>>,
    sink: Arc<dyn EventSink>,
    relay: Mutex<Option<JoinHandle<()>>>,
}

impl SessionCoordinator {
    /// Create a coordinator over a capability client and event sink
    #[must_use]
    pub fn new(client: CapabilityClient, sink: Arc<dyn EventSink>, config: BridgeConfig) -> Self {
        Self {
            client,
            responder: Responder::new(Arc::new(Catalog::new())),
            config,
            state: Arc::new(RwLock::new(SessionState::default())),
            sink,
            relay: Mutex::new(None),
        }
    }

    /// Snapshot of the current session state
    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    /// Spawn the relay task consuming transport events
    ///
    /// Connectivity transitions update session state and are forwarded to the
    /// sink; message payloads are decoded as UTF-8 and forwarded verbatim.
    /// Replaces any previously attached stream.
    pub async fn attach_transport(&self, mut events: mpsc::UnboundedReceiver<TransportEvent>) {
        let state = Arc::clone(&self.state);
        let sink = Arc::clone(&self.sink);
        let handle = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    TransportEvent::Message { node_id, payload } => {
                        let text = String::from_utf8_lossy(&payload).into_owned();
                        tracing::debug!(
                            node_id = %node_id,
                            bytes = payload.len(),
                            "relaying incoming message"
                        );
                        sink.on_message_received(text);
                    }
                    TransportEvent::ServiceConnected => {
                        state.write().await.service_connected = true;
                        tracing::info!("transport service connected");
                        sink.on_service_status_changed(ServiceStatus::now(true));
                    }
                    TransportEvent::ServiceDisconnected => {
                        state.write().await.service_connected = false;
                        tracing::info!("transport service disconnected");
                        sink.on_service_status_changed(ServiceStatus::now(false));
                    }
                }
            }
        });
        if let Some(previous) = self.relay.lock().await.replace(handle) {
            previous.abort();
        }
    }

    /// Query the device list and bind the first entry as the current node
    ///
    /// Re-binding while already bound refreshes the cached node. An empty
    /// list leaves state untouched.
    pub async fn discover_node(&self) -> Envelope {
        tracing::debug!("discovering connected nodes");
        let Some(node_api) = self.client.node.as_ref() else {
            return self.responder.error(ErrorCode::SdkError).build();
        };
        match node_api.connected_nodes().await {
            Ok(nodes) => {
                let Some(node) = nodes.into_iter().next() else {
                    return self.responder.error(ErrorCode::NoDevice).build();
                };
                tracing::info!(node_id = %node.id, node_name = %node.display_name, "node bound");
                let data = node_payload(&node);
                self.state.write().await.current_node = Some(node);
                Envelope::success("device connected", Some(data))
            }
            Err(e) => {
                tracing::warn!(error = %e, "node discovery failed");
                self.responder
                    .error(ErrorCode::ConnectionError)
                    .cause(&e)
                    .build()
            }
        }
    }

    /// Request the configured permission set against the bound node
    ///
    /// A partial grant is still a success; the data is the granted list.
    pub async fn request_permissions(&self) -> Envelope {
        let Some(node) = self.bound_node().await else {
            return self.responder.error(ErrorCode::NoDevice).build();
        };
        let Some(auth) = self.client.auth.as_ref() else {
            return self.responder.error(ErrorCode::SdkError).build();
        };
        match auth
            .request_permissions(&node.id, &self.config.requested_permissions)
            .await
        {
            Ok(granted) => {
                let names: Vec<String> = granted.iter().map(ToString::to_string).collect();
                tracing::info!(granted = ?names, "permissions requested");
                Envelope::success("permissions requested", Some(json!(names)))
            }
            Err(e) => {
                tracing::warn!(error = %e, "permission request failed");
                self.responder
                    .error(ErrorCode::PermissionError)
                    .cause(&e)
                    .build()
            }
        }
    }

    /// Send a text message to the bound node
    pub async fn send_message(&self, message: &str) -> Envelope {
        let Some(node) = self.bound_node().await else {
            return self.responder.error(ErrorCode::NoDevice).build();
        };
        let Some(message_api) = self.client.message.as_ref() else {
            return self.responder.error(ErrorCode::SdkError).build();
        };
        if message.is_empty() {
            return self.responder.param_error("message");
        }
        match message_api.send_message(&node.id, message.as_bytes()).await {
            Ok(()) => Envelope::success("message sent", None),
            Err(e) => {
                tracing::warn!(node_id = %node.id, error = %e, "message send failed");
                self.responder
                    .error(ErrorCode::MessageError)
                    .cause(&e)
                    .build()
            }
        }
    }

    /// Send a notification to the bound node
    ///
    /// Validates `title` before `message`; the first empty argument
    /// short-circuits.
    pub async fn send_notification(&self, title: &str, message: &str) -> Envelope {
        let Some(node) = self.bound_node().await else {
            return self.responder.error(ErrorCode::NoDevice).build();
        };
        let Some(notify) = self.client.notify.as_ref() else {
            return self.responder.error(ErrorCode::SdkError).build();
        };
        if title.is_empty() {
            return self.responder.param_error("title");
        }
        if message.is_empty() {
            return self.responder.param_error("message");
        }
        match notify.send_notification(&node.id, title, message).await {
            Ok(status) => Envelope::success("notification sent", Some(json!({ "status": status }))),
            Err(e) => {
                tracing::warn!(node_id = %node.id, error = %e, "notification send failed");
                self.responder
                    .error(ErrorCode::NotifyError)
                    .cause(&e)
                    .build()
            }
        }
    }

    /// Register the message subscription for the bound node
    ///
    /// Idempotent: if already listening, no second subscription is issued.
    pub async fn start_listening(&self) -> Envelope {
        let Some(node) = self.bound_node().await else {
            return self.responder.error(ErrorCode::NoDevice).build();
        };
        let Some(message_api) = self.client.message.as_ref() else {
            return self.responder.error(ErrorCode::SdkError).build();
        };
        if self.state.read().await.listening {
            return Envelope::success("already listening", Some(listening_payload(true, Some(&node))));
        }
        match message_api.subscribe(&node.id).await {
            Ok(()) => {
                self.state.write().await.listening = true;
                tracing::info!(node_id = %node.id, "message subscription registered");
                Envelope::success("listening started", Some(listening_payload(true, Some(&node))))
            }
            Err(e) => {
                tracing::warn!(node_id = %node.id, error = %e, "subscribe failed");
                self.responder
                    .error(ErrorCode::ListenError)
                    .cause(&e)
                    .build()
            }
        }
    }

    /// Remove the message subscription for the bound node
    ///
    /// Idempotent: if not listening, the client is not contacted.
    pub async fn stop_listening(&self) -> Envelope {
        let Some(node) = self.bound_node().await else {
            return self.responder.error(ErrorCode::NoDevice).build();
        };
        let Some(message_api) = self.client.message.as_ref() else {
            return self.responder.error(ErrorCode::SdkError).build();
        };
        if !self.state.read().await.listening {
            return Envelope::success(
                "listening already stopped",
                Some(listening_payload(false, Some(&node))),
            );
        }
        match message_api.unsubscribe(&node.id).await {
            Ok(()) => {
                self.state.write().await.listening = false;
                tracing::info!(node_id = %node.id, "message subscription removed");
                Envelope::success("listening stopped", Some(listening_payload(false, Some(&node))))
            }
            Err(e) => {
                tracing::warn!(node_id = %node.id, error = %e, "unsubscribe failed");
                self.responder
                    .error(ErrorCode::StopListenError)
                    .cause(&e)
                    .build()
            }
        }
    }

    /// Check whether the companion app is installed on the host device
    pub async fn check_companion_app_installed(&self) -> Envelope {
        let Some(package) = self.client.package.as_ref() else {
            return self.responder.error(ErrorCode::CheckFailed).build();
        };
        match package.is_installed(&self.config.companion_package).await {
            Ok(true) => {
                Envelope::success("companion app installed", Some(json!({ "installed": true })))
            }
            Ok(false) => self
                .responder
                .error(ErrorCode::AppNotInstalled)
                .data(json!({ "installed": false }))
                .build(),
            Err(e) => {
                tracing::warn!(error = %e, "companion app lookup failed");
                self.responder
                    .error(ErrorCode::CheckFailed)
                    .cause(&e)
                    .build()
            }
        }
    }

    /// Check whether the remote app is installed on the bound node
    ///
    /// Two-step: the device-manager permission is checked first; only a
    /// positive grant proceeds to the installation query.
    pub async fn check_remote_app_installed(&self) -> Envelope {
        let Some(node) = self.bound_node().await else {
            return self.responder.error(ErrorCode::NoDevice).build();
        };
        let (Some(auth), Some(node_api)) = (self.client.auth.as_ref(), self.client.node.as_ref())
        else {
            return self.responder.error(ErrorCode::SdkError).build();
        };
        let granted = match auth
            .check_permissions(&node.id, &[Permission::DeviceManager])
            .await
        {
            Ok(results) => results.first().copied().unwrap_or(false),
            Err(e) => {
                tracing::warn!(node_id = %node.id, error = %e, "permission check failed");
                return self
                    .responder
                    .error(ErrorCode::PermissionCheckFailed)
                    .cause(&e)
                    .build();
            }
        };
        if !granted {
            return self.responder.error(ErrorCode::PermissionRequired).build();
        }
        match node_api.is_remote_app_installed(&node.id).await {
            Ok(true) => {
                Envelope::success("remote app installed", Some(json!({ "installed": true })))
            }
            Ok(false) => self
                .responder
                .error(ErrorCode::WearAppNotInstalled)
                .data(json!({ "installed": false }))
                .build(),
            Err(e) => {
                tracing::warn!(node_id = %node.id, error = %e, "remote app lookup failed");
                self.responder
                    .error(ErrorCode::CheckFailed)
                    .cause(&e)
                    .build()
            }
        }
    }

    /// Launch the remote app on the bound node
    ///
    /// An empty `path` falls back to the configured default rather than
    /// being rejected.
    pub async fn launch_remote_app(&self, path: &str) -> Envelope {
        let Some(node) = self.bound_node().await else {
            return self.responder.error(ErrorCode::NoDevice).build();
        };
        let Some(node_api) = self.client.node.as_ref() else {
            return self.responder.error(ErrorCode::SdkError).build();
        };
        let launch_path = if path.is_empty() {
            self.config.default_launch_path.as_str()
        } else {
            path
        };
        match node_api.launch_remote_app(&node.id, launch_path).await {
            Ok(()) => {
                tracing::info!(node_id = %node.id, path = %launch_path, "remote app launched");
                Envelope::success("remote app launched", Some(json!({ "path": launch_path })))
            }
            Err(e) => {
                tracing::warn!(node_id = %node.id, error = %e, "remote app launch failed");
                self.responder
                    .error(ErrorCode::LaunchFailed)
                    .cause(&e)
                    .build()
            }
        }
    }

    /// Tear down the session
    ///
    /// Best-effort: unsubscribes if listening (failures are logged and
    /// swallowed) and stops the relay task. Idempotent.
    pub async fn shutdown(&self) {
        let (node, listening) = {
            let state = self.state.read().await;
            (state.current_node.clone(), state.listening)
        };
        if listening {
            if let (Some(node), Some(message_api)) = (node, self.client.message.as_ref()) {
                if let Err(e) = message_api.unsubscribe(&node.id).await {
                    tracing::warn!(node_id = %node.id, error = %e, "unsubscribe during shutdown failed");
                }
            }
            self.state.write().await.listening = false;
        }
        if let Some(handle) = self.relay.lock().await.take() {
            handle.abort();
        }
        tracing::debug!("session torn down");
    }

    async fn bound_node(&self) -> Option<Node> {
        self.state.read().await.current_node.clone()
    }
}

fn node_payload(node: &Node) -> Value {
    json!({
        "id": node.id,
        "name": node.display_name,
        "attributes": node.attributes,
    })
}

fn listening_payload(listening: bool, node: Option<&Node>) -> Value {
    let mut payload = json!({ "listening": listening });
    if let (Some(node), Some(map)) = (node, payload.as_object_mut()) {
        map.insert("nodeId".to_string(), json!(node.id));
        map.insert("nodeName".to_string(), json!(node.display_name));
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listening_payload_includes_node_when_present() {
        let node = Node::new("A1", "Band");
        let payload = listening_payload(true, Some(&node));
        assert_eq!(payload["listening"], true);
        assert_eq!(payload["nodeId"], "A1");
        assert_eq!(payload["nodeName"], "Band");

        let payload = listening_payload(false, None);
        assert_eq!(payload["listening"], false);
        assert!(payload.get("nodeId").is_none());
    }

    #[test]
    fn service_status_timestamp_is_epoch_millis() {
        let status = ServiceStatus::now(true);
        assert!(status.connected);
        // chrono epoch millis: sanity-check the order of magnitude
        assert!(status.timestamp > 1_600_000_000_000);
    }
}
