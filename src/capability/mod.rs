//! Capability client abstraction over the wearable SDK
//!
//! The coordinator never talks to a vendor SDK directly. Each independent
//! capability (node discovery, permission management, point-to-point
//! messaging, notification/launch control, host package lookup) is an async
//! trait, and [`CapabilityClient`] aggregates optional handles to each.
//! An absent handle models an uninitialized SDK surface.

pub mod loopback;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

pub use loopback::LoopbackClient;

/// A paired wearable accessory, as reported by discovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Opaque transport-assigned identifier, stable per pairing
    pub id: String,

    /// User-facing display name
    #[serde(rename = "name")]
    pub display_name: String,

    /// Reserved for extension; currently always empty
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Node {
    /// Create a node with no attributes
    #[must_use]
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            attributes: BTreeMap::new(),
        }
    }
}

/// SDK-defined permission grants requested from the accessory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    /// Device management (required for remote-app queries)
    DeviceManager,
    /// Notification delivery
    Notify,
}

impl Permission {
    /// Wire-format name for this permission
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DeviceManager => "DEVICE_MANAGER",
            Self::Notify => "NOTIFY",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unsolicited event pushed by the transport
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// Incoming message bytes from a node (only flows while subscribed)
    Message {
        /// Source node id
        node_id: String,
        /// Raw payload, decoded as UTF-8 by the coordinator
        payload: Vec<u8>,
    },
    /// The transport service came up
    ServiceConnected,
    /// The transport service went away
    ServiceDisconnected,
}

/// Node discovery and remote-app control
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// List currently connected nodes
    async fn connected_nodes(&self) -> Result<Vec<Node>>;

    /// Whether the remote app is installed on the given node
    async fn is_remote_app_installed(&self, node_id: &str) -> Result<bool>;

    /// Launch the remote app on the given node at `path`
    async fn launch_remote_app(&self, node_id: &str, path: &str) -> Result<()>;
}

/// Permission request and check against a node
#[async_trait]
pub trait AuthClient: Send + Sync {
    /// Request permissions; returns the granted subset (possibly smaller)
    async fn request_permissions(
        &self,
        node_id: &str,
        permissions: &[Permission],
    ) -> Result<Vec<Permission>>;

    /// Check permissions; one flag per requested permission, in order
    async fn check_permissions(
        &self,
        node_id: &str,
        permissions: &[Permission],
    ) -> Result<Vec<bool>>;
}

/// Point-to-point messaging with a node
#[async_trait]
pub trait MessageClient: Send + Sync {
    /// Send a raw payload to the node
    async fn send_message(&self, node_id: &str, payload: &[u8]) -> Result<()>;

    /// Register the message subscription for the node
    async fn subscribe(&self, node_id: &str) -> Result<()>;

    /// Remove the message subscription for the node
    async fn unsubscribe(&self, node_id: &str) -> Result<()>;
}

/// Notification delivery to a node
#[async_trait]
pub trait NotifyClient: Send + Sync {
    /// Send a notification; returns the delivery status token
    async fn send_notification(&self, node_id: &str, title: &str, body: &str) -> Result<String>;
}

/// Host-OS package presence query (companion app check)
#[async_trait]
pub trait PackageQuery: Send + Sync {
    /// Whether the package is installed on the host device
    ///
    /// `Ok(false)` means the package is definitively absent; `Err` means the
    /// lookup itself failed.
    async fn is_installed(&self, package_id: &str) -> Result<bool>;
}

/// Aggregate of optional capability handles
///
/// Handles are optional to mirror the SDK surface: an operation that needs a
/// missing handle resolves to an `SDK_ERROR` envelope instead of panicking.
#[derive(Clone, Default)]
pub struct CapabilityClient {
    /// Node discovery and remote-app control
    pub node: Option<Arc<dyn NodeClient>>,
    /// Permission management
    pub auth: Option<Arc<dyn AuthClient>>,
    /// Point-to-point messaging
    pub message: Option<Arc<dyn MessageClient>>,
    /// Notification delivery
    pub notify: Option<Arc<dyn NotifyClient>>,
    /// Host package lookup
    pub package: Option<Arc<dyn PackageQuery>>,
}

impl CapabilityClient {
    /// Create an aggregate with no handles attached
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a node handle
    #[must_use]
    pub fn with_node(mut self, node: Arc<dyn NodeClient>) -> Self {
        self.node = Some(node);
        self
    }

    /// Attach an auth handle
    #[must_use]
    pub fn with_auth(mut self, auth: Arc<dyn AuthClient>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Attach a message handle
    #[must_use]
    pub fn with_message(mut self, message: Arc<dyn MessageClient>) -> Self {
        self.message = Some(message);
        self
    }

    /// Attach a notify handle
    #[must_use]
    pub fn with_notify(mut self, notify: Arc<dyn NotifyClient>) -> Self {
        self.notify = Some(notify);
        self
    }

    /// Attach a package-query handle
    #[must_use]
    pub fn with_package(mut self, package: Arc<dyn PackageQuery>) -> Self {
        self.package = Some(package);
        self
    }
}
