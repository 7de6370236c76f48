//! Wearbridge - session bridge between a host application and a paired
//! wearable accessory
//!
//! The crate tracks exactly one bound node, sequences operations against it
//! (permission, capability check, action), and converts every asynchronous
//! outcome into a uniform response envelope.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  Host application                    │
//! │        (UI bridge, dispatch surface, sink)           │
//! └────────────────────┬────────────────────────────────┘
//!                      │ operations / envelopes / events
//! ┌────────────────────▼────────────────────────────────┐
//! │               Session Coordinator                    │
//! │   node state │ listening │ connectivity │ relay     │
//! └────────────────────┬────────────────────────────────┘
//!                      │ capability traits
//! ┌────────────────────▼────────────────────────────────┐
//! │              Wearable SDK / transport                │
//! │   discovery │ auth │ messaging │ notify │ packages  │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod capability;
pub mod catalog;
pub mod config;
pub mod error;
pub mod response;
pub mod session;

pub use capability::{
    AuthClient, CapabilityClient, LoopbackClient, MessageClient, Node, NodeClient, NotifyClient,
    PackageQuery, Permission, TransportEvent,
};
pub use catalog::{Catalog, CatalogEntry, ErrorCode};
pub use config::BridgeConfig;
pub use error::{Error, Result};
pub use response::{Envelope, Responder};
pub use session::{EventSink, ServiceStatus, SessionCoordinator, SessionState};
