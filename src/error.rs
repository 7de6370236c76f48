//! Error types for the wearbridge crate

use thiserror::Error;

/// Result type alias for wearbridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by capability client implementations and internal plumbing
///
/// These never cross the session-operation boundary: the coordinator converts
/// every failure into a response [`Envelope`](crate::Envelope).
#[derive(Debug, Error)]
pub enum Error {
    /// Node discovery or node-scoped query failed
    #[error("node error: {0}")]
    Node(String),

    /// Permission request or check failed
    #[error("auth error: {0}")]
    Auth(String),

    /// Message send or subscription management failed
    #[error("message error: {0}")]
    Message(String),

    /// Notification delivery failed
    #[error("notify error: {0}")]
    Notify(String),

    /// Host package lookup failed
    #[error("package error: {0}")]
    Package(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
