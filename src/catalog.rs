//! Static catalog of session error codes and their user-facing metadata
//!
//! Every session operation resolves its failures through this catalog so that
//! messages, remediation hints, and retryability stay consistent across call
//! sites. The catalog is built once at startup and shared by reference; a
//! lookup miss synthesizes a generic entry rather than failing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Error code carried by every response envelope
///
/// Serializes as the wire string (`"SDK_ERROR"`, `"NO_DEVICE"`, ...).
/// `Ok` is the success sentinel and has no catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Success sentinel
    Ok,
    /// A required capability handle is unavailable or uninitialized
    SdkError,
    /// No node cached: discovery not yet run or returned empty
    NoDevice,
    /// The discovery query itself failed
    ConnectionError,
    /// The permission-request call failed
    PermissionError,
    /// An operation needing a prior grant was attempted without one
    PermissionRequired,
    /// The permission-check call failed
    PermissionCheckFailed,
    /// Message send failed
    MessageError,
    /// Notification send failed
    NotifyError,
    /// Message subscription failed
    ListenError,
    /// Message unsubscription failed
    StopListenError,
    /// Host-side companion app is absent
    AppNotInstalled,
    /// Accessory-side remote app is absent
    WearAppNotInstalled,
    /// A verification step failed for an unclassified reason
    CheckFailed,
    /// Remote-app launch failed
    LaunchFailed,
    /// Caller-supplied argument missing or empty
    InvalidParams,
}

impl ErrorCode {
    /// Wire-format string for this code
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::SdkError => "SDK_ERROR",
            Self::NoDevice => "NO_DEVICE",
            Self::ConnectionError => "CONNECTION_ERROR",
            Self::PermissionError => "PERMISSION_ERROR",
            Self::PermissionRequired => "PERMISSION_REQUIRED",
            Self::PermissionCheckFailed => "PERMISSION_CHECK_FAILED",
            Self::MessageError => "MESSAGE_ERROR",
            Self::NotifyError => "NOTIFY_ERROR",
            Self::ListenError => "LISTEN_ERROR",
            Self::StopListenError => "STOP_LISTEN_ERROR",
            Self::AppNotInstalled => "APP_NOT_INSTALLED",
            Self::WearAppNotInstalled => "WEAR_APP_NOT_INSTALLED",
            Self::CheckFailed => "CHECK_FAILED",
            Self::LaunchFailed => "LAUNCH_FAILED",
            Self::InvalidParams => "INVALID_PARAMS",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalog entry: default message, remediation hints, and retryability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// The code this entry describes
    pub code: ErrorCode,
    /// Default human-readable message
    pub message: String,
    /// Default remediation hints, in display order
    pub hints: Vec<String>,
    /// Whether the caller should offer an automatic retry by default
    pub retryable: bool,
}

impl CatalogEntry {
    fn new(code: ErrorCode, message: &str, retryable: bool, hints: &[&str]) -> Self {
        Self {
            code,
            message: message.to_string(),
            hints: hints.iter().map(|h| (*h).to_string()).collect(),
            retryable,
        }
    }
}

/// Immutable error catalog, built once and shared via `Arc`
#[derive(Debug)]
pub struct Catalog {
    entries: HashMap<ErrorCode, CatalogEntry>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// Build the catalog with the built-in entry set
    #[must_use]
    pub fn new() -> Self {
        use ErrorCode as E;
        let defaults = [
            CatalogEntry::new(
                E::SdkError,
                "wearable SDK is not initialized",
                true,
                &["check wearable SDK initialization state"],
            ),
            CatalogEntry::new(
                E::NoDevice,
                "no wearable device detected",
                true,
                &[
                    "confirm the wearable is paired with the phone",
                    "confirm the wearable stays connected to the phone",
                    "confirm the companion app is installed",
                ],
            ),
            CatalogEntry::new(
                E::ConnectionError,
                "failed to query connected devices",
                true,
                &[
                    "keep the companion app running",
                    "confirm the device is paired and online",
                ],
            ),
            CatalogEntry::new(
                E::PermissionError,
                "permission request failed",
                true,
                &[
                    "keep the companion app running",
                    "confirm the device is paired and online",
                    "confirm the remote app is installed",
                ],
            ),
            CatalogEntry::new(
                E::PermissionRequired,
                "device management permission has not been granted",
                false,
                &[
                    "request permissions first",
                    "confirm the authorization prompt on the wearable",
                ],
            ),
            CatalogEntry::new(
                E::PermissionCheckFailed,
                "permission check failed",
                true,
                &["retry later, reconnecting the device if needed"],
            ),
            CatalogEntry::new(
                E::MessageError,
                "failed to send message",
                true,
                &[
                    "confirm the device is connected and online",
                    "confirm message permission has been granted",
                ],
            ),
            CatalogEntry::new(
                E::NotifyError,
                "failed to send notification",
                true,
                &[
                    "confirm the device is connected and online",
                    "confirm notification permission has been granted",
                ],
            ),
            CatalogEntry::new(
                E::ListenError,
                "failed to start listening",
                true,
                &[
                    "confirm the device stays connected",
                    "retry starting the listener later",
                ],
            ),
            CatalogEntry::new(
                E::StopListenError,
                "failed to stop listening",
                true,
                &[
                    "confirm the device stays connected",
                    "retry stopping the listener later",
                ],
            ),
            CatalogEntry::new(
                E::AppNotInstalled,
                "companion app is not installed",
                false,
                &["install the companion app from the app store"],
            ),
            CatalogEntry::new(
                E::WearAppNotInstalled,
                "remote app is not installed on the wearable",
                false,
                &["install the remote app on the wearable"],
            ),
            CatalogEntry::new(
                E::CheckFailed,
                "check failed",
                true,
                &["retry later, reconnecting the device if needed"],
            ),
            CatalogEntry::new(
                E::LaunchFailed,
                "failed to launch the remote app",
                true,
                &[
                    "confirm the remote app is installed on the wearable",
                    "confirm the remote app is up to date",
                ],
            ),
            CatalogEntry::new(E::InvalidParams, "invalid parameters", false, &[]),
        ];

        Self {
            entries: defaults.into_iter().map(|e| (e.code, e)).collect(),
        }
    }

    /// Look up the entry for a code
    ///
    /// A miss synthesizes a generic retryable entry instead of failing.
    #[must_use]
    pub fn lookup(&self, code: ErrorCode) -> CatalogEntry {
        self.entries.get(&code).cloned().unwrap_or_else(|| {
            CatalogEntry::new(code, "unknown error", true, &["retry later"])
        })
    }
}
