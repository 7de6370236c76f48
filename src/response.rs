//! Uniform response envelopes for session operations
//!
//! Every operation resolves to an [`Envelope`], success or failure, so the
//! caller never has to catch anything. Error envelopes pull their defaults
//! from the [`Catalog`] and accept per-call overrides; building one never
//! fails.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::catalog::{Catalog, ErrorCode};

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(b: &bool) -> bool {
    !*b
}

/// The uniform result of every session operation
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    /// Whether the operation succeeded
    pub success: bool,

    /// `Ok` on success, otherwise the failure classification
    pub code: ErrorCode,

    /// Human-readable outcome message
    pub message: String,

    /// Operation-specific payload (always present on the wire, possibly null)
    pub data: Option<Value>,

    /// Remediation hints, omitted when empty
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,

    /// Raw underlying failure detail, omitted when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,

    /// Whether the caller may retry automatically, omitted when false
    #[serde(skip_serializing_if = "is_false")]
    pub retryable: bool,
}

impl Envelope {
    /// Build a success envelope
    ///
    /// Success envelopes always carry `code == Ok` and no hints, details,
    /// or retryable flag.
    #[must_use]
    pub fn success(message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            success: true,
            code: ErrorCode::Ok,
            message: message.into(),
            data,
            hints: Vec::new(),
            details: None,
            retryable: false,
        }
    }
}

/// Builds error envelopes against a shared [`Catalog`]
#[derive(Debug, Clone)]
pub struct Responder {
    catalog: Arc<Catalog>,
}

impl Responder {
    /// Create a responder over a shared catalog
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// Start an error envelope for `code`, defaults resolved from the catalog
    #[must_use]
    pub fn error(&self, code: ErrorCode) -> ErrorBuilder<'_> {
        ErrorBuilder {
            catalog: &self.catalog,
            code,
            data: None,
            message: None,
            hints: None,
            retryable: None,
            details: None,
        }
    }

    /// Build an invalid-argument envelope for an empty `field`
    #[must_use]
    pub fn param_error(&self, field: &str) -> Envelope {
        self.error(ErrorCode::InvalidParams)
            .message(format!("{field} must not be empty"))
            .hints(vec![format!("{field} is required")])
            .retryable(false)
            .build()
    }
}

/// Incremental error-envelope builder
///
/// Overrides apply only when explicitly provided and non-empty; everything
/// else degrades to the catalog defaults.
#[derive(Debug)]
pub struct ErrorBuilder<'a> {
    catalog: &'a Catalog,
    code: ErrorCode,
    data: Option<Value>,
    message: Option<String>,
    hints: Option<Vec<String>>,
    retryable: Option<bool>,
    details: Option<String>,
}

impl ErrorBuilder<'_> {
    /// Attach the underlying failure; its display text becomes `details`
    /// when non-empty
    #[must_use]
    pub fn cause(mut self, err: &impl std::fmt::Display) -> Self {
        let text = err.to_string();
        if !text.is_empty() {
            self.details = Some(text);
        }
        self
    }

    /// Attach an operation-specific payload
    #[must_use]
    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Override the catalog message
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Override the catalog hints
    #[must_use]
    pub fn hints(mut self, hints: Vec<String>) -> Self {
        self.hints = Some(hints);
        self
    }

    /// Override the catalog retryability
    #[must_use]
    pub fn retryable(mut self, retryable: bool) -> Self {
        self.retryable = Some(retryable);
        self
    }

    /// Resolve defaults and produce the envelope
    #[must_use]
    pub fn build(self) -> Envelope {
        let entry = self.catalog.lookup(self.code);
        let message = match self.message {
            Some(m) if !m.is_empty() => m,
            _ => entry.message,
        };
        let hints = match self.hints {
            Some(h) if !h.is_empty() => h,
            _ => entry.hints,
        };
        Envelope {
            success: false,
            code: self.code,
            message,
            data: self.data,
            hints,
            details: self.details,
            retryable: self.retryable.unwrap_or(entry.retryable),
        }
    }
}
