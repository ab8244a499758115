// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared by the transport, API, and action layers.

use thiserror::Error;

/// The primary error type used across the Trackline client core.
#[derive(Debug, Error)]
pub enum TracklineError {
    /// The access token was rejected and refreshing it failed.
    /// The user has to sign in again.
    #[error("re-authentication required: {message}")]
    AuthExpired {
        status: u16,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The server answered with a non-2xx status (other than a recovered 401).
    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        /// Response body parsed as JSON, when it was decodable.
        body: Option<serde_json::Value>,
        /// Raw response text.
        text: String,
    },

    /// The request never produced a response.
    #[error("network error: {message}")]
    Network {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The request was aborted through route cancellation.
    #[error("request cancelled{}", route.as_ref().map(|r| format!(" (route {r})")).unwrap_or_default())]
    Cancelled { route: Option<String> },

    /// Input rejected before any network call was made.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A response body could not be decoded into the expected shape.
    #[error("decode error: {message}")]
    Decode {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid client configuration (bad URL, header value, etc.).
    #[error("configuration error: {0}")]
    Config(String),

    /// Local persisted cache failure.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON body fields inspected, in order, for a human-readable server message.
const MESSAGE_FIELDS: [&str; 4] = ["error_description", "error_message", "message", "error"];

impl TracklineError {
    /// Builds an [`TracklineError::Http`] from a status and raw body text.
    ///
    /// The body is parsed as JSON when possible; the message is the first of
    /// `error_description`, `error_message`, `message`, `error` found in it,
    /// falling back to the raw text and then the status line.
    pub fn http(status: u16, text: impl Into<String>) -> Self {
        let text = text.into();
        let body = serde_json::from_str::<serde_json::Value>(&text).ok();
        let message = body
            .as_ref()
            .and_then(message_from_body)
            .or_else(|| {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| format!("request failed with status {status}"));
        Self::Http {
            status,
            message,
            body,
            text,
        }
    }

    /// Returns true if this error is a route cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Returns the HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } | Self::AuthExpired { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text suitable for a user-visible notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::Http { message, .. } | Self::AuthExpired { message, .. } => message.clone(),
            Self::Network { message, .. } => message.clone(),
            Self::Validation(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Extracts the first known message field from a JSON error body.
pub fn message_from_body(body: &serde_json::Value) -> Option<String> {
    MESSAGE_FIELDS.iter().find_map(|field| {
        body.get(field)
            .and_then(serde_json::Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}
