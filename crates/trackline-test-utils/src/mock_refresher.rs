// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token refresher with a scripted outcome.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use trackline_core::TracklineError;
use trackline_transport::{Credential, TokenRefresher};

/// Refreshes to a fixed access token, or always fails.
#[derive(Debug)]
pub struct MockRefresher {
    access_token: Option<String>,
    calls: AtomicUsize,
}

impl MockRefresher {
    /// Every refresh yields a bearer credential with `access_token`.
    pub fn succeeding(access_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Every refresh is rejected by the hub.
    pub fn failing() -> Self {
        Self {
            access_token: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenRefresher for MockRefresher {
    async fn refresh(&self, _credential: &Credential) -> Result<Credential, TracklineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.access_token {
            Some(token) => Ok(Credential::new(token.clone(), "Bearer")),
            None => Err(TracklineError::http(
                400,
                r#"{"error": "invalid_grant", "error_description": "Refresh token expired"}"#,
            )),
        }
    }
}
