// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Access credentials and the lock-free credential store.

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// An access token plus what is needed to renew it.
///
/// Tokens are wrapped in [`SecretString`] so they never show up in `Debug`
/// output or logs.
#[derive(Debug)]
pub struct Credential {
    pub access_token: SecretString,
    /// Authorization scheme, usually `Bearer`.
    pub token_type: String,
    pub refresh_token: Option<SecretString>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    pub fn new(access_token: impl Into<String>, token_type: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            token_type: token_type.into(),
            refresh_token: None,
            expires_at: None,
        }
    }

    /// A non-expiring bearer token such as a `perm:` token.
    pub fn permanent(token: impl Into<String>) -> Self {
        Self::new(token, "Bearer")
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(SecretString::from(refresh_token.into()));
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Value for the `Authorization` header: `<tokenType> <accessToken>`.
    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.access_token.expose_secret())
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Body of a hub `oauth2/token` response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl TokenResponse {
    /// Converts into a credential. A response without a refresh token keeps
    /// `previous_refresh`.
    pub fn into_credential(
        self,
        previous_refresh: Option<&SecretString>,
        now: DateTime<Utc>,
    ) -> Credential {
        let refresh_token = match self.refresh_token {
            Some(token) => Some(SecretString::from(token)),
            None => previous_refresh.map(|s| SecretString::from(s.expose_secret().to_string())),
        };
        Credential {
            access_token: SecretString::from(self.access_token),
            token_type: self.token_type,
            refresh_token,
            expires_at: self.expires_in.map(|secs| now + Duration::seconds(secs)),
        }
    }
}

/// A credential tagged with the generation it was installed at.
#[derive(Debug)]
pub struct Versioned {
    pub generation: u64,
    pub credential: Credential,
}

/// Holds the current credential. Readers never block; only the refresh
/// path and explicit logins write.
#[derive(Debug)]
pub struct CredentialStore {
    current: ArcSwap<Versioned>,
}

impl CredentialStore {
    pub fn new(credential: Credential) -> Self {
        Self {
            current: ArcSwap::from_pointee(Versioned {
                generation: 0,
                credential,
            }),
        }
    }

    /// Snapshot of the current credential and its generation.
    pub fn current(&self) -> Arc<Versioned> {
        self.current.load_full()
    }

    pub fn generation(&self) -> u64 {
        self.current.load().generation
    }

    /// Installs a new credential, bumping the generation. Returns the new
    /// generation.
    pub fn replace(&self, credential: Credential) -> u64 {
        let next = self.generation() + 1;
        self.current.store(Arc::new(Versioned {
            generation: next,
            credential,
        }));
        next
    }
}
