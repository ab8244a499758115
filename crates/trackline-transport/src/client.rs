// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authorized HTTP client.
//!
//! [`TransportClient`] attaches the current credential to every request,
//! recovers from an expired access token with one coordinated refresh and a
//! single retry, and lets callers cancel all pending requests of a route.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use trackline_core::{Navigator, RouteTag, TracklineError};

use crate::credential::{Credential, CredentialStore};
use crate::query;
use crate::reauth::ReauthLatch;
use crate::refresh::{TokenRefreshCoordinator, TokenRefresher};
use crate::registry::PendingRequestRegistry;
use crate::request::RequestDescriptor;

/// Connection settings for the transport.
#[derive(Debug, Clone)]
pub struct TransportSettings {
    /// Backend base URL, e.g. `https://host/youtrack`.
    pub backend_url: String,
    /// Sent as `User-Agent` on every request.
    pub user_agent: String,
    /// Total time allowed for one HTTP exchange.
    pub timeout: Duration,
    /// Query strings longer than this are logged as a warning.
    pub max_query_length: usize,
}

impl TransportSettings {
    pub fn new(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into().trim_end_matches('/').to_string(),
            user_agent: format!("trackline/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
            max_query_length: 2048,
        }
    }
}

/// Builder for [`TransportClient`].
pub struct TransportClientBuilder {
    settings: TransportSettings,
    credential: Credential,
    refresher: Option<Arc<dyn TokenRefresher>>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl TransportClientBuilder {
    pub fn refresher(mut self, refresher: Arc<dyn TokenRefresher>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.settings.user_agent = user_agent.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.settings.timeout = timeout;
        self
    }

    pub fn max_query_length(mut self, max: usize) -> Self {
        self.settings.max_query_length = max;
        self
    }

    pub fn build(self) -> Result<TransportClient, TracklineError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(self.settings.user_agent.clone())
            .timeout(self.settings.timeout)
            .build()
            .map_err(|e| TracklineError::Config(format!("failed to build HTTP client: {e}")))?;

        let credentials = Arc::new(CredentialStore::new(self.credential));
        let coordinator = TokenRefreshCoordinator::new(Arc::clone(&credentials), self.refresher);
        let reauth = ReauthLatch::new(self.navigator, self.settings.backend_url.clone());

        Ok(TransportClient {
            inner: Arc::new(ClientInner {
                http,
                settings: self.settings,
                credentials,
                coordinator,
                reauth,
                registry: PendingRequestRegistry::new(),
            }),
        })
    }
}

struct ClientInner {
    http: reqwest::Client,
    settings: TransportSettings,
    credentials: Arc<CredentialStore>,
    coordinator: TokenRefreshCoordinator,
    reauth: ReauthLatch,
    registry: PendingRequestRegistry,
}

/// Cheaply cloneable handle; clones share credentials, refresh state and
/// the pending-request registry.
#[derive(Clone)]
pub struct TransportClient {
    inner: Arc<ClientInner>,
}

impl TransportClient {
    pub fn builder(settings: TransportSettings, credential: Credential) -> TransportClientBuilder {
        TransportClientBuilder {
            settings,
            credential,
            refresher: None,
            navigator: None,
        }
    }

    pub fn settings(&self) -> &TransportSettings {
        &self.inner.settings
    }

    pub fn backend_url(&self) -> &str {
        &self.inner.settings.backend_url
    }

    /// Installs a credential obtained outside the refresh path (login).
    pub fn set_credential(&self, credential: Credential) {
        self.inner.credentials.replace(credential);
    }

    pub fn credential_generation(&self) -> u64 {
        self.inner.credentials.generation()
    }

    pub fn is_refreshing(&self) -> bool {
        self.inner.coordinator.is_refreshing()
    }

    /// Aborts every pending request tagged `route`.
    pub fn cancel_route(&self, route: RouteTag) -> usize {
        self.inner.registry.cancel_route(route)
    }

    /// Number of pending requests tagged `route`.
    pub fn pending(&self, route: RouteTag) -> usize {
        self.inner.registry.pending(route)
    }

    /// Sends a request and returns the parsed response body.
    ///
    /// Empty bodies yield `Value::Null`. A tagged request that is cancelled
    /// resolves to [`TracklineError::Cancelled`] even if its response
    /// arrives in the same instant.
    pub async fn request(&self, descriptor: RequestDescriptor) -> Result<Value, TracklineError> {
        let url = query::prepare_url(&descriptor.url, self.inner.settings.max_query_length)?;

        let Some(route) = descriptor.route_tag else {
            return self.execute(&descriptor, url).await;
        };

        let guard = self.inner.registry.register(route);
        tokio::select! {
            biased;
            _ = guard.token().cancelled() => {
                debug!(%route, url = %url.path(), "request cancelled");
                Err(TracklineError::Cancelled { route: Some(route.to_string()) })
            }
            result = self.execute(&descriptor, url.clone()) => result,
        }
    }

    /// Sends a request and decodes the body into `T`.
    pub async fn request_as<T: DeserializeOwned>(
        &self,
        descriptor: RequestDescriptor,
    ) -> Result<T, TracklineError> {
        let value = self.request(descriptor).await?;
        serde_json::from_value(value).map_err(|e| TracklineError::Decode {
            message: format!("unexpected response shape: {e}"),
            source: Some(Box::new(e)),
        })
    }

    pub async fn get(&self, url: impl Into<String>) -> Result<Value, TracklineError> {
        self.request(RequestDescriptor::get(url)).await
    }

    pub async fn post(&self, url: impl Into<String>, body: Value) -> Result<Value, TracklineError> {
        self.request(RequestDescriptor::post(url, body)).await
    }

    pub async fn put(&self, url: impl Into<String>, body: Value) -> Result<Value, TracklineError> {
        self.request(RequestDescriptor::put(url, body)).await
    }

    pub async fn delete(&self, url: impl Into<String>) -> Result<Value, TracklineError> {
        self.request(RequestDescriptor::delete(url)).await
    }

    async fn execute(
        &self,
        descriptor: &RequestDescriptor,
        url: Url,
    ) -> Result<Value, TracklineError> {
        let mut refreshed = false;
        loop {
            let snapshot = self.inner.credentials.current();
            let (status, text) = self.send(descriptor, &url, &snapshot.credential).await?;

            if (200..300).contains(&status) {
                self.inner.reauth.reset();
                return parse_body(text, descriptor.parse_json);
            }

            let error = TracklineError::http(status, text);
            if refreshed || !is_authorization_failure(&error, &snapshot.credential) {
                debug!(status, url = %url.path(), "request failed");
                return Err(error);
            }

            match self.inner.coordinator.refresh_after(snapshot.generation).await {
                Ok(()) => {
                    debug!(url = %url.path(), "retrying after token refresh");
                    refreshed = true;
                }
                Err(failure) => {
                    self.inner.reauth.fire();
                    return Err(TracklineError::AuthExpired {
                        status,
                        message: error.user_message(),
                        source: Some(Box::new(failure)),
                    });
                }
            }
        }
    }

    async fn send(
        &self,
        descriptor: &RequestDescriptor,
        url: &Url,
        credential: &Credential,
    ) -> Result<(u16, String), TracklineError> {
        let mut builder = self
            .inner
            .http
            .request(descriptor.method.clone(), url.clone())
            .header(AUTHORIZATION, credential.authorization());
        if let Some(body) = &descriptor.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(url = %url.path(), error = %e, "request did not complete");
            TracklineError::Network {
                message: format!("request to {} failed: {e}", url.path()),
                source: Some(Box::new(e)),
            }
        })?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| TracklineError::Network {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;
        debug!(method = %descriptor.method, url = %url.path(), status, "response received");
        Ok((status, text))
    }
}

/// 401, a token rejection reported in the body, or any failure while the
/// credential is past its expiry.
fn is_authorization_failure(error: &TracklineError, credential: &Credential) -> bool {
    let TracklineError::Http { status, body, .. } = error else {
        return false;
    };
    let invalid_token = body
        .as_ref()
        .and_then(|b| b.get("error_description"))
        .and_then(Value::as_str)
        .is_some_and(|d| d.to_ascii_lowercase().contains("invalid token"));
    *status == 401 || invalid_token || credential.is_expired()
}

fn parse_body(text: String, parse_json: bool) -> Result<Value, TracklineError> {
    if !parse_json {
        return Ok(Value::String(text));
    }
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|e| TracklineError::Decode {
        message: format!("response is not valid JSON: {e}"),
        source: Some(Box::new(e)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_token_description_counts_as_auth_failure() {
        let credential = Credential::permanent("t");
        let error = TracklineError::http(403, r#"{"error_description": "Invalid token"}"#);
        assert!(is_authorization_failure(&error, &credential));

        let other = TracklineError::http(403, r#"{"error_description": "Forbidden"}"#);
        assert!(!is_authorization_failure(&other, &credential));
    }

    #[test]
    fn expired_credential_turns_any_failure_into_auth_failure() {
        let credential =
            Credential::permanent("t").with_expiry(chrono::Utc::now() - chrono::Duration::hours(1));
        let error = TracklineError::http(500, "oops");
        assert!(is_authorization_failure(&error, &credential));
    }

    #[test]
    fn empty_body_is_null() {
        assert_eq!(parse_body("  ".into(), true).unwrap(), Value::Null);
        assert_eq!(
            parse_body("plain".into(), false).unwrap(),
            Value::String("plain".into())
        );
        assert!(parse_body("<html>".into(), true).is_err());
    }

    #[test]
    fn settings_trim_trailing_slash() {
        assert_eq!(
            TransportSettings::new("http://foo.bar/youtrack/").backend_url,
            "http://foo.bar/youtrack"
        );
    }
}
