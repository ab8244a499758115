// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! State shared by every sub-facade.

use serde::de::DeserializeOwned;
use serde_json::Value;

use trackline_core::TracklineError;
use trackline_transport::{ATTACHMENT_URL_FIELDS, RequestDescriptor, TransportClient, normalize_fields};

use crate::version::{Feature, FeatureGate};

/// Tunables for request shapes.
#[derive(Debug, Clone)]
pub struct ApiOptions {
    /// `$top` for activity pages.
    pub activity_page_size: usize,
}

impl Default for ApiOptions {
    fn default() -> Self {
        Self {
            activity_page_size: 100,
        }
    }
}

/// Transport, version gate and base URLs.
pub struct ApiContext {
    pub transport: TransportClient,
    pub gate: FeatureGate,
    pub options: ApiOptions,
    backend_url: String,
    api_url: String,
}

impl ApiContext {
    pub fn new(transport: TransportClient, gate: FeatureGate, options: ApiOptions) -> Self {
        let backend_url = transport.backend_url().to_string();
        let api_url = format!("{backend_url}/api");
        Self {
            transport,
            gate,
            options,
            backend_url,
            api_url,
        }
    }

    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    /// `{backend}/api`
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// `{backend}/api/issues`
    pub fn issues_url(&self) -> String {
        format!("{}/issues", self.api_url)
    }

    /// `{api}/users/me` on the current API, `{api}/admin/users/me` before it.
    pub fn current_user_url(&self) -> String {
        if self.gate.is_enabled(Feature::ActualApi) {
            format!("{}/users/me", self.api_url)
        } else {
            format!("{}/admin/users/me", self.api_url)
        }
    }

    /// Sends a request and decodes the body as-is.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        descriptor: RequestDescriptor,
    ) -> Result<T, TracklineError> {
        self.transport.request_as(descriptor).await
    }

    /// Sends a request, rewrites relative avatar and attachment URLs, then
    /// decodes the body.
    pub async fn fetch_normalized<T: DeserializeOwned>(
        &self,
        descriptor: RequestDescriptor,
    ) -> Result<T, TracklineError> {
        let value = self.transport.request(descriptor).await?;
        decode(self.normalize(value))
    }

    /// Sends a request whose response body is ignored.
    pub async fn send(&self, descriptor: RequestDescriptor) -> Result<(), TracklineError> {
        self.transport.request(descriptor.raw()).await.map(|_| ())
    }

    pub fn normalize(&self, value: Value) -> Value {
        normalize_fields(value, &ATTACHMENT_URL_FIELDS, &self.backend_url)
    }
}

pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T, TracklineError> {
    serde_json::from_value(value).map_err(|e| TracklineError::Decode {
        message: format!("unexpected response shape: {e}"),
        source: Some(Box::new(e)),
    })
}
