// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authorized HTTP transport for the Trackline client core.
//!
//! Provides the [`TransportClient`] with single-flight token refresh,
//! route-tagged cancellation, and the URL normalizer applied to payloads
//! that carry server-relative links.

pub mod client;
pub mod credential;
pub mod normalize;
pub mod oauth;
pub mod query;
mod reauth;
pub mod refresh;
pub mod registry;
pub mod request;

pub use client::{TransportClient, TransportClientBuilder, TransportSettings};
pub use credential::Credential;
pub use normalize::{ATTACHMENT_URL_FIELDS, absolute_url, normalize, normalize_fields};
pub use oauth::OAuthRefresher;
pub use refresh::{RefreshFailure, TokenRefresher};
pub use registry::PendingRequestRegistry;
pub use request::RequestDescriptor;
pub use reqwest::Method;
