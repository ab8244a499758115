// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed facade over the tracker REST API.
//!
//! [`Api`] groups the issue list, single-issue and article operations. All
//! of them share one [`ApiContext`]: the transport, the version gate that
//! picks legacy or current endpoints, and the backend URLs used to make
//! avatar and attachment links absolute.

pub mod articles;
pub mod context;
pub mod fields;
pub mod issue;
pub mod issues;
pub mod types;
pub mod version;

use std::sync::Arc;

use trackline_transport::TransportClient;

pub use articles::ArticlesApi;
pub use context::{ApiContext, ApiOptions};
pub use issue::IssueApi;
pub use issues::{COUNT_NOT_READY, IssuesApi};
pub use types::*;
pub use version::{Feature, FeatureGate, ServerVersion};

/// Entry point composing the sub-facades.
pub struct Api {
    ctx: Arc<ApiContext>,
    issues: IssuesApi,
    issue: IssueApi,
    articles: ArticlesApi,
}

impl Api {
    pub fn new(transport: TransportClient, gate: FeatureGate, options: ApiOptions) -> Self {
        Self::from_context(Arc::new(ApiContext::new(transport, gate, options)))
    }

    pub fn from_context(ctx: Arc<ApiContext>) -> Self {
        Self {
            issues: IssuesApi::new(Arc::clone(&ctx)),
            issue: IssueApi::new(Arc::clone(&ctx)),
            articles: ArticlesApi::new(Arc::clone(&ctx)),
            ctx,
        }
    }

    pub fn context(&self) -> &ApiContext {
        &self.ctx
    }

    pub fn transport(&self) -> &TransportClient {
        &self.ctx.transport
    }

    pub fn issues(&self) -> &IssuesApi {
        &self.issues
    }

    pub fn issue(&self) -> &IssueApi {
        &self.issue
    }

    pub fn articles(&self) -> &ArticlesApi {
        &self.articles
    }
}
