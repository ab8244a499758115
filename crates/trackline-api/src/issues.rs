// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Issue list, search and count.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use trackline_core::{RouteTag, TracklineError};
use trackline_transport::RequestDescriptor;

use crate::context::ApiContext;
use crate::fields::{self, FieldsQuery};
use crate::types::{EntityRef, Folder, Issue};
use crate::version::Feature;

/// The server answers a count request with this value while the count is
/// still being computed.
pub const COUNT_NOT_READY: i64 = -1;

#[derive(Deserialize)]
struct CountResponse {
    count: i64,
}

#[derive(Deserialize)]
struct LegacyCountResponse {
    value: i64,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct SortedIssues {
    tree: Vec<EntityRef>,
}

pub struct IssuesApi {
    ctx: Arc<ApiContext>,
}

impl IssuesApi {
    pub(crate) fn new(ctx: Arc<ApiContext>) -> Self {
        Self { ctx }
    }

    /// One page of issues matching `query`. Tagged with the `Issues` route.
    pub async fn get_issues(
        &self,
        query: &str,
        top: i64,
        skip: i64,
    ) -> Result<Vec<Issue>, TracklineError> {
        let q = FieldsQuery::new(fields::ISSUE_ON_LIST)
            .top(top)
            .skip(skip)
            .query(query)
            .build();
        let descriptor = RequestDescriptor::get(format!("{}?{q}", self.ctx.issues_url()))
            .with_route(RouteTag::Issues);
        self.ctx.fetch_normalized(descriptor).await
    }

    /// Number of issues matching `query`, or [`COUNT_NOT_READY`].
    ///
    /// Uses `issuesGetter/count` when the server supports it and the legacy
    /// `rest/issue/count` endpoint otherwise; both reduce to a plain number.
    pub async fn get_issues_count(
        &self,
        query: Option<&str>,
        folder: Option<&Folder>,
        unresolved_only: bool,
    ) -> Result<i64, TracklineError> {
        if self.ctx.gate.is_enabled(Feature::IssuesGetter) {
            self.issues_count(query, folder, unresolved_only).await
        } else {
            self.issues_count_legacy(query).await
        }
    }

    async fn issues_count(
        &self,
        query: Option<&str>,
        folder: Option<&Folder>,
        unresolved_only: bool,
    ) -> Result<i64, TracklineError> {
        let folder = folder
            .filter(|f| !f.id.is_empty())
            .map(|f| json!({"$type": f.type_name, "id": f.id}));
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        let body = json!({
            "folder": folder,
            "query": query,
            "unresolvedOnly": unresolved_only,
        });
        debug!(legacy = false, "requesting issue count");
        let url = format!("{}/issuesGetter/count?fields=count", self.ctx.api_url());
        let response: CountResponse = self
            .ctx
            .fetch(RequestDescriptor::post(url, body).with_route(RouteTag::Issues))
            .await?;
        Ok(response.count)
    }

    async fn issues_count_legacy(&self, query: Option<&str>) -> Result<i64, TracklineError> {
        let q = FieldsQuery::empty()
            .param("sync", false)
            .opt("filter", query)
            .build();
        debug!(legacy = true, "requesting issue count");
        let url = format!("{}/rest/issue/count?{q}", self.ctx.backend_url());
        let response: LegacyCountResponse = self
            .ctx
            .fetch(RequestDescriptor::get(url).with_route(RouteTag::Issues))
            .await?;
        Ok(response.value)
    }

    /// Ordered ids of the issues in `folder_id` matching `query`.
    pub async fn sorted_issues(
        &self,
        folder_id: Option<&str>,
        query: &str,
        top: i64,
        skip: i64,
    ) -> Result<Vec<String>, TracklineError> {
        let q = FieldsQuery::empty()
            .opt("folderId", folder_id)
            .param("topRoot", top)
            .param("skipRoot", skip)
            .query(query)
            .param("fields", "tree(id)")
            .param("flatten", true)
            .build();
        let url = format!("{}/sortedIssues?{q}", self.ctx.api_url());
        let sorted: SortedIssues = self
            .ctx
            .fetch(RequestDescriptor::get(url).with_route(RouteTag::Issues))
            .await?;
        Ok(sorted.tree.into_iter().map(|e| e.id).collect())
    }

    /// Full issues for the given ids, in one request.
    pub async fn issues_getter(&self, ids: &[String]) -> Result<Vec<Issue>, TracklineError> {
        let body = serde_json::Value::Array(ids.iter().map(|id| json!({"id": id})).collect());
        let q = FieldsQuery::new(fields::ISSUE_ON_LIST).build();
        let url = format!("{}/issuesGetter?{q}", self.ctx.api_url());
        self.ctx
            .fetch_normalized(RequestDescriptor::post(url, body))
            .await
    }
}
