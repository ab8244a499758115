// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Issue list queries and the matching-issues counter.
//!
//! A new query supersedes the previous one: in-flight list requests are
//! cancelled through the `Issues` route, and a pending count re-poll is
//! abandoned when its token is cancelled.

use std::sync::{Arc, Mutex, PoisonError};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use trackline_api::{COUNT_NOT_READY, Folder, Issue};
use trackline_core::{RouteTag, StoragePatch};

use crate::context::ActionContext;

pub struct IssueListActions {
    ctx: Arc<ActionContext>,
    count_poll: Mutex<CancellationToken>,
}

impl IssueListActions {
    pub fn new(ctx: Arc<ActionContext>) -> Self {
        Self {
            ctx,
            count_poll: Mutex::new(CancellationToken::new()),
        }
    }

    /// Loads one page of issues for `query`.
    ///
    /// Returns `None` on failure or when a newer query superseded this one.
    /// The first page is cached for offline display.
    pub async fn load_issues(&self, query: &str, skip: i64) -> Option<Vec<Issue>> {
        let cancelled = self.ctx.api.transport().cancel_route(RouteTag::Issues);
        if cancelled > 0 {
            debug!(cancelled, "superseded in-flight issue requests");
        }
        self.remember_query(query).await;

        let page_size = self.ctx.settings.issues_page_size;
        match self.ctx.api.issues().get_issues(query, page_size, skip).await {
            Ok(issues) => {
                info!(count = issues.len(), skip, "issues loaded");
                if skip == 0 {
                    self.cache_issues(&issues).await;
                }
                Some(issues)
            }
            Err(e) => {
                self.ctx.report("load issues", &e);
                None
            }
        }
    }

    /// Number of issues matching `query`.
    ///
    /// While the server is still computing it answers [`COUNT_NOT_READY`];
    /// the count is then polled once more after the configured delay.
    /// Returns `None` when the count is still not ready, the request
    /// failed, or a newer count request replaced this one.
    pub async fn load_issues_count(&self, query: Option<&str>, folder: Option<&Folder>) -> Option<i64> {
        let token = self.replace_count_token();

        let count = self.fetch_count(query, folder).await?;
        if count != COUNT_NOT_READY {
            return (!token.is_cancelled()).then_some(count);
        }

        debug!(delay_ms = self.ctx.settings.count_poll_delay.as_millis(), "issue count not ready, re-polling");
        tokio::select! {
            biased;
            () = token.cancelled() => return None,
            () = tokio::time::sleep(self.ctx.settings.count_poll_delay) => {}
        }

        let count = self.fetch_count(query, folder).await?;
        if token.is_cancelled() {
            return None;
        }
        if count == COUNT_NOT_READY {
            warn!("issue count still not ready after re-poll");
            return None;
        }
        Some(count)
    }

    /// Abandons any pending count re-poll.
    pub fn cancel(&self) {
        self.count_poll
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
    }

    fn replace_count_token(&self) -> CancellationToken {
        let mut current = self.count_poll.lock().unwrap_or_else(PoisonError::into_inner);
        current.cancel();
        *current = CancellationToken::new();
        current.clone()
    }

    async fn fetch_count(&self, query: Option<&str>, folder: Option<&Folder>) -> Option<i64> {
        match self.ctx.api.issues().get_issues_count(query, folder, false).await {
            Ok(count) => Some(count),
            Err(e) => {
                self.ctx.report("count issues", &e);
                None
            }
        }
    }

    async fn remember_query(&self, query: &str) {
        let mut queries = match self.ctx.storage.load().await {
            Ok(state) => state.last_queries,
            Err(e) => {
                warn!(error = %e, "cannot read stored queries");
                return;
            }
        };
        if !push_query(&mut queries, query, self.ctx.settings.max_stored_queries) {
            return;
        }
        let patch = StoragePatch {
            last_queries: Some(queries),
            ..StoragePatch::default()
        };
        if let Err(e) = self.ctx.storage.flush(patch).await {
            warn!(error = %e, "failed to store query");
        }
    }

    async fn cache_issues(&self, issues: &[Issue]) {
        let cached = match issues.iter().map(serde_json::to_value).collect::<Result<Vec<_>, _>>() {
            Ok(cached) => cached,
            Err(e) => {
                warn!(error = %e, "cannot encode issues for caching");
                return;
            }
        };
        let patch = StoragePatch {
            issues_cache: Some(cached),
            ..StoragePatch::default()
        };
        if let Err(e) = self.ctx.storage.flush(patch).await {
            warn!(error = %e, "failed to cache issues");
        }
    }
}

/// Moves `query` to the front of `queries`, keeping at most `max` distinct
/// entries. Blank queries are ignored. Returns whether `queries` changed.
pub fn push_query(queries: &mut Vec<String>, query: &str, max: usize) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return false;
    }
    if queries.first().is_some_and(|q| q == query) && queries.len() <= max {
        return false;
    }
    queries.retain(|q| q != query);
    queries.insert(0, query.to_string());
    queries.truncate(max);
    true
}
