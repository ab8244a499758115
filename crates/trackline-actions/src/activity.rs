// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loading activity pages with an offline fallback.

use std::sync::Arc;

use tracing::{debug, info, warn};

use trackline_activity::ActivityStream;
use trackline_api::RawActivity;
use trackline_core::{StoragePatch, TracklineError};

use crate::context::ActionContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityTarget {
    Issue(String),
    Article(String),
}

impl ActivityTarget {
    pub fn id(&self) -> &str {
        match self {
            Self::Issue(id) | Self::Article(id) => id,
        }
    }
}

/// Where a successful load came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Server,
    Cache,
}

pub struct ActivityLoader {
    ctx: Arc<ActionContext>,
    target: ActivityTarget,
}

impl ActivityLoader {
    pub fn new(ctx: Arc<ActionContext>, target: ActivityTarget) -> Self {
        Self { ctx, target }
    }

    pub fn target(&self) -> &ActivityTarget {
        &self.target
    }

    /// Loads the page into `stream`, notifying on failure.
    pub async fn load(&self, stream: &mut ActivityStream) -> bool {
        match self.refresh(stream).await {
            Ok(_) => true,
            Err(e) => {
                self.ctx.report("load activity", &e);
                false
            }
        }
    }

    /// Loads the page into `stream` without notifying.
    ///
    /// When the device is offline, or the request fails without a
    /// response, the cached page is used if there is one. Successful server
    /// loads replace the cached page.
    pub async fn refresh(&self, stream: &mut ActivityStream) -> Result<LoadSource, TracklineError> {
        stream.begin_load()?;
        let storage = match self.ctx.storage.load().await {
            Ok(state) => Some(state),
            Err(e) => {
                warn!(error = %e, "local storage unavailable");
                None
            }
        };
        let online = storage.as_ref().is_none_or(|s| s.network_online);
        let cached = storage.and_then(|mut s| s.activity_cache.remove(self.target.id()));

        if !online {
            if let Some(page) = cached {
                return self.finish_from_cache(stream, page);
            }
        }

        match self.fetch(stream).await {
            Ok(raw) => {
                self.store(&raw).await;
                stream.finish_load(raw)?;
                Ok(LoadSource::Server)
            }
            Err(e @ TracklineError::Network { .. }) => match cached {
                Some(page) => {
                    info!(entity = self.target.id(), error = %e, "using cached activity page");
                    self.finish_from_cache(stream, page)
                }
                None => {
                    stream.fail_load();
                    Err(e)
                }
            },
            Err(e) => {
                stream.fail_load();
                Err(e)
            }
        }
    }

    async fn fetch(&self, stream: &ActivityStream) -> Result<Vec<RawActivity>, TracklineError> {
        match &self.target {
            ActivityTarget::Issue(id) => {
                let categories = stream.options().category_ids();
                self.ctx.api.issue().get_activities_page(id, &categories).await
            }
            ActivityTarget::Article(id) => self.ctx.api.articles().get_activities_page(id).await,
        }
    }

    fn finish_from_cache(
        &self,
        stream: &mut ActivityStream,
        page: serde_json::Value,
    ) -> Result<LoadSource, TracklineError> {
        let raw: Vec<RawActivity> = match serde_json::from_value(page) {
            Ok(raw) => raw,
            Err(e) => {
                stream.fail_load();
                return Err(TracklineError::Decode {
                    message: format!("cached activity page is unreadable: {e}"),
                    source: Some(Box::new(e)),
                });
            }
        };
        stream.finish_load(raw)?;
        Ok(LoadSource::Cache)
    }

    async fn store(&self, raw: &[RawActivity]) {
        let page = match serde_json::to_value(raw) {
            Ok(page) => page,
            Err(e) => {
                warn!(error = %e, "cannot encode activity page for caching");
                return;
            }
        };
        let patch = StoragePatch {
            activity_page: Some((self.target.id().to_string(), page)),
            ..StoragePatch::default()
        };
        if let Err(e) = self.ctx.storage.flush(patch).await {
            warn!(error = %e, "failed to cache activity page");
        } else {
            debug!(entity = self.target.id(), "activity page cached");
        }
    }
}
