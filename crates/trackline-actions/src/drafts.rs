// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Draft lifecycle shared by articles and issues.
//!
//! A draft is created, edited, and finally published. Publishing first
//! saves pending edits; if either step fails the draft stays where it is so
//! the user can retry.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use trackline_api::{Api, Article, ArticleDraft, Issue};
use trackline_core::TracklineError;

use crate::context::ActionContext;
use crate::validation;

/// Server operations for one kind of draft.
#[async_trait]
pub trait DraftResource: Send + Sync {
    type Draft: Clone + Send + Sync;
    type Entity: Send;

    /// Human-readable kind, e.g. `article draft`.
    fn kind(&self) -> &'static str;

    fn draft_id<'a>(&self, draft: &'a Self::Draft) -> &'a str;

    async fn create(&self, api: &Api, parent: Option<&str>) -> Result<Self::Draft, TracklineError>;

    async fn update(&self, api: &Api, draft: &Self::Draft) -> Result<Self::Draft, TracklineError>;

    async fn publish(&self, api: &Api, draft_id: &str) -> Result<Self::Entity, TracklineError>;

    async fn delete(&self, api: &Api, draft_id: &str) -> Result<(), TracklineError>;
}

/// Knowledge base article drafts. `parent` is the article being edited.
pub struct ArticleDrafts;

#[async_trait]
impl DraftResource for ArticleDrafts {
    type Draft = ArticleDraft;
    type Entity = Article;

    fn kind(&self) -> &'static str {
        "article draft"
    }

    fn draft_id<'a>(&self, draft: &'a ArticleDraft) -> &'a str {
        &draft.id
    }

    async fn create(&self, api: &Api, parent: Option<&str>) -> Result<ArticleDraft, TracklineError> {
        api.articles().create_article_draft(parent).await
    }

    async fn update(&self, api: &Api, draft: &ArticleDraft) -> Result<ArticleDraft, TracklineError> {
        api.articles().update_article_draft(draft).await
    }

    async fn publish(&self, api: &Api, draft_id: &str) -> Result<Article, TracklineError> {
        api.articles().publish_article_draft(draft_id).await
    }

    async fn delete(&self, api: &Api, draft_id: &str) -> Result<(), TracklineError> {
        api.articles().delete_article_draft(draft_id).await
    }
}

/// New-issue drafts. `parent` is the project id.
pub struct IssueDrafts;

#[async_trait]
impl DraftResource for IssueDrafts {
    type Draft = Issue;
    type Entity = Issue;

    fn kind(&self) -> &'static str {
        "issue draft"
    }

    fn draft_id<'a>(&self, draft: &'a Issue) -> &'a str {
        &draft.id
    }

    async fn create(&self, api: &Api, parent: Option<&str>) -> Result<Issue, TracklineError> {
        api.issue().create_issue_draft(parent).await
    }

    async fn update(&self, api: &Api, draft: &Issue) -> Result<Issue, TracklineError> {
        api.issue().update_issue_draft(draft).await
    }

    async fn publish(&self, api: &Api, draft_id: &str) -> Result<Issue, TracklineError> {
        api.issue().create_issue(draft_id).await
    }

    async fn delete(&self, api: &Api, draft_id: &str) -> Result<(), TracklineError> {
        api.issue().delete_issue_draft(draft_id).await
    }
}

/// What the draft screen shows.
#[derive(Debug, Clone)]
pub struct DraftState<D> {
    pub draft: Option<D>,
    pub processing: bool,
    /// Message of the last failed publish.
    pub error: Option<String>,
}

impl<D> Default for DraftState<D> {
    fn default() -> Self {
        Self {
            draft: None,
            processing: false,
            error: None,
        }
    }
}

pub struct DraftActions<R: DraftResource> {
    ctx: Arc<ActionContext>,
    resource: R,
    state: DraftState<R::Draft>,
}

impl<R: DraftResource> DraftActions<R> {
    pub fn new(ctx: Arc<ActionContext>, resource: R) -> Self {
        Self {
            ctx,
            resource,
            state: DraftState::default(),
        }
    }

    pub fn state(&self) -> &DraftState<R::Draft> {
        &self.state
    }

    /// Starts editing an existing draft, e.g. one restored from the server.
    pub fn set_draft(&mut self, draft: Option<R::Draft>) {
        self.state.draft = draft;
        self.state.error = None;
    }

    pub async fn create_draft(&mut self, parent: Option<&str>) -> Option<R::Draft> {
        self.state.processing = true;
        let result = self.resource.create(&self.ctx.api, parent).await;
        self.state.processing = false;
        match result {
            Ok(draft) => {
                info!(kind = self.resource.kind(), id = self.resource.draft_id(&draft), "draft created");
                self.state.draft = Some(draft.clone());
                Some(draft)
            }
            Err(e) => {
                self.ctx.report("create draft", &e);
                None
            }
        }
    }

    /// Saves edits. On failure the previous draft stays in place.
    pub async fn update_draft(&mut self, draft: R::Draft) -> Option<R::Draft> {
        if let Err(failure) = validation::draft_id(self.resource.kind(), self.resource.draft_id(&draft)) {
            self.ctx.report("update draft", &failure.into());
            return None;
        }
        match self.resource.update(&self.ctx.api, &draft).await {
            Ok(saved) => {
                self.state.draft = Some(saved.clone());
                Some(saved)
            }
            Err(e) => {
                self.ctx.report("update draft", &e);
                None
            }
        }
    }

    /// Saves pending edits, then publishes. Any failure stops the sequence
    /// and keeps the draft for a retry.
    pub async fn publish_draft(&mut self, draft: R::Draft) -> Option<R::Entity> {
        let draft_id = match validation::draft_id(self.resource.kind(), self.resource.draft_id(&draft)) {
            Ok(id) => id.to_string(),
            Err(failure) => {
                self.ctx.report("publish draft", &failure.into());
                return None;
            }
        };

        self.state.processing = true;
        self.state.error = None;
        let result = self.save_and_publish(&draft, &draft_id).await;
        self.state.processing = false;

        match result {
            Ok(entity) => {
                info!(kind = self.resource.kind(), id = %draft_id, "draft published");
                self.state.draft = None;
                self.ctx.notifier.notify("Published");
                Some(entity)
            }
            Err(e) => {
                self.state.error = Some(e.user_message());
                self.ctx.report("publish draft", &e);
                None
            }
        }
    }

    async fn save_and_publish(
        &mut self,
        draft: &R::Draft,
        draft_id: &str,
    ) -> Result<R::Entity, TracklineError> {
        let saved = self.resource.update(&self.ctx.api, draft).await?;
        self.state.draft = Some(saved);
        self.resource.publish(&self.ctx.api, draft_id).await
    }

    /// Discards the current draft on the server.
    pub async fn delete_draft(&mut self) -> bool {
        let Some(draft_id) = self
            .state
            .draft
            .as_ref()
            .map(|d| self.resource.draft_id(d).to_string())
        else {
            return false;
        };
        self.state.processing = true;
        let result = self.resource.delete(&self.ctx.api, &draft_id).await;
        self.state.processing = false;
        match result {
            Ok(()) => {
                self.state.draft = None;
                true
            }
            Err(e) => {
                self.ctx.report("delete draft", &e);
                false
            }
        }
    }
}
