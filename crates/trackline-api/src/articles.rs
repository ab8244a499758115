// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge-base articles, their drafts and comments.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use trackline_core::{RouteTag, TracklineError};
use trackline_transport::RequestDescriptor;

use crate::context::ApiContext;
use crate::fields::{self, FieldsQuery};
use crate::issue::{activities_query, to_body};
use crate::types::{Article, ArticleDraft, Comment, RawActivity};

/// Activity categories shown for an article.
pub const ARTICLE_ACTIVITY_CATEGORIES: [&str; 6] = [
    "ArticleCommentsCategory",
    "ArticleCreatedCategory",
    "ArticleSummaryCategory",
    "ArticleDescriptionCategory",
    "ArticleAttachmentsCategory",
    "ArticleCommentReactionCategory",
];

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct DraftCommentHolder {
    draft_comment: Option<Comment>,
}

pub struct ArticlesApi {
    ctx: Arc<ApiContext>,
}

impl ArticlesApi {
    pub(crate) fn new(ctx: Arc<ApiContext>) -> Self {
        Self { ctx }
    }

    fn articles_url(&self) -> String {
        format!("{}/articles", self.ctx.api_url())
    }

    fn article_url(&self, article_id: &str) -> String {
        format!("{}/{article_id}", self.articles_url())
    }

    fn drafts_url(&self) -> String {
        format!("{}/articleDrafts", self.ctx.current_user_url())
    }

    pub async fn get_articles(
        &self,
        query: Option<&str>,
        top: i64,
        skip: i64,
    ) -> Result<Vec<Article>, TracklineError> {
        let q = FieldsQuery::new(fields::ARTICLE)
            .top(top)
            .skip(skip)
            .opt("query", query)
            .build();
        self.ctx
            .fetch_normalized(
                RequestDescriptor::get(format!("{}?{q}", self.articles_url()))
                    .with_route(RouteTag::Articles),
            )
            .await
    }

    pub async fn get_article(&self, article_id: &str) -> Result<Article, TracklineError> {
        let q = FieldsQuery::new(fields::ARTICLE).build();
        self.ctx
            .fetch_normalized(RequestDescriptor::get(format!(
                "{}?{q}",
                self.article_url(article_id)
            )))
            .await
    }

    pub async fn delete_article(&self, article_id: &str) -> Result<(), TracklineError> {
        self.ctx
            .send(RequestDescriptor::delete(self.article_url(article_id)))
            .await
    }

    // Drafts

    /// Drafts of the current user; `original` selects drafts of one article,
    /// `None` selects drafts of new articles.
    pub async fn get_article_drafts(
        &self,
        original: Option<&str>,
    ) -> Result<Vec<ArticleDraft>, TracklineError> {
        let q = FieldsQuery::new(fields::ARTICLE_DRAFT)
            .param("original", original.unwrap_or("null"))
            .top(1000)
            .build();
        self.ctx
            .fetch_normalized(RequestDescriptor::get(format!("{}/?{q}", self.drafts_url())))
            .await
    }

    /// Creates a draft: an edit draft of `article_id`, or a blank article.
    pub async fn create_article_draft(
        &self,
        article_id: Option<&str>,
    ) -> Result<ArticleDraft, TracklineError> {
        let body = match article_id {
            Some(id) => json!({"originalArticle": {"id": id}}),
            None => json!({"project": null, "parentArticle": null, "summary": "", "content": ""}),
        };
        let q = FieldsQuery::new(fields::ARTICLE_DRAFT).build();
        self.ctx
            .fetch_normalized(RequestDescriptor::post(format!("{}?{q}", self.drafts_url()), body))
            .await
    }

    pub async fn update_article_draft(
        &self,
        draft: &ArticleDraft,
    ) -> Result<ArticleDraft, TracklineError> {
        let q = FieldsQuery::new(fields::ARTICLE_DRAFT).build();
        let body = json!({
            "summary": draft.summary,
            "content": draft.content,
            "parentArticle": draft.parent_article,
            "project": draft.project,
            "visibility": draft.visibility,
            "attachments": draft.attachments,
        });
        self.ctx
            .fetch_normalized(RequestDescriptor::post(
                format!("{}/{}?{q}", self.drafts_url(), draft.id),
                body,
            ))
            .await
    }

    /// Publishes a draft, creating or updating the article.
    pub async fn publish_article_draft(&self, draft_id: &str) -> Result<Article, TracklineError> {
        let q = FieldsQuery::empty()
            .param("draftId", draft_id)
            .param("fields", fields::ARTICLE)
            .build();
        self.ctx
            .fetch_normalized(RequestDescriptor::post(
                format!("{}/?{q}", self.articles_url()),
                json!({}),
            ))
            .await
    }

    pub async fn delete_article_draft(&self, draft_id: &str) -> Result<(), TracklineError> {
        self.ctx
            .send(RequestDescriptor::delete(format!("{}/{draft_id}", self.drafts_url())))
            .await
    }

    // Comments

    pub async fn get_draft_comment(&self, article_id: &str) -> Result<Option<Comment>, TracklineError> {
        let projection = format!("draftComment({})", fields::COMMENT);
        let q = FieldsQuery::new(&projection).build();
        let holder: DraftCommentHolder = self
            .ctx
            .fetch_normalized(RequestDescriptor::get(format!(
                "{}/?{q}",
                self.article_url(article_id)
            )))
            .await?;
        Ok(holder.draft_comment)
    }

    pub async fn update_draft_comment(
        &self,
        article_id: &str,
        draft: &Comment,
    ) -> Result<Comment, TracklineError> {
        let q = FieldsQuery::new(fields::COMMENT).build();
        let url = format!("{}/draftComment?{q}", self.article_url(article_id));
        let mut body = to_body(draft)?;
        body["usesMarkdown"] = json!(true);
        let descriptor = if draft.id.is_empty() {
            RequestDescriptor::put(url, body)
        } else {
            RequestDescriptor::post(url, body)
        };
        self.ctx.fetch_normalized(descriptor).await
    }

    pub async fn submit_draft_comment(
        &self,
        article_id: &str,
        draft_id: &str,
    ) -> Result<Comment, TracklineError> {
        let q = FieldsQuery::empty()
            .param("draftId", draft_id)
            .param("fields", fields::COMMENT)
            .build();
        self.ctx
            .fetch_normalized(RequestDescriptor::post(
                format!("{}/comments?{q}", self.article_url(article_id)),
                json!({}),
            ))
            .await
    }

    pub async fn update_comment(
        &self,
        article_id: &str,
        comment: &Comment,
    ) -> Result<Comment, TracklineError> {
        let q = FieldsQuery::new(fields::COMMENT).build();
        let mut body = to_body(comment)?;
        body["usesMarkdown"] = json!(true);
        body["visibility"] = comment.visibility.clone().unwrap_or(serde_json::Value::Null);
        self.ctx
            .fetch_normalized(RequestDescriptor::post(
                format!("{}/comments/{}?{q}", self.article_url(article_id), comment.id),
                body,
            ))
            .await
    }

    pub async fn delete_comment(&self, article_id: &str, comment_id: &str) -> Result<(), TracklineError> {
        self.ctx
            .send(RequestDescriptor::delete(format!(
                "{}/comments/{comment_id}",
                self.article_url(article_id)
            )))
            .await
    }

    pub async fn get_activities_page(&self, article_id: &str) -> Result<Vec<RawActivity>, TracklineError> {
        let url = format!(
            "{}/activitiesPage?{}",
            self.article_url(article_id),
            activities_query(&self.ctx, &ARTICLE_ACTIVITY_CATEGORIES)
        );
        // Articles answer with the bare list rather than a page wrapper.
        let value = self
            .ctx
            .transport
            .request(RequestDescriptor::get(url).with_route(RouteTag::Activity))
            .await?;
        let value = self.ctx.normalize(value);
        let list = match value.get("activities") {
            Some(activities) => activities.clone(),
            None => value,
        };
        crate::context::decode(list)
    }
}
