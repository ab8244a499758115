// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-issue operations: drafts, comments, reactions, tags, work items
//! and the activity page.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Value, json};

use trackline_core::{RouteTag, TracklineError};
use trackline_transport::RequestDescriptor;

use crate::context::ApiContext;
use crate::fields::{self, FieldsQuery};
use crate::types::{
    ActivityPage, CheckboxUpdate, Comment, DraftWorkItem, Issue, RawActivity, Reaction, Tag,
    TimeTracking, WorkItem,
};
use crate::version::Feature;

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct DraftCommentHolder {
    draft_comment: Option<Comment>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct TagsHolder {
    tags: Vec<Tag>,
}

pub struct IssueApi {
    ctx: Arc<ApiContext>,
}

impl IssueApi {
    pub(crate) fn new(ctx: Arc<ApiContext>) -> Self {
        Self { ctx }
    }

    fn issue_url(&self, issue_id: &str) -> String {
        format!("{}/{issue_id}", self.ctx.issues_url())
    }

    fn comments_url(&self, issue_id: &str) -> String {
        format!("{}/comments", self.issue_url(issue_id))
    }

    /// `{current user}/drafts`
    pub fn drafts_url(&self) -> String {
        format!("{}/drafts", self.ctx.current_user_url())
    }

    pub async fn get_issue(&self, issue_id: &str) -> Result<Issue, TracklineError> {
        let q = FieldsQuery::new(fields::ISSUE).build();
        self.ctx
            .fetch_normalized(RequestDescriptor::get(format!("{}?{q}", self.issue_url(issue_id))))
            .await
    }

    pub async fn delete_issue(&self, issue_id: &str) -> Result<(), TracklineError> {
        self.ctx
            .send(RequestDescriptor::delete(self.issue_url(issue_id)))
            .await
    }

    pub async fn get_issue_comments(&self, issue_id: &str) -> Result<Vec<Comment>, TracklineError> {
        let q = FieldsQuery::new(fields::COMMENT).build();
        self.ctx
            .fetch_normalized(RequestDescriptor::get(format!("{}?{q}", self.comments_url(issue_id))))
            .await
    }

    // Drafts

    /// Creates an empty issue draft, optionally in a project.
    pub async fn create_issue_draft(&self, project_id: Option<&str>) -> Result<Issue, TracklineError> {
        let draft = Issue {
            project: project_id.map(|id| json!({"id": id})),
            ..Issue::default()
        };
        self.update_issue_draft(&draft).await
    }

    pub async fn load_issue_draft(&self, draft_id: &str) -> Result<Issue, TracklineError> {
        let q = FieldsQuery::new(fields::ISSUE).build();
        self.ctx
            .fetch_normalized(RequestDescriptor::get(format!(
                "{}/{draft_id}?{q}",
                self.drafts_url()
            )))
            .await
    }

    /// Saves a draft; a draft without id is created.
    pub async fn update_issue_draft(&self, draft: &Issue) -> Result<Issue, TracklineError> {
        let q = FieldsQuery::new(fields::ISSUE).build();
        let url = format!("{}/{}?{q}", self.drafts_url(), draft.id);
        self.ctx
            .fetch_normalized(RequestDescriptor::post(url, to_body(draft)?))
            .await
    }

    pub async fn delete_issue_draft(&self, draft_id: &str) -> Result<(), TracklineError> {
        self.ctx
            .send(RequestDescriptor::delete(format!("{}/{draft_id}", self.drafts_url())))
            .await
    }

    /// Publishes a draft as a new issue.
    pub async fn create_issue(&self, draft_id: &str) -> Result<Issue, TracklineError> {
        let q = FieldsQuery::empty()
            .param("draftId", draft_id)
            .param("fields", fields::ISSUE_ON_LIST)
            .build();
        let url = format!("{}?{q}", self.ctx.issues_url());
        self.ctx
            .fetch_normalized(RequestDescriptor::post(url, json!({})))
            .await
    }

    // Comments

    pub async fn get_draft_comment(&self, issue_id: &str) -> Result<Option<Comment>, TracklineError> {
        let projection = format!("draftComment({})", fields::COMMENT);
        let q = FieldsQuery::new(&projection).build();
        let holder: DraftCommentHolder = self
            .ctx
            .fetch_normalized(RequestDescriptor::get(format!("{}?{q}", self.issue_url(issue_id))))
            .await?;
        Ok(holder.draft_comment)
    }

    /// Saves the draft comment. The first save creates it with `PUT`.
    pub async fn update_draft_comment(
        &self,
        issue_id: &str,
        draft: &Comment,
    ) -> Result<Comment, TracklineError> {
        let q = FieldsQuery::new(fields::COMMENT).build();
        let url = format!("{}/draftComment/?{q}", self.issue_url(issue_id));
        let body = to_body(draft)?;
        let descriptor = if draft.id.is_empty() {
            RequestDescriptor::put(url, body)
        } else {
            RequestDescriptor::post(url, body)
        };
        self.ctx.fetch_normalized(descriptor).await
    }

    /// Turns the saved draft comment into a real comment.
    pub async fn submit_draft_comment(
        &self,
        issue_id: &str,
        draft_id: &str,
    ) -> Result<Comment, TracklineError> {
        let q = FieldsQuery::empty()
            .param("draftId", draft_id)
            .param("fields", fields::COMMENT)
            .build();
        let url = format!("{}/?{q}", self.comments_url(issue_id));
        self.ctx
            .fetch_normalized(RequestDescriptor::post(url, json!({})))
            .await
    }

    /// Creates a comment, or updates it when it already has an id.
    pub async fn submit_comment(
        &self,
        issue_id: &str,
        comment: &Comment,
    ) -> Result<Comment, TracklineError> {
        let q = FieldsQuery::new(fields::COMMENT).build();
        let url = format!("{}/{}?{q}", self.comments_url(issue_id), comment.id);
        self.ctx
            .fetch_normalized(RequestDescriptor::post(url, to_body(comment)?))
            .await
    }

    /// Soft-deletes or restores a comment.
    pub async fn update_comment_deleted(
        &self,
        issue_id: &str,
        comment_id: &str,
        deleted: bool,
    ) -> Result<Comment, TracklineError> {
        let q = FieldsQuery::new(fields::COMMENT).build();
        let url = format!("{}/{comment_id}?{q}", self.comments_url(issue_id));
        self.ctx
            .fetch_normalized(RequestDescriptor::post(url, json!({"deleted": deleted})))
            .await
    }

    pub async fn delete_comment_permanently(
        &self,
        issue_id: &str,
        comment_id: &str,
    ) -> Result<(), TracklineError> {
        self.ctx
            .send(RequestDescriptor::delete(format!(
                "{}/{comment_id}",
                self.comments_url(issue_id)
            )))
            .await
    }

    pub async fn add_comment_reaction(
        &self,
        issue_id: &str,
        comment_id: &str,
        reaction: &str,
    ) -> Result<Reaction, TracklineError> {
        let q = FieldsQuery::new(fields::REACTION).build();
        let url = format!("{}/{comment_id}/reactions?{q}", self.comments_url(issue_id));
        self.ctx
            .fetch_normalized(RequestDescriptor::post(url, json!({"reaction": reaction})))
            .await
    }

    pub async fn remove_comment_reaction(
        &self,
        issue_id: &str,
        comment_id: &str,
        reaction_id: &str,
    ) -> Result<(), TracklineError> {
        self.ctx
            .send(RequestDescriptor::delete(format!(
                "{}/{comment_id}/reactions/{reaction_id}",
                self.comments_url(issue_id)
            )))
            .await
    }

    /// Toggles the markdown checkbox at `position` in a comment.
    pub async fn update_comment_checkbox(
        &self,
        issue_id: &str,
        comment: &Comment,
        checked: bool,
        position: usize,
    ) -> Result<CheckboxUpdate, TracklineError> {
        let q = FieldsQuery::new("text,updated").build();
        let url = format!("{}/{}?{q}", self.comments_url(issue_id), comment.id);
        let body = json!({
            "checkboxes": [{"checked": checked, "position": position}],
            "text": comment.text,
        });
        self.ctx.fetch(RequestDescriptor::post(url, body)).await
    }

    // Tags

    /// Adds tags and returns the issue's resulting tag list.
    pub async fn add_tags(&self, issue_id: &str, tags: &[Tag]) -> Result<Vec<Tag>, TracklineError> {
        let projection = format!("tags({})", fields::TAG);
        let q = FieldsQuery::new(&projection).build();
        let url = format!("{}?{q}", self.issue_url(issue_id));
        let holder: TagsHolder = self
            .ctx
            .fetch(RequestDescriptor::post(url, json!({"tags": tags})))
            .await?;
        Ok(holder.tags)
    }

    pub async fn remove_tag(&self, issue_id: &str, tag_id: &str) -> Result<(), TracklineError> {
        self.ctx
            .send(RequestDescriptor::delete(format!(
                "{}/tags/{tag_id}",
                self.issue_url(issue_id)
            )))
            .await
    }

    // Work items

    pub async fn time_tracking(&self, issue_id: &str) -> Result<TimeTracking, TracklineError> {
        let q = FieldsQuery::new(fields::TIME_TRACKING).build();
        self.ctx
            .fetch_normalized(RequestDescriptor::get(format!(
                "{}/timeTracking?{q}",
                self.issue_url(issue_id)
            )))
            .await
    }

    /// Creates a work item, or updates a persisted one.
    pub async fn submit_work_item(
        &self,
        issue_id: &str,
        item: &WorkItem,
    ) -> Result<WorkItem, TracklineError> {
        let q = FieldsQuery::new(fields::WORK_ITEM).build();
        let id = if item.is_persisted() { item.id.as_str() } else { "" };
        let url = format!("{}/timeTracking/workItems/{id}?{q}", self.issue_url(issue_id));
        self.ctx
            .fetch_normalized(RequestDescriptor::post(url, to_body(item)?))
            .await
    }

    pub async fn delete_work_item(&self, issue_id: &str, work_item_id: &str) -> Result<(), TracklineError> {
        self.ctx
            .send(RequestDescriptor::delete(format!(
                "{}/timeTracking/workItems/{work_item_id}",
                self.issue_url(issue_id)
            )))
            .await
    }

    /// Saves the draft work item. The first save creates it with `PUT`.
    pub async fn update_draft_work_item(
        &self,
        issue_id: &str,
        draft: &DraftWorkItem,
    ) -> Result<DraftWorkItem, TracklineError> {
        let q = FieldsQuery::new(fields::WORK_ITEM).build();
        let url = format!("{}/timeTracking/draftWorkItem?{q}", self.issue_url(issue_id));
        let body = to_body(draft)?;
        let descriptor = if draft.id.is_some() {
            RequestDescriptor::post(url, body)
        } else {
            RequestDescriptor::put(url, body)
        };
        self.ctx.fetch(descriptor).await
    }

    pub async fn delete_draft_work_item(&self, issue_id: &str) -> Result<(), TracklineError> {
        self.ctx
            .send(RequestDescriptor::delete(format!(
                "{}/timeTracking/draftWorkItem",
                self.issue_url(issue_id)
            )))
            .await
    }

    // Activity

    /// Newest-first page of activities in the given categories.
    pub async fn get_activities_page(
        &self,
        issue_id: &str,
        categories: &[&str],
    ) -> Result<Vec<RawActivity>, TracklineError> {
        let url = format!(
            "{}/activitiesPage?{}",
            self.issue_url(issue_id),
            activities_query(&self.ctx, categories)
        );
        let page: ActivityPage = self
            .ctx
            .fetch_normalized(RequestDescriptor::get(url).with_route(RouteTag::Activity))
            .await?;
        Ok(page.activities)
    }
}

/// `categories=a,b&$top=N&reverse=true&fields=...`
pub(crate) fn activities_query(ctx: &ApiContext, categories: &[&str]) -> String {
    let projection = if ctx.gate.is_enabled(Feature::ModernActivities) {
        fields::ACTIVITY
    } else {
        fields::ACTIVITY_LEGACY
    };
    FieldsQuery::empty()
        .param("categories", categories.join(","))
        .top(ctx.options.activity_page_size as i64)
        .param("reverse", true)
        .param("fields", projection)
        .build()
}

pub(crate) fn to_body<T: serde::Serialize>(value: &T) -> Result<Value, TracklineError> {
    serde_json::to_value(value).map_err(|e| TracklineError::Internal(format!("failed to encode request body: {e}")))
}
