// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Issue comment workflows on top of the activity stream.
//!
//! Each action applies its change to the stream optimistically, calls the
//! server, then confirms or rolls the edit back. A failed action produces
//! exactly one notification and leaves the stream as it was before.

use std::sync::Arc;

use tracing::{info, warn};

use trackline_activity::{ActivityStream, Confirmed, ReactionToggle};
use trackline_api::Comment;

use crate::activity::{ActivityLoader, ActivityTarget};
use crate::context::ActionContext;
use crate::validation;

/// Local comment input state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentEditor {
    /// The server-side draft comment, once saved.
    pub draft: Option<Comment>,
    /// Comment being edited, if any.
    pub editing: Option<Comment>,
}

pub struct CommentActions {
    ctx: Arc<ActionContext>,
    issue_id: String,
    loader: ActivityLoader,
}

impl CommentActions {
    pub fn new(ctx: Arc<ActionContext>, issue_id: impl Into<String>) -> Self {
        let issue_id = issue_id.into();
        let loader = ActivityLoader::new(Arc::clone(&ctx), ActivityTarget::Issue(issue_id.clone()));
        Self {
            ctx,
            issue_id,
            loader,
        }
    }

    /// Restores the server-side draft into the editor.
    pub async fn load_draft(&self, editor: &mut CommentEditor) {
        match self.ctx.api.issue().get_draft_comment(&self.issue_id).await {
            Ok(draft) => editor.draft = draft,
            Err(e) => warn!(issue = %self.issue_id, error = %e, "failed to load draft comment"),
        }
    }

    /// Saves the draft, shows a placeholder, submits, then reloads.
    ///
    /// The draft is saved before submitting so the text survives a failed
    /// submission.
    pub async fn submit_comment(
        &self,
        stream: &mut ActivityStream,
        editor: &mut CommentEditor,
        text: &str,
    ) -> bool {
        let text = match validation::comment_text(text) {
            Ok(text) => text,
            Err(failure) => {
                self.ctx.report("submit comment", &failure.into());
                return false;
            }
        };

        let mut draft = editor.draft.clone().unwrap_or_default();
        draft.text = text.to_string();
        let draft = match self.ctx.api.issue().update_draft_comment(&self.issue_id, &draft).await {
            Ok(saved) => saved,
            Err(e) => {
                self.ctx.report("save draft comment", &e);
                return false;
            }
        };
        editor.draft = Some(draft.clone());
        if let Err(failure) = validation::draft_id("draft comment", &draft.id) {
            self.ctx.report("submit comment", &failure.into());
            return false;
        }

        let edit = stream
            .insert_comment_placeholder(text, self.ctx.current_user.clone())
            .map_err(|e| warn!(error = %e, "comment submitted without placeholder"))
            .ok();

        match self.ctx.api.issue().submit_draft_comment(&self.issue_id, &draft.id).await {
            Ok(comment) => {
                info!(issue = %self.issue_id, comment = %comment.id, "comment added");
                if let Some(edit) = edit {
                    stream.confirm(edit, Confirmed::Comment(comment)).ok();
                }
                editor.draft = None;
                editor.editing = None;
                self.reload(stream).await;
                true
            }
            Err(e) => {
                if let Some(edit) = edit {
                    stream.rollback(edit).ok();
                }
                self.ctx.report("submit comment", &e);
                false
            }
        }
    }

    /// Saves an edited comment and reloads.
    pub async fn submit_edited_comment(
        &self,
        stream: &mut ActivityStream,
        editor: &mut CommentEditor,
        comment: Comment,
    ) -> bool {
        if let Err(failure) = validation::comment_text(&comment.text) {
            self.ctx.report("update comment", &failure.into());
            return false;
        }
        let edit = stream.update_comment(comment.clone()).ok();
        match self.ctx.api.issue().submit_comment(&self.issue_id, &comment).await {
            Ok(saved) => {
                if let Some(edit) = edit {
                    stream.confirm(edit, Confirmed::Comment(saved)).ok();
                }
                editor.editing = None;
                self.reload(stream).await;
                true
            }
            Err(e) => {
                if let Some(edit) = edit {
                    stream.rollback(edit).ok();
                }
                self.ctx.report("update comment", &e);
                false
            }
        }
    }

    /// Soft-deletes (`deleted = true`) or restores a comment.
    pub async fn toggle_comment_deleted(
        &self,
        stream: &mut ActivityStream,
        comment_id: &str,
        deleted: bool,
    ) -> bool {
        let edit = match stream.set_comment_deleted(comment_id, deleted) {
            Ok(edit) => edit,
            Err(e) => {
                self.ctx.report("toggle comment deleted", &e.into());
                return false;
            }
        };
        match self
            .ctx
            .api
            .issue()
            .update_comment_deleted(&self.issue_id, comment_id, deleted)
            .await
        {
            Ok(_) => {
                info!(comment = comment_id, deleted, "comment deleted state updated");
                stream.confirm(edit, Confirmed::Keep).ok();
                true
            }
            Err(e) => {
                stream.rollback(edit).ok();
                self.ctx.report("toggle comment deleted", &e);
                false
            }
        }
    }

    /// Removes a comment for good after the user confirms.
    pub async fn delete_comment_permanently(
        &self,
        stream: &mut ActivityStream,
        comment_id: &str,
    ) -> bool {
        if !self.ctx.confirm("Delete comment permanently?", "Delete").await {
            return false;
        }
        let edit = stream.remove_comment(comment_id).ok();
        match self
            .ctx
            .api
            .issue()
            .delete_comment_permanently(&self.issue_id, comment_id)
            .await
        {
            Ok(()) => {
                info!(comment = comment_id, "comment deleted permanently");
                if let Some(edit) = edit {
                    stream.confirm(edit, Confirmed::Keep).ok();
                }
                self.reload(stream).await;
                true
            }
            Err(e) => {
                if let Some(edit) = edit {
                    stream.rollback(edit).ok();
                }
                self.ctx.report("delete comment", &e);
                false
            }
        }
    }

    /// Adds the current user's `kind` reaction, or removes it if present.
    pub async fn toggle_reaction(
        &self,
        stream: &mut ActivityStream,
        comment_id: &str,
        kind: &str,
    ) -> bool {
        let (edit, toggle) = match stream.toggle_reaction(comment_id, kind, &self.ctx.current_user) {
            Ok(edit) => edit,
            Err(e) => {
                self.ctx.report("toggle reaction", &e.into());
                return false;
            }
        };
        let issue = self.ctx.api.issue();
        let result = match &toggle {
            ReactionToggle::Add => issue
                .add_comment_reaction(&self.issue_id, comment_id, kind)
                .await
                .map(Confirmed::Reaction),
            ReactionToggle::Remove(reaction_id) => issue
                .remove_comment_reaction(&self.issue_id, comment_id, reaction_id)
                .await
                .map(|()| Confirmed::Keep),
        };
        match result {
            Ok(confirmed) => {
                stream.confirm(edit, confirmed).ok();
                true
            }
            Err(e) => {
                stream.rollback(edit).ok();
                self.ctx.report("toggle reaction", &e);
                false
            }
        }
    }

    /// Ticks or clears the markdown checkbox at `position`.
    pub async fn update_checkbox(
        &self,
        stream: &mut ActivityStream,
        comment_id: &str,
        checked: bool,
        position: usize,
    ) -> bool {
        let Some(comment) = find_comment(stream, comment_id) else {
            warn!(comment = comment_id, "checkbox toggled on a comment not in the stream");
            return false;
        };
        match self
            .ctx
            .api
            .issue()
            .update_comment_checkbox(&self.issue_id, &comment, checked, position)
            .await
        {
            Ok(update) => {
                let updated = Comment {
                    text: update.text,
                    updated: update.updated.or(comment.updated),
                    ..comment
                };
                if let Ok(edit) = stream.update_comment(updated) {
                    stream.confirm(edit, Confirmed::Keep).ok();
                }
                true
            }
            Err(e) => {
                self.ctx.report("update checkbox", &e);
                false
            }
        }
    }

    async fn reload(&self, stream: &mut ActivityStream) {
        if let Err(e) = self.loader.refresh(stream).await {
            if !e.is_cancelled() {
                warn!(issue = %self.issue_id, error = %e, "activity reload failed");
            }
        }
    }
}

fn find_comment(stream: &ActivityStream, comment_id: &str) -> Option<Comment> {
    stream
        .records()
        .iter()
        .find_map(|r| r.as_comment().filter(|c| c.id == comment_id).cloned())
}
