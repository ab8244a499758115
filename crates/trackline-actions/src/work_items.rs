// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Spent-time records of an issue.

use std::sync::Arc;

use tracing::{info, warn};

use trackline_activity::{ActivityStream, Confirmed};
use trackline_api::{DraftWorkItem, WorkItem};

use crate::activity::{ActivityLoader, ActivityTarget};
use crate::context::ActionContext;
use crate::validation;

pub struct WorkItemActions {
    ctx: Arc<ActionContext>,
    issue_id: String,
    loader: ActivityLoader,
}

impl WorkItemActions {
    pub fn new(ctx: Arc<ActionContext>, issue_id: impl Into<String>) -> Self {
        let issue_id = issue_id.into();
        let loader = ActivityLoader::new(Arc::clone(&ctx), ActivityTarget::Issue(issue_id.clone()));
        Self {
            ctx,
            issue_id,
            loader,
        }
    }

    /// Submits a new work item, showing it in the stream until confirmed.
    pub async fn create_work_item(&self, stream: &mut ActivityStream, item: WorkItem) -> Option<WorkItem> {
        if let Err(failure) = validation::work_item(&item) {
            self.ctx.report("create work item", &failure.into());
            return None;
        }
        let edit = match stream.add_work_item(item.clone()) {
            Ok(edit) => Some(edit),
            Err(e) => {
                warn!(error = %e, "work item submitted without placeholder");
                None
            }
        };
        match self.ctx.api.issue().submit_work_item(&self.issue_id, &item).await {
            Ok(created) => {
                info!(issue = %self.issue_id, work_item = %created.id, "work item created");
                if let Some(edit) = edit {
                    stream.confirm(edit, Confirmed::WorkItem(created.clone())).ok();
                }
                self.reload(stream).await;
                Some(created)
            }
            Err(e) => {
                if let Some(edit) = edit {
                    stream.rollback(edit).ok();
                }
                self.ctx.report("create work item", &e);
                None
            }
        }
    }

    /// Saves changes to a persisted work item.
    pub async fn update_work_item(&self, stream: &mut ActivityStream, item: WorkItem) -> Option<WorkItem> {
        if let Err(failure) = validation::work_item(&item) {
            self.ctx.report("update work item", &failure.into());
            return None;
        }
        let edit = stream.update_work_item(item.clone()).ok();
        match self.ctx.api.issue().submit_work_item(&self.issue_id, &item).await {
            Ok(updated) => {
                if let Some(edit) = edit {
                    stream.confirm(edit, Confirmed::WorkItem(updated.clone())).ok();
                }
                self.reload(stream).await;
                Some(updated)
            }
            Err(e) => {
                if let Some(edit) = edit {
                    stream.rollback(edit).ok();
                }
                self.ctx.report("update work item", &e);
                None
            }
        }
    }

    /// Deletes a work item after the user confirms.
    pub async fn delete_work_item(&self, stream: &mut ActivityStream, work_item_id: &str) -> bool {
        if !self.ctx.confirm("Delete work item?", "Delete").await {
            return false;
        }
        let edit = stream.delete_work_item(work_item_id).ok();
        match self.ctx.api.issue().delete_work_item(&self.issue_id, work_item_id).await {
            Ok(()) => {
                info!(issue = %self.issue_id, work_item = work_item_id, "work item deleted");
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
                self.ctx.report("delete work item", &e);
                false
            }
        }
    }

    pub async fn update_draft_work_item(&self, draft: &DraftWorkItem) -> Option<DraftWorkItem> {
        match self.ctx.api.issue().update_draft_work_item(&self.issue_id, draft).await {
            Ok(saved) => Some(saved),
            Err(e) => {
                self.ctx.report("save draft work item", &e);
                None
            }
        }
    }

    pub async fn delete_draft_work_item(&self) -> bool {
        match self.ctx.api.issue().delete_draft_work_item(&self.issue_id).await {
            Ok(()) => true,
            Err(e) => {
                self.ctx.report("delete draft work item", &e);
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
