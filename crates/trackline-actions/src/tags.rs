// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use tracing::info;

use trackline_api::Tag;

use crate::context::ActionContext;

pub struct TagActions {
    ctx: Arc<ActionContext>,
}

impl TagActions {
    pub fn new(ctx: Arc<ActionContext>) -> Self {
        Self { ctx }
    }

    /// Tags an issue and returns its resulting tag list.
    pub async fn add_tag(&self, issue_id: &str, tag: Tag) -> Option<Vec<Tag>> {
        match self.ctx.api.issue().add_tags(issue_id, std::slice::from_ref(&tag)).await {
            Ok(tags) => {
                info!(issue = issue_id, tag = %tag.id, "tag added");
                Some(tags)
            }
            Err(e) => {
                self.ctx.report("add tag", &e);
                None
            }
        }
    }

    pub async fn remove_tag(&self, issue_id: &str, tag_id: &str) -> bool {
        match self.ctx.api.issue().remove_tag(issue_id, tag_id).await {
            Ok(()) => {
                info!(issue = issue_id, tag = tag_id, "tag removed");
                true
            }
            Err(e) => {
                self.ctx.report("remove tag", &e);
                false
            }
        }
    }
}
