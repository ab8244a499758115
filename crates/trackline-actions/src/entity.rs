// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Confirmed deletion of issues and articles.

use tracing::info;

use crate::context::ActionContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletable<'a> {
    Issue(&'a str),
    Article(&'a str),
    ArticleDraft(&'a str),
}

impl Deletable<'_> {
    fn title(&self) -> &'static str {
        match self {
            Self::Issue(_) => "Delete issue?",
            Self::Article(_) => "Delete article?",
            Self::ArticleDraft(_) => "Delete draft?",
        }
    }
}

/// Deletes after the user confirms. `on_deleted` runs only on success.
/// Returns whether the entity was deleted; a declined prompt is not an error.
pub async fn delete_entity<F>(ctx: &ActionContext, entity: Deletable<'_>, on_deleted: F) -> bool
where
    F: FnOnce(),
{
    if !ctx.confirm(entity.title(), "Delete").await {
        return false;
    }

    let result = match entity {
        Deletable::Issue(id) => ctx.api.issue().delete_issue(id).await,
        Deletable::Article(id) => ctx.api.articles().delete_article(id).await,
        Deletable::ArticleDraft(id) => ctx.api.articles().delete_article_draft(id).await,
    };

    match result {
        Ok(()) => {
            info!(?entity, "deleted");
            on_deleted();
            true
        }
        Err(e) => {
            ctx.report("delete", &e);
            false
        }
    }
}
