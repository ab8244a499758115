// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed activity records.
//!
//! [`ActivityRecord::from_raw`] interprets the loosely-shaped wire activity
//! by its category. Everything the display model needs is matched
//! exhaustively on [`ActivityKind`] from here on.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use trackline_api::{Comment, RawActivity, Reaction, User, WorkItem};

use crate::category::{ActivityCategory, ActivitySource};

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRecord {
    pub id: String,
    /// Milliseconds since the epoch.
    pub timestamp: i64,
    pub author: Option<User>,
    /// Comment id for comment and reaction records, work item id for work
    /// records, entity id otherwise.
    pub target_id: Option<String>,
    pub kind: ActivityKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActivityKind {
    CommentAdded(Comment),
    CommentUpdated(Comment),
    CommentDeleted(Comment),
    FieldChanged(FieldChange),
    WorkItemAdded(WorkItem),
    WorkItemUpdated { before: WorkItem, after: WorkItem },
    WorkItemDeleted(WorkItem),
    ReactionAdded(Reaction),
    ReactionRemoved(Reaction),
    VcsChange { pull_request: bool, payload: Value },
    IssueCreated,
}

/// A history entry: one field of one entity changed.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    /// Server category id; unknown categories are kept verbatim.
    pub category: String,
    /// `targetMember`, e.g. `__CUSTOM_FIELD__Priority_3`.
    pub member: Option<String>,
    pub added: Value,
    pub removed: Value,
}

impl FieldChange {
    /// Multi-value changes carry arrays on at least one side.
    pub fn is_multi_value(&self) -> bool {
        self.added.is_array() || self.removed.is_array()
    }
}

/// One attribute that differs between two versions of a work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkItemChange {
    Duration,
    Date,
    Type,
    Text,
}

impl ActivityKind {
    /// Lists the attributes changed by a `WorkItemUpdated`; empty for other kinds.
    pub fn diff(&self) -> Vec<WorkItemChange> {
        let Self::WorkItemUpdated { before, after } = self else {
            return Vec::new();
        };
        let mut changes = Vec::new();
        if before.duration.minutes != after.duration.minutes {
            changes.push(WorkItemChange::Duration);
        }
        if before.date != after.date {
            changes.push(WorkItemChange::Date);
        }
        let type_id = |item: &WorkItem| item.work_type.as_ref().map(|t| t.id.clone());
        if type_id(before) != type_id(after) {
            changes.push(WorkItemChange::Type);
        }
        if before.text.as_deref().unwrap_or_default() != after.text.as_deref().unwrap_or_default() {
            changes.push(WorkItemChange::Text);
        }
        changes
    }
}

impl ActivityRecord {
    /// Interprets a wire activity. Returns `None` for noise categories and
    /// for entries whose payload does not match their category.
    pub fn from_raw(raw: RawActivity) -> Option<Self> {
        let category = ActivityCategory::from_str(&raw.category.id).ok();
        if category.is_some_and(ActivityCategory::is_noise) {
            return None;
        }
        let target_id = raw.target_id().map(str::to_string);
        let kind = match category {
            Some(c) if c.is_comment() => comment_kind(&raw)?,
            Some(c) if c.is_reaction() => reaction_kind(&raw)?,
            Some(ActivityCategory::WorkItem) => work_item_kind(&raw)?,
            Some(c) if c.is_vcs() => ActivityKind::VcsChange {
                pull_request: c == ActivityCategory::PullRequestChange,
                payload: raw.added.clone(),
            },
            Some(c) if c.is_created() => ActivityKind::IssueCreated,
            _ => {
                if category.is_none() {
                    debug!(category = %raw.category.id, "unrecognized activity category");
                }
                ActivityKind::FieldChanged(FieldChange {
                    category: raw.category.id.clone(),
                    member: raw.target_member.clone(),
                    added: raw.added.clone(),
                    removed: raw.removed.clone(),
                })
            }
        };
        let target_id = match &kind {
            ActivityKind::CommentAdded(c)
            | ActivityKind::CommentUpdated(c)
            | ActivityKind::CommentDeleted(c) => Some(c.id.clone()),
            ActivityKind::WorkItemAdded(w)
            | ActivityKind::WorkItemDeleted(w)
            | ActivityKind::WorkItemUpdated { after: w, .. } => Some(w.id.clone()),
            _ => target_id,
        };
        Some(Self {
            id: raw.id,
            timestamp: raw.timestamp,
            author: raw.author,
            target_id,
            kind,
        })
    }

    /// Record for a comment that is known to exist, e.g. one just created.
    pub fn comment(comment: Comment) -> Self {
        Self {
            id: comment.id.clone(),
            timestamp: comment.created,
            author: comment.author.clone(),
            target_id: Some(comment.id.clone()),
            kind: ActivityKind::CommentAdded(comment),
        }
    }

    /// Record for a work item that is known to exist.
    pub fn work_item(item: WorkItem) -> Self {
        Self {
            id: item.id.clone(),
            timestamp: item.created.unwrap_or(item.date),
            author: item.author.clone(),
            target_id: Some(item.id.clone()),
            kind: ActivityKind::WorkItemAdded(item),
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    pub fn author_id(&self) -> Option<&str> {
        self.author.as_ref().map(|a| a.id.as_str())
    }

    pub fn source(&self) -> ActivitySource {
        match &self.kind {
            ActivityKind::CommentAdded(_)
            | ActivityKind::CommentUpdated(_)
            | ActivityKind::CommentDeleted(_)
            | ActivityKind::ReactionAdded(_)
            | ActivityKind::ReactionRemoved(_) => ActivitySource::Comment,
            ActivityKind::WorkItemAdded(_)
            | ActivityKind::WorkItemUpdated { .. }
            | ActivityKind::WorkItemDeleted(_) => ActivitySource::WorkItem,
            ActivityKind::VcsChange { .. } => ActivitySource::Vcs,
            ActivityKind::FieldChanged(_) | ActivityKind::IssueCreated => ActivitySource::History,
        }
    }

    pub fn is_vcs(&self) -> bool {
        matches!(self.kind, ActivityKind::VcsChange { .. })
    }

    /// The comment carried by a comment record, if any.
    pub fn as_comment(&self) -> Option<&Comment> {
        match &self.kind {
            ActivityKind::CommentAdded(c)
            | ActivityKind::CommentUpdated(c)
            | ActivityKind::CommentDeleted(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_comment_mut(&mut self) -> Option<&mut Comment> {
        match &mut self.kind {
            ActivityKind::CommentAdded(c)
            | ActivityKind::CommentUpdated(c)
            | ActivityKind::CommentDeleted(c) => Some(c),
            _ => None,
        }
    }

    /// The current version of the work item carried by a work record.
    pub fn as_work_item(&self) -> Option<&WorkItem> {
        match &self.kind {
            ActivityKind::WorkItemAdded(w)
            | ActivityKind::WorkItemDeleted(w)
            | ActivityKind::WorkItemUpdated { after: w, .. } => Some(w),
            _ => None,
        }
    }
}

fn comment_kind(raw: &RawActivity) -> Option<ActivityKind> {
    let added: Option<Comment> = first(&raw.added);
    let removed: Option<Comment> = first(&raw.removed);
    let kind = match (added, removed) {
        (Some(c), None) if c.deleted => ActivityKind::CommentDeleted(c),
        (Some(c), None) => ActivityKind::CommentAdded(c),
        (Some(c), Some(_)) => ActivityKind::CommentUpdated(c),
        (None, Some(c)) => ActivityKind::CommentDeleted(c),
        (None, None) => {
            warn!(activity = %raw.id, "comment activity without a comment payload");
            return None;
        }
    };
    Some(kind)
}

fn reaction_kind(raw: &RawActivity) -> Option<ActivityKind> {
    if let Some(reaction) = first::<Reaction>(&raw.added) {
        return Some(ActivityKind::ReactionAdded(reaction));
    }
    if let Some(reaction) = first::<Reaction>(&raw.removed) {
        return Some(ActivityKind::ReactionRemoved(reaction));
    }
    warn!(activity = %raw.id, "reaction activity without a reaction payload");
    None
}

fn work_item_kind(raw: &RawActivity) -> Option<ActivityKind> {
    let added: Option<WorkItem> = first(&raw.added);
    let removed: Option<WorkItem> = first(&raw.removed);
    let kind = match (added, removed) {
        (Some(after), Some(before)) => ActivityKind::WorkItemUpdated { before, after },
        (Some(item), None) => ActivityKind::WorkItemAdded(item),
        (None, Some(item)) => ActivityKind::WorkItemDeleted(item),
        (None, None) => {
            warn!(activity = %raw.id, "work item activity without a work item payload");
            return None;
        }
    };
    Some(kind)
}

/// First element of an array payload, or the payload itself when it is an object.
fn first<T: DeserializeOwned>(value: &Value) -> Option<T> {
    let item = match value {
        Value::Array(items) => items.first()?,
        Value::Object(_) => value,
        _ => return None,
    };
    match serde_json::from_value(item.clone()) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            warn!(error = %e, "skipping malformed activity payload");
            None
        }
    }
}
