// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Activity list state with optimistic edits.
//!
//! ```text
//! Unloaded -> Loading -> Loaded <-> Reconciling
//! ```
//!
//! An edit is applied to the records immediately and remembered together
//! with a snapshot of the records before it. [`ActivityStream::confirm`]
//! swaps optimistic entries for the server's version,
//! [`ActivityStream::rollback`] restores the snapshot. Only one edit can be
//! pending at a time. Groups are recomputed after every change.

use chrono::Utc;
use strum::Display;
use tracing::{debug, info};
use uuid::Uuid;

use trackline_api::{Comment, RawActivity, Reaction, User, WorkItem};

use crate::error::ActivityError;
use crate::group::ActivityGroup;
use crate::model::{ActivityOptions, build_groups, records_from_raw};
use crate::reaction::{ReactionToggle, add_reaction, toggle_for};
use crate::record::{ActivityKind, ActivityRecord};

/// Id prefix of records and reactions that exist only locally.
pub const PLACEHOLDER_PREFIX: &str = "tmp-";

pub fn is_placeholder(id: &str) -> bool {
    id.starts_with(PLACEHOLDER_PREFIX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum StreamState {
    Unloaded,
    Loading,
    Loaded,
    Reconciling,
}

/// Handle of a pending optimistic edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EditId(Uuid);

impl std::fmt::Display for EditId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Server answer used to finish an edit.
#[derive(Debug, Clone, PartialEq)]
pub enum Confirmed {
    /// Keep the optimistic state as is.
    Keep,
    Comment(Comment),
    Reaction(Reaction),
    WorkItem(WorkItem),
}

#[derive(Debug, Clone)]
enum EditKind {
    CommentPlaceholder { tmp_id: String },
    Reaction { comment_id: String, tmp_id: Option<String> },
    CommentChanged { comment_id: String },
    CommentRemoved,
    WorkItemPlaceholder { tmp_id: String },
    WorkItemChanged { id: String },
    WorkItemRemoved,
}

#[derive(Debug, Clone)]
struct PendingEdit {
    id: EditId,
    kind: EditKind,
    snapshot: Vec<ActivityRecord>,
}

pub struct ActivityStream {
    options: ActivityOptions,
    state: StreamState,
    loaded_once: bool,
    records: Vec<ActivityRecord>,
    groups: Vec<ActivityGroup>,
    pending: Option<PendingEdit>,
}

impl ActivityStream {
    pub fn new(options: ActivityOptions) -> Self {
        Self {
            options,
            state: StreamState::Unloaded,
            loaded_once: false,
            records: Vec::new(),
            groups: Vec::new(),
            pending: None,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn options(&self) -> &ActivityOptions {
        &self.options
    }

    /// Display groups for the current records.
    pub fn groups(&self) -> &[ActivityGroup] {
        &self.groups
    }

    /// Records in chronological order of arrival, optimistic ones included.
    pub fn records(&self) -> &[ActivityRecord] {
        &self.records
    }

    pub fn pending_edit(&self) -> Option<EditId> {
        self.pending.as_ref().map(|p| p.id)
    }

    /// Changes sort order, window or sources and regroups.
    pub fn set_options(&mut self, options: ActivityOptions) {
        self.options = options;
        self.regroup();
    }

    pub fn begin_load(&mut self) -> Result<(), ActivityError> {
        if self.state == StreamState::Reconciling {
            return Err(ActivityError::EditPending);
        }
        self.state = StreamState::Loading;
        Ok(())
    }

    /// Replaces the records with a freshly fetched page.
    pub fn finish_load(&mut self, raw: Vec<RawActivity>) -> Result<(), ActivityError> {
        let records = records_from_raw(raw, &self.options);
        self.finish_load_records(records)
    }

    pub fn finish_load_records(&mut self, records: Vec<ActivityRecord>) -> Result<(), ActivityError> {
        if self.state != StreamState::Loading {
            return Err(ActivityError::InvalidTransition {
                from: self.state,
                to: StreamState::Loaded,
            });
        }
        self.records = records;
        self.loaded_once = true;
        self.state = StreamState::Loaded;
        self.regroup();
        debug!(records = self.records.len(), groups = self.groups.len(), "activity stream loaded");
        Ok(())
    }

    /// Abandons a load, keeping whatever was shown before.
    pub fn fail_load(&mut self) {
        if self.state == StreamState::Loading {
            self.state = if self.loaded_once {
                StreamState::Loaded
            } else {
                StreamState::Unloaded
            };
        }
    }

    /// Shows a not-yet-submitted comment at the newest position.
    pub fn insert_comment_placeholder(
        &mut self,
        text: &str,
        author: User,
    ) -> Result<EditId, ActivityError> {
        let tmp_id = placeholder_id();
        let comment = Comment {
            id: tmp_id.clone(),
            text: text.to_string(),
            created: self.next_timestamp(),
            author: Some(author),
            uses_markdown: true,
            ..Comment::default()
        };
        let edit = self.begin_edit(EditKind::CommentPlaceholder { tmp_id })?;
        self.records.push(ActivityRecord::comment(comment));
        self.regroup();
        Ok(edit)
    }

    /// Adds or removes `user`'s `kind` reaction on a comment.
    pub fn toggle_reaction(
        &mut self,
        comment_id: &str,
        kind: &str,
        user: &User,
    ) -> Result<(EditId, ReactionToggle), ActivityError> {
        let slot = self.comment_slot(comment_id)?;
        let toggle = self.records[slot]
            .as_comment()
            .map(|c| toggle_for(c, kind, user))
            .unwrap_or(ReactionToggle::Add);

        let tmp_id = matches!(toggle, ReactionToggle::Add).then(placeholder_id);
        let edit = self.begin_edit(EditKind::Reaction {
            comment_id: comment_id.to_string(),
            tmp_id: tmp_id.clone(),
        })?;
        if let Some(comment) = self.records[slot].as_comment_mut() {
            match (&toggle, tmp_id) {
                (ReactionToggle::Add, Some(id)) => add_reaction(
                    comment,
                    Reaction {
                        id,
                        reaction: kind.to_string(),
                        author: user.clone(),
                    },
                ),
                (ReactionToggle::Remove(id), _) => comment.reactions.retain(|r| &r.id != id),
                _ => {}
            }
        }
        self.regroup();
        Ok((edit, toggle))
    }

    /// Replaces a comment's content, e.g. after editing its text or a checkbox.
    pub fn update_comment(&mut self, comment: Comment) -> Result<EditId, ActivityError> {
        let slot = self.comment_slot(&comment.id)?;
        let edit = self.begin_edit(EditKind::CommentChanged {
            comment_id: comment.id.clone(),
        })?;
        if let Some(current) = self.records[slot].as_comment_mut() {
            *current = comment;
        }
        self.regroup();
        Ok(edit)
    }

    /// Sets or clears the soft-delete flag.
    pub fn set_comment_deleted(
        &mut self,
        comment_id: &str,
        deleted: bool,
    ) -> Result<EditId, ActivityError> {
        let slot = self.comment_slot(comment_id)?;
        let edit = self.begin_edit(EditKind::CommentChanged {
            comment_id: comment_id.to_string(),
        })?;
        if let Some(current) = self.records[slot].as_comment_mut() {
            current.deleted = deleted;
        }
        self.regroup();
        Ok(edit)
    }

    /// Drops every record of a comment.
    pub fn remove_comment(&mut self, comment_id: &str) -> Result<EditId, ActivityError> {
        self.comment_slot(comment_id)?;
        let edit = self.begin_edit(EditKind::CommentRemoved)?;
        self.records
            .retain(|r| r.as_comment().is_none_or(|c| c.id != comment_id));
        self.regroup();
        Ok(edit)
    }

    pub fn add_work_item(&mut self, mut item: WorkItem) -> Result<EditId, ActivityError> {
        if item.id.is_empty() {
            item.id = placeholder_id();
        }
        let tmp_id = item.id.clone();
        let timestamp = self.next_timestamp();
        let edit = self.begin_edit(EditKind::WorkItemPlaceholder { tmp_id })?;
        let mut record = ActivityRecord::work_item(item);
        record.timestamp = timestamp;
        self.records.push(record);
        self.regroup();
        Ok(edit)
    }

    pub fn update_work_item(&mut self, item: WorkItem) -> Result<EditId, ActivityError> {
        let slot = self.work_item_slot(&item.id)?;
        let edit = self.begin_edit(EditKind::WorkItemChanged { id: item.id.clone() })?;
        replace_work_item(&mut self.records[slot], item);
        self.regroup();
        Ok(edit)
    }

    pub fn delete_work_item(&mut self, work_item_id: &str) -> Result<EditId, ActivityError> {
        self.work_item_slot(work_item_id)?;
        let edit = self.begin_edit(EditKind::WorkItemRemoved)?;
        self.records
            .retain(|r| r.as_work_item().is_none_or(|w| w.id != work_item_id));
        self.regroup();
        Ok(edit)
    }

    /// Finishes the pending edit with the server's answer.
    pub fn confirm(&mut self, edit: EditId, confirmed: Confirmed) -> Result<(), ActivityError> {
        let pending = self.take_pending(edit)?;
        match (pending.kind, confirmed) {
            (EditKind::CommentPlaceholder { tmp_id }, Confirmed::Comment(mut comment)) => {
                self.records
                    .retain(|r| r.as_comment().is_none_or(|c| c.id != comment.id));
                if let Some(slot) = self.find_comment(&tmp_id) {
                    if comment.created == 0 {
                        comment.created = self.records[slot].timestamp;
                    }
                    self.records[slot] = ActivityRecord::comment(comment);
                }
            }
            (EditKind::Reaction { comment_id, tmp_id: Some(tmp_id) }, Confirmed::Reaction(reaction)) => {
                if let Some(comment) = self
                    .find_comment(&comment_id)
                    .and_then(|slot| self.records[slot].as_comment_mut())
                {
                    comment.reactions.retain(|r| r.id != tmp_id);
                    add_reaction(comment, reaction);
                }
            }
            (EditKind::CommentChanged { comment_id }, Confirmed::Comment(comment)) => {
                if let Some(current) = self
                    .find_comment(&comment_id)
                    .and_then(|slot| self.records[slot].as_comment_mut())
                {
                    *current = comment;
                }
            }
            (EditKind::WorkItemPlaceholder { tmp_id }, Confirmed::WorkItem(item)) => {
                self.records
                    .retain(|r| r.as_work_item().is_none_or(|w| w.id != item.id));
                if let Some(slot) = self.find_work_item(&tmp_id) {
                    let timestamp = self.records[slot].timestamp;
                    let mut record = ActivityRecord::work_item(item);
                    record.timestamp = timestamp;
                    self.records[slot] = record;
                }
            }
            (EditKind::WorkItemChanged { id }, Confirmed::WorkItem(item)) => {
                if let Some(slot) = self.find_work_item(&id) {
                    replace_work_item(&mut self.records[slot], item);
                }
            }
            (_, Confirmed::Keep) => {}
            (kind, other) => {
                debug!(?kind, ?other, "confirmation payload does not apply to edit, keeping local state");
            }
        }
        self.state = StreamState::Loaded;
        self.regroup();
        Ok(())
    }

    /// Restores the records exactly as they were before the edit.
    pub fn rollback(&mut self, edit: EditId) -> Result<(), ActivityError> {
        let pending = self.take_pending(edit)?;
        info!(edit = %edit, "rolling back optimistic activity edit");
        self.records = pending.snapshot;
        self.state = StreamState::Loaded;
        self.regroup();
        Ok(())
    }

    fn begin_edit(&mut self, kind: EditKind) -> Result<EditId, ActivityError> {
        match self.state {
            StreamState::Loaded => {}
            StreamState::Reconciling => return Err(ActivityError::EditPending),
            state => return Err(ActivityError::NotLoaded { state }),
        }
        let id = EditId(Uuid::new_v4());
        self.pending = Some(PendingEdit {
            id,
            kind,
            snapshot: self.records.clone(),
        });
        self.state = StreamState::Reconciling;
        Ok(id)
    }

    fn take_pending(&mut self, edit: EditId) -> Result<PendingEdit, ActivityError> {
        match self.pending.take() {
            Some(pending) if pending.id == edit => Ok(pending),
            other => {
                self.pending = other;
                Err(ActivityError::UnknownEdit(edit))
            }
        }
    }

    fn find_comment(&self, comment_id: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|r| r.as_comment().is_some_and(|c| c.id == comment_id))
    }

    fn comment_slot(&self, comment_id: &str) -> Result<usize, ActivityError> {
        self.find_comment(comment_id).ok_or_else(|| ActivityError::NotFound {
            what: "comment",
            id: comment_id.to_string(),
        })
    }

    fn find_work_item(&self, id: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|r| r.as_work_item().is_some_and(|w| w.id == id))
    }

    fn work_item_slot(&self, id: &str) -> Result<usize, ActivityError> {
        self.find_work_item(id).ok_or_else(|| ActivityError::NotFound {
            what: "work item",
            id: id.to_string(),
        })
    }

    /// A timestamp that sorts after every record already present.
    fn next_timestamp(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let latest = self.records.iter().map(|r| r.timestamp).max().unwrap_or(i64::MIN);
        now.max(latest.saturating_add(1))
    }

    fn regroup(&mut self) {
        let visible = self
            .records
            .iter()
            .filter(|r| self.options.shows(r))
            .cloned()
            .collect();
        self.groups = build_groups(visible, &self.options);
    }
}

fn placeholder_id() -> String {
    format!("{PLACEHOLDER_PREFIX}{}", Uuid::new_v4())
}

fn replace_work_item(record: &mut ActivityRecord, item: WorkItem) {
    match &mut record.kind {
        ActivityKind::WorkItemAdded(current)
        | ActivityKind::WorkItemDeleted(current)
        | ActivityKind::WorkItemUpdated { after: current, .. } => *current = item,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use trackline_api::WorkDuration;

    use super::*;

    fn user(id: &str) -> User {
        User {
            id: id.into(),
            ..User::default()
        }
    }

    fn comment(id: &str, author: &str, ts: i64) -> ActivityRecord {
        ActivityRecord::comment(Comment {
            id: id.into(),
            text: format!("text of {id}"),
            created: ts,
            author: Some(user(author)),
            ..Comment::default()
        })
    }

    fn loaded(records: Vec<ActivityRecord>) -> ActivityStream {
        let mut stream = ActivityStream::new(ActivityOptions::default());
        stream.begin_load().unwrap();
        stream.finish_load_records(records).unwrap();
        stream
    }

    #[test]
    fn lifecycle_transitions() {
        let mut stream = ActivityStream::new(ActivityOptions::default());
        assert_eq!(stream.state(), StreamState::Unloaded);
        assert!(matches!(
            stream.insert_comment_placeholder("x", user("u")),
            Err(ActivityError::NotLoaded { state: StreamState::Unloaded })
        ));

        stream.begin_load().unwrap();
        assert_eq!(stream.state(), StreamState::Loading);
        stream.fail_load();
        assert_eq!(stream.state(), StreamState::Unloaded);

        stream.begin_load().unwrap();
        stream.finish_load_records(vec![comment("c-1", "u-1", 0)]).unwrap();
        assert_eq!(stream.state(), StreamState::Loaded);

        stream.begin_load().unwrap();
        stream.fail_load();
        assert_eq!(stream.state(), StreamState::Loaded);
        assert_eq!(stream.records().len(), 1);
    }

    #[test]
    fn finishing_without_loading_is_rejected() {
        let mut stream = ActivityStream::new(ActivityOptions::default());
        assert_eq!(
            stream.finish_load_records(Vec::new()),
            Err(ActivityError::InvalidTransition {
                from: StreamState::Unloaded,
                to: StreamState::Loaded
            })
        );
    }

    #[test]
    fn one_edit_at_a_time() {
        let mut stream = loaded(vec![comment("c-1", "u-1", 0)]);
        let edit = stream.set_comment_deleted("c-1", true).unwrap();
        assert_eq!(stream.state(), StreamState::Reconciling);
        assert_eq!(
            stream.toggle_reaction("c-1", "heart", &user("u-2")),
            Err(ActivityError::EditPending)
        );
        assert_eq!(stream.begin_load(), Err(ActivityError::EditPending));
        stream.confirm(edit, Confirmed::Keep).unwrap();
        assert!(stream.records()[0].as_comment().unwrap().deleted);
    }

    #[test]
    fn stale_edit_id_is_rejected() {
        let mut stream = loaded(vec![comment("c-1", "u-1", 0)]);
        let first = stream.set_comment_deleted("c-1", true).unwrap();
        stream.rollback(first).unwrap();
        let second = stream.set_comment_deleted("c-1", true).unwrap();
        assert_eq!(stream.confirm(first, Confirmed::Keep), Err(ActivityError::UnknownEdit(first)));
        assert_eq!(stream.pending_edit(), Some(second));
    }

    #[test]
    fn reaction_toggle_adds_then_confirms_server_id() {
        let mut stream = loaded(vec![comment("c-1", "u-1", 0)]);
        let (edit, toggle) = stream.toggle_reaction("c-1", "heart", &user("u-2")).unwrap();
        assert_eq!(toggle, ReactionToggle::Add);
        let reactions = &stream.records()[0].as_comment().unwrap().reactions;
        assert_eq!(reactions.len(), 1);
        assert!(is_placeholder(&reactions[0].id));

        stream
            .confirm(
                edit,
                Confirmed::Reaction(Reaction {
                    id: "r-1".into(),
                    reaction: "heart".into(),
                    author: user("u-2"),
                }),
            )
            .unwrap();
        let reactions = &stream.records()[0].as_comment().unwrap().reactions;
        assert_eq!(reactions.len(), 1);
        assert_eq!(reactions[0].id, "r-1");

        let (_, toggle) = stream.toggle_reaction("c-1", "heart", &user("u-2")).unwrap();
        assert_eq!(toggle, ReactionToggle::Remove("r-1".into()));
        assert!(stream.records()[0].as_comment().unwrap().reactions.is_empty());
    }

    #[test]
    fn unknown_comment_is_not_found() {
        let mut stream = loaded(Vec::new());
        assert!(matches!(
            stream.remove_comment("c-404"),
            Err(ActivityError::NotFound { what: "comment", .. })
        ));
        assert_eq!(stream.state(), StreamState::Loaded);
    }

    #[test]
    fn work_item_placeholder_is_replaced_on_confirm() {
        let mut stream = loaded(vec![comment("c-1", "u-1", 0)]);
        let edit = stream
            .add_work_item(WorkItem {
                date: 5,
                duration: WorkDuration {
                    minutes: 30,
                    presentation: None,
                },
                author: Some(user("u-1")),
                ..WorkItem::default()
            })
            .unwrap();
        assert!(stream
            .records()
            .iter()
            .any(|r| r.as_work_item().is_some_and(|w| is_placeholder(&w.id))));

        stream
            .confirm(
                edit,
                Confirmed::WorkItem(WorkItem {
                    type_name: Some("IssueWorkItem".into()),
                    id: "w-1".into(),
                    date: 5,
                    ..WorkItem::default()
                }),
            )
            .unwrap();
        let items: Vec<_> = stream.records().iter().filter_map(|r| r.as_work_item()).collect();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "w-1");
    }

    #[test]
    fn hidden_sources_stay_out_of_groups() {
        let mut stream = loaded(vec![comment("c-1", "u-1", 0)]);
        stream.set_options(ActivityOptions {
            sources: vec![crate::ActivitySource::History],
            ..ActivityOptions::default()
        });
        assert!(stream.groups().is_empty());
        assert_eq!(stream.records().len(), 1);
    }
}
