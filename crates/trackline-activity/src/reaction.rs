// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Comment reactions.

use std::collections::HashMap;

use tracing::debug;

use trackline_api::{Comment, Reaction, User};

use crate::record::{ActivityKind, ActivityRecord};

/// What toggling a reaction will do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactionToggle {
    Add,
    /// Remove the existing reaction with this id.
    Remove(String),
}

/// The reaction `user_id` already left on `comment` with this `kind`.
pub fn find_reaction<'a>(comment: &'a Comment, kind: &str, user_id: &str) -> Option<&'a Reaction> {
    comment
        .reactions
        .iter()
        .find(|r| r.reaction == kind && r.author.id == user_id)
}

pub fn toggle_for(comment: &Comment, kind: &str, user: &User) -> ReactionToggle {
    match find_reaction(comment, kind, &user.id) {
        Some(existing) => ReactionToggle::Remove(existing.id.clone()),
        None => ReactionToggle::Add,
    }
}

/// Adds a reaction unless the same author already has one of this kind.
pub fn add_reaction(comment: &mut Comment, reaction: Reaction) {
    if find_reaction(comment, &reaction.reaction, &reaction.author.id).is_none() {
        comment.reactions.push(reaction);
    }
}

pub fn remove_reaction(comment: &mut Comment, reaction: &Reaction) {
    comment.reactions.retain(|r| {
        !(r.id == reaction.id
            || (r.reaction == reaction.reaction && r.author.id == reaction.author.id))
    });
}

/// Applies reaction records to their target comments and drops them from
/// the list. Reactions on comments outside the list are discarded.
pub fn fold_reactions(records: Vec<ActivityRecord>) -> Vec<ActivityRecord> {
    let (reactions, mut rest): (Vec<_>, Vec<_>) = records.into_iter().partition(|r| {
        matches!(
            r.kind,
            ActivityKind::ReactionAdded(_) | ActivityKind::ReactionRemoved(_)
        )
    });
    if reactions.is_empty() {
        return rest;
    }

    let by_comment: HashMap<String, usize> = rest
        .iter()
        .enumerate()
        .filter_map(|(i, r)| r.as_comment().map(|c| (c.id.clone(), i)))
        .collect();

    let mut reactions = reactions;
    reactions.sort_by_key(|r| r.timestamp);
    for record in reactions {
        let Some(&slot) = record.target_id.as_ref().and_then(|id| by_comment.get(id)) else {
            debug!(activity = %record.id, "reaction target not in page");
            continue;
        };
        let Some(comment) = rest[slot].as_comment_mut() else {
            continue;
        };
        match record.kind {
            ActivityKind::ReactionAdded(reaction) => add_reaction(comment, reaction),
            ActivityKind::ReactionRemoved(reaction) => remove_reaction(comment, &reaction),
            _ => {}
        }
    }
    rest
}
