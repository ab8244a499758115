// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multi-step issue and article workflows.
//!
//! Actions combine API calls with the host collaborators from
//! `trackline-core`: they confirm destructive operations, update the
//! activity stream optimistically, and report each failure once through the
//! [`Notifier`](trackline_core::Notifier).

pub mod activity;
pub mod comments;
pub mod context;
pub mod drafts;
pub mod entity;
pub mod issue_list;
pub mod tags;
pub mod validation;
pub mod work_items;

pub use activity::{ActivityLoader, ActivityTarget, LoadSource};
pub use comments::{CommentActions, CommentEditor};
pub use context::{ActionContext, ActionSettings, MAX_STORED_QUERIES};
pub use drafts::{ArticleDrafts, DraftActions, DraftResource, DraftState, IssueDrafts};
pub use entity::{Deletable, delete_entity};
pub use issue_list::{IssueListActions, push_query};
pub use tags::TagActions;
pub use validation::ValidationFailure;
pub use work_items::WorkItemActions;
