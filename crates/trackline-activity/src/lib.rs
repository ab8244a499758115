// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Activity stream model for issues and articles.
//!
//! Wire activities are interpreted into typed [`ActivityRecord`]s, filtered
//! by [`ActivitySource`], grouped by author and time, and kept in an
//! [`ActivityStream`] that supports optimistic edits with confirm and
//! rollback.

pub mod category;
pub mod error;
pub mod group;
pub mod merge;
pub mod model;
pub mod reaction;
pub mod record;
pub mod stream;

pub use category::{ActivityCategory, ActivitySource, category_ids};
pub use error::ActivityError;
pub use group::{ActivityGroup, group_records};
pub use model::{ActivityOptions, build_groups, records_from_raw};
pub use reaction::ReactionToggle;
pub use record::{ActivityKind, ActivityRecord, FieldChange, WorkItemChange};
pub use stream::{ActivityStream, Confirmed, EditId, StreamState, is_placeholder};
pub use trackline_config::model::SortOrder;
