// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use thiserror::Error;

use trackline_core::TracklineError;

use crate::stream::{EditId, StreamState};

/// Misuse of the activity stream state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActivityError {
    #[error("activity stream is {state}, expected loaded")]
    NotLoaded { state: StreamState },

    #[error("another edit is awaiting confirmation")]
    EditPending,

    #[error("no pending edit {0}")]
    UnknownEdit(EditId),

    #[error("{what} {id} is not in the stream")]
    NotFound { what: &'static str, id: String },

    #[error("cannot move from {from} to {to}")]
    InvalidTransition { from: StreamState, to: StreamState },
}

impl From<ActivityError> for TracklineError {
    fn from(err: ActivityError) -> Self {
        TracklineError::Internal(err.to_string())
    }
}
