// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Input checks run before any request is made.

use thiserror::Error;

use trackline_api::WorkItem;
use trackline_core::TracklineError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    #[error("comment text is empty")]
    EmptyComment,

    #[error("{0} has no id")]
    MissingDraftId(&'static str),

    #[error("spent time must be greater than zero")]
    EmptyWorkDuration,
}

impl From<ValidationFailure> for TracklineError {
    fn from(failure: ValidationFailure) -> Self {
        TracklineError::Validation(failure.to_string())
    }
}

pub fn comment_text(text: &str) -> Result<&str, ValidationFailure> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(ValidationFailure::EmptyComment)
    } else {
        Ok(trimmed)
    }
}

pub fn draft_id<'a>(kind: &'static str, id: &'a str) -> Result<&'a str, ValidationFailure> {
    if id.trim().is_empty() {
        Err(ValidationFailure::MissingDraftId(kind))
    } else {
        Ok(id)
    }
}

pub fn work_item(item: &WorkItem) -> Result<(), ValidationFailure> {
    if item.duration.minutes == 0 {
        return Err(ValidationFailure::EmptyWorkDuration);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_comment_is_rejected() {
        assert_eq!(comment_text(" \n\t"), Err(ValidationFailure::EmptyComment));
        assert_eq!(comment_text("  ok "), Ok("ok"));
    }

    #[test]
    fn draft_without_id_is_rejected() {
        assert_eq!(
            draft_id("article draft", ""),
            Err(ValidationFailure::MissingDraftId("article draft"))
        );
        assert_eq!(
            TracklineError::from(ValidationFailure::MissingDraftId("article draft")).user_message(),
            "article draft has no id"
        );
    }

    #[test]
    fn zero_duration_is_rejected() {
        assert_eq!(work_item(&WorkItem::default()), Err(ValidationFailure::EmptyWorkDuration));
    }
}
