// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-visible notifications.

use crate::error::TracklineError;

/// Shows short messages to the user (toasts, snackbars, status lines).
pub trait Notifier: Send + Sync {
    /// Shows an informational message, e.g. "Article published".
    fn notify(&self, message: &str);

    /// Shows a failure. Implementations derive the text from
    /// [`TracklineError::user_message`].
    fn notify_error(&self, error: &TracklineError);
}
