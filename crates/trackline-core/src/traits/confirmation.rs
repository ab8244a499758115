// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Confirmation prompts for destructive actions.

use async_trait::async_trait;

/// Asks the user to confirm a destructive action.
#[async_trait]
pub trait Confirmation: Send + Sync {
    /// Returns `true` when the user accepted, `false` when they dismissed
    /// the prompt. Dismissal is not an error.
    async fn confirm(&self, title: &str, action_label: &str) -> bool;
}
