// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Everything an action needs, passed explicitly.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use trackline_api::{Api, User};
use trackline_config::TracklineConfig;
use trackline_core::{Confirmation, LocalStorage, Notifier, TracklineError};

/// Number of recent search queries kept in local storage.
pub const MAX_STORED_QUERIES: usize = 10;

#[derive(Debug, Clone)]
pub struct ActionSettings {
    /// Wait before re-polling a count the server is still computing.
    pub count_poll_delay: Duration,
    pub issues_page_size: i64,
    pub max_stored_queries: usize,
}

impl Default for ActionSettings {
    fn default() -> Self {
        Self {
            count_poll_delay: Duration::from_millis(3000),
            issues_page_size: 10,
            max_stored_queries: MAX_STORED_QUERIES,
        }
    }
}

impl ActionSettings {
    pub fn from_config(config: &TracklineConfig) -> Self {
        Self {
            count_poll_delay: Duration::from_millis(config.issues.count_poll_delay_ms),
            issues_page_size: i64::try_from(config.issues.page_size).unwrap_or(i64::MAX),
            max_stored_queries: MAX_STORED_QUERIES,
        }
    }
}

/// The API plus the host collaborators.
pub struct ActionContext {
    pub api: Arc<Api>,
    pub notifier: Arc<dyn Notifier>,
    pub confirmation: Arc<dyn Confirmation>,
    pub storage: Arc<dyn LocalStorage>,
    pub current_user: User,
    pub settings: ActionSettings,
}

impl ActionContext {
    /// Reports a failed action: logged, and notified unless it was a
    /// route cancellation.
    pub fn report(&self, action: &str, err: &TracklineError) {
        if err.is_cancelled() {
            debug!(action, "action superseded by a newer request");
            return;
        }
        warn!(action, error = %err, "action failed");
        self.notifier.notify_error(err);
    }

    /// Asks the user and logs a decline.
    pub async fn confirm(&self, title: &str, action_label: &str) -> bool {
        let confirmed = self.confirmation.confirm(title, action_label).await;
        if !confirmed {
            debug!(title, "user declined");
        }
        confirmed
    }
}
