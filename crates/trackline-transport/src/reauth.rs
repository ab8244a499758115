// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Once-per-episode re-authentication signal.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use trackline_core::Navigator;

/// Fires [`Navigator::redirect_to_login`] at most once until the next
/// successful response resets it.
pub(crate) struct ReauthLatch {
    navigator: Option<Arc<dyn Navigator>>,
    server_url: String,
    fired: AtomicBool,
}

impl ReauthLatch {
    pub(crate) fn new(navigator: Option<Arc<dyn Navigator>>, server_url: String) -> Self {
        Self {
            navigator,
            server_url,
            fired: AtomicBool::new(false),
        }
    }

    pub(crate) fn fire(&self) {
        if self.fired.swap(true, Ordering::SeqCst) {
            debug!("re-authentication already requested");
            return;
        }
        warn!(server = %self.server_url, "re-authentication required");
        if let Some(navigator) = &self.navigator {
            navigator.redirect_to_login(&self.server_url);
        }
    }

    pub(crate) fn reset(&self) {
        self.fired.store(false, Ordering::SeqCst);
    }
}
