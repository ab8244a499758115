// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock notifier, confirmation dialog and navigator.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use trackline_core::{Confirmation, Navigator, Notifier, TracklineError};

/// A notification shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Info(String),
    Error(String),
}

/// Records notifications instead of showing them.
#[derive(Debug, Default)]
pub struct MockNotifier {
    shown: Mutex<Vec<Notification>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every notification shown so far, oldest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|n| match n {
                Notification::Error(message) => Some(message.clone()),
                Notification::Info(_) => None,
            })
            .collect()
    }

    pub fn infos(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|n| match n {
                Notification::Info(message) => Some(message.clone()),
                Notification::Error(_) => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Notification>> {
        self.shown.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Notifier for MockNotifier {
    fn notify(&self, message: &str) {
        self.lock().push(Notification::Info(message.to_string()));
    }

    fn notify_error(&self, error: &TracklineError) {
        self.lock().push(Notification::Error(error.user_message()));
    }
}

/// Answers every prompt with the configured choice and records the titles.
#[derive(Debug)]
pub struct MockConfirmation {
    answer: AtomicBool,
    prompts: Mutex<Vec<(String, String)>>,
}

impl MockConfirmation {
    pub fn new(answer: bool) -> Self {
        Self {
            answer: AtomicBool::new(answer),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn set_answer(&self, answer: bool) {
        self.answer.store(answer, Ordering::SeqCst);
    }

    /// `(title, action label)` of every prompt shown.
    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl Default for MockConfirmation {
    fn default() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl Confirmation for MockConfirmation {
    async fn confirm(&self, title: &str, action_label: &str) -> bool {
        self.prompts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((title.to_string(), action_label.to_string()));
        self.answer.load(Ordering::SeqCst)
    }
}

/// Records re-authentication redirects.
#[derive(Debug, Default)]
pub struct MockNavigator {
    redirects: Mutex<Vec<String>>,
}

impl MockNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Server URLs passed to `redirect_to_login`.
    pub fn redirects(&self) -> Vec<String> {
        self.redirects
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for MockNavigator {
    fn redirect_to_login(&self, server_url: &str) {
        self.redirects
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(server_url.to_string());
    }
}
