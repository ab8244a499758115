// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal implementations of the host collaborators.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

use trackline_core::{
    Confirmation, LocalStorage, Navigator, Notifier, StoragePatch, StorageState, TracklineError,
};

/// Prints notifications to stderr.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, message: &str) {
        eprintln!("{message}");
    }

    fn notify_error(&self, error: &TracklineError) {
        eprintln!("error: {}", error.user_message());
    }
}

/// Asks `[y/N]` on the terminal. Anything but `y`/`yes` declines.
pub struct PromptConfirmation;

#[async_trait]
impl Confirmation for PromptConfirmation {
    async fn confirm(&self, title: &str, action_label: &str) -> bool {
        let mut stderr = tokio::io::stderr();
        let prompt = format!("{title} {action_label} [y/N] ");
        if stderr.write_all(prompt.as_bytes()).await.is_err() {
            return false;
        }
        let _ = stderr.flush().await;

        let mut answer = String::new();
        match BufReader::new(tokio::io::stdin()).read_line(&mut answer).await {
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(e) => {
                warn!(error = %e, "cannot read confirmation");
                false
            }
        }
    }
}

/// Tells the user to sign in again.
pub struct LoginNotice;

impl Navigator for LoginNotice {
    fn redirect_to_login(&self, server_url: &str) {
        eprintln!("session expired: sign in to {server_url} again and update your token");
    }
}

/// Storage snapshot kept as one JSON file in the user cache directory.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `<cache dir>/trackline/storage.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::cache_dir().map(|d| d.join("trackline").join("storage.json"))
    }
}

fn storage_error(e: impl std::error::Error + Send + Sync + 'static) -> TracklineError {
    TracklineError::Storage {
        source: Box::new(e),
    }
}

#[async_trait]
impl LocalStorage for FileStorage {
    async fn load(&self) -> Result<StorageState, TracklineError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(storage_error),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no local storage yet");
                Ok(StorageState::default())
            }
            Err(e) => Err(storage_error(e)),
        }
    }

    async fn flush(&self, patch: StoragePatch) -> Result<(), TracklineError> {
        let mut state = self.load().await?;
        patch.apply_to(&mut state);
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await.map_err(storage_error)?;
        }
        let bytes = serde_json::to_vec(&state).map_err(storage_error)?;
        tokio::fs::write(&self.path, bytes).await.map_err(storage_error)
    }
}
