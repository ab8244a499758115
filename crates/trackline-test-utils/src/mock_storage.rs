// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory local storage.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use trackline_core::{LocalStorage, StoragePatch, StorageState, TracklineError};

/// Keeps the storage snapshot in memory and applies flushed patches to it.
#[derive(Debug, Default)]
pub struct MockStorage {
    state: Mutex<StorageState>,
    flushes: AtomicUsize,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: StorageState) -> Self {
        Self {
            state: Mutex::new(state),
            flushes: AtomicUsize::new(0),
        }
    }

    pub async fn snapshot(&self) -> StorageState {
        self.state.lock().await.clone()
    }

    pub async fn set_online(&self, online: bool) {
        self.state.lock().await.network_online = online;
    }

    /// Caches a raw activity page for `entity_id`.
    pub async fn cache_activity(&self, entity_id: &str, page: serde_json::Value) {
        self.state
            .lock()
            .await
            .activity_cache
            .insert(entity_id.to_string(), page);
    }

    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocalStorage for MockStorage {
    async fn load(&self) -> Result<StorageState, TracklineError> {
        Ok(self.state.lock().await.clone())
    }

    async fn flush(&self, patch: StoragePatch) -> Result<(), TracklineError> {
        patch.apply_to(&mut *self.state.lock().await);
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
