// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local persisted cache.

use async_trait::async_trait;

use crate::error::TracklineError;
use crate::types::{StoragePatch, StorageState};

/// Key/value cache used for offline display and recent queries.
#[async_trait]
pub trait LocalStorage: Send + Sync {
    /// Loads the current snapshot.
    async fn load(&self) -> Result<StorageState, TracklineError>;

    /// Persists a partial update.
    async fn flush(&self, patch: StoragePatch) -> Result<(), TracklineError>;
}
