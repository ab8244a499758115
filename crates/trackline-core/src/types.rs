// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared between the transport, API, and action layers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Logical route a request belongs to, used for "last request wins"
/// cancellation of list-style queries.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum RouteTag {
    Issues,
    Articles,
    Activity,
}

/// Snapshot of the locally persisted cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageState {
    /// Last loaded issue list, kept for offline display.
    #[serde(default)]
    pub issues_cache: Vec<serde_json::Value>,

    /// Most recent search queries, newest first.
    #[serde(default)]
    pub last_queries: Vec<String>,

    /// Raw activity pages keyed by issue id.
    #[serde(default)]
    pub activity_cache: HashMap<String, serde_json::Value>,

    /// Whether the device currently reports network connectivity.
    #[serde(default = "default_online")]
    pub network_online: bool,
}

fn default_online() -> bool {
    true
}

/// Partial update flushed to local storage. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoragePatch {
    pub issues_cache: Option<Vec<serde_json::Value>>,
    pub last_queries: Option<Vec<String>>,
    /// `(issue id, raw activity page)`
    pub activity_page: Option<(String, serde_json::Value)>,
}

impl StoragePatch {
    /// Applies this patch to a storage snapshot.
    pub fn apply_to(self, state: &mut StorageState) {
        if let Some(issues) = self.issues_cache {
            state.issues_cache = issues;
        }
        if let Some(queries) = self.last_queries {
            state.last_queries = queries;
        }
        if let Some((issue_id, page)) = self.activity_page {
            state.activity_cache.insert(issue_id, page);
        }
    }
}
