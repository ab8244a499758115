// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so misspelled keys are
//! rejected at startup with a suggestion instead of being silently ignored.

use serde::{Deserialize, Serialize};

/// Top-level Trackline configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TracklineConfig {
    /// Backend server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Hub authorization settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Minimum server versions for version-gated endpoints.
    #[serde(default)]
    pub features: FeaturesConfig,

    /// Activity stream presentation.
    #[serde(default)]
    pub activity: ActivityConfig,

    /// Issue list and count polling.
    #[serde(default)]
    pub issues: IssuesConfig,

    /// Logging.
    #[serde(default)]
    pub log: LogConfig,
}

/// Backend server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Backend base URL, possibly with a context path (`https://host/youtrack`).
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Server version cached from the last login, e.g. `2023.1.10518`.
    /// When unset every version-gated call takes the legacy path.
    #[serde(default)]
    pub version: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// `User-Agent` header value.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Query strings longer than this are logged as a warning.
    #[serde(default = "default_max_query_length")]
    pub max_query_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            version: None,
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
            max_query_length: default_max_query_length(),
        }
    }
}

fn default_backend_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("trackline/{}", env!("CARGO_PKG_VERSION"))
}

fn default_max_query_length() -> usize {
    2048
}

/// Hub (OAuth) authorization configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Hub service URL. Defaults to `{backend_url}/hub` when unset.
    #[serde(default)]
    pub hub_url: Option<String>,

    /// OAuth client id used for refresh-token grants.
    #[serde(default)]
    pub client_id: Option<String>,

    /// OAuth client secret.
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Permanent token (`perm:...`). Also settable via `TRACKLINE_TOKEN`.
    #[serde(default)]
    pub permanent_token: Option<String>,
}

/// Minimum server versions for feature families, as `YYYY.N[.build]`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FeaturesConfig {
    /// `issuesGetter` endpoints (issue count).
    #[serde(default = "default_issues_getter")]
    pub issues_getter: String,

    /// Current API layout (drafts under `users/me`).
    #[serde(default = "default_actual_api")]
    pub actual_api: String,

    /// Activity categories introduced with the modern activity stream.
    #[serde(default = "default_modern_activities")]
    pub modern_activities: String,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            issues_getter: default_issues_getter(),
            actual_api: default_actual_api(),
            modern_activities: default_modern_activities(),
        }
    }
}

fn default_issues_getter() -> String {
    "2019.1".to_string()
}

fn default_actual_api() -> String {
    "2022.3".to_string()
}

fn default_modern_activities() -> String {
    "2020.6".to_string()
}

/// Display order of the activity stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    OldestFirst,
    NewestFirst,
}

/// Activity stream configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ActivityConfig {
    /// Maximum gap between consecutive records of one author to merge them.
    #[serde(default = "default_merge_window_secs")]
    pub merge_window_secs: u64,

    #[serde(default)]
    pub sort: SortOrder,

    /// Enabled sources: `comment`, `history`, `work_item`, `vcs`.
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,

    /// `$top` for the activities page request.
    #[serde(default = "default_activity_page_size")]
    pub page_size: usize,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            merge_window_secs: default_merge_window_secs(),
            sort: SortOrder::default(),
            sources: default_sources(),
            page_size: default_activity_page_size(),
        }
    }
}

/// Names accepted in `activity.sources`.
pub const ACTIVITY_SOURCES: [&str; 4] = ["comment", "history", "work_item", "vcs"];

fn default_merge_window_secs() -> u64 {
    60
}

fn default_sources() -> Vec<String> {
    ACTIVITY_SOURCES.iter().map(|s| s.to_string()).collect()
}

fn default_activity_page_size() -> usize {
    100
}

/// Issue list configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IssuesConfig {
    #[serde(default = "default_issues_page_size")]
    pub page_size: usize,

    /// Delay before re-polling a count the server reported as not ready.
    #[serde(default = "default_count_poll_delay_ms")]
    pub count_poll_delay_ms: u64,
}

impl Default for IssuesConfig {
    fn default() -> Self {
        Self {
            page_size: default_issues_page_size(),
            count_poll_delay_ms: default_count_poll_delay_ms(),
        }
    }
}

fn default_issues_page_size() -> usize {
    10
}

fn default_count_poll_delay_ms() -> u64 {
    3000
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_server_conventions() {
        let config = TracklineConfig::default();
        assert_eq!(config.server.max_query_length, 2048);
        assert_eq!(config.features.issues_getter, "2019.1");
        assert_eq!(config.features.actual_api, "2022.3");
        assert_eq!(config.activity.merge_window_secs, 60);
        assert_eq!(config.activity.sources.len(), 4);
        assert_eq!(config.issues.count_poll_delay_ms, 3000);
        assert!(config.server.version.is_none());
    }

    #[test]
    fn sort_order_uses_snake_case() {
        let config: TracklineConfig = toml::from_str(
            r#"
[activity]
sort = "newest_first"
"#,
        )
        .unwrap();
        assert_eq!(config.activity.sort, SortOrder::NewestFirst);
    }

    #[test]
    fn unknown_section_is_rejected() {
        let result = toml::from_str::<TracklineConfig>("[agent]\nname = \"x\"\n");
        assert!(result.is_err());
    }
}
