// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Merge order (later overrides earlier):
//! 1. Compiled defaults
//! 2. `/etc/trackline/trackline.toml`
//! 3. `~/.config/trackline/trackline.toml`
//! 4. `./trackline.toml`
//! 5. `TRACKLINE_*` environment variables

#![allow(clippy::result_large_err)]

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::TracklineConfig;

pub(crate) const SYSTEM_CONFIG: &str = "/etc/trackline/trackline.toml";
pub(crate) const LOCAL_CONFIG: &str = "trackline.toml";

/// Config sections that environment variables may address.
const SECTIONS: [&str; 6] = ["server", "auth", "features", "activity", "issues", "log"];

pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("trackline").join(LOCAL_CONFIG))
}

/// Loads configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<TracklineConfig, figment::Error> {
    build_figment().extract()
}

/// Loads configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<TracklineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TracklineConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Loads configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TracklineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TracklineConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Builds the full layered Figment without extracting it.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(TracklineConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Maps `TRACKLINE_<SECTION>_<KEY>` to `<section>.<key>`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `TRACKLINE_SERVER_BACKEND_URL` maps to `server.backend_url`. Variables
/// outside the known sections, such as `TRACKLINE_TOKEN`, are not config keys.
fn env_provider() -> Env {
    Env::prefixed("TRACKLINE_")
        .filter(|key| section_key(key.as_str()).is_some())
        .map(|key| {
            section_key(key.as_str())
                .unwrap_or_else(|| key.as_str().to_ascii_lowercase())
                .into()
        })
}

/// `server_backend_url` -> `server.backend_url`, in any letter case.
fn section_key(key: &str) -> Option<String> {
    let key = key.to_ascii_lowercase();
    SECTIONS.iter().find_map(|section| {
        key.strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
            .filter(|rest| !rest.is_empty())
            .map(|rest| format!("{section}.{rest}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_map_to_sections() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("TRACKLINE_SERVER_BACKEND_URL", "https://yt.example.com/youtrack");
            jail.set_env("TRACKLINE_ACTIVITY_MERGE_WINDOW_SECS", "120");
            jail.set_env("TRACKLINE_AUTH_PERMANENT_TOKEN", "perm:abc");

            let config: TracklineConfig = Figment::new()
                .merge(Serialized::defaults(TracklineConfig::default()))
                .merge(env_provider())
                .extract()?;

            assert_eq!(config.server.backend_url, "https://yt.example.com/youtrack");
            assert_eq!(config.activity.merge_window_secs, 120);
            assert_eq!(config.auth.permanent_token.as_deref(), Some("perm:abc"));
            Ok(())
        });
    }

    #[test]
    fn non_section_variables_are_ignored() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("TRACKLINE_TOKEN", "perm:abc");
            let config: TracklineConfig = Figment::new()
                .merge(Serialized::defaults(TracklineConfig::default()))
                .merge(env_provider())
                .extract()?;
            assert!(config.auth.permanent_token.is_none());
            Ok(())
        });
    }

    #[test]
    fn local_file_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                LOCAL_CONFIG,
                r#"
[issues]
page_size = 25
"#,
            )?;
            let config: TracklineConfig = Figment::new()
                .merge(Serialized::defaults(TracklineConfig::default()))
                .merge(Toml::file(LOCAL_CONFIG))
                .extract()?;
            assert_eq!(config.issues.page_size, 25);
            assert_eq!(config.issues.count_poll_delay_ms, 3000);
            Ok(())
        });
    }
}
