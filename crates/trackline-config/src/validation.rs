// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks applied after deserialization.
//!
//! All problems are collected; validation never stops at the first one.

use crate::diagnostic::ConfigError;
use crate::model::{ACTIVITY_SOURCES, TracklineConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validates a deserialized configuration.
pub fn validate_config(config: &TracklineConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    check_url(&mut errors, "server.backend_url", &config.server.backend_url);
    if let Some(hub) = &config.auth.hub_url {
        check_url(&mut errors, "auth.hub_url", hub);
    }

    if let Some(version) = &config.server.version
        && !is_version(version)
    {
        errors.push(ConfigError::invalid(
            "server.version",
            format!("`{version}` is not of the form YYYY.N[.build]"),
        ));
    }
    for (key, version) in [
        ("features.issues_getter", &config.features.issues_getter),
        ("features.actual_api", &config.features.actual_api),
        ("features.modern_activities", &config.features.modern_activities),
    ] {
        if !is_version(version) {
            errors.push(ConfigError::invalid(
                key,
                format!("`{version}` is not of the form YYYY.N[.build]"),
            ));
        }
    }

    if config.server.request_timeout_secs == 0 {
        errors.push(ConfigError::invalid(
            "server.request_timeout_secs",
            "must be greater than zero",
        ));
    }
    if config.activity.merge_window_secs == 0 {
        errors.push(ConfigError::invalid(
            "activity.merge_window_secs",
            "must be greater than zero",
        ));
    }
    if config.activity.page_size == 0 {
        errors.push(ConfigError::invalid(
            "activity.page_size",
            "must be greater than zero",
        ));
    }
    if config.issues.page_size == 0 {
        errors.push(ConfigError::invalid(
            "issues.page_size",
            "must be greater than zero",
        ));
    }
    if config.issues.count_poll_delay_ms == 0 {
        errors.push(ConfigError::invalid(
            "issues.count_poll_delay_ms",
            "must be greater than zero",
        ));
    }

    for source in &config.activity.sources {
        if !ACTIVITY_SOURCES.contains(&source.as_str()) {
            errors.push(ConfigError::invalid(
                "activity.sources",
                format!(
                    "unknown source `{source}`, expected one of {}",
                    ACTIVITY_SOURCES.join(", ")
                ),
            ));
        }
    }

    if !LOG_LEVELS.contains(&config.log.level.as_str()) {
        errors.push(ConfigError::invalid(
            "log.level",
            format!("`{}` is not one of {}", config.log.level, LOG_LEVELS.join(", ")),
        ));
    }

    if config.auth.client_id.is_some() != config.auth.client_secret.is_some() {
        errors.push(ConfigError::invalid(
            "auth.client_secret",
            "client_id and client_secret must be set together",
        ));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn check_url(errors: &mut Vec<ConfigError>, key: &str, value: &str) {
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => {}
        Ok(parsed) => errors.push(ConfigError::invalid(
            key,
            format!("`{value}` must be an http(s) URL with a host, got scheme `{}`", parsed.scheme()),
        )),
        Err(e) => errors.push(ConfigError::invalid(key, format!("`{value}`: {e}"))),
    }
}

/// `YYYY.N` or `YYYY.N.build`, all numeric.
fn is_version(value: &str) -> bool {
    let parts: Vec<&str> = value.trim().split('.').collect();
    (2..=3).contains(&parts.len())
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(errors: &[ConfigError]) -> Vec<String> {
        errors
            .iter()
            .filter_map(|e| match e {
                ConfigError::Validation { key, .. } => Some(key.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&TracklineConfig::default()).is_ok());
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = TracklineConfig::default();
        config.server.backend_url = "not a url".into();
        config.activity.merge_window_secs = 0;
        config.features.actual_api = "latest".into();

        let errors = validate_config(&config).unwrap_err();
        let keys = keys(&errors);
        assert_eq!(errors.len(), 3);
        assert!(keys.contains(&"server.backend_url".to_string()));
        assert!(keys.contains(&"activity.merge_window_secs".to_string()));
        assert!(keys.contains(&"features.actual_api".to_string()));
    }

    #[test]
    fn version_format() {
        assert!(is_version("2020.6"));
        assert!(is_version("2023.1.10518"));
        assert!(!is_version("2023"));
        assert!(!is_version("2023.x"));
        assert!(!is_version("2023.1.2.3"));
    }

    #[test]
    fn non_http_backend_is_rejected() {
        let mut config = TracklineConfig::default();
        config.server.backend_url = "ftp://example.com".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(keys(&errors), vec!["server.backend_url".to_string()]);
    }

    #[test]
    fn unknown_activity_source_is_rejected() {
        let mut config = TracklineConfig::default();
        config.activity.sources.push("commits".into());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn client_credentials_come_in_pairs() {
        let mut config = TracklineConfig::default();
        config.auth.client_id = Some("0-0-0-0-0".into());
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(keys(&errors), vec!["auth.client_secret".to_string()]);
    }
}
