// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builds the client stack from the resolved configuration.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use tracing::{debug, warn};

use trackline_actions::{ActionContext, ActionSettings};
use trackline_api::{Api, ApiOptions, Feature, FeatureGate, ServerVersion, User};
use trackline_config::TracklineConfig;
use trackline_core::{LocalStorage, TracklineError};
use trackline_transport::{Credential, OAuthRefresher, TransportClient, TransportSettings};

use crate::host::{FileStorage, LoginNotice, PromptConfirmation, TerminalNotifier};

/// Environment variable consulted when `auth.permanent_token` is not set.
pub const TOKEN_ENV: &str = "TRACKLINE_TOKEN";
/// Refresh token used together with the configured hub client.
pub const REFRESH_TOKEN_ENV: &str = "TRACKLINE_REFRESH_TOKEN";

/// Feature gate for the configured server version and minimums.
pub fn feature_gate(config: &TracklineConfig) -> FeatureGate {
    let minimums = [
        (Feature::IssuesGetter, &config.features.issues_getter),
        (Feature::ActualApi, &config.features.actual_api),
        (Feature::ModernActivities, &config.features.modern_activities),
    ];
    minimums
        .into_iter()
        .fold(FeatureGate::new(config.server.version.as_deref()), |gate, (feature, raw)| {
            match raw.parse::<ServerVersion>() {
                Ok(minimum) => gate.with_minimum(feature, minimum),
                Err(e) => {
                    warn!(%feature, error = %e, "ignoring configured minimum version");
                    gate
                }
            }
        })
}

/// The access token from the config file, falling back to [`TOKEN_ENV`].
pub fn credential(config: &TracklineConfig, env_token: Option<String>) -> Result<Credential, TracklineError> {
    let token = config
        .auth
        .permanent_token
        .clone()
        .or(env_token)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| {
            TracklineError::Config(format!(
                "no access token: set auth.permanent_token or {TOKEN_ENV}"
            ))
        })?;
    Ok(Credential::permanent(token))
}

fn transport(config: &TracklineConfig) -> Result<TransportClient, TracklineError> {
    let mut credential = credential(config, std::env::var(TOKEN_ENV).ok())?;

    let auth = &config.auth;
    let refresher = match (
        auth.hub_url.as_deref(),
        auth.client_id.as_deref(),
        auth.client_secret.as_deref(),
        std::env::var(REFRESH_TOKEN_ENV),
    ) {
        (Some(hub), Some(client_id), Some(secret), Ok(refresh_token)) => {
            debug!(hub, "token refresh enabled");
            credential = credential.with_refresh_token(refresh_token);
            Some(OAuthRefresher::new(hub, client_id, SecretString::from(secret.to_string()))?)
        }
        _ => None,
    };

    let mut settings = TransportSettings::new(&config.server.backend_url);
    settings.user_agent = config.server.user_agent.clone();
    let mut builder = TransportClient::builder(settings, credential)
        .timeout(Duration::from_secs(config.server.request_timeout_secs))
        .max_query_length(config.server.max_query_length)
        .navigator(Arc::new(LoginNotice));
    if let Some(refresher) = refresher {
        builder = builder.refresher(Arc::new(refresher));
    }
    builder.build()
}

/// Wires the API and the terminal collaborators into an action context.
pub fn action_context(config: &TracklineConfig) -> Result<Arc<ActionContext>, TracklineError> {
    let api = Api::new(transport(config)?, feature_gate(config), ApiOptions {
        activity_page_size: config.activity.page_size,
    });
    let storage: Arc<dyn LocalStorage> = match FileStorage::default_path() {
        Some(path) => Arc::new(FileStorage::new(path)),
        None => {
            return Err(TracklineError::Config(
                "no cache directory available for local storage".to_string(),
            ));
        }
    };
    Ok(Arc::new(ActionContext {
        api: Arc::new(api),
        notifier: Arc::new(TerminalNotifier),
        confirmation: Arc::new(PromptConfirmation),
        storage,
        current_user: User::default(),
        settings: ActionSettings::from_config(config),
    }))
}
