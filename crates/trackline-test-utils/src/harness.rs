// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end action testing.
//!
//! `TestHarness` assembles an [`ActionContext`] whose API talks to a
//! [`MockServer`] and whose host collaborators are the in-memory mocks of
//! this crate.

use std::sync::Arc;
use std::time::Duration;

use wiremock::MockServer;

use trackline_actions::{ActionContext, ActionSettings};
use trackline_activity::{ActivityOptions, ActivityStream};
use trackline_api::{Api, ApiOptions, FeatureGate, User};
use trackline_core::{StorageState, TracklineError};
use trackline_transport::{Credential, TokenRefresher, TransportClient, TransportSettings};

use crate::mock_host::{MockConfirmation, MockNavigator, MockNotifier};
use crate::mock_storage::MockStorage;

/// Access token the harness client starts with.
pub const TEST_TOKEN: &str = "perm:test";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    server_version: Option<String>,
    confirm: bool,
    storage: StorageState,
    count_poll_delay: Duration,
    refresher: Option<Arc<dyn TokenRefresher>>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            server_version: Some("2023.1".to_string()),
            confirm: true,
            storage: StorageState::default(),
            count_poll_delay: Duration::from_millis(3000),
            refresher: None,
        }
    }

    /// Server version used for feature gating. `None` means unknown.
    pub fn server_version(mut self, version: Option<&str>) -> Self {
        self.server_version = version.map(str::to_string);
        self
    }

    /// Answer given to every confirmation prompt.
    pub fn confirm(mut self, answer: bool) -> Self {
        self.confirm = answer;
        self
    }

    pub fn storage(mut self, state: StorageState) -> Self {
        self.storage = state;
        self
    }

    pub fn count_poll_delay(mut self, delay: Duration) -> Self {
        self.count_poll_delay = delay;
        self
    }

    pub fn refresher(mut self, refresher: Arc<dyn TokenRefresher>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    /// Starts the mock server and builds the context.
    pub async fn build(self) -> Result<TestHarness, TracklineError> {
        let server = MockServer::start().await;
        let navigator = Arc::new(MockNavigator::new());

        let mut transport = TransportClient::builder(
            TransportSettings::new(server.uri()),
            Credential::permanent(TEST_TOKEN),
        )
        .navigator(navigator.clone());
        if let Some(refresher) = self.refresher {
            transport = transport.refresher(refresher);
        }
        let api = Api::new(
            transport.build()?,
            FeatureGate::new(self.server_version.as_deref()),
            ApiOptions::default(),
        );

        let notifier = Arc::new(MockNotifier::new());
        let confirmation = Arc::new(MockConfirmation::new(self.confirm));
        let storage = Arc::new(MockStorage::with_state(self.storage));

        let ctx = Arc::new(ActionContext {
            api: Arc::new(api),
            notifier: notifier.clone(),
            confirmation: confirmation.clone(),
            storage: storage.clone(),
            current_user: test_user(),
            settings: ActionSettings {
                count_poll_delay: self.count_poll_delay,
                ..ActionSettings::default()
            },
        });

        Ok(TestHarness {
            server,
            ctx,
            notifier,
            confirmation,
            storage,
            navigator,
        })
    }
}

/// A complete action environment backed by a mock HTTP server.
pub struct TestHarness {
    pub server: MockServer,
    pub ctx: Arc<ActionContext>,
    pub notifier: Arc<MockNotifier>,
    pub confirmation: Arc<MockConfirmation>,
    pub storage: Arc<MockStorage>,
    pub navigator: Arc<MockNavigator>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with default settings.
    pub async fn new() -> Result<Self, TracklineError> {
        Self::builder().build().await
    }

    pub fn api(&self) -> &Api {
        &self.ctx.api
    }

    /// An activity stream already loaded with `page`.
    pub fn loaded_stream(&self, page: serde_json::Value) -> Result<ActivityStream, TracklineError> {
        let raw = serde_json::from_value(page).map_err(|e| TracklineError::Decode {
            message: format!("invalid activity fixture: {e}"),
            source: Some(Box::new(e)),
        })?;
        let mut stream = ActivityStream::new(ActivityOptions::default());
        stream.begin_load()?;
        stream.finish_load(raw)?;
        Ok(stream)
    }
}

/// The signed-in user of every harness.
pub fn test_user() -> User {
    User {
        id: "1-1".to_string(),
        login: Some("tester".to_string()),
        full_name: Some("Test User".to_string()),
        ..User::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn harness_points_api_at_mock_server() {
        let harness = TestHarness::new().await.unwrap();
        assert_eq!(harness.api().context().backend_url(), harness.server.uri());
        assert_eq!(harness.ctx.current_user.id, "1-1");
        assert!(harness.notifier.notifications().is_empty());
    }
}
