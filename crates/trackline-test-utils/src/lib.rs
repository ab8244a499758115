// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Trackline integration tests.
//!
//! Provides in-memory implementations of the host collaborator traits and a
//! harness that wires them to a mock HTTP server.
//!
//! # Components
//!
//! - [`MockNotifier`] - records every notification
//! - [`MockConfirmation`] - answers prompts with a fixed choice
//! - [`MockStorage`] - in-memory local storage with an online switch
//! - [`MockNavigator`] - counts re-authentication redirects
//! - [`MockRefresher`] - scripted token refresh outcomes
//! - [`TestHarness`] - action context over a [`wiremock::MockServer`]

pub mod harness;
pub mod mock_host;
pub mod mock_refresher;
pub mod mock_storage;

pub use harness::{TEST_TOKEN, TestHarness, TestHarnessBuilder, test_user};
pub use mock_host::{MockConfirmation, MockNavigator, MockNotifier, Notification};
pub use mock_refresher::MockRefresher;
pub use mock_storage::MockStorage;
