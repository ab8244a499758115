// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Navigation signals emitted by the transport.

/// Receives the re-authentication signal once a token refresh has failed.
pub trait Navigator: Send + Sync {
    /// Sends the user back to the login screen for `server_url`.
    fn redirect_to_login(&self, server_url: &str);
}
