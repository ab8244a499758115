// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Trackline client.
//!
//! This crate provides the error taxonomy, the collaborator traits the
//! client core calls out to (notifications, confirmation prompts, local
//! storage, login navigation), and the small set of types shared by every
//! other crate in the workspace.

pub mod error;
pub mod traits;
pub mod types;

pub use error::TracklineError;
pub use types::{RouteTag, StoragePatch, StorageState};

pub use traits::{Confirmation, LocalStorage, Navigator, Notifier};
