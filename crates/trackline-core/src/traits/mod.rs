// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits implemented by the embedding application.
//!
//! The client core never renders anything itself. It reports outcomes
//! through these traits, which use `#[async_trait]` where the host may need
//! to await user interaction or I/O.

pub mod confirmation;
pub mod navigator;
pub mod notifier;
pub mod storage;

pub use confirmation::Confirmation;
pub use navigator::Navigator;
pub use notifier::Notifier;
pub use storage::LocalStorage;
