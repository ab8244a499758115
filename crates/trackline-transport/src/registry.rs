// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Route-tagged cancellation bookkeeping.
//!
//! Each request started with a route tag registers a [`CancellationToken`]
//! and holds a [`PendingGuard`]; dropping the guard deregisters it. All
//! mutations happen under one mutex so a start and a settle for the same
//! tag can never lose each other's update.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;
use tracing::debug;

use trackline_core::RouteTag;

#[derive(Default)]
struct Inner {
    routes: Mutex<HashMap<RouteTag, HashMap<u64, CancellationToken>>>,
    next_id: AtomicU64,
}

/// Shared map of `route tag -> pending request handles`.
#[derive(Clone, Default)]
pub struct PendingRequestRegistry {
    inner: Arc<Inner>,
}

impl PendingRequestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new pending request for `route`.
    pub fn register(&self, route: RouteTag) -> PendingGuard {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        self.routes()
            .entry(route)
            .or_default()
            .insert(id, token.clone());
        PendingGuard {
            registry: self.clone(),
            route,
            id,
            token,
        }
    }

    /// Cancels every pending request for `route` and clears its entry.
    /// Returns how many were cancelled.
    pub fn cancel_route(&self, route: RouteTag) -> usize {
        let removed = self.routes().remove(&route).unwrap_or_default();
        for token in removed.values() {
            token.cancel();
        }
        if !removed.is_empty() {
            debug!(%route, cancelled = removed.len(), "cancelled pending requests");
        }
        removed.len()
    }

    /// Number of requests currently registered for `route`.
    pub fn pending(&self, route: RouteTag) -> usize {
        self.routes().get(&route).map_or(0, HashMap::len)
    }

    fn deregister(&self, route: RouteTag, id: u64) {
        let mut routes = self.routes();
        if let Some(handles) = routes.get_mut(&route) {
            handles.remove(&id);
            if handles.is_empty() {
                routes.remove(&route);
            }
        }
    }

    fn routes(&self) -> std::sync::MutexGuard<'_, HashMap<RouteTag, HashMap<u64, CancellationToken>>> {
        self.inner
            .routes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Registration handle for one pending request.
pub struct PendingGuard {
    registry: PendingRequestRegistry,
    route: RouteTag,
    id: u64,
    token: CancellationToken,
}

impl PendingGuard {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn route(&self) -> RouteTag {
        self.route
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.registry.deregister(self.route, self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_deregisters_on_drop() {
        let registry = PendingRequestRegistry::new();
        let guard = registry.register(RouteTag::Issues);
        assert_eq!(registry.pending(RouteTag::Issues), 1);
        drop(guard);
        assert_eq!(registry.pending(RouteTag::Issues), 0);
    }

    #[test]
    fn cancel_route_only_touches_its_tag() {
        let registry = PendingRequestRegistry::new();
        let issues = registry.register(RouteTag::Issues);
        let articles = registry.register(RouteTag::Articles);

        assert_eq!(registry.cancel_route(RouteTag::Issues), 1);
        assert!(issues.token().is_cancelled());
        assert!(!articles.token().is_cancelled());
        assert_eq!(registry.pending(RouteTag::Issues), 0);
        assert_eq!(registry.pending(RouteTag::Articles), 1);
    }

    #[test]
    fn cancelled_guard_drop_keeps_newer_registration() {
        let registry = PendingRequestRegistry::new();
        let a = registry.register(RouteTag::Issues);
        registry.cancel_route(RouteTag::Issues);
        let b = registry.register(RouteTag::Issues);

        drop(a);
        assert_eq!(registry.pending(RouteTag::Issues), 1);
        assert!(!b.token().is_cancelled());
    }
}
