// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-flight token refresh.
//!
//! Every request remembers the credential generation it was sent with. The
//! first authorization failure for generation `g` starts one refresh; every
//! other request that failed on `g` awaits the same shared future. Requests
//! that failed on an older generation skip straight to a retry with the
//! current credential.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use thiserror::Error;
use tracing::{debug, info, warn};

use trackline_core::TracklineError;

use crate::credential::{Credential, CredentialStore};

/// Exchanges a credential for a fresh one.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, credential: &Credential) -> Result<Credential, TracklineError>;
}

/// Why a refresh episode failed. Cloned to every request that awaited it.
#[derive(Debug, Clone, Error)]
#[error("token refresh failed: {message}")]
pub struct RefreshFailure {
    pub message: String,
}

type RefreshFuture = Shared<BoxFuture<'static, Result<u64, RefreshFailure>>>;

#[derive(Default)]
struct RefreshState {
    /// Generation being refreshed and the future producing its successor.
    in_flight: Option<(u64, RefreshFuture)>,
    /// Last generation whose refresh failed.
    failed: Option<(u64, RefreshFailure)>,
}

/// Serializes token refreshes for one transport client.
#[derive(Clone)]
pub struct TokenRefreshCoordinator {
    store: Arc<CredentialStore>,
    refresher: Option<Arc<dyn TokenRefresher>>,
    state: Arc<Mutex<RefreshState>>,
}

impl TokenRefreshCoordinator {
    pub fn new(store: Arc<CredentialStore>, refresher: Option<Arc<dyn TokenRefresher>>) -> Self {
        Self {
            store,
            refresher,
            state: Arc::new(Mutex::new(RefreshState::default())),
        }
    }

    /// Whether a refresh is currently in flight.
    pub fn is_refreshing(&self) -> bool {
        self.lock().in_flight.is_some()
    }

    /// Ensures the credential that replaced `used_generation` is installed.
    ///
    /// Returns `Ok(())` when the caller should retry with the current
    /// credential, or the failure shared by the whole episode.
    pub async fn refresh_after(&self, used_generation: u64) -> Result<(), RefreshFailure> {
        let pending = {
            let mut state = self.lock();

            if self.store.generation() > used_generation {
                debug!(used_generation, "credential already replaced, retrying");
                return Ok(());
            }
            if let Some((generation, failure)) = &state.failed
                && *generation == used_generation
            {
                return Err(failure.clone());
            }
            match &state.in_flight {
                Some((generation, future)) if *generation == used_generation => {
                    debug!(used_generation, "joining in-flight token refresh");
                    future.clone()
                }
                _ => {
                    let future = self.start(used_generation);
                    state.in_flight = Some((used_generation, future.clone()));
                    future
                }
            }
        };

        pending.await.map(|_| ())
    }

    /// Spawns the refresh so it completes even when every waiting request
    /// is cancelled.
    fn start(&self, generation: u64) -> RefreshFuture {
        let store = Arc::clone(&self.store);
        let refresher = self.refresher.clone();
        let state = Arc::clone(&self.state);

        let task = tokio::spawn(async move {
            info!(generation, "refreshing access token");
            let snapshot = store.current();
            let result = match refresher {
                Some(refresher) => refresher
                    .refresh(&snapshot.credential)
                    .await
                    .map(|credential| store.replace(credential))
                    .map_err(|e| RefreshFailure {
                        message: e.to_string(),
                    }),
                None => Err(RefreshFailure {
                    message: "no token refresher configured".to_string(),
                }),
            };
            match &result {
                Ok(next) => info!(generation = *next, "access token refreshed"),
                Err(failure) => warn!(generation, error = %failure, "access token refresh failed"),
            }
            finish(&state, generation, result)
        });

        let state = Arc::clone(&self.state);
        task.map(move |joined| {
            joined.unwrap_or_else(|e| {
                let failure = RefreshFailure {
                    message: format!("token refresh task ended: {e}"),
                };
                finish(&state, generation, Err(failure))
            })
        })
        .boxed()
        .shared()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RefreshState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Records the outcome of the refresh for `generation`. A newer in-flight
/// refresh is left alone.
fn finish(
    state: &Mutex<RefreshState>,
    generation: u64,
    result: Result<u64, RefreshFailure>,
) -> Result<u64, RefreshFailure> {
    let mut guard = state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if guard
        .in_flight
        .as_ref()
        .is_some_and(|(in_flight, _)| *in_flight == generation)
    {
        guard.in_flight = None;
    }
    if let Err(failure) = &result {
        guard.failed = Some((generation, failure.clone()));
    }
    result
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    struct CountingRefresher {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl TokenRefresher for CountingRefresher {
        async fn refresh(&self, _credential: &Credential) -> Result<Credential, TracklineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            if self.fail {
                Err(TracklineError::http(400, r#"{"error": "invalid_grant"}"#))
            } else {
                Ok(Credential::permanent("fresh"))
            }
        }
    }

    fn coordinator(fail: bool) -> (TokenRefreshCoordinator, Arc<CountingRefresher>) {
        let refresher = Arc::new(CountingRefresher {
            calls: AtomicUsize::new(0),
            fail,
        });
        let store = Arc::new(CredentialStore::new(Credential::permanent("stale")));
        let coordinator = TokenRefreshCoordinator::new(store, Some(refresher.clone()));
        (coordinator, refresher)
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_refresh() {
        let (coordinator, refresher) = coordinator(false);

        let results = futures::future::join_all(
            (0..8).map(|_| {
                let c = coordinator.clone();
                async move { c.refresh_after(0).await }
            }),
        )
        .await;

        assert!(results.iter().all(Result::is_ok));
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(coordinator.store.generation(), 1);
        assert!(!coordinator.is_refreshing());
    }

    #[tokio::test]
    async fn stale_generation_skips_refresh() {
        let (coordinator, refresher) = coordinator(false);
        coordinator.refresh_after(0).await.unwrap();
        coordinator.refresh_after(0).await.unwrap();
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_episode_is_remembered() {
        let (coordinator, refresher) = coordinator(true);
        let first = coordinator.refresh_after(0).await.unwrap_err();
        let second = coordinator.refresh_after(0).await.unwrap_err();
        assert_eq!(first.message, second.message);
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_refresher_fails() {
        let store = Arc::new(CredentialStore::new(Credential::permanent("perm:x")));
        let coordinator = TokenRefreshCoordinator::new(store, None);
        assert!(coordinator.refresh_after(0).await.is_err());
    }

    #[tokio::test]
    async fn finishing_refresh_keeps_newer_in_flight_entry() {
        let (coordinator, _) = coordinator(false);
        let newer: RefreshFuture = futures::future::ready(Ok(2)).boxed().shared();
        coordinator.lock().in_flight = Some((1, newer));

        let result = finish(&coordinator.state, 0, Ok(1));

        assert_eq!(result.unwrap(), 1);
        assert!(coordinator.is_refreshing());
        assert_eq!(coordinator.lock().in_flight.as_ref().map(|(g, _)| *g), Some(1));
    }
}
