// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport behavior against a mock server.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use trackline_core::{Navigator, RouteTag, TracklineError};
use trackline_transport::{
    Credential, RequestDescriptor, TokenRefresher, TransportClient, TransportSettings,
};

struct StaticRefresher {
    calls: AtomicUsize,
    token: Option<&'static str>,
}

impl StaticRefresher {
    fn succeeding(token: &'static str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            token: Some(token),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            token: None,
        })
    }
}

#[async_trait]
impl TokenRefresher for StaticRefresher {
    async fn refresh(&self, _credential: &Credential) -> Result<Credential, TracklineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        match self.token {
            Some(token) => Ok(Credential::new(token, "Bearer")),
            None => Err(TracklineError::http(400, r#"{"error": "invalid_grant"}"#)),
        }
    }
}

#[derive(Default)]
struct RecordingNavigator {
    redirects: AtomicUsize,
}

impl Navigator for RecordingNavigator {
    fn redirect_to_login(&self, _server_url: &str) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}

fn client(server: &MockServer, refresher: Arc<StaticRefresher>) -> TransportClient {
    TransportClient::builder(
        TransportSettings::new(server.uri()),
        Credential::new("stale", "Bearer"),
    )
    .refresher(refresher)
    .build()
    .unwrap()
}

async fn mount_protected(server: &MockServer, route: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Token expired"
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"foo": "bar"})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn retries_transparently_after_refresh() {
    let server = MockServer::start().await;
    mount_protected(&server, "/api/protected").await;
    let refresher = StaticRefresher::succeeding("fresh");
    let client = client(&server, refresher.clone());

    let body = client
        .get(format!("{}/api/protected", server.uri()))
        .await
        .unwrap();

    assert_eq!(body, json!({"foo": "bar"}));
    assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
    assert_eq!(client.credential_generation(), 1);
}

#[tokio::test]
async fn concurrent_401s_share_one_refresh() {
    let server = MockServer::start().await;
    mount_protected(&server, "/api/protected").await;
    let refresher = StaticRefresher::succeeding("fresh");
    let client = client(&server, refresher.clone());

    let url = format!("{}/api/protected", server.uri());
    let handles: Vec<_> = (0..6)
        .map(|_| {
            let client = client.clone();
            let url = url.clone();
            tokio::spawn(async move { client.get(url).await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), json!({"foo": "bar"}));
    }
    assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
    assert!(!client.is_refreshing());
}

#[tokio::test]
async fn failed_refresh_redirects_once_and_reports_auth_expired() {
    let server = MockServer::start().await;
    mount_protected(&server, "/api/protected").await;
    let refresher = StaticRefresher::failing();
    let navigator = Arc::new(RecordingNavigator::default());
    let client = TransportClient::builder(
        TransportSettings::new(server.uri()),
        Credential::new("stale", "Bearer"),
    )
    .refresher(refresher.clone())
    .navigator(navigator.clone())
    .build()
    .unwrap();

    let url = format!("{}/api/protected", server.uri());
    let results = futures::future::join_all((0..4).map(|_| client.get(url.clone()))).await;

    for result in results {
        match result {
            Err(TracklineError::AuthExpired {
                status, message, ..
            }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Token expired");
            }
            other => panic!("expected AuthExpired, got {other:?}"),
        }
    }
    assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
    assert_eq!(navigator.redirects.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn second_401_after_refresh_is_not_retried_again() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/locked"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;
    let refresher = StaticRefresher::succeeding("fresh");
    let client = client(&server, refresher.clone());

    let err = client
        .get(format!("{}/api/locked", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(matches!(err, TracklineError::Http { .. }));
    assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn non_401_errors_carry_status_body_and_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/issues/missing"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"error": "Not Found", "error_description": "Entity not found"})),
        )
        .mount(&server)
        .await;
    let refresher = StaticRefresher::succeeding("fresh");
    let client = client(&server, refresher.clone());

    let err = client
        .get(format!("{}/api/issues/missing", server.uri()))
        .await
        .unwrap_err();
    match err {
        TracklineError::Http {
            status,
            message,
            body,
            text,
        } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Entity not found");
            assert!(body.is_some());
            assert!(text.contains("Entity not found"));
        }
        other => panic!("expected Http, got {other:?}"),
    }
    assert_eq!(refresher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn sends_headers_and_default_top() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/issues"))
        .and(header("authorization", "Bearer stale"))
        .and(header("accept", "application/json, text/plain, */*"))
        .and(query_param("$top", "-1"))
        .and(query_param("fields", "id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    let client = client(&server, StaticRefresher::failing());

    let body = client
        .get(format!("{}/api/issues?fields=id", server.uri()))
        .await
        .unwrap();
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn cancel_route_drops_stale_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/issues"))
        .and(query_param("query", "old"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": "old"}]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/issues"))
        .and(query_param("query", "new"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": "new"}]))
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&server)
        .await;
    let client = client(&server, StaticRefresher::failing());

    let first = {
        let client = client.clone();
        let url = format!("{}/api/issues?query=old", server.uri());
        tokio::spawn(async move {
            client
                .request(RequestDescriptor::get(url).with_route(RouteTag::Issues))
                .await
        })
    };
    while client.pending(RouteTag::Issues) == 0 {
        tokio::task::yield_now().await;
    }

    assert_eq!(client.cancel_route(RouteTag::Issues), 1);
    let second = {
        let client = client.clone();
        let url = format!("{}/api/issues?query=new", server.uri());
        tokio::spawn(async move {
            client
                .request(RequestDescriptor::get(url).with_route(RouteTag::Issues))
                .await
        })
    };

    let stale = first.await.unwrap().unwrap_err();
    assert!(stale.is_cancelled());
    while client.pending(RouteTag::Issues) == 0 {
        tokio::task::yield_now().await;
    }
    assert_eq!(client.pending(RouteTag::Issues), 1);

    let fresh = second.await.unwrap().unwrap();
    assert_eq!(fresh, json!([{"id": "new"}]));
    assert_eq!(client.pending(RouteTag::Issues), 0);
}

#[tokio::test]
async fn refresh_completes_after_waiting_request_is_cancelled() {
    let server = MockServer::start().await;
    mount_protected(&server, "/api/issues").await;
    let refresher = StaticRefresher::succeeding("fresh");
    let client = client(&server, refresher.clone());

    let waiting = {
        let client = client.clone();
        let url = format!("{}/api/issues", server.uri());
        tokio::spawn(async move {
            client
                .request(RequestDescriptor::get(url).with_route(RouteTag::Issues))
                .await
        })
    };
    tokio::time::timeout(Duration::from_secs(5), async {
        while !client.is_refreshing() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();

    assert_eq!(client.cancel_route(RouteTag::Issues), 1);
    assert!(waiting.await.unwrap().unwrap_err().is_cancelled());

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(!client.is_refreshing());
    assert_eq!(client.credential_generation(), 1);
    assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);

    let body = client
        .get(format!("{}/api/issues", server.uri()))
        .await
        .unwrap();
    assert_eq!(body, json!({"foo": "bar"}));
    assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
}
