//! Integration tests for the proxy routes.
//!
//! Each test starts a wiremock backend, serves the proxy on an ephemeral
//! port in front of it and talks to the proxy over real HTTP.

use std::net::SocketAddr;

use changelog_portal::proxy::{self, ProxyState};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    addr: SocketAddr,
    shutdown: CancellationToken,
    client: reqwest::Client,
}

impl Harness {
    async fn start(backend_url: &str) -> Self {
        let state = ProxyState::new(backend_url, None).unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = CancellationToken::new();
        tokio::spawn(proxy::serve(listener, state, shutdown.clone()));
        Self {
            addr,
            shutdown,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }

    async fn get(&self, path_and_query: &str) -> (u16, Value) {
        let response = self.client.get(self.url(path_and_query)).send().await.unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }

    async fn post(&self, path: &str, body: &str) -> (u16, Value) {
        let response = self
            .client
            .post(self.url(path))
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

// =============================================================================
// GET /api/commits
// =============================================================================

mod commits {
    use super::*;

    #[tokio::test]
    async fn relays_body_and_query() {
        let backend = MockServer::start().await;
        let body = json!({
            "items": [{
                "sha": "abc1234def",
                "author": "ana",
                "message": "Add parser",
                "date": "2024-01-05T10:00:00Z",
                "link": "https://example.com/c/abc1234"
            }],
            "totalPages": 3
        });
        Mock::given(method("GET"))
            .and(path("/api/commits"))
            .and(query_param("page", "1"))
            .and(query_param("pageSize", "10"))
            .and(query_param("startDate", "2024-01-01"))
            .and(query_param("endDate", "2024-01-07"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .expect(1)
            .mount(&backend)
            .await;

        let proxy = Harness::start(&backend.uri()).await;
        let (status, relayed) = proxy
            .get("/api/commits?page=1&pageSize=10&startDate=2024-01-01&endDate=2024-01-07")
            .await;

        assert_eq!(status, 200);
        assert_eq!(relayed, body);
    }

    #[tokio::test]
    async fn backend_error_becomes_generic_500() {
        let backend = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/commits"))
            .respond_with(
                ResponseTemplate::new(503).set_body_json(json!({ "error": "db down at 10.0.0.5" })),
            )
            .mount(&backend)
            .await;

        let proxy = Harness::start(&backend.uri()).await;
        let (status, body) = proxy.get("/api/commits?page=0").await;

        assert_eq!(status, 500);
        assert_eq!(body, json!({ "error": "Failed to fetch commits" }));
    }

    #[tokio::test]
    async fn client_error_also_becomes_500() {
        let backend = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/commits"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&backend)
            .await;

        let proxy = Harness::start(&backend.uri()).await;
        let (status, body) = proxy.get("/api/commits").await;

        assert_eq!(status, 500);
        assert_eq!(body["error"], "Failed to fetch commits");
    }

    #[tokio::test]
    async fn non_json_body_becomes_500() {
        let backend = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/commits"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&backend)
            .await;

        let proxy = Harness::start(&backend.uri()).await;
        let (status, body) = proxy.get("/api/commits").await;

        assert_eq!(status, 500);
        assert_eq!(body["error"], "Failed to fetch commits");
    }

    #[tokio::test]
    async fn unreachable_backend_becomes_500() {
        // Bind and drop to get a port with nothing listening.
        let unused = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dead = format!("http://{}", unused.local_addr().unwrap());
        drop(unused);

        let proxy = Harness::start(&dead).await;
        let (status, body) = proxy.get("/api/commits").await;

        assert_eq!(status, 500);
        assert_eq!(body["error"], "Failed to fetch commits");
    }
}

// =============================================================================
// GET/POST /api/changelogs
// =============================================================================

mod changelogs {
    use super::*;

    #[tokio::test]
    async fn list_relays_cursor() {
        let backend = MockServer::start().await;
        let body = json!({ "items": [], "hasMore": false });
        Mock::given(method("GET"))
            .and(path("/api/changelogs"))
            .and(query_param("pageSize", "10"))
            .and(query_param("lastTimestamp", "2024-03-01T00:00:00Z"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .expect(1)
            .mount(&backend)
            .await;

        let proxy = Harness::start(&backend.uri()).await;
        let (status, relayed) = proxy
            .get("/api/changelogs?pageSize=10&lastTimestamp=2024-03-01T00:00:00Z")
            .await;

        assert_eq!(status, 200);
        assert_eq!(relayed, body);
    }

    #[tokio::test]
    async fn list_failure_message() {
        let backend = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/changelogs"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&backend)
            .await;

        let proxy = Harness::start(&backend.uri()).await;
        let (status, body) = proxy.get("/api/changelogs?pageSize=10").await;

        assert_eq!(status, 500);
        assert_eq!(body, json!({ "error": "Failed to fetch changelogs" }));
    }

    #[tokio::test]
    async fn submit_forwards_json_body() {
        let backend = MockServer::start().await;
        let payload = json!({ "startDate": "2024-01-01", "endDate": "2024-01-07", "version": "v1" });
        Mock::given(method("POST"))
            .and(path("/api/changelogs"))
            .and(body_json(payload.clone()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "job-42" })))
            .expect(1)
            .mount(&backend)
            .await;

        let proxy = Harness::start(&backend.uri()).await;
        let (status, body) = proxy.post("/api/changelogs", &payload.to_string()).await;

        assert_eq!(status, 200);
        assert_eq!(body, json!({ "id": "job-42" }));
    }

    #[tokio::test]
    async fn submit_with_invalid_json_is_not_forwarded() {
        let backend = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/changelogs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "x" })))
            .expect(0)
            .mount(&backend)
            .await;

        let proxy = Harness::start(&backend.uri()).await;
        let (status, body) = proxy.post("/api/changelogs", "{not json").await;

        assert_eq!(status, 500);
        assert_eq!(body, json!({ "error": "Failed to generate changelog" }));
    }

    #[tokio::test]
    async fn submit_backend_failure() {
        let backend = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/changelogs"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&backend)
            .await;

        let proxy = Harness::start(&backend.uri()).await;
        let (status, body) = proxy
            .post("/api/changelogs", r#"{"startDate":"2024-01-01","endDate":"2024-01-07"}"#)
            .await;

        assert_eq!(status, 500);
        assert_eq!(body["error"], "Failed to generate changelog");
    }
}

// =============================================================================
// GET /api/changelogs/status/{id}
// =============================================================================

mod status {
    use super::*;

    #[tokio::test]
    async fn relays_status_for_id() {
        let backend = MockServer::start().await;
        let body = json!({ "completed": false });
        Mock::given(method("GET"))
            .and(path("/api/changelogs/status/job-7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .expect(1)
            .mount(&backend)
            .await;

        let proxy = Harness::start(&backend.uri()).await;
        let (status, relayed) = proxy.get("/api/changelogs/status/job-7").await;

        assert_eq!(status, 200);
        assert_eq!(relayed, body);
    }

    #[tokio::test]
    async fn status_failure_message() {
        let backend = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/changelogs/status/job-7"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&backend)
            .await;

        let proxy = Harness::start(&backend.uri()).await;
        let (status, body) = proxy.get("/api/changelogs/status/job-7").await;

        assert_eq!(status, 500);
        assert_eq!(body, json!({ "error": "Failed to check changelog status" }));
    }
}

#[tokio::test]
async fn healthz_does_not_touch_backend() {
    let backend = MockServer::start().await;
    let proxy = Harness::start(&backend.uri()).await;

    let (status, body) = proxy.get("/healthz").await;

    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
    assert!(backend.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn backend_base_path_is_preserved() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/api/commits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [], "totalPages": 0 })))
        .expect(1)
        .mount(&backend)
        .await;

    let proxy = Harness::start(&format!("{}/v2", backend.uri())).await;
    let (status, _) = proxy.get("/api/commits").await;
    assert_eq!(status, 200);
}
