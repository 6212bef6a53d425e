//! Integration tests for the client workflows over HTTP.
//!
//! The workflows run against `HttpApi` with wiremock standing in for the
//! API, so these cover the wire format as well as the state machines.

use std::time::Duration;

use chrono::NaiveDate;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use changelog_portal::api::{ApiError, ChangelogApi, HttpApi};
use changelog_portal::core::types::{ChangelogRequest, DateRange, JobId};
use changelog_portal::workflow::{
    ChangelogViewer, CommitBrowser, FailureReason, GenerationState, GeneratorWorkflow, PollPolicy,
};

fn week() -> DateRange {
    DateRange::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
    )
    .unwrap()
}

fn fast() -> PollPolicy {
    PollPolicy {
        interval: Duration::from_millis(5),
        max_attempts: 10,
    }
}

fn commit_page(total_pages: u32) -> serde_json::Value {
    json!({
        "items": [{
            "sha": "abc1234def5678",
            "author": "ana",
            "message": "Add parser\n\nbody",
            "date": "2024-01-05T10:00:00Z",
            "link": "https://example.com/c/abc1234"
        }],
        "totalPages": total_pages
    })
}

// =============================================================================
// Commit browser
// =============================================================================

mod commit_browser {
    use super::*;

    #[tokio::test]
    async fn fetch_sends_page_and_range() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/commits"))
            .and(query_param("page", "0"))
            .and(query_param("pageSize", "10"))
            .and(query_param("startDate", "2024-01-01"))
            .and(query_param("endDate", "2024-01-07"))
            .respond_with(ResponseTemplate::new(200).set_body_json(commit_page(2)))
            .expect(1)
            .mount(&server)
            .await;

        let api = HttpApi::new(&server.uri(), None).unwrap();
        let mut browser = CommitBrowser::new(week(), 10);
        browser.fetch(&api).await.unwrap();

        let commits = browser.commits().unwrap();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].summary(), "Add parser");
        assert_eq!(commits[0].short_sha(), "abc1234");
        assert_eq!(browser.total_pages(), 2);
        assert!(browser.can_next());
        assert!(browser.can_generate());
    }

    #[tokio::test]
    async fn proxy_error_is_recorded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/commits"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({ "error": "Failed to fetch commits" })),
            )
            .mount(&server)
            .await;

        let api = HttpApi::new(&server.uri(), None).unwrap();
        let mut browser = CommitBrowser::new(week(), 10);
        let err = browser.fetch(&api).await.unwrap_err();

        assert_eq!(
            err,
            ApiError::Status {
                status: 500,
                message: "Failed to fetch commits".into()
            }
        );
        assert!(browser.commits().is_none());
        assert!(!browser.can_generate());
    }
}

// =============================================================================
// Generator
// =============================================================================

mod generator {
    use super::*;

    async fn mount_submit(server: &MockServer, id: &str) {
        Mock::given(method("POST"))
            .and(path("/api/changelogs"))
            .and(body_json(json!({ "startDate": "2024-01-01", "endDate": "2024-01-07" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": id })))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn polls_until_completed() {
        let server = MockServer::start().await;
        mount_submit(&server, "job-1").await;
        Mock::given(method("GET"))
            .and(path("/api/changelogs/status/job-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "completed": false })))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/changelogs/status/job-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "completed": true,
                "changelog": {
                    "version": "v1.0",
                    "changes": [{
                        "category": "Features",
                        "items": [{ "description": "Add parser", "commitLink": "https://example.com/c/1" }]
                    }]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = HttpApi::new(&server.uri(), None).unwrap();
        let mut workflow = GeneratorWorkflow::new(fast());
        let state = workflow
            .generate(
                &api,
                ChangelogRequest::new(week(), "  ", ""),
                true,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        match state {
            GenerationState::Completed { job, changelog } => {
                assert_eq!(job.as_str(), "job-1");
                assert_eq!(changelog.version.as_deref(), Some("v1.0"));
                assert_eq!(changelog.sections[0].heading, "Features");
                assert_eq!(
                    changelog.sections[0].bullet_points[0]
                        .link_to_relevant_commit
                        .as_deref(),
                    Some("https://example.com/c/1")
                );
            }
            other => panic!("expected Completed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn backend_error_field_fails() {
        let server = MockServer::start().await;
        mount_submit(&server, "job-2").await;
        Mock::given(method("GET"))
            .and(path("/api/changelogs/status/job-2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "completed": false, "error": "model quota exceeded" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let api = HttpApi::new(&server.uri(), None).unwrap();
        let mut workflow = GeneratorWorkflow::new(fast());
        workflow
            .generate(
                &api,
                ChangelogRequest::new(week(), "", ""),
                true,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(
            workflow.state(),
            &GenerationState::Failed {
                job: Some(JobId::new("job-2").unwrap()),
                reason: FailureReason::Backend("model quota exceeded".into()),
            }
        );
        assert!(workflow.can_submit(true));
    }

    #[tokio::test]
    async fn failed_status_request_fails() {
        let server = MockServer::start().await;
        mount_submit(&server, "job-3").await;
        Mock::given(method("GET"))
            .and(path("/api/changelogs/status/job-3"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({ "error": "Failed to check changelog status" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let api = HttpApi::new(&server.uri(), None).unwrap();
        let mut workflow = GeneratorWorkflow::new(fast());
        workflow
            .generate(
                &api,
                ChangelogRequest::new(week(), "", ""),
                true,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert!(matches!(
            workflow.state(),
            GenerationState::Failed {
                reason: FailureReason::Status(ApiError::Status { status: 500, .. }),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn undecodable_status_fails() {
        let server = MockServer::start().await;
        mount_submit(&server, "job-4").await;
        Mock::given(method("GET"))
            .and(path("/api/changelogs/status/job-4"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let api = HttpApi::new(&server.uri(), None).unwrap();
        let mut workflow = GeneratorWorkflow::new(fast());
        workflow
            .generate(
                &api,
                ChangelogRequest::new(week(), "", ""),
                true,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert!(matches!(
            workflow.state(),
            GenerationState::Failed {
                reason: FailureReason::Status(ApiError::Decode(_)),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn never_exceeds_max_attempts() {
        let server = MockServer::start().await;
        mount_submit(&server, "job-5").await;
        Mock::given(method("GET"))
            .and(path("/api/changelogs/status/job-5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "completed": false })))
            .expect(3)
            .mount(&server)
            .await;

        let api = HttpApi::new(&server.uri(), None).unwrap();
        let mut workflow = GeneratorWorkflow::new(PollPolicy {
            interval: Duration::from_millis(1),
            max_attempts: 3,
        });
        workflow
            .generate(
                &api,
                ChangelogRequest::new(week(), "", ""),
                true,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert!(matches!(
            workflow.state(),
            GenerationState::Failed {
                reason: FailureReason::Exhausted { attempts: 3 },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn cancellation_mid_poll() {
        let server = MockServer::start().await;
        mount_submit(&server, "job-6").await;
        Mock::given(method("GET"))
            .and(path("/api/changelogs/status/job-6"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "completed": false })))
            .mount(&server)
            .await;

        let api = HttpApi::new(&server.uri(), None).unwrap();
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let mut workflow = GeneratorWorkflow::new(PollPolicy {
            interval: Duration::from_millis(10),
            max_attempts: 10_000,
        });
        workflow
            .generate(&api, ChangelogRequest::new(week(), "", ""), true, &cancel)
            .await
            .unwrap();

        assert!(matches!(
            workflow.state(),
            GenerationState::Failed {
                reason: FailureReason::Cancelled,
                ..
            }
        ));
    }
}

// =============================================================================
// Viewer
// =============================================================================

mod viewer {
    use super::*;

    #[tokio::test]
    async fn load_more_uses_last_timestamp() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/changelogs"))
            .and(query_param("pageSize", "2"))
            .and(query_param_is_missing("lastTimestamp"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    { "id": "a", "version": "v3", "sections": [] },
                    { "id": "b", "version": "v2", "sections": [] }
                ],
                "hasMore": true,
                "lastTimestamp": "2024-02-01T00:00:00Z"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/changelogs"))
            .and(query_param("lastTimestamp", "2024-02-01T00:00:00Z"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {
                        "id": "c",
                        "startDate": "2024-01-01",
                        "endDate": "2024-01-07",
                        "sections": [{
                            "heading": "Fixes",
                            "bulletPoints": [{ "bulletPointDetails": "Fix crash" }]
                        }]
                    }
                ],
                "hasMore": false
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = HttpApi::new(&server.uri(), None).unwrap();
        let mut viewer = ChangelogViewer::new(2);
        viewer.load_first(&api).await.unwrap();
        assert!(viewer.can_load_more());
        viewer.load_more(&api).await.unwrap();

        let ids: Vec<_> = viewer
            .entries()
            .iter()
            .filter_map(|e| e.id.as_deref())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(!viewer.can_load_more());
        assert_eq!(viewer.entries()[2].sections[0].bullet_points[0].bullet_point_details, "Fix crash");
    }
}

#[tokio::test]
async fn job_id_is_a_single_path_segment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/changelogs/status/a%2Fb"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "completed": false })))
        .expect(1)
        .mount(&server)
        .await;

    let api = HttpApi::new(&server.uri(), None).unwrap();
    let status = api
        .changelog_status(&JobId::new("a/b").unwrap())
        .await
        .unwrap();
    assert!(!status.completed);
}
