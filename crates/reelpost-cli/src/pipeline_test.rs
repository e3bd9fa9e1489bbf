use std::collections::HashMap;
use std::time::Duration;

use reelpost_publish::PublishError;
use reelpost_storage::StorageError;
use reqwest::Url;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use super::*;

const IG_USER: &str = "17841400000000000";

/// Points search, storage, and the Graph API at one mock server so the order
/// of all calls can be read back from `received_requests`.
fn test_pipeline(server: &MockServer, poll_max_attempts: u32) -> Pipeline {
    let uri = server.uri();
    Pipeline::new(
        SearchClient::with_base_url("rapid-key", "twitter-api45.p.rapidapi.com", &uri, 5)
            .expect("search client should build"),
        StorageClient::with_base_url("service-key", "VIDEOS", &uri, 5)
            .expect("storage client should build"),
        GraphClient::with_base_url(IG_USER, "ig-token", &uri, 5)
            .expect("graph client should build"),
        PollPolicy {
            interval: Duration::ZERO,
            max_attempts: poll_max_attempts,
            timeout: Duration::from_secs(10),
        },
    )
}

/// Decodes an `application/x-www-form-urlencoded` request body.
fn form_fields(request: &Request) -> HashMap<String, String> {
    let body = String::from_utf8_lossy(&request.body);
    let url = Url::parse(&format!("http://form.invalid/?{body}")).expect("form body should parse");
    url.query_pairs().into_owned().collect()
}

async fn mount_search_with_video(server: &MockServer) {
    let body = json!({
        "timeline": [{
            "screen_name": "newsdesk",
            "text": "Rally footage",
            "media": { "video": [{ "variants": [
                { "content_type": "video/mp4", "bitrate": 500, "url": format!("{}/media/low.mp4", server.uri()) },
                { "content_type": "video/mp4", "bitrate": 1200, "url": format!("{}/media/v.mp4", server.uri()) }
            ]}]}
        }]
    });
    Mock::given(method("GET"))
        .and(path("/search.php"))
        .and(query_param("query", "YS Jagan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_source_video(server: &MockServer, expected: u64) {
    Mock::given(method("GET"))
        .and(path("/media/v.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fake-mp4".to_vec()))
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_upload(server: &MockServer, expected: u64) {
    Mock::given(method("POST"))
        .and(path("/storage/v1/object/VIDEOS/trending.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Key": "VIDEOS/trending.mp4" })))
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_create(server: &MockServer, response: serde_json::Value, expected: u64) {
    Mock::given(method("POST"))
        .and(path(format!("/{IG_USER}/media")))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, status: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path("/123"))
        .and(query_param("fields", "status_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status_code": status })))
        .up_to_n_times(times)
        .expect(times)
        .mount(server)
        .await;
}

async fn mount_publish(server: &MockServer, expected: u64) {
    Mock::given(method("POST"))
        .and(path(format!("/{IG_USER}/media_publish")))
        .and(body_string_contains("creation_id=123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "9001" })))
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_delete(server: &MockServer, expected: u64) {
    Mock::given(method("DELETE"))
        .and(path("/storage/v1/object/VIDEOS"))
        .and(body_json(json!({ "prefixes": ["trending.mp4"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_failing_delete(server: &MockServer) {
    Mock::given(method("DELETE"))
        .and(path("/storage/v1/object/VIDEOS"))
        .respond_with(ResponseTemplate::new(500).set_body_string("storage unavailable"))
        .expect(1)
        .mount(server)
        .await;
}

/// Catches anything that reaches storage or the Graph API when it should not.
async fn mount_nothing_downstream(server: &MockServer) {
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/media/v.mp4"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

#[tokio::test]
async fn full_run_publishes_then_deletes_once() {
    let server = MockServer::start().await;
    mount_search_with_video(&server).await;
    mount_source_video(&server, 1).await;
    mount_upload(&server, 1).await;

    mount_create(&server, json!({ "id": "123" }), 1).await;
    mount_status(&server, "IN_PROGRESS", 2).await;
    mount_status(&server, "FINISHED", 1).await;
    mount_publish(&server, 1).await;
    mount_delete(&server, 1).await;

    let pipeline = test_pipeline(&server, 5);
    let outcome = pipeline
        .run("YS Jagan", "trending.mp4")
        .await
        .expect("run should succeed");

    match outcome {
        RunOutcome::Published {
            container_id,
            receipt,
        } => {
            assert_eq!(container_id, "123");
            assert_eq!(receipt.media_id.as_deref(), Some("9001"));
        }
        other => panic!("expected Published, got {other:?}"),
    }

    let requests = server.received_requests().await.expect("recording enabled");
    let create = requests
        .iter()
        .find(|r| r.method.as_str() == "POST" && r.url.path() == format!("/{IG_USER}/media"))
        .expect("container should be created");
    let fields = form_fields(create);
    assert_eq!(fields["media_type"], "REELS");
    assert_eq!(
        fields["video_url"],
        format!(
            "{}/storage/v1/object/public/VIDEOS/trending.mp4",
            server.uri()
        )
    );
    assert_eq!(
        fields["caption"],
        "Rally footage\n\n#YSJagan #Telugu #Politics #AP"
    );

    let position = |m: &str, p: &str| {
        requests
            .iter()
            .position(|r| r.method.as_str() == m && r.url.path() == p)
    };
    let publish_at = position("POST", &format!("/{IG_USER}/media_publish")).unwrap();
    let delete_at = position("DELETE", "/storage/v1/object/VIDEOS").unwrap();
    assert!(delete_at > publish_at, "delete must follow publish");
    assert_eq!(
        requests
            .iter()
            .filter(|r| r.method.as_str() == "DELETE")
            .count(),
        1
    );
}

#[tokio::test]
async fn no_candidate_skips_every_later_stage() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "timeline": [{ "screen_name": "x", "text": "no video" }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_nothing_downstream(&server).await;

    let pipeline = test_pipeline(&server, 5);
    let outcome = pipeline.run("YS Jagan", "trending.mp4").await.unwrap();
    assert!(matches!(outcome, RunOutcome::NoCandidate));
}

#[tokio::test]
async fn failed_search_ends_run_cleanly() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.php"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    mount_nothing_downstream(&server).await;

    let pipeline = test_pipeline(&server, 5);
    let outcome = pipeline.run("YS Jagan", "trending.mp4").await.unwrap();
    assert!(matches!(outcome, RunOutcome::NoCandidate));
}

#[tokio::test]
async fn unreachable_source_aborts_before_any_write() {
    let server = MockServer::start().await;
    mount_search_with_video(&server).await;
    Mock::given(method("GET"))
        .and(path("/media/v.mp4"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_upload(&server, 0).await;
    mount_create(&server, json!({ "id": "123" }), 0).await;
    mount_delete(&server, 0).await;

    let pipeline = test_pipeline(&server, 5);
    let err = pipeline.run("YS Jagan", "trending.mp4").await.unwrap_err();
    assert!(
        matches!(
            err.downcast_ref::<StorageError>(),
            Some(StorageError::SourceFetch { status: 404, .. })
        ),
        "expected SourceFetch(404), got {err:?}"
    );
}

#[tokio::test]
async fn container_error_still_deletes_staged_video() {
    let server = MockServer::start().await;
    mount_search_with_video(&server).await;
    mount_source_video(&server, 1).await;
    mount_upload(&server, 1).await;
    mount_create(&server, json!({ "id": "123" }), 1).await;
    mount_status(&server, "IN_PROGRESS", 1).await;
    mount_status(&server, "ERROR", 1).await;
    mount_publish(&server, 0).await;
    mount_delete(&server, 1).await;

    let pipeline = test_pipeline(&server, 5);
    let err = pipeline.run("YS Jagan", "trending.mp4").await.unwrap_err();
    assert!(
        matches!(
            err.downcast_ref::<PublishError>(),
            Some(PublishError::ContainerFailed { .. })
        ),
        "expected ContainerFailed, got {err:?}"
    );
}

#[tokio::test]
async fn missing_container_id_skips_poll_and_publish() {
    let server = MockServer::start().await;
    mount_search_with_video(&server).await;
    mount_source_video(&server, 1).await;
    mount_upload(&server, 1).await;
    mount_create(
        &server,
        json!({ "error": { "message": "Invalid parameter", "code": 100 } }),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status_code": "FINISHED" })))
        .expect(0)
        .mount(&server)
        .await;
    mount_publish(&server, 0).await;
    mount_delete(&server, 1).await;

    let pipeline = test_pipeline(&server, 5);
    let outcome = pipeline.run("YS Jagan", "trending.mp4").await.unwrap();
    assert!(matches!(outcome, RunOutcome::NoContainer));
}

#[tokio::test]
async fn failed_delete_after_publish_fails_the_run() {
    let server = MockServer::start().await;
    mount_search_with_video(&server).await;
    mount_source_video(&server, 1).await;
    mount_upload(&server, 1).await;
    mount_create(&server, json!({ "id": "123" }), 1).await;
    mount_status(&server, "FINISHED", 1).await;
    mount_publish(&server, 1).await;
    mount_failing_delete(&server).await;

    let pipeline = test_pipeline(&server, 5);
    let err = pipeline.run("YS Jagan", "trending.mp4").await.unwrap_err();
    assert!(
        matches!(
            err.downcast_ref::<StorageError>(),
            Some(StorageError::UnexpectedStatus {
                operation: "delete",
                status: 500,
                ..
            })
        ),
        "expected delete UnexpectedStatus(500), got {err:?}"
    );
}

#[tokio::test]
async fn failed_delete_after_container_error_reports_container_error() {
    let server = MockServer::start().await;
    mount_search_with_video(&server).await;
    mount_source_video(&server, 1).await;
    mount_upload(&server, 1).await;
    mount_create(&server, json!({ "id": "123" }), 1).await;
    mount_status(&server, "ERROR", 1).await;
    mount_publish(&server, 0).await;
    mount_failing_delete(&server).await;

    let pipeline = test_pipeline(&server, 5);
    let err = pipeline.run("YS Jagan", "trending.mp4").await.unwrap_err();
    assert!(
        matches!(
            err.downcast_ref::<PublishError>(),
            Some(PublishError::ContainerFailed { .. })
        ),
        "expected ContainerFailed, got {err:?}"
    );
    assert!(err.downcast_ref::<StorageError>().is_none());
}

#[tokio::test]
async fn poll_exhaustion_still_deletes_staged_video() {
    let server = MockServer::start().await;
    mount_search_with_video(&server).await;
    mount_source_video(&server, 1).await;
    mount_upload(&server, 1).await;
    mount_create(&server, json!({ "id": "123" }), 1).await;
    mount_status(&server, "IN_PROGRESS", 3).await;
    mount_publish(&server, 0).await;
    mount_delete(&server, 1).await;

    let pipeline = test_pipeline(&server, 3);
    let err = pipeline.run("YS Jagan", "trending.mp4").await.unwrap_err();
    assert!(
        matches!(
            err.downcast_ref::<PublishError>(),
            Some(PublishError::PollExhausted { attempts: 3, .. })
        ),
        "expected PollExhausted(3), got {err:?}"
    );
}

#[tokio::test]
async fn unreadable_publish_response_still_deletes_staged_video() {
    let server = MockServer::start().await;
    mount_search_with_video(&server).await;
    mount_source_video(&server, 1).await;
    mount_upload(&server, 1).await;
    mount_create(&server, json!({ "id": "123" }), 1).await;
    mount_status(&server, "FINISHED", 1).await;
    Mock::given(method("POST"))
        .and(path(format!("/{IG_USER}/media_publish")))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .expect(1)
        .mount(&server)
        .await;
    mount_delete(&server, 1).await;

    let pipeline = test_pipeline(&server, 5);
    let err = pipeline.run("YS Jagan", "trending.mp4").await.unwrap_err();
    assert!(
        matches!(
            err.downcast_ref::<PublishError>(),
            Some(PublishError::Deserialize { .. })
        ),
        "expected Deserialize, got {err:?}"
    );
}
