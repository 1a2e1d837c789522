use quote_engine::{
    GeneratedImage, GraphPublisher, GraphSettings, MediaHandle, Platform, Publisher, RejectionKind,
};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const IMAGE_URL: &str = "https://img.test/quote.png";

const USER_ID: &str = "17841400000000000";

fn instagram(server: &MockServer) -> GraphPublisher {
    let mut settings = GraphSettings::instagram(USER_ID, "graph-token");
    settings.base_url = server.uri();
    GraphPublisher::instagram(settings).unwrap()
}

fn threads(server: &MockServer) -> GraphPublisher {
    let mut settings = GraphSettings::threads(USER_ID, "graph-token");
    settings.base_url = server.uri();
    GraphPublisher::threads(settings).unwrap()
}

#[tokio::test]
async fn upload_passes_the_public_url_through() {
    let server = MockServer::start().await;
    let image = GeneratedImage {
        url: IMAGE_URL.into(),
        bytes: None,
        content_type: None,
    };

    let media = instagram(&server).upload(&image).await.unwrap();

    assert_eq!(media, MediaHandle(IMAGE_URL.into()));
}

#[tokio::test]
async fn upload_rejects_unparseable_url() {
    let server = MockServer::start().await;
    let image = GeneratedImage {
        url: "nope".into(),
        bytes: None,
        content_type: None,
    };

    let err = threads(&server).upload(&image).await.unwrap_err();

    assert_eq!(err.platform, Platform::Threads);
    assert_eq!(err.kind, RejectionKind::MediaUnavailable);
}

#[tokio::test]
async fn instagram_creates_container_then_publishes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/17841400000000000/media"))
        .and(body_string_contains("caption=%23AI+wisdom"))
        .and(body_string_contains("access_token=graph-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "container-1" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/17841400000000000/media_publish"))
        .and(body_string_contains("creation_id=container-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "ig-post-9" })))
        .expect(1)
        .mount(&server)
        .await;

    let post = instagram(&server)
        .post("#AI wisdom", &MediaHandle(IMAGE_URL.into()))
        .await
        .unwrap();

    assert_eq!(post.0, "ig-post-9");
}

#[tokio::test]
async fn threads_caption_drops_hashtags() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/17841400000000000/threads"))
        .and(body_string_contains("media_type=IMAGE"))
        .and(body_string_contains("text=Keep+it+simple"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "container-2" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/17841400000000000/threads_publish"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "th-post-3" })))
        .expect(1)
        .mount(&server)
        .await;

    let post = threads(&server)
        .post("Keep it simple #dev #code", &MediaHandle(IMAGE_URL.into()))
        .await
        .unwrap();

    assert_eq!(post.0, "th-post-3");
    let requests = server.received_requests().await.unwrap();
    let container_body = String::from_utf8(requests[0].body.clone()).unwrap();
    assert!(!container_body.contains("%23"), "{container_body}");
}

#[tokio::test]
async fn graph_error_codes_map_to_rejections() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/17841400000000000/media"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "message": "Application request limit reached", "code": 4 }
        })))
        .mount(&server)
        .await;

    let err = instagram(&server)
        .post("hello", &MediaHandle(IMAGE_URL.into()))
        .await
        .unwrap_err();

    assert_eq!(err.platform, Platform::Instagram);
    assert_eq!(err.kind, RejectionKind::RateLimited);
    assert_eq!(err.message, "Application request limit reached");
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/17841400000000000/threads"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "message": "Error validating access token", "code": 190 }
        })))
        .mount(&server)
        .await;

    let err = threads(&server)
        .post("hello", &MediaHandle(IMAGE_URL.into()))
        .await
        .unwrap_err();

    assert_eq!(err.kind, RejectionKind::Unauthorized);
}

#[tokio::test]
async fn publish_step_failure_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/17841400000000000/media"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "container-1" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/17841400000000000/media_publish"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let err = instagram(&server)
        .post("hello", &MediaHandle(IMAGE_URL.into()))
        .await
        .unwrap_err();

    assert_eq!(err.kind, RejectionKind::HttpStatus(500));
    assert_eq!(err.message, "internal");
}
