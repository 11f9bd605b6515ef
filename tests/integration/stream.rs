//! Stream URL integration tests
//!
//! Tests for `type=url` requests:
//! - The upstream redirect is resolved by the proxy, not the caller
//! - QQ locations are fetched over http, others upgraded to https
//! - Range requests and media headers survive the hop
//! - Stream host failures render as JSON errors

use axum::http::{header, StatusCode};
use serde_json::{json, Value};
use wiremock::ResponseTemplate;

use crate::common::{constants, test_config, test_server};
use crate::mocks::{MockTunehub, AUDIO_BYTES};

#[tokio::test]
async fn test_qq_stream_downgraded_to_http() {
    let upstream = MockTunehub::start().await;
    let location = format!("{}/media/qq.m4a?vkey=abc", upstream.https_uri());
    upstream.mock_stream_redirect(302, &location).await;
    upstream.mock_audio("/media/qq.m4a").await;

    let server = test_server(test_config(&upstream.uri()));
    let response = server
        .get("/api/music")
        .add_raw_query_param("source=qq&id=0039MnYb0qxYhV&type=url&br=320k")
        .await;

    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), AUDIO_BYTES);
    assert_eq!(response.header(header::CONTENT_TYPE), "audio/mp4");
    assert_eq!(response.header(header::ACCEPT_RANGES), "bytes");
    assert_eq!(
        response.header(header::CONTENT_LENGTH),
        AUDIO_BYTES.len().to_string().as_str()
    );
    assert!(response.headers().get(header::LOCATION).is_none());

    let media = upstream.requests_to("/media/qq.m4a").await;
    assert_eq!(media.len(), 1);
    assert_eq!(media[0].url.query(), Some("vkey=abc"));
}

#[tokio::test]
async fn test_stream_without_https_upgrade() {
    let upstream = MockTunehub::start().await;
    let location = format!("{}/media/song.mp3", upstream.uri());
    upstream.mock_stream_redirect(302, &location).await;
    upstream.mock_audio("/media/song.mp3").await;

    let mut config = test_config(&upstream.uri());
    config.upgrade_stream_https = false;

    let server = test_server(config);
    let response = server
        .get("/api/music")
        .add_raw_query_param("source=netease&id=186016&type=url")
        .await;

    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), AUDIO_BYTES);
}

#[tokio::test]
async fn test_relative_location_resolved_against_upstream() {
    let upstream = MockTunehub::start().await;
    upstream
        .mock_stream_redirect(307, "/media/relative.mp3")
        .await;
    upstream.mock_audio("/media/relative.mp3").await;

    let mut config = test_config(&upstream.uri());
    config.upgrade_stream_https = false;

    let server = test_server(config);
    let response = server
        .get("/api/music")
        .add_raw_query_param("source=kuwo&id=1&type=url")
        .await;

    response.assert_status_ok();
    assert_eq!(upstream.requests_to("/media/relative.mp3").await.len(), 1);
}

#[tokio::test]
async fn test_non_qq_stream_upgraded_to_https() {
    let upstream = MockTunehub::start().await;
    let location = format!("{}/media/song.mp3", upstream.uri());
    upstream.mock_stream_redirect(302, &location).await;

    // The mock only speaks plain http, so the upgraded fetch fails its handshake
    let server = test_server(test_config(&upstream.uri()));
    let response = server
        .get("/api/music")
        .add_raw_query_param("source=netease&id=186016&type=url")
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Failed to fetch audio stream");
    assert_eq!(
        body["url"],
        format!("{}/media/song.mp3", upstream.https_uri())
    );
    assert!(upstream.requests_to("/media/song.mp3").await.is_empty());
}

#[tokio::test]
async fn test_range_request_returns_partial_content() {
    let upstream = MockTunehub::start().await;
    let location = format!("{}/media/range.mp3", upstream.uri());
    upstream.mock_stream_redirect(302, &location).await;
    upstream.mock_audio_range("/media/range.mp3", "bytes=0-3").await;

    let mut config = test_config(&upstream.uri());
    config.upgrade_stream_https = false;

    let server = test_server(config);
    let response = server
        .get("/api/music")
        .add_raw_query_param("source=kuwo&id=1&type=url&br=flac")
        .add_header(header::RANGE, "bytes=0-3".parse().unwrap())
        .await;

    response.assert_status(StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.as_bytes().as_ref(), &AUDIO_BYTES[..4]);
    assert_eq!(
        response.header(header::CONTENT_RANGE),
        format!("bytes 0-3/{}", AUDIO_BYTES.len()).as_str()
    );
    assert_eq!(response.header(header::CONTENT_TYPE), "audio/mpeg");
}

#[tokio::test]
async fn test_stream_host_rejection() {
    let upstream = MockTunehub::start().await;
    let location = format!("{}/media/expired.mp3", upstream.uri());
    upstream.mock_stream_redirect(302, &location).await;
    upstream.mock_media_status("/media/expired.mp3", 403).await;

    let mut config = test_config(&upstream.uri());
    config.upgrade_stream_https = false;

    let server = test_server(config);
    let response = server
        .get("/api/music")
        .add_raw_query_param("source=netease&id=1&type=url")
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(
        body,
        json!({ "error": "Failed to fetch audio", "status": 403, "statusText": "Forbidden" })
    );
}

#[tokio::test]
async fn test_stream_host_unreachable() {
    let upstream = MockTunehub::start().await;
    let location = format!("{}/media/qq.m4a", constants::CLOSED_PORT_URL);
    upstream.mock_stream_redirect(302, &location).await;

    let server = test_server(test_config(&upstream.uri()));
    let response = server
        .get("/api/music")
        .add_raw_query_param("source=qq&id=1&type=url")
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Failed to fetch audio stream");
    assert_eq!(body["url"], "http://127.0.0.1:1/media/qq.m4a");
    assert!(body["message"].as_str().is_some());
}

#[tokio::test]
async fn test_non_redirect_answer_relayed() {
    let upstream = MockTunehub::start().await;
    upstream
        .mock_api_response(
            "url",
            ResponseTemplate::new(404).set_body_json(json!({ "code": 404, "msg": "no copyright" })),
        )
        .await;

    let server = test_server(test_config(&upstream.uri()));
    let response = server
        .get("/api/music")
        .add_raw_query_param("source=qq&id=1&type=url")
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["msg"], "no copyright");
    assert_eq!(upstream.received_requests().await.len(), 1);
}

#[tokio::test]
async fn test_stream_unreachable_upstream_returns_502() {
    let server = test_server(test_config(constants::CLOSED_PORT_URL));
    let response = server
        .get("/api/music")
        .add_raw_query_param("source=qq&id=1&type=url")
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body["error"], "Upstream request failed");
}

#[tokio::test]
async fn test_repeated_query_keys_use_first_value() {
    let upstream = MockTunehub::start().await;
    let location = format!("{}/media/dup.m4a", upstream.https_uri());
    upstream.mock_stream_redirect(302, &location).await;
    upstream.mock_audio("/media/dup.m4a").await;

    let server = test_server(test_config(&upstream.uri()));
    let response = server
        .get("/api/music")
        .add_raw_query_param("type=url&source=qq&id=1&source=qq")
        .await;

    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), AUDIO_BYTES);

    let requests = upstream.requests_to(constants::UPSTREAM_PATH).await;
    assert_eq!(requests[0].url.query(), Some("type=url&source=qq&id=1&source=qq"));
}
