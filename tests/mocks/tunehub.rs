//! Mock TuneHub upstream for testing
//!
//! Provides wiremock-based mocks for the upstream API and media hosts:
//! - GET /api?type=... - JSON envelopes, redirects, raw bodies
//! - GET /media/... - audio and image bytes behind stream redirects
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::mocks::MockTunehub;
//!
//! #[tokio::test]
//! async fn test_with_tunehub_mock() {
//!     let upstream = MockTunehub::start().await;
//!     upstream.mock_envelope("search", TunehubTestData::search_results()).await;
//!
//!     // Point the proxy at format!("{}/api", upstream.uri())
//! }
//! ```

#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

/// Audio bytes served by the mock media host
pub const AUDIO_BYTES: &[u8] = b"ID3\x04\x00fake-mp3-frames";

/// Mock TuneHub server wrapper
pub struct MockTunehub {
    server: MockServer,
}

impl MockTunehub {
    /// Start a new mock upstream
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Get the mock server URI (`http://127.0.0.1:<port>`)
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Underlying server, for one-off mocks
    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// Get the mock server URI with an https scheme (nothing answers TLS there)
    pub fn https_uri(&self) -> String {
        self.server.uri().replacen("http://", "https://", 1)
    }

    /// Get all received requests (for assertion in tests)
    pub async fn received_requests(&self) -> Vec<wiremock::Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// Received requests for one path
    pub async fn requests_to(&self, request_path: &str) -> Vec<wiremock::Request> {
        self.received_requests()
            .await
            .into_iter()
            .filter(|r| r.url.path() == request_path)
            .collect()
    }

    // =========================================================================
    // GET /api - JSON endpoints
    // =========================================================================

    /// Mock a `{code: 200, data}` envelope for a request type
    pub async fn mock_envelope(&self, request_type: &str, data: Value) {
        self.mock_envelope_code(request_type, 200, data).await;
    }

    /// Mock an envelope with an arbitrary code
    pub async fn mock_envelope_code(&self, request_type: &str, code: i64, data: Value) {
        Mock::given(method("GET"))
            .and(path("/api"))
            .and(query_param("type", request_type))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "code": code, "data": data })),
            )
            .mount(&self.server)
            .await;
    }

    /// Mock an arbitrary response for a request type
    pub async fn mock_api_response(&self, request_type: &str, response: ResponseTemplate) {
        Mock::given(path("/api"))
            .and(query_param("type", request_type))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    /// Mock an API call that must never reach the upstream
    pub async fn expect_no_api_calls(&self) {
        Mock::given(path("/api"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }

    // =========================================================================
    // GET /api?type=url - Stream redirects
    // =========================================================================

    /// Mock the upstream answering a stream request with a redirect
    pub async fn mock_stream_redirect(&self, status: u16, location: &str) {
        Mock::given(path("/api"))
            .and(query_param("type", "url"))
            .respond_with(ResponseTemplate::new(status).insert_header("Location", location))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    // =========================================================================
    // GET /media/... - Media hosts
    // =========================================================================

    /// Mock an audio file with range support
    pub async fn mock_audio(&self, media_path: &str) {
        Mock::given(method("GET"))
            .and(path(media_path))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(AUDIO_BYTES.to_vec(), "audio/mp4")
                    .insert_header("Accept-Ranges", "bytes"),
            )
            .mount(&self.server)
            .await;
    }

    /// Mock a partial audio response for a specific `Range` header
    pub async fn mock_audio_range(&self, media_path: &str, range: &str) {
        let total = AUDIO_BYTES.len();
        Mock::given(method("GET"))
            .and(path(media_path))
            .and(header("range", range))
            .respond_with(
                ResponseTemplate::new(206)
                    .set_body_raw(AUDIO_BYTES[..4].to_vec(), "audio/mpeg")
                    .insert_header("Accept-Ranges", "bytes")
                    .insert_header("Content-Range", format!("bytes 0-3/{}", total).as_str()),
            )
            .mount(&self.server)
            .await;
    }

    /// Mock a media path answering with a bare status
    pub async fn mock_media_status(&self, media_path: &str, status: u16) {
        Mock::given(path(media_path))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Mock an image body
    pub async fn mock_image(&self, media_path: &str, content_type: &str) {
        Mock::given(method("GET"))
            .and(path(media_path))
            .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0xFF, 0xD8, 0xFF], content_type))
            .mount(&self.server)
            .await;
    }
}

/// Sample upstream payloads
pub struct TunehubTestData;

impl TunehubTestData {
    /// Search results as the upstream sends them (mixed id types)
    pub fn search_results() -> Value {
        json!({
            "results": [
                {
                    "id": "0039MnYb0qxYhV",
                    "name": "晴天",
                    "artist": "周杰伦",
                    "album": "叶惠美",
                    "platform": "qq",
                    "pic": "https://y.gtimg.cn/music/photo_new/T002R300x300M000.jpg"
                },
                {
                    "id": 186016,
                    "name": "晴天",
                    "artist": "周杰伦"
                }
            ]
        })
    }

    /// Aggregate results including a platform the client does not know
    pub fn aggregate_results() -> Value {
        json!({
            "results": [
                { "id": "1", "name": "晴天", "artist": "周杰伦", "platform": "netease" },
                { "id": "2", "name": "晴天", "artist": "周杰伦", "platform": "kuwo" },
                { "id": "3", "name": "晴天", "artist": "周杰伦", "platform": "migu" }
            ]
        })
    }

    pub fn song_info() -> Value {
        json!({
            "name": "晴天",
            "artist": "周杰伦",
            "album": "叶惠美",
            "url": "/api/music/?source=netease&id=186016&type=url",
            "pic": "/api/music/?source=netease&id=186016&type=pic",
            "lrc": "/api/music/?source=netease&id=186016&type=lrc"
        })
    }

    pub fn top_lists() -> Value {
        json!({
            "list": [
                { "id": "19723756", "name": "飙升榜", "updateFrequency": "每天更新" },
                { "id": 3779629, "name": "新歌榜" }
            ]
        })
    }

    pub fn playlist_songs() -> Value {
        json!({
            "list": [
                { "id": "186016", "name": "晴天", "types": ["128k", "320k", "flac"] },
                { "id": 185811, "name": "七里香" }
            ]
        })
    }

    pub fn external_playlist() -> Value {
        json!({
            "info": { "name": "华语经典", "author": "网易云音乐" },
            "list": [
                { "id": "186016", "name": "晴天" }
            ]
        })
    }
}
