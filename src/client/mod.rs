//! Typed client for the TuneHub proxy
//!
//! Builds query strings against the proxy base path and unwraps the
//! `{code, data}` envelopes into typed results. Failures never reach the
//! caller: every operation degrades to an empty list, `None` or an empty
//! string and logs the cause.

pub mod models;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error, instrument, warn};

pub use models::{
    AudioQuality, Envelope, ExternalPlaylist, Platform, PlaylistInfo, PlaylistSong,
    SearchResult, SongInfo, TopList,
};
use models::{ListData, SearchData};

/// Proxy path used by the local development server
pub const DEV_BASE_PATH: &str = "/music-api/api";

/// Same-origin proxy path served by this crate's router
pub const PROXY_BASE_PATH: &str = "/api/music";

/// Default number of results for single-platform search
pub const DEFAULT_SEARCH_LIMIT: u32 = 20;

/// Envelope code the upstream uses for success
const SUCCESS_CODE: i64 = 200;

/// Where the client runs, which decides the proxy base path
#[derive(Debug, Clone, Default)]
pub struct ClientEnvironment {
    /// Running against the local development server
    pub dev: bool,
    /// User agent of the hosting browser, if known
    pub user_agent: Option<String>,
    /// Launched from the home screen (standalone display mode)
    pub standalone: bool,
}

impl ClientEnvironment {
    /// iOS home-screen apps cannot reach the dev server's proxy path
    pub fn is_ios_standalone(&self) -> bool {
        let is_ios = self
            .user_agent
            .as_deref()
            .map(|ua| ["iPad", "iPhone", "iPod"].iter().any(|d| ua.contains(d)))
            .unwrap_or(false);
        is_ios && self.standalone
    }

    /// Proxy path: the dev server's unless running as an iOS home-screen app
    pub fn base_path(&self) -> &'static str {
        if self.dev && !self.is_ios_standalone() {
            DEV_BASE_PATH
        } else {
            PROXY_BASE_PATH
        }
    }
}

/// Client-side failures, logged and swallowed at the public boundary
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid JSON in response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Upstream returned code {0}")]
    Code(i64),

    #[error("HTTP status {0}")]
    Status(StatusCode),
}

/// Client for the music API behind the proxy
#[derive(Debug, Clone)]
pub struct MusicApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl MusicApiClient {
    /// Create a client for an explicit base URL such as `https://host/api/music`
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Create a client for an origin, picking the base path from the environment
    pub fn for_origin(client: reqwest::Client, origin: &str, env: &ClientEnvironment) -> Self {
        Self::new(
            client,
            format!("{}{}", origin.trim_end_matches('/'), env.base_path()),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Search one platform
    #[instrument(skip(self))]
    pub async fn search_songs(
        &self,
        keyword: &str,
        platform: Platform,
        limit: u32,
    ) -> Vec<SearchResult> {
        let limit = limit.to_string();
        let url = self.endpoint(&[
            ("source", platform.as_str()),
            ("type", "search"),
            ("keyword", keyword),
            ("limit", limit.as_str()),
        ]);

        match self.fetch_data::<SearchData>(&url).await {
            Ok(data) => data
                .and_then(|d| d.results)
                .unwrap_or_default()
                .into_iter()
                .filter_map(|item| item.into_result(Some(platform)))
                .collect(),
            Err(e) => {
                log_failure("Search", &e);
                Vec::new()
            }
        }
    }

    /// Search all platforms at once
    ///
    /// Items tagged with a platform this client does not know are skipped.
    #[instrument(skip(self))]
    pub async fn aggregate_search(&self, keyword: &str) -> Vec<SearchResult> {
        let url = self.endpoint(&[("type", "aggregateSearch"), ("keyword", keyword)]);

        match self.fetch_data::<SearchData>(&url).await {
            Ok(data) => data
                .and_then(|d| d.results)
                .unwrap_or_default()
                .into_iter()
                .filter_map(|item| {
                    let id = item.id.clone();
                    let result = item.into_result(None);
                    if result.is_none() {
                        debug!(id = %id, "Skipping result from unknown platform");
                    }
                    result
                })
                .collect(),
            Err(e) => {
                log_failure("Aggregate search", &e);
                Vec::new()
            }
        }
    }

    /// Song metadata
    #[instrument(skip(self))]
    pub async fn get_song_info(&self, id: &str, platform: Platform) -> Option<SongInfo> {
        let url = self.song_endpoint(id, platform, "info", None);

        match self.fetch_data::<SongInfo>(&url).await {
            Ok(info) => info,
            Err(e) => {
                log_failure("Get song info", &e);
                None
            }
        }
    }

    /// Playable stream URL; no request is made
    pub fn play_url(&self, id: &str, platform: Platform, quality: AudioQuality) -> String {
        self.song_endpoint(id, platform, "url", Some(quality))
    }

    /// Cover art URL; no request is made
    pub fn cover_url(&self, id: &str, platform: Platform) -> String {
        self.song_endpoint(id, platform, "pic", None)
    }

    /// Lyrics URL; no request is made
    pub fn lyrics_url(&self, id: &str, platform: Platform) -> String {
        self.song_endpoint(id, platform, "lrc", None)
    }

    /// Lyrics text (LRC), empty when unavailable
    #[instrument(skip(self))]
    pub async fn get_lyrics(&self, id: &str, platform: Platform) -> String {
        let url = self.lyrics_url(id, platform);

        match self.fetch_text(&url).await {
            Ok(text) => text,
            Err(e) => {
                log_failure("Get lyrics", &e);
                String::new()
            }
        }
    }

    /// Charts offered by a platform
    #[instrument(skip(self))]
    pub async fn get_top_lists(&self, platform: Platform) -> Vec<TopList> {
        let url = self.endpoint(&[("source", platform.as_str()), ("type", "toplists")]);

        match self.fetch_data::<ListData<TopList>>(&url).await {
            Ok(data) => data.and_then(|d| d.list).unwrap_or_default(),
            Err(e) => {
                log_failure("Get toplists", &e);
                Vec::new()
            }
        }
    }

    /// Songs on one chart
    #[instrument(skip(self))]
    pub async fn get_top_list_songs(&self, id: &str, platform: Platform) -> Vec<PlaylistSong> {
        let url = self.song_endpoint(id, platform, "toplist", None);

        match self.fetch_data::<ListData<PlaylistSong>>(&url).await {
            Ok(data) => data.and_then(|d| d.list).unwrap_or_default(),
            Err(e) => {
                log_failure("Get toplist songs", &e);
                Vec::new()
            }
        }
    }

    /// A platform playlist with its songs
    #[instrument(skip(self))]
    pub async fn get_external_playlist(
        &self,
        id: &str,
        platform: Platform,
    ) -> Option<ExternalPlaylist> {
        let url = self.song_endpoint(id, platform, "playlist", None);

        match self.fetch_data::<ListData<PlaylistSong>>(&url).await {
            Ok(data) => data.map(|d| ExternalPlaylist {
                info: d.info.unwrap_or_default(),
                songs: d.list.unwrap_or_default(),
            }),
            Err(e) => {
                log_failure("Get playlist", &e);
                None
            }
        }
    }

    /// `<base>/?k=v&...` with values percent-encoded
    fn endpoint(&self, params: &[(&str, &str)]) -> String {
        let query = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}/?{}", self.base_url, query)
    }

    fn song_endpoint(
        &self,
        id: &str,
        platform: Platform,
        request_type: &str,
        quality: Option<AudioQuality>,
    ) -> String {
        let mut params = vec![
            ("source", platform.as_str()),
            ("id", id),
            ("type", request_type),
        ];
        if let Some(quality) = quality {
            params.push(("br", quality.as_str()));
        }
        self.endpoint(&params)
    }

    /// GET `url` and unwrap a `{code: 200, data}` envelope
    ///
    /// `Ok(None)` means the call succeeded but carried no `data`.
    async fn fetch_data<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>, ClientError> {
        debug!(url = %url, "Requesting music API");

        let body = self.client.get(url).send().await?.text().await?;
        let envelope: Envelope<T> = serde_json::from_str(&body)?;

        if envelope.code != SUCCESS_CODE {
            return Err(ClientError::Code(envelope.code));
        }

        Ok(envelope.data)
    }

    async fn fetch_text(&self, url: &str) -> Result<String, ClientError> {
        debug!(url = %url, "Requesting music API text");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status));
        }

        Ok(response.text().await?)
    }
}

fn log_failure(operation: &str, err: &ClientError) {
    match err {
        ClientError::Code(_) | ClientError::Status(_) => {
            warn!(operation = %operation, error = %err, "Music API returned no result")
        }
        _ => error!(operation = %operation, error = %err, "Music API request failed"),
    }
}
