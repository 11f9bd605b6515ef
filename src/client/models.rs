//! Typed shapes for TuneHub API responses
//!
//! The upstream wraps every JSON answer as `{code, data}`; these types model
//! the `data` payloads the client reads.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Music platform served by the upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Netease,
    Kuwo,
    Qq,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Netease => "netease",
            Platform::Kuwo => "kuwo",
            Platform::Qq => "qq",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "netease" => Ok(Platform::Netease),
            "kuwo" => Ok(Platform::Kuwo),
            "qq" => Ok(Platform::Qq),
            other => Err(format!("unknown platform: {}", other)),
        }
    }
}

/// Stream quality requested through the `br` parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AudioQuality {
    #[serde(rename = "128k")]
    Standard,
    #[default]
    #[serde(rename = "320k")]
    High,
    #[serde(rename = "flac")]
    Lossless,
    #[serde(rename = "flac24bit")]
    HiRes,
}

impl AudioQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioQuality::Standard => "128k",
            AudioQuality::High => "320k",
            AudioQuality::Lossless => "flac",
            AudioQuality::HiRes => "flac24bit",
        }
    }
}

impl fmt::Display for AudioQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response envelope: `{code, data}`
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    pub data: Option<T>,
}

/// A song in search results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub id: String,
    pub name: String,
    pub artist: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    pub platform: Platform,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pic: Option<String>,
}

/// Search result item as the upstream sends it
#[derive(Debug, Deserialize)]
pub(crate) struct RawSearchItem {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub artist: String,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub pic: Option<String>,
}

impl RawSearchItem {
    /// Convert to a [`SearchResult`], falling back to `default_platform`
    ///
    /// Returns `None` when the item names a platform this client does not know
    /// and no fallback is given.
    pub(crate) fn into_result(self, default_platform: Option<Platform>) -> Option<SearchResult> {
        let platform = self
            .platform
            .as_deref()
            .and_then(|p| p.parse().ok())
            .or(default_platform)?;

        Some(SearchResult {
            id: self.id,
            name: self.name,
            artist: self.artist,
            album: self.album,
            platform,
            pic: self.pic,
        })
    }
}

/// `data` payload of search endpoints
#[derive(Debug, Deserialize)]
pub(crate) struct SearchData {
    #[serde(default)]
    pub results: Option<Vec<RawSearchItem>>,
}

/// Song metadata from `type=info`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SongInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub artist: String,
    #[serde(deserialize_with = "null_as_default")]
    pub album: String,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub pic: String,
    #[serde(deserialize_with = "null_as_default")]
    pub lrc: String,
}

/// A chart from `type=toplists`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopList {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_frequency: Option<String>,
}

/// Playlist header from `type=playlist`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaylistInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// A song in a chart or playlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistSong {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<String>>,
}

/// An external playlist with its songs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternalPlaylist {
    pub info: PlaylistInfo,
    pub songs: Vec<PlaylistSong>,
}

/// `data` payload of list endpoints (`toplists`, `toplist`, `playlist`)
#[derive(Debug, Deserialize)]
pub(crate) struct ListData<T> {
    pub list: Option<Vec<T>>,
    #[serde(default)]
    pub info: Option<PlaylistInfo>,
}

/// Accept ids sent either as JSON strings or numbers
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

/// Read `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
