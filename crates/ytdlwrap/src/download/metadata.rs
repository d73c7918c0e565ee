//! Metadata returned by `--dump-single-json`
//!
//! Plain serde DTOs. Only the commonly used fields are typed; everything else
//! is kept in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// `_type` of a metadata document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataType {
    #[default]
    Video,
    Playlist,
    MultiVideo,
    Url,
    UrlTransparent,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoData {
    pub id: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub webpage_url: Option<String>,
    pub ext: Option<String>,
    pub description: Option<String>,
    /// Seconds
    pub duration: Option<f64>,
    pub uploader: Option<String>,
    pub uploader_id: Option<String>,
    pub channel: Option<String>,
    /// YYYYMMDD
    pub upload_date: Option<String>,
    pub view_count: Option<u64>,
    pub like_count: Option<u64>,
    pub thumbnail: Option<String>,
    pub extractor: Option<String>,
    pub playlist: Option<String>,
    pub playlist_index: Option<u32>,
    #[serde(rename = "_type")]
    pub result_type: MetadataType,
    pub formats: Vec<FormatData>,
    pub thumbnails: Vec<ThumbnailData>,
    /// Child items of a playlist; with `--flat-playlist` only id/url/title are filled
    pub entries: Vec<VideoData>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl VideoData {
    pub fn is_playlist(&self) -> bool {
        matches!(self.result_type, MetadataType::Playlist | MetadataType::MultiVideo)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatData {
    pub format_id: Option<String>,
    pub format: Option<String>,
    pub format_note: Option<String>,
    pub url: Option<String>,
    pub ext: Option<String>,
    pub vcodec: Option<String>,
    pub acodec: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<f64>,
    /// Total bitrate in KBit/s
    pub tbr: Option<f64>,
    pub abr: Option<f64>,
    pub vbr: Option<f64>,
    pub filesize: Option<u64>,
    pub filesize_approx: Option<u64>,
    pub protocol: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailData {
    pub id: Option<String>,
    pub url: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub preference: Option<i32>,
}
