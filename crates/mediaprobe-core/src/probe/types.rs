//! Normalized probe result types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Free-form tag name to value mapping carried by streams and containers.
pub type UserData = BTreeMap<String, String>;

/// Stream buckets keyed by stream type, each in order of appearance.
pub type Streams = BTreeMap<StreamKind, Vec<StreamRecord>>;

/// Everything known about one probed file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// File-level metadata.
    pub container: Container,
    /// Per-stream metadata, grouped by stream type.
    pub streams: Streams,
}

impl ProbeResult {
    /// Streams of the given type, in order of appearance.
    pub fn streams_of(&self, kind: StreamKind) -> &[StreamRecord] {
        self.streams.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of stream records across all buckets.
    pub fn stream_count(&self) -> usize {
        self.streams.values().map(Vec::len).sum()
    }
}

/// Kind of filesystem entry that was probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    File,
    Dir,
    Other,
}

/// Top-level file metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    /// Base name of the file.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Modification time in seconds since the Unix epoch.
    pub mtime: f64,
    /// Filesystem entry type.
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    /// Classified MIME type.
    pub mime_type: String,
    /// Container duration in seconds, for time-based media.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Container format name, for time-based media.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Container-level tags, copied verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<UserData>,
}

/// Stream bucket names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Audio,
    Video,
    Image,
    Text,
    Data,
    Document,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StreamKind::Audio => "audio",
            StreamKind::Video => "video",
            StreamKind::Image => "image",
            StreamKind::Text => "text",
            StreamKind::Data => "data",
            StreamKind::Document => "document",
        };
        f.write_str(s)
    }
}

/// One stream record, tagged by `@type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type", rename_all = "lowercase")]
pub enum StreamRecord {
    Audio(AudioStream),
    Video(VideoStream),
    Image(ImageStream),
    Text(TextStream),
    Data(DataStream),
    Document(DocumentStream),
}

impl StreamRecord {
    /// The bucket this record belongs in.
    pub fn kind(&self) -> StreamKind {
        match self {
            StreamRecord::Audio(_) => StreamKind::Audio,
            StreamRecord::Video(_) => StreamKind::Video,
            StreamRecord::Image(_) => StreamKind::Image,
            StreamRecord::Text(_) => StreamKind::Text,
            StreamRecord::Data(_) => StreamKind::Data,
            StreamRecord::Document(_) => StreamKind::Document,
        }
    }

    /// Zero-based position of the record within the probed file.
    pub fn position(&self) -> usize {
        match self {
            StreamRecord::Audio(s) => s.position,
            StreamRecord::Video(s) => s.position,
            StreamRecord::Image(s) => s.position,
            StreamRecord::Text(s) => s.position,
            StreamRecord::Data(s) => s.position,
            StreamRecord::Document(s) => s.position,
        }
    }
}

/// An audio track.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioStream {
    #[serde(rename = "@position")]
    pub position: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
    /// Duration in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_layout: Option<String>,
    /// Sample rate in Hz.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bits_per_sample: Option<u32>,
    /// Bit rate in bits per second.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bit_rate: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<UserData>,
}

/// A video track.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoStream {
    #[serde(rename = "@position")]
    pub position: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
    /// Duration in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixel_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bit_rate: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bits_per_sample: Option<u32>,
    /// Frames per second, rounded to two decimals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_space: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_transfer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec_profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<UserData>,
}

/// A stream that is neither audio nor video (subtitles, timecode, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataStream {
    #[serde(rename = "@position")]
    pub position: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<UserData>,
}

/// One image (or frame of a multi-image file).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageStream {
    #[serde(rename = "@position")]
    pub position: usize,
    pub dimensions: Dimensions,
    pub pixel_type: String,
    pub codec: String,
    pub bit_depth: u32,
    pub compression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_profile: Option<String>,
}

/// Character-level information about a text file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextStream {
    #[serde(rename = "@position")]
    pub position: usize,
    pub encoding: String,
    pub description: String,
}

/// An office or PDF document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentStream {
    #[serde(rename = "@position")]
    pub position: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<UserData>,
}

/// Pixel dimensions plus optional aspect ratio and resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
    /// Reduced `[numerator, denominator]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_aspect_ratio: Option<[u64; 2]>,
    /// Reduced `[numerator, denominator]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_aspect_ratio: Option<[u64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
}

/// Physical resolution of an image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub horizontal: f64,
    pub vertical: f64,
    /// Lower-cased unit name, e.g. `inch` or `centimeter`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Turn a possibly-empty tag map into the `user_data` representation.
pub(crate) fn user_data(tags: UserData) -> Option<UserData> {
    if tags.is_empty() {
        None
    } else {
        Some(tags)
    }
}
