//! Time-based media probing with ffprobe.

use std::path::Path;

use serde::Deserialize;

use super::types::*;
use crate::command::ToolCommand;
use crate::tools::{Tool, ToolRegistry};
use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeFormat {
    format_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    duration: Option<f64>,
    tags: Option<UserData>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    codec_tag_string: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    duration: Option<f64>,
    sample_fmt: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    channels: Option<u32>,
    channel_layout: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    sample_rate: Option<u32>,
    #[serde(default, deserialize_with = "lenient::number")]
    bits_per_sample: Option<u32>,
    #[serde(default, deserialize_with = "lenient::number")]
    bits_per_raw_sample: Option<u32>,
    #[serde(default, deserialize_with = "lenient::number")]
    bit_rate: Option<u64>,
    #[serde(default, deserialize_with = "lenient::number")]
    width: Option<u32>,
    #[serde(default, deserialize_with = "lenient::number")]
    height: Option<u32>,
    sample_aspect_ratio: Option<String>,
    display_aspect_ratio: Option<String>,
    pix_fmt: Option<String>,
    r_frame_rate: Option<String>,
    color_space: Option<String>,
    color_transfer: Option<String>,
    profile: Option<String>,
    #[serde(default)]
    tags: UserData,
}

/// ffprobe reports most numbers as strings and a few as JSON numbers,
/// depending on field and version.
mod lenient {
    use serde::de::{self, Deserializer};
    use serde::Deserialize;
    use std::fmt::Display;
    use std::str::FromStr;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(serde_json::Number),
        Text(String),
    }

    pub fn number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
        T::Err: Display,
    {
        let text = match Option::<Raw>::deserialize(deserializer)? {
            None => return Ok(None),
            Some(Raw::Number(n)) => n.to_string(),
            Some(Raw::Text(s)) => s,
        };
        text.trim()
            .parse()
            .map(Some)
            .map_err(|e| de::Error::custom(format!("invalid number {text:?}: {e}")))
    }
}

/// Container and stream information extracted from one ffprobe report.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeBasedMedia {
    /// Container duration in seconds.
    pub duration: Option<f64>,
    /// Container format name, e.g. `matroska,webm`.
    pub format: Option<String>,
    /// Container tags, copied verbatim.
    pub tags: Option<UserData>,
    /// Audio, video and data streams.
    pub streams: Streams,
}

/// Whether the time-based probe handles this file.
///
/// Matroska files are accepted by extension because `file` often cannot
/// classify them.
pub fn applies(mime: &str, path: &Path) -> bool {
    mime.starts_with("audio/")
        || mime.starts_with("video/")
        || path.to_string_lossy().ends_with(".mkv")
}

/// Run ffprobe on `path` and normalize its report.
pub fn probe_with_ffprobe(tools: &ToolRegistry, path: &Path) -> Result<TimeBasedMedia> {
    let output = ToolCommand::new(tools.resolve(Tool::Ffprobe)?)
        .args([
            "-v",
            "0",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .execute()?;

    parse_ffprobe_output(&output.stdout)
}

/// Normalize the JSON printed by `ffprobe -show_format -show_streams`.
pub fn parse_ffprobe_output(json: &str) -> Result<TimeBasedMedia> {
    let output: FfprobeOutput =
        serde_json::from_str(json).map_err(|e| Error::parse_error("ffprobe", e.to_string()))?;

    let container_duration = output.format.duration;
    let mut streams = Streams::new();

    // Positions count every stream, not just those of the same type.
    for (position, stream) in output.streams.into_iter().enumerate() {
        let record = match stream.codec_type.as_deref() {
            Some("audio") => StreamRecord::Audio(audio_stream(position, stream, container_duration)),
            Some("video") => StreamRecord::Video(video_stream(position, stream, container_duration)),
            _ => StreamRecord::Data(DataStream {
                position,
                user_data: user_data(stream.tags),
            }),
        };
        streams.entry(record.kind()).or_default().push(record);
    }

    Ok(TimeBasedMedia {
        duration: container_duration,
        format: output.format.format_name,
        tags: output.format.tags,
        streams,
    })
}

fn audio_stream(position: usize, stream: FfprobeStream, container_duration: Option<f64>) -> AudioStream {
    let duration = stream_duration(&stream, container_duration);
    let channel_layout = stream
        .channel_layout
        .or_else(|| guess_channel_layout(stream.channels).map(str::to_string));

    AudioStream {
        position,
        codec: stream.codec_name.or(stream.codec_tag_string),
        duration,
        sample_format: stream.sample_fmt,
        channels: stream.channels,
        channel_layout,
        sample_rate: stream.sample_rate,
        bits_per_sample: bit_depth(stream.bits_per_sample, stream.bits_per_raw_sample),
        bit_rate: stream.bit_rate,
        user_data: user_data(stream.tags),
    }
}

fn video_stream(position: usize, stream: FfprobeStream, container_duration: Option<f64>) -> VideoStream {
    let duration = stream_duration(&stream, container_duration);
    let dimensions = video_dimensions(&stream);
    let frame_rate = stream.r_frame_rate.as_deref().and_then(parse_frame_rate);

    VideoStream {
        position,
        codec: stream.codec_name.or(stream.codec_tag_string),
        duration,
        dimensions,
        pixel_format: stream.pix_fmt,
        bit_rate: stream.bit_rate,
        bits_per_sample: bit_depth(stream.bits_per_sample, stream.bits_per_raw_sample),
        frame_rate,
        color_space: stream.color_space,
        color_transfer: stream.color_transfer,
        codec_profile: stream.profile,
        user_data: user_data(stream.tags),
    }
}

/// Stream duration, falling back to the Matroska `DURATION` tag and then to
/// the container duration.
fn stream_duration(stream: &FfprobeStream, container_duration: Option<f64>) -> Option<f64> {
    stream
        .duration
        .or_else(|| stream.tags.get("DURATION").and_then(|d| hhmmss_to_secs(d)))
        .or(container_duration)
}

fn guess_channel_layout(channels: Option<u32>) -> Option<&'static str> {
    match channels? {
        1 => Some("mono"),
        2 => Some("stereo"),
        _ => None,
    }
}

/// Zero means unknown for both fields.
fn bit_depth(primary: Option<u32>, raw: Option<u32>) -> Option<u32> {
    primary
        .filter(|&b| b != 0)
        .or_else(|| raw.filter(|&b| b != 0))
}

fn video_dimensions(stream: &FfprobeStream) -> Option<Dimensions> {
    let (width, height) = (stream.width?, stream.height?);
    let mut dims = Dimensions {
        width,
        height,
        ..Default::default()
    };

    if width > 0 && height > 0 {
        // Square pixels unless told otherwise.
        let sar = ratio_to_fraction(stream.sample_aspect_ratio.as_deref().unwrap_or("1:1"));
        let dar = match stream.display_aspect_ratio.as_deref() {
            Some(ratio) => ratio_to_fraction(ratio),
            None => sar.and_then(|[n, d]| {
                reduce(n.checked_mul(u64::from(width))?, d.checked_mul(u64::from(height))?)
            }),
        };
        if sar.is_none() {
            tracing::debug!("Ignoring malformed sample aspect ratio {:?}", stream.sample_aspect_ratio);
        }
        dims.sample_aspect_ratio = sar;
        dims.display_aspect_ratio = dar;
    }

    Some(dims)
}

/// Convert a `hh:mm:ss.sss` duration to seconds.
///
/// ```
/// use mediaprobe_core::probe::hhmmss_to_secs;
///
/// assert_eq!(hhmmss_to_secs("01:02:03.5"), Some(3723.5));
/// ```
pub fn hhmmss_to_secs(duration: &str) -> Option<f64> {
    let mut parts = duration.trim().split(':');
    let hours: u64 = parts.next()?.parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || !seconds.is_finite() {
        return None;
    }
    let whole = hours.checked_mul(3600)?.checked_add(minutes.checked_mul(60)?)?;
    Some(whole as f64 + seconds)
}

/// Convert an aspect ratio written as `N:D`, `N/D` or `N` into a reduced
/// `[numerator, denominator]` pair.
///
/// ```
/// use mediaprobe_core::probe::ratio_to_fraction;
///
/// assert_eq!(ratio_to_fraction("16:9"), Some([16, 9]));
/// assert_eq!(ratio_to_fraction("1920/1080"), Some([16, 9]));
/// ```
pub fn ratio_to_fraction(ratio: &str) -> Option<[u64; 2]> {
    let ratio = ratio.trim();
    match ratio.split_once([':', '/']) {
        Some((n, d)) => reduce(n.trim().parse().ok()?, d.trim().parse().ok()?),
        None => Some([ratio.parse().ok()?, 1]),
    }
}

fn reduce(numerator: u64, denominator: u64) -> Option<[u64; 2]> {
    if denominator == 0 {
        return None;
    }
    let divisor = gcd(numerator, denominator);
    Some([numerator / divisor, denominator / divisor])
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Frame rate expression (`30000/1001`, `25/1`, `25`) as frames per second,
/// rounded to two decimals.
fn parse_frame_rate(rate_str: &str) -> Option<f64> {
    let fps = match rate_str.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => rate_str.trim().parse().ok()?,
    };
    Some((fps * 100.0).round() / 100.0)
}
