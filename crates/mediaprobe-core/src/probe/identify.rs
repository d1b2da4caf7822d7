//! Image probing with ImageMagick `identify`.

use std::path::Path;

use serde::Deserialize;

use super::types::*;
use crate::command::ToolCommand;
use crate::tools::{Tool, ToolRegistry};
use crate::{Error, Result};

/// `identify -format` template. Each frame renders as one JSON object
/// followed by a comma.
const FORMAT_TEMPLATE: &str = r#"{
    "dimensions": {
        "width": %[width],
        "height": %[height],
        "resolution": {
            "horizontal": %[resolution.x],
            "vertical": %[resolution.y],
            "unit": "%[units]"
        }
    },
    "pixel_type": "%[channels]",
    "codec": "%[magick]",
    "bit_depth": %[bit-depth],
    "compression": "%[compression]",
    "color_profile": "%[profile:icc]"
},"#;

/// Prefix of the ImageMagick `PixelsPerInch` / `PixelsPerCentimeter` units.
const UNIT_PREFIX: &str = "PixelsPer";

#[derive(Debug, Deserialize)]
struct IdentifyImage {
    dimensions: IdentifyDimensions,
    pixel_type: String,
    codec: String,
    bit_depth: u32,
    compression: String,
    color_profile: String,
}

#[derive(Debug, Deserialize)]
struct IdentifyDimensions {
    width: u32,
    height: u32,
    resolution: IdentifyResolution,
}

#[derive(Debug, Deserialize)]
struct IdentifyResolution {
    horizontal: f64,
    vertical: f64,
    unit: String,
}

/// Whether the image probe handles this MIME type.
pub fn applies(mime: &str) -> bool {
    mime.starts_with("image/")
}

/// Run identify on `path` and return one image record per frame.
pub fn probe_with_identify(tools: &ToolRegistry, path: &Path) -> Result<Streams> {
    let output = ToolCommand::new(tools.resolve(Tool::Identify)?)
        .arg("-format")
        .arg(FORMAT_TEMPLATE)
        .arg(path)
        .execute()?;

    parse_identify_output(&output.stdout)
}

/// Normalize the concatenated template output into an `image` bucket.
pub fn parse_identify_output(output: &str) -> Result<Streams> {
    let body = output.trim_end().trim_end_matches(',');
    let images: Vec<IdentifyImage> = serde_json::from_str(&format!("[{body}]"))
        .map_err(|e| Error::parse_error("identify", e.to_string()))?;

    let records = images
        .into_iter()
        .enumerate()
        .map(|(position, image)| StreamRecord::Image(image_stream(position, image)))
        .collect();

    Ok(Streams::from([(StreamKind::Image, records)]))
}

fn image_stream(position: usize, image: IdentifyImage) -> ImageStream {
    let IdentifyDimensions {
        width,
        height,
        resolution,
    } = image.dimensions;

    let resolution = (resolution.horizontal != 0.0 && resolution.vertical != 0.0).then(|| Resolution {
        horizontal: resolution.horizontal,
        vertical: resolution.vertical,
        unit: resolution_unit(&resolution.unit),
    });

    ImageStream {
        position,
        dimensions: Dimensions {
            width,
            height,
            resolution,
            ..Default::default()
        },
        pixel_type: image.pixel_type.to_lowercase(),
        codec: image.codec.to_lowercase(),
        bit_depth: image.bit_depth,
        compression: image.compression.to_lowercase(),
        color_profile: (!image.color_profile.is_empty()).then_some(image.color_profile),
    }
}

/// `PixelsPerInch` becomes `inch`; `Undefined` and anything else is dropped.
fn resolution_unit(unit: &str) -> Option<String> {
    unit.strip_prefix(UNIT_PREFIX)
        .filter(|rest| !rest.is_empty())
        .map(str::to_lowercase)
}
