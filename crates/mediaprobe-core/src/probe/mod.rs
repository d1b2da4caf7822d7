//! Per-domain probes.
//!
//! Each probe wraps one external tool and turns its report into normalized
//! stream records:
//!
//! - [`ffprobe`]: audio and video files
//! - [`identify`]: images
//! - [`text`]: plain text and XML
//! - [`document`]: PDF and office documents
//!
//! Probes are selected by MIME type and never merge their output with one
//! another; see [`crate::MetadataNormalizer`].

pub mod document;
pub mod ffprobe;
pub mod identify;
pub mod text;
mod types;

pub use document::{parse_pdfinfo_output, probe_document};
pub use ffprobe::{
    hhmmss_to_secs, parse_ffprobe_output, probe_with_ffprobe, ratio_to_fraction, TimeBasedMedia,
};
pub use identify::{parse_identify_output, probe_with_identify};
pub use text::probe_text;
pub use types::*;
