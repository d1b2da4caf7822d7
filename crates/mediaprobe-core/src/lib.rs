//! # mediaprobe-core
//!
//! Normalize technical metadata about media files into one structure.
//!
//! The crate does not decode media itself. It runs well-known inspection
//! tools and reshapes their reports:
//!
//! - `file` classifies the MIME type and, for text, the encoding
//! - `ffprobe` describes audio and video files
//! - ImageMagick `identify` describes images
//! - `pdfinfo` describes PDFs; Office Open XML and OpenDocument archives are
//!   read directly
//!
//! The result is a [`ProbeResult`]: a container record plus streams grouped
//! by type, each stream carrying its `@position` in the file.
//!
//! ## Example
//!
//! ```no_run
//! let result = mediaprobe_core::probe("/path/to/report.pdf")?;
//! println!("{}", serde_json::to_string_pretty(&result)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod command;
mod error;
pub mod mime;
mod normalizer;
pub mod probe;
pub mod scrape;
pub mod tools;

// Re-exports
pub use command::{ToolCommand, ToolOutput};
pub use error::{Error, Result};
pub use normalizer::MetadataNormalizer;
pub use probe::{
    AudioStream, Container, DataStream, Dimensions, DocumentStream, EntryType, ImageStream,
    ProbeResult, Resolution, StreamKind, StreamRecord, Streams, TextStream, UserData, VideoStream,
};
pub use tools::{Tool, ToolInfo, ToolPaths, ToolRegistry};

/// Probe a file using the default tool locations.
///
/// Each call builds a fresh [`MetadataNormalizer`]; reuse one directly to
/// avoid repeated tool lookups.
pub fn probe<P: AsRef<std::path::Path>>(path: P) -> Result<ProbeResult> {
    MetadataNormalizer::default().probe(path)
}
