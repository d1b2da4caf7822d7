//! Result assembly: container record, classification and probe dispatch.

use std::fs::Metadata;
use std::path::Path;
use std::time::UNIX_EPOCH;

use crate::probe::{self, Container, EntryType, ProbeResult, Streams};
use crate::tools::{ToolPaths, ToolRegistry};
use crate::{mime, Error, Result};

/// Probes files and normalizes the reports of the external tools into a
/// single [`ProbeResult`].
///
/// A normalizer owns one [`ToolRegistry`], so tool locations are resolved at
/// most once per instance.
///
/// # Example
///
/// ```no_run
/// use mediaprobe_core::{MetadataNormalizer, StreamKind, ToolPaths};
///
/// let normalizer = MetadataNormalizer::new(ToolPaths::default());
/// let result = normalizer.probe("/path/to/movie.mkv")?;
/// println!("{} is {}", result.container.name, result.container.mime_type);
/// for stream in result.streams_of(StreamKind::Audio) {
///     println!("audio stream at position {}", stream.position());
/// }
/// # Ok::<(), mediaprobe_core::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct MetadataNormalizer {
    tools: ToolRegistry,
}

impl MetadataNormalizer {
    /// Create a normalizer using the given tool locations.
    pub fn new(paths: ToolPaths) -> Self {
        Self {
            tools: ToolRegistry::new(paths),
        }
    }

    /// The tool registry used by this normalizer.
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Probe `path` and return its normalized metadata.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileNotFound`] if `path` does not exist. Any tool
    /// lookup, invocation or parse failure aborts the whole probe.
    pub fn probe(&self, path: impl AsRef<Path>) -> Result<ProbeResult> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::file_not_found(path),
            _ => Error::Io(e),
        })?;

        let mime_type = mime::classify(&self.tools, path)?;
        tracing::debug!("Probing {:?} as {}", path, mime_type);

        let mut container = container_record(path, &metadata, mime_type);
        let mut streams = Streams::new();

        // Later probes replace the streams of earlier ones.
        if probe::ffprobe::applies(&container.mime_type, path) {
            let media = probe::probe_with_ffprobe(&self.tools, path)?;
            container.duration = media.duration;
            container.format = media.format;
            container.tags = media.tags;
            streams = media.streams;
        }

        if probe::identify::applies(&container.mime_type) {
            streams = probe::probe_with_identify(&self.tools, path)?;
        }

        if probe::text::applies(&container.mime_type) {
            streams = probe::probe_text(&self.tools, path, &container.mime_type)?;
        }

        if probe::document::applies(&container.mime_type) {
            streams = probe::probe_document(&self.tools, path, &container.mime_type)?;
        }

        Ok(ProbeResult { container, streams })
    }
}

fn container_record(path: &Path, metadata: &Metadata, mime_type: String) -> Container {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string());

    let entry_type = if metadata.is_file() {
        EntryType::File
    } else if metadata.is_dir() {
        EntryType::Dir
    } else {
        EntryType::Other
    };

    let mtime = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0.0, |d| d.as_secs_f64());

    Container {
        name,
        size: metadata.len(),
        mtime,
        entry_type,
        mime_type,
        duration: None,
        format: None,
        tags: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_reported_before_tools_run() {
        let normalizer = MetadataNormalizer::new(ToolPaths::from_path_env());
        let err = normalizer.probe("/nonexistent/file_xyz_12345.mkv").unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn container_record_for_file_and_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, "hello").unwrap();

        let record = container_record(&file, &std::fs::metadata(&file).unwrap(), "text/plain".into());
        assert_eq!(record.name, "notes.txt");
        assert_eq!(record.size, 5);
        assert_eq!(record.entry_type, EntryType::File);
        assert!(record.mtime > 0.0);

        let record = container_record(
            dir.path(),
            &std::fs::metadata(dir.path()).unwrap(),
            "inode/directory".into(),
        );
        assert_eq!(record.entry_type, EntryType::Dir);
    }
}
