//! MIME type classification using `file`.

use std::path::Path;

use crate::command::ToolCommand;
use crate::tools::{Tool, ToolRegistry};
use crate::Result;

/// MIME type forced for YAML files, which `file` reports as plain text.
pub const YAML_MIME: &str = "application/x-yaml";

/// Determine the MIME type of `path`.
///
/// The raw `file --mime-type` answer is adjusted for two known blind spots:
/// `.yaml` files are reported as [`YAML_MIME`], and MPEG program streams that
/// `file` mistakes for Targa images are reported as `video/mpeg`.
pub fn classify(tools: &ToolRegistry, path: &Path) -> Result<String> {
    let raw = run_file(tools, path, &["--brief", "--mime-type", "--dereference"])?;
    let mime = apply_name_override(path, raw);

    if mime == "image/x-tga" {
        let extended = run_file(tools, path, &["-k", "--dereference"])?;
        return Ok(apply_extended_override(mime, &extended));
    }

    Ok(mime)
}

/// Character encoding of `path` as reported by `file --mime-encoding`.
pub fn mime_encoding(tools: &ToolRegistry, path: &Path) -> Result<String> {
    run_file(tools, path, &["--brief", "--mime-encoding", "--dereference"])
}

/// Human readable description of `path` as reported by `file`.
pub fn describe(tools: &ToolRegistry, path: &Path) -> Result<String> {
    run_file(tools, path, &["--brief", "--dereference"])
}

fn run_file(tools: &ToolRegistry, path: &Path, flags: &[&str]) -> Result<String> {
    let output = ToolCommand::new(tools.resolve(Tool::File)?)
        .args(flags)
        .arg(path)
        .execute()?;
    Ok(output.stdout.trim_end().to_string())
}

fn apply_name_override(path: &Path, mime: String) -> String {
    if path.to_string_lossy().ends_with(".yaml") {
        tracing::debug!("Treating {:?} as YAML (was {})", path, mime);
        return YAML_MIME.to_string();
    }
    mime
}

fn apply_extended_override(mime: String, extended: &str) -> String {
    if extended.contains("MPEG") {
        tracing::debug!("Targa detection looks like an MPEG stream: {}", extended);
        return "video/mpeg".to_string();
    }
    mime
}
