//! Text and XML probing.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::types::*;
use crate::mime;
use crate::tools::ToolRegistry;
use crate::Result;

static XML_ENCODING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<\?xml[^>]+encoding=["'](.+?)["']"#).expect("valid regex"));

static XML_ROOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([a-zA-Z_].+?)[\s>]").expect("valid regex"));

/// Whether the text probe handles this MIME type.
pub fn applies(mime: &str) -> bool {
    mime.starts_with("text/") || mime.starts_with("application/xml")
}

/// Describe the text file at `path` as a single `text` stream.
///
/// XML files are additionally scanned for the declared encoding and the name
/// of the root element.
pub fn probe_text(tools: &ToolRegistry, path: &Path, mime_type: &str) -> Result<Streams> {
    let mut stream = TextStream {
        position: 0,
        encoding: mime::mime_encoding(tools, path)?,
        description: mime::describe(tools, path)?,
    };

    if mime_type.ends_with("/xml") {
        let content = std::fs::read(path)?;
        refine_xml(&mut stream, &String::from_utf8_lossy(&content));
    }

    Ok(Streams::from([(
        StreamKind::Text,
        vec![StreamRecord::Text(stream)],
    )]))
}

fn refine_xml(stream: &mut TextStream, content: &str) {
    if let Some(caps) = XML_ENCODING.captures(content) {
        stream.encoding = caps[1].to_string();
    }
    if let Some(caps) = XML_ROOT.captures(content) {
        stream.description = format!("XML Document with '{}' root node", &caps[1]);
    }
}
