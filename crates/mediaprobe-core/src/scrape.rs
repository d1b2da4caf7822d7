//! Key/value extraction from tagged text.
//!
//! Office and OpenDocument property files are small, flat XML documents. The
//! document probe pulls a handful of values out of them by pattern rather
//! than by parsing; every such lookup goes through this module so the
//! strategy can change without touching the probes.

use regex::Regex;

use crate::probe::UserData;

/// Text content of the first `<tag ...>value</tag>` element, trimmed.
///
/// Returns `None` when the element is absent or its content is blank. The
/// content must be on a single line.
pub fn element_text(haystack: &str, tag: &str) -> Option<String> {
    let tag = regex::escape(tag);
    let re = Regex::new(&format!(r"<{tag}\b.*?>(.+?)</{tag}>")).ok()?;
    let value = re.captures(haystack)?.get(1)?.as_str().trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Value of the first `name="value"` attribute in the text.
pub fn attribute(haystack: &str, name: &str) -> Option<String> {
    let name = regex::escape(name);
    let re = Regex::new(&format!(r#"{name}="([^"]*)""#)).ok()?;
    let value = re.captures(haystack)?.get(1)?.as_str();
    (!value.is_empty()).then(|| value.to_string())
}

/// Collect the text of each listed element, keyed by its local name.
///
/// `dc:creator` is stored as `creator`; elements that are missing or blank
/// are left out.
pub fn elements(haystack: &str, tags: &[&str]) -> UserData {
    tags.iter()
        .filter_map(|tag| {
            let key = tag.split_once(':').map_or(*tag, |(_, local)| local);
            element_text(haystack, tag).map(|v| (key.to_string(), v))
        })
        .collect()
}
