//! Office document and PDF probing.
//!
//! PDFs are described by `pdfinfo`. Office Open XML and OpenDocument files
//! are zip containers whose property parts are scraped directly. Legacy
//! binary Office formats are recognized but not inspected.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use zip::result::ZipError;
use zip::ZipArchive;

use super::types::*;
use crate::command::ToolCommand;
use crate::scrape;
use crate::tools::{Tool, ToolRegistry};
use crate::{Error, Result};

const OOXML_PREFIX: &str = "application/vnd.openxmlformats-officedocument.";
const ODF_PREFIX: &str = "application/vnd.oasis.opendocument.";

/// `.doc`, `.ppt` and `.xls`.
const LEGACY_TYPES: &[&str] = &[
    "application/msword",
    "application/vnd.ms-powerpoint",
    "application/vnd.ms-excel",
];

/// Properties copied from `docProps/core.xml`.
const CORE_PROPERTIES: &[&str] = &[
    "dc:creator",
    "dc:description",
    "dc:language",
    "cp:lastModifiedBy",
    "cp:revision",
    "dc:subject",
    "dc:title",
    "dcterms:modified",
    "dcterms:created",
];

/// Properties copied from OpenDocument `meta.xml`.
const ODF_PROPERTIES: &[&str] = &["meta:initial-creator", "meta:creation-date", "dc:date"];

/// Properties copied from `pdfinfo` output when non-empty.
const PDF_PROPERTIES: &[&str] = &["Creator", "Producer", "Tagged"];

static WORKSHEET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^xl/worksheets/sheet\d+\.xml").expect("valid regex"));

static SLIDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ppt/slides/slide\d+\.xml").expect("valid regex"));

/// Whether the document probe handles this MIME type.
pub fn applies(mime: &str) -> bool {
    mime == "application/pdf"
        || mime.starts_with(OOXML_PREFIX)
        || mime.starts_with(ODF_PREFIX)
        || LEGACY_TYPES.contains(&mime)
}

/// Describe the document at `path` as a single `document` stream.
///
/// Callers check [`applies`] first; any MIME type it rejects is treated as
/// a legacy Office file and yields an empty record.
pub fn probe_document(tools: &ToolRegistry, path: &Path, mime_type: &str) -> Result<Streams> {
    let document = if mime_type == "application/pdf" {
        probe_with_pdfinfo(tools, path)?
    } else if mime_type.starts_with(OOXML_PREFIX) {
        office_open_xml(File::open(path)?, path)?
    } else if mime_type.starts_with(ODF_PREFIX) {
        open_document(File::open(path)?, path, mime_type)?
    } else {
        DocumentStream::default()
    };

    Ok(Streams::from([(
        StreamKind::Document,
        vec![StreamRecord::Document(document)],
    )]))
}

fn probe_with_pdfinfo(tools: &ToolRegistry, path: &Path) -> Result<DocumentStream> {
    let output = ToolCommand::new(tools.resolve(Tool::Pdfinfo)?)
        .arg(path)
        .execute()?;

    parse_pdfinfo_output(&output.stdout)
}

/// Normalize the `Key: Value` lines printed by pdfinfo.
pub fn parse_pdfinfo_output(output: &str) -> Result<DocumentStream> {
    let mut document = DocumentStream::default();
    let mut properties = UserData::new();

    for line in output.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());

        match key {
            "PDF version" => document.version = Some(value.to_string()),
            "Pages" => {
                let pages = value.parse::<u32>().map_err(|e| {
                    Error::parse_error("pdfinfo", format!("invalid page count {value:?}: {e}"))
                })?;
                document.pages = Some(pages);
            }
            "Page size" => document.page_size = Some(value.to_string()),
            k if PDF_PROPERTIES.contains(&k) && !value.is_empty() => {
                properties.insert(k.to_string(), value.to_string());
            }
            _ => {}
        }
    }

    document.user_data = user_data(properties);
    Ok(document)
}

fn office_open_xml<R: Read + Seek>(reader: R, path: &Path) -> Result<DocumentStream> {
    let mut document = DocumentStream::default();
    let Some(mut archive) = open_archive(reader, path)? else {
        return Ok(document);
    };
    let members: Vec<String> = archive.file_names().map(str::to_string).collect();
    let has = |name: &str| members.iter().any(|m| m == name);

    if let Some(core) = read_member(&mut archive, "docProps/core.xml")? {
        document.user_data = user_data(scrape::elements(&core, CORE_PROPERTIES));
    }

    if has("word/document.xml") {
        document.description = Some("Word 2007+ Document".to_string());
        if let Some(app) = read_member(&mut archive, "docProps/app.xml")? {
            document.pages = scrape::element_text(&app, "Pages").and_then(|p| p.parse().ok());
        }
    } else if has("xl/workbook.xml") {
        document.description = Some("Excel 2007+ Document".to_string());
        document.pages = count_members(&members, &WORKSHEET);
    } else if has("ppt/presentation.xml") {
        document.description = Some("Powerpoint 2007+ Document".to_string());
        document.pages = count_members(&members, &SLIDE);
    }

    Ok(document)
}

fn open_document<R: Read + Seek>(reader: R, path: &Path, mime_type: &str) -> Result<DocumentStream> {
    let mut document = DocumentStream::default();
    let Some(mut archive) = open_archive(reader, path)? else {
        return Ok(document);
    };

    if let Some(meta) = read_member(&mut archive, "meta.xml")? {
        document.user_data = user_data(scrape::elements(&meta, ODF_PROPERTIES));
        if mime_type.ends_with("text") {
            document.pages = scrape::attribute(&meta, "page-count").and_then(|p| p.parse().ok());
        }
    }

    Ok(document)
}

fn count_members(members: &[String], pattern: &Regex) -> Option<u32> {
    u32::try_from(members.iter().filter(|m| pattern.is_match(m)).count()).ok()
}

/// Open the contents of `path` as a zip archive. Content that is not an
/// archive yields `None`; I/O failures are errors.
fn open_archive<R: Read + Seek>(reader: R, path: &Path) -> Result<Option<ZipArchive<R>>> {
    match ZipArchive::new(reader) {
        Ok(archive) => Ok(Some(archive)),
        Err(ZipError::Io(e)) => Err(Error::Io(e)),
        Err(e) => {
            tracing::debug!("{:?} is not a zip archive: {}", path, e);
            Ok(None)
        }
    }
}

/// Read an archive member as text. Missing or corrupt members yield `None`;
/// I/O failures are errors.
fn read_member<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<String>> {
    let mut member = match archive.by_name(name) {
        Ok(member) => member,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(ZipError::Io(e)) => return Err(Error::Io(e)),
        Err(e) => {
            tracing::warn!("Skipping unreadable archive member {}: {}", name, e);
            return Ok(None);
        }
    };

    let mut bytes = Vec::new();
    match member.read_to_end(&mut bytes) {
        Ok(_) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
            tracing::warn!("Skipping corrupt archive member {}: {}", name, e);
            Ok(None)
        }
        Err(e) => Err(Error::Io(e)),
    }
}
