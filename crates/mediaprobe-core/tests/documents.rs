//! Document probing through the full normalizer.

#![cfg(unix)]

mod common;

use common::FakeTools;
use mediaprobe_core::{DocumentStream, Error, ProbeResult, StreamKind, StreamRecord, Tool};

const XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const PPTX: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";

fn document(result: &ProbeResult) -> &DocumentStream {
    let records = result.streams_of(StreamKind::Document);
    assert_eq!(records.len(), 1, "expected exactly one document record");
    match &records[0] {
        StreamRecord::Document(doc) => doc,
        other => panic!("expected document record, got {other:?}"),
    }
}

#[test]
fn spreadsheet_pages_are_worksheets() {
    let mut tools = FakeTools::new();
    tools.mime(XLSX);
    let path = tools.zip_fixture(
        "budget.xlsx",
        &[
            ("[Content_Types].xml", "<Types/>"),
            ("xl/workbook.xml", "<workbook/>"),
            ("xl/worksheets/sheet1.xml", "<worksheet/>"),
            ("xl/worksheets/sheet2.xml", "<worksheet/>"),
            ("xl/worksheets/sheet3.xml", "<worksheet/>"),
        ],
    );

    let result = tools.normalizer().probe(&path).unwrap();
    let doc = document(&result);

    assert_eq!(result.container.mime_type, XLSX);
    assert_eq!(doc.position, 0);
    assert_eq!(doc.description.as_deref(), Some("Excel 2007+ Document"));
    assert_eq!(doc.pages, Some(3));
}

#[test]
fn presentation_pages_are_slides() {
    let mut tools = FakeTools::new();
    tools.mime(PPTX);
    let path = tools.zip_fixture(
        "talk.pptx",
        &[
            (
                "docProps/core.xml",
                "<cp:coreProperties><dc:title>Quarterly Review</dc:title><dc:creator>Dana</dc:creator></cp:coreProperties>",
            ),
            ("ppt/presentation.xml", "<presentation/>"),
            ("ppt/slides/slide1.xml", "<sld/>"),
            ("ppt/slides/slide2.xml", "<sld/>"),
            ("ppt/slides/_rels/slide1.xml.rels", "<Relationships/>"),
        ],
    );

    let result = tools.normalizer().probe(&path).unwrap();
    let doc = document(&result);

    assert_eq!(doc.description.as_deref(), Some("Powerpoint 2007+ Document"));
    assert_eq!(doc.pages, Some(2));
    let user_data = doc.user_data.as_ref().unwrap();
    assert_eq!(user_data["title"], "Quarterly Review");
    assert_eq!(user_data["creator"], "Dana");
}

#[test]
fn legacy_office_record_is_empty() {
    let mut tools = FakeTools::new();
    tools.mime("application/msword");
    let path = tools.fixture("memo.doc", b"\xd0\xcf\x11\xe0\xa1\xb1\x1a\xe1");

    let result = tools.normalizer().probe(&path).unwrap();
    let json = serde_json::to_value(&result.streams).unwrap();

    assert_eq!(
        json,
        serde_json::json!({"document": [{"@type": "document", "@position": 0}]})
    );
}

#[test]
fn pdf_described_by_pdfinfo() {
    let mut tools = FakeTools::new();
    tools.mime("application/pdf").printing(
        Tool::Pdfinfo,
        "Title:          Field Notes\n\
         Creator:        TeX\n\
         Producer:       pdfTeX-1.40.21\n\
         Tagged:         no\n\
         Pages:          42\n\
         Page size:      595.276 x 841.89 pts (A4)\n\
         PDF version:    1.5",
    );
    let path = tools.fixture("notes.pdf", b"%PDF-1.5\n");

    let result = tools.normalizer().probe(&path).unwrap();
    let doc = document(&result);

    assert_eq!(doc.pages, Some(42));
    assert_eq!(doc.version.as_deref(), Some("1.5"));
    assert_eq!(doc.page_size.as_deref(), Some("595.276 x 841.89 pts (A4)"));
    let user_data = doc.user_data.as_ref().unwrap();
    assert_eq!(user_data["Producer"], "pdfTeX-1.40.21");
    assert!(!user_data.contains_key("Title"));
}

#[test]
fn pdfinfo_failure_aborts_probe() {
    let mut tools = FakeTools::new();
    tools
        .mime("application/pdf")
        .failing(Tool::Pdfinfo, "Syntax Error: Could not find trailer dictionary");
    let path = tools.fixture("truncated.pdf", b"%PDF-1.4\n");

    let err = tools.normalizer().probe(&path).unwrap_err();

    assert!(matches!(err, Error::ToolFailed { ref tool, .. } if tool == "pdfinfo"));
}

#[test]
fn office_type_that_is_not_a_zip() {
    let mut tools = FakeTools::new();
    tools.mime(XLSX);
    let path = tools.fixture("mislabeled.xlsx", b"plain bytes, no archive here");

    let result = tools.normalizer().probe(&path).unwrap();

    assert_eq!(document(&result), &DocumentStream::default());
}

#[test]
fn plain_zip_is_not_a_document() {
    let mut tools = FakeTools::new();
    tools.mime("application/zip");
    let path = tools.zip_fixture("photos.zip", &[("docProps/core.xml", "<dc:title>Holiday</dc:title>")]);

    let result = tools.normalizer().probe(&path).unwrap();

    assert_eq!(result.container.mime_type, "application/zip");
    assert!(result.streams.is_empty());
}
