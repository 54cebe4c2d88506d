//! Minimal Word document writer for test case exports.
//!
//! Builds a bare WordprocessingML package in memory: `[Content_Types].xml`,
//! the package relationships, and `word/document.xml`, zipped into a .docx.
//! Word and LibreOffice open these without a styles part; headings carry
//! direct bold/size formatting instead.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::entity::{step, test_case};
use crate::error::{AppError, AppResult};

const CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
    r#"</Types>"#
);

const PACKAGE_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
    r#"</Relationships>"#
);

const DOCUMENT_OPEN: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
    r#"<w:body>"#
);

const DOCUMENT_CLOSE: &str = r#"<w:sectPr/></w:body></w:document>"#;

/// Escape text for embedding in document XML.
fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn archive_error(e: impl std::fmt::Display) -> AppError {
    AppError::FileSystem(format!("Failed to assemble document: {}", e))
}

/// Incremental builder for one document body.
#[derive(Default)]
pub struct DocxBuilder {
    body: String,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bold heading. Level 1 renders at 16pt, anything deeper at
    /// 14pt (`w:sz` counts half-points).
    pub fn heading(&mut self, text: &str, level: u8) -> &mut Self {
        let size = if level <= 1 { 32 } else { 28 };
        self.body.push_str(&format!(
            concat!(
                r#"<w:p><w:pPr><w:pStyle w:val="Heading{level}"/></w:pPr>"#,
                r#"<w:r><w:rPr><w:b/><w:sz w:val="{size}"/></w:rPr>"#,
                r#"<w:t xml:space="preserve">{text}</w:t></w:r></w:p>"#
            ),
            level = level,
            size = size,
            text = escape_xml(text)
        ));
        self
    }

    /// Append a plain paragraph.
    pub fn paragraph(&mut self, text: &str) -> &mut Self {
        self.body.push_str(&format!(
            r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
            escape_xml(text)
        ));
        self
    }

    /// Append a bordered table with a bold header row.
    pub fn table(&mut self, header: &[&str], rows: &[Vec<String>]) -> &mut Self {
        self.body.push_str(concat!(
            r#"<w:tbl><w:tblPr><w:tblW w:w="0" w:type="auto"/><w:tblBorders>"#,
            r#"<w:top w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
            r#"<w:left w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
            r#"<w:bottom w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
            r#"<w:right w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
            r#"<w:insideH w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
            r#"<w:insideV w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
            r#"</w:tblBorders></w:tblPr>"#
        ));

        self.body.push_str("<w:tr>");
        for cell in header {
            self.body.push_str(&format!(
                concat!(
                    r#"<w:tc><w:p><w:r><w:rPr><w:b/></w:rPr>"#,
                    r#"<w:t xml:space="preserve">{}</w:t></w:r></w:p></w:tc>"#
                ),
                escape_xml(cell)
            ));
        }
        self.body.push_str("</w:tr>");

        for row in rows {
            self.body.push_str("<w:tr>");
            for cell in row {
                self.body.push_str(&format!(
                    r#"<w:tc><w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p></w:tc>"#,
                    escape_xml(cell)
                ));
            }
            self.body.push_str("</w:tr>");
        }
        self.body.push_str("</w:tbl>");
        self
    }

    /// Append a page break.
    pub fn page_break(&mut self) -> &mut Self {
        self.body
            .push_str(r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#);
        self
    }

    /// Zip the package and return the .docx bytes.
    pub fn build(&self) -> AppResult<Vec<u8>> {
        let document = format!("{}{}{}", DOCUMENT_OPEN, self.body, DOCUMENT_CLOSE);

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        writer
            .start_file("[Content_Types].xml", options)
            .map_err(archive_error)?;
        writer
            .write_all(CONTENT_TYPES.as_bytes())
            .map_err(archive_error)?;

        writer
            .start_file("_rels/.rels", options)
            .map_err(archive_error)?;
        writer
            .write_all(PACKAGE_RELS.as_bytes())
            .map_err(archive_error)?;

        writer
            .start_file("word/document.xml", options)
            .map_err(archive_error)?;
        writer
            .write_all(document.as_bytes())
            .map_err(archive_error)?;

        let cursor = writer.finish().map_err(archive_error)?;
        Ok(cursor.into_inner())
    }
}

/// Header row shared by every step table.
const STEP_TABLE_HEADER: [&str; 3] = ["Steps", "Expected Result", "Actual Result"];

fn step_rows(steps: &[step::Model]) -> Vec<Vec<String>> {
    steps
        .iter()
        .map(|s| {
            vec![
                s.description.clone(),
                s.expected_result.clone(),
                s.actual_result.clone().unwrap_or_default(),
            ]
        })
        .collect()
}

/// Render a single test case export document.
pub fn test_case_document(case: &test_case::Model, steps: &[step::Model]) -> AppResult<Vec<u8>> {
    let mut doc = DocxBuilder::new();
    doc.heading(&case.name, 1);
    doc.paragraph(&format!("Description: {}", case.description));
    if !case.precondition.is_empty() {
        doc.paragraph(&format!("Precondition: {}", case.precondition));
    }
    if !case.postcondition.is_empty() {
        doc.paragraph(&format!("Postcondition: {}", case.postcondition));
    }
    if !case.comment.is_empty() {
        doc.paragraph(&format!("Comment: {}", case.comment));
    }
    doc.paragraph(&format!("Status: {}", case.status));
    doc.paragraph(&format!("Priority: {}", case.priority));
    if !case.category.is_empty() {
        doc.paragraph(&format!("Category: {}", case.category));
    }
    if !case.tags.is_empty() {
        doc.paragraph(&format!("Tags: {}", case.tags));
    }
    doc.table(&STEP_TABLE_HEADER, &step_rows(steps));
    doc.build()
}

/// Render the bulk export document: one section per test case, separated by
/// page breaks.
pub fn bulk_document(cases: &[(test_case::Model, Vec<step::Model>)]) -> AppResult<Vec<u8>> {
    let mut doc = DocxBuilder::new();
    doc.heading("Bulk Test Cases Export", 1);
    for (case, steps) in cases {
        doc.heading(&case.name, 2);
        doc.paragraph(&format!("Description: {}", case.description));
        doc.paragraph(&format!("Status: {}, Priority: {}", case.status, case.priority));
        doc.table(&STEP_TABLE_HEADER, &step_rows(steps));
        doc.page_break();
    }
    doc.build()
}
