use crate::attendance::AttendanceRecord;
use anyhow::Context;
use sha2::{Digest, Sha256};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const SHEET_NAME: &str = "Attendance";
pub const HEADER: [&str; 3] = ["RollNo", "Name", "Status"];

const CONTENT_TYPES_ENTRY: &str = "[Content_Types].xml";
const ROOT_RELS_ENTRY: &str = "_rels/.rels";
const WORKBOOK_ENTRY: &str = "xl/workbook.xml";
const WORKBOOK_RELS_ENTRY: &str = "xl/_rels/workbook.xml.rels";
const SHEET_ENTRY: &str = "xl/worksheets/sheet1.xml";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub bytes: usize,
    pub sha256: String,
    pub row_count: usize,
}

/// `Attendance_<date>.xlsx`, with path separators and other characters
/// file systems reject replaced by `_`.
pub fn export_file_name(date: &str) -> String {
    let safe: String = date
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("{}_{}.xlsx", SHEET_NAME, safe)
}

pub fn workbook_bytes(record: &AttendanceRecord) -> anyhow::Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts: [(&str, String); 5] = [
        (CONTENT_TYPES_ENTRY, CONTENT_TYPES_XML.to_string()),
        (ROOT_RELS_ENTRY, ROOT_RELS_XML.to_string()),
        (WORKBOOK_ENTRY, workbook_xml()),
        (WORKBOOK_RELS_ENTRY, WORKBOOK_RELS_XML.to_string()),
        (SHEET_ENTRY, sheet_xml(record)),
    ];
    for (name, body) in parts.iter() {
        zip.start_file(*name, opts)
            .with_context(|| format!("failed to start {} entry", name))?;
        zip.write_all(body.as_bytes())
            .with_context(|| format!("failed to write {} entry", name))?;
    }

    let cursor = zip.finish().context("failed to finalize workbook")?;
    Ok(cursor.into_inner())
}

pub fn export_workbook(record: &AttendanceRecord, out_dir: &Path) -> anyhow::Result<ExportSummary> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create directory {}", out_dir.to_string_lossy()))?;
    let bytes = workbook_bytes(record)?;
    let path = out_dir.join(export_file_name(&record.date));
    std::fs::write(&path, &bytes)
        .with_context(|| format!("failed to write workbook {}", path.to_string_lossy()))?;

    Ok(ExportSummary {
        path,
        bytes: bytes.len(),
        sha256: format!("{:x}", Sha256::digest(&bytes)),
        row_count: record.data.len(),
    })
}

fn workbook_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        xml_escape(SHEET_NAME)
    )
}

fn sheet_xml(record: &AttendanceRecord) -> String {
    let mut rows = String::new();
    rows.push_str(r#"<row r="1">"#);
    for (col, title) in HEADER.iter().enumerate() {
        rows.push_str(&inline_str_cell(col, 1, title));
    }
    rows.push_str("</row>");

    for (i, entry) in record.data.iter().enumerate() {
        let r = i + 2;
        rows.push_str(&format!(r#"<row r="{}">"#, r));
        rows.push_str(&format!(
            r#"<c r="{}"><v>{}</v></c>"#,
            cell_ref(0, r),
            entry.roll_no
        ));
        rows.push_str(&inline_str_cell(1, r, &entry.name));
        rows.push_str(&inline_str_cell(2, r, entry.status.as_str()));
        rows.push_str("</row>");
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
        rows
    )
}

fn inline_str_cell(col: usize, row: usize, text: &str) -> String {
    format!(
        r#"<c r="{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
        cell_ref(col, row),
        xml_escape(text)
    )
}

fn cell_ref(col: usize, row: usize) -> String {
    // Three columns only; single letters suffice.
    let letter = (b'A' + col as u8) as char;
    format!("{}{}", letter, row)
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if c.is_control() && c != '\t' && c != '\n' && c != '\r' => {}
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_follows_date() {
        assert_eq!(export_file_name("2024-01-10"), "Attendance_2024-01-10.xlsx");
        assert_eq!(export_file_name("10/01/2024"), "Attendance_10_01_2024.xlsx");
    }

    #[test]
    fn escape_handles_markup_characters() {
        assert_eq!(xml_escape("O'Neil & <Co>"), "O&apos;Neil &amp; &lt;Co&gt;");
        assert_eq!(xml_escape("a\u{1}b"), "ab");
    }

    #[test]
    fn cell_refs_are_column_letter_then_row() {
        assert_eq!(cell_ref(0, 1), "A1");
        assert_eq!(cell_ref(2, 9), "C9");
    }
}
