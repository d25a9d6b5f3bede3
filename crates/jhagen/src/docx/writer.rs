use std::io::{Cursor, Read, Write};

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use zip::write::SimpleFileOptions;

use crate::docx::model::{Row, Run};
use crate::docx::reader::read_entry_to_string;
use crate::error::DocxError;

const DOCUMENT_ENTRY: &str = "word/document.xml";

/// Serializes the template package with the target table's data rows
/// replaced by `new_rows`.
///
/// Every zip entry except `word/document.xml` is copied verbatim. Inside
/// the document part, everything outside the target table passes through
/// event-by-event, the target table's first (header) row is preserved
/// untouched, its remaining rows are dropped, and the generated rows are
/// emitted before the closing tag. `target_table` is the table's ordinal
/// in opening-tag document order, matching [`super::reader`] indices.
pub fn write_document(
    template: &[u8],
    target_table: usize,
    new_rows: &[Row],
) -> Result<Vec<u8>, DocxError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(template))
        .map_err(|e| DocxError::OpenPackage(e.to_string()))?;

    let document_xml = read_entry_to_string(&mut archive, DOCUMENT_ENTRY)?;
    let rewritten = rewrite_document_xml(&document_xml, target_table, new_rows)?;

    let mut out = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| DocxError::OpenPackage(e.to_string()))?;
        let name = entry.name().to_string();

        if entry.is_dir() {
            out.add_directory(name, options)
                .map_err(|e| DocxError::WritePackage(e.to_string()))?;
            continue;
        }

        out.start_file(&name, options)
            .map_err(|e| DocxError::WritePackage(e.to_string()))?;

        if name == DOCUMENT_ENTRY {
            out.write_all(&rewritten)
                .map_err(|e| DocxError::WritePackage(e.to_string()))?;
        } else {
            let mut content = Vec::new();
            entry
                .read_to_end(&mut content)
                .map_err(|e| DocxError::ReadEntry {
                    entry: name.clone(),
                    source: e,
                })?;
            out.write_all(&content)
                .map_err(|e| DocxError::WritePackage(e.to_string()))?;
        }
    }

    let cursor = out
        .finish()
        .map_err(|e| DocxError::WritePackage(e.to_string()))?;
    Ok(cursor.into_inner())
}

/// Rewrite phases for the event stream relative to the target table.
enum Phase {
    /// Not inside the target table yet.
    Outside,
    /// Inside the target table, before its first row.
    AwaitHeader,
    /// Copying the header row through untouched.
    Header,
    /// Dropping the template's remaining data rows.
    Skipping,
}

pub(crate) fn rewrite_document_xml(
    xml: &str,
    target_table: usize,
    new_rows: &[Row],
) -> Result<Vec<u8>, DocxError> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    let mut phase = Phase::Outside;
    let mut table_ordinal = 0usize;
    // Nesting depth of w:tbl elements relative to the target table.
    let mut tbl_depth = 0usize;

    enum Kind {
        TableStart,
        TableEnd,
        RowStart,
        RowEnd,
        Eof,
        Other,
    }

    loop {
        let event = reader.read_event().map_err(|e| DocxError::Xml(e.to_string()))?;

        let kind = match &event {
            Event::Eof => Kind::Eof,
            Event::Start(e) => match e.local_name().as_ref() {
                b"tbl" => Kind::TableStart,
                b"tr" => Kind::RowStart,
                _ => Kind::Other,
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"tbl" => Kind::TableEnd,
                b"tr" => Kind::RowEnd,
                _ => Kind::Other,
            },
            _ => Kind::Other,
        };

        match kind {
            Kind::Eof => break,
            Kind::TableStart => {
                if matches!(phase, Phase::Outside) {
                    if table_ordinal == target_table {
                        phase = Phase::AwaitHeader;
                        tbl_depth = 1;
                    }
                } else {
                    tbl_depth += 1;
                }
                table_ordinal += 1;
                if !matches!(phase, Phase::Skipping) {
                    write_event(&mut writer, event)?;
                }
            }
            Kind::TableEnd => {
                if !matches!(phase, Phase::Outside) {
                    tbl_depth -= 1;
                    if tbl_depth == 0 {
                        // Closing the target table itself.
                        for row in new_rows {
                            write_row(&mut writer, row)?;
                        }
                        phase = Phase::Outside;
                        write_event(&mut writer, event)?;
                        continue;
                    }
                }
                if !matches!(phase, Phase::Skipping) {
                    write_event(&mut writer, event)?;
                }
            }
            Kind::RowStart => {
                if matches!(phase, Phase::AwaitHeader) && tbl_depth == 1 {
                    phase = Phase::Header;
                }
                if !matches!(phase, Phase::Skipping) {
                    write_event(&mut writer, event)?;
                }
            }
            Kind::RowEnd => {
                if matches!(phase, Phase::Header) && tbl_depth == 1 {
                    write_event(&mut writer, event)?;
                    phase = Phase::Skipping;
                } else if !matches!(phase, Phase::Skipping) {
                    write_event(&mut writer, event)?;
                }
            }
            Kind::Other => {
                if !matches!(phase, Phase::Skipping) {
                    write_event(&mut writer, event)?;
                }
            }
        }
    }

    Ok(writer.into_inner().into_inner())
}

fn write_event(writer: &mut Writer<Cursor<Vec<u8>>>, event: Event<'_>) -> Result<(), DocxError> {
    writer
        .write_event(event)
        .map_err(|e| DocxError::Xml(e.to_string()))
}

/// Emits one generated `w:tr` from the model.
fn write_row(writer: &mut Writer<Cursor<Vec<u8>>>, row: &Row) -> Result<(), DocxError> {
    write_event(writer, Event::Start(BytesStart::new("w:tr")))?;

    for cell in &row.cells {
        write_event(writer, Event::Start(BytesStart::new("w:tc")))?;

        let mut tc_width = BytesStart::new("w:tcW");
        tc_width.push_attribute(("w:w", "0"));
        tc_width.push_attribute(("w:type", "auto"));
        write_event(writer, Event::Start(BytesStart::new("w:tcPr")))?;
        write_event(writer, Event::Empty(tc_width))?;
        write_event(writer, Event::End(BytesEnd::new("w:tcPr")))?;

        // A table cell must contain at least one paragraph.
        if cell.paragraphs.is_empty() {
            write_event(writer, Event::Empty(BytesStart::new("w:p")))?;
        }
        for paragraph in &cell.paragraphs {
            write_event(writer, Event::Start(BytesStart::new("w:p")))?;
            for run in &paragraph.runs {
                write_run(writer, run)?;
            }
            write_event(writer, Event::End(BytesEnd::new("w:p")))?;
        }

        write_event(writer, Event::End(BytesEnd::new("w:tc")))?;
    }

    write_event(writer, Event::End(BytesEnd::new("w:tr")))
}

fn write_run(writer: &mut Writer<Cursor<Vec<u8>>>, run: &Run) -> Result<(), DocxError> {
    write_event(writer, Event::Start(BytesStart::new("w:r")))?;

    if run.bold.is_some()
        || run.highlight.is_some()
        || run.font_name.is_some()
        || run.font_size_half_points.is_some()
    {
        write_event(writer, Event::Start(BytesStart::new("w:rPr")))?;

        // Property order follows the CT_RPr schema sequence.
        if let Some(name) = &run.font_name {
            let mut fonts = BytesStart::new("w:rFonts");
            fonts.push_attribute(("w:ascii", name.as_str()));
            fonts.push_attribute(("w:hAnsi", name.as_str()));
            write_event(writer, Event::Empty(fonts))?;
        }
        if let Some(bold) = run.bold {
            let mut b = BytesStart::new("w:b");
            if !bold {
                b.push_attribute(("w:val", "0"));
            }
            write_event(writer, Event::Empty(b))?;
        }
        if let Some(size) = run.font_size_half_points {
            let value = size.to_string();
            let mut sz = BytesStart::new("w:sz");
            sz.push_attribute(("w:val", value.as_str()));
            write_event(writer, Event::Empty(sz))?;
            let mut sz_cs = BytesStart::new("w:szCs");
            sz_cs.push_attribute(("w:val", value.as_str()));
            write_event(writer, Event::Empty(sz_cs))?;
        }
        if let Some(highlight) = &run.highlight {
            let mut hl = BytesStart::new("w:highlight");
            hl.push_attribute(("w:val", highlight.as_str()));
            write_event(writer, Event::Empty(hl))?;
        }

        write_event(writer, Event::End(BytesEnd::new("w:rPr")))?;
    }

    // Embedded newlines become explicit line breaks.
    for (i, piece) in run.text.split('\n').enumerate() {
        if i > 0 {
            write_event(writer, Event::Empty(BytesStart::new("w:br")))?;
        }
        if !piece.is_empty() {
            let mut text = BytesStart::new("w:t");
            text.push_attribute(("xml:space", "preserve"));
            write_event(writer, Event::Start(text))?;
            write_event(writer, Event::Text(BytesText::new(piece)))?;
            write_event(writer, Event::End(BytesEnd::new("w:t")))?;
        }
    }

    write_event(writer, Event::End(BytesEnd::new("w:r")))
}
