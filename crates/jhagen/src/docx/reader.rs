use std::io::{Cursor, Read};

use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::Reader;

use crate::docx::model::{Cell, DocumentTree, Paragraph, Row, Run, Table};
use crate::error::DocxError;

/// Parses a .docx package from memory into a [`DocumentTree`].
pub fn read_document(bytes: &[u8]) -> Result<DocumentTree, DocxError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| DocxError::OpenPackage(e.to_string()))?;

    let xml = read_entry_to_string(&mut archive, "word/document.xml")?;
    parse_document_xml(&xml)
}

pub(crate) fn read_entry_to_string<R: Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
    name: &str,
) -> Result<String, DocxError> {
    let mut entry = archive
        .by_name(name)
        .map_err(|_| DocxError::MissingEntry(name.to_string()))?;

    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|e| DocxError::ReadEntry {
            entry: name.to_string(),
            source: e,
        })?;
    Ok(content)
}

/// Event-loop parse of `word/document.xml`.
///
/// Tables may nest (a `w:tbl` inside a `w:tc`); open tables/rows/cells are
/// kept on stacks so runs always land in the innermost open cell. Finished
/// tables are returned in document order of their opening tag, outer before
/// inner. Entity and character references inside run text are resolved.
/// Unknown elements are skipped.
pub fn parse_document_xml(xml: &str) -> Result<DocumentTree, DocxError> {
    let mut reader = Reader::from_str(xml);

    let mut finished: Vec<(usize, Table)> = Vec::new();
    let mut open_tables: Vec<(usize, Table)> = Vec::new();
    let mut open_rows: Vec<Row> = Vec::new();
    let mut open_cells: Vec<Cell> = Vec::new();
    let mut paragraph: Option<Paragraph> = None;
    let mut run: Option<Run> = None;
    let mut in_run_props = false;
    let mut in_text = false;
    let mut next_ordinal = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"tbl" => {
                    open_tables.push((next_ordinal, Table::default()));
                    next_ordinal += 1;
                }
                b"tr" if !open_tables.is_empty() => open_rows.push(Row::default()),
                b"tc" if !open_rows.is_empty() => open_cells.push(Cell::default()),
                b"p" if !open_cells.is_empty() => paragraph = Some(Paragraph::default()),
                b"r" if paragraph.is_some() => run = Some(Run::default()),
                b"rPr" if run.is_some() => in_run_props = true,
                b"t" if run.is_some() => in_text = true,
                _ => {
                    if in_run_props {
                        apply_run_property(e, run.as_mut());
                    }
                }
            },
            Ok(Event::Empty(ref e)) => {
                if in_run_props {
                    apply_run_property(e, run.as_mut());
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"tbl" => {
                    if let Some(table) = open_tables.pop() {
                        finished.push(table);
                    }
                }
                b"tr" => {
                    if let (Some(row), Some((_, table))) = (open_rows.pop(), open_tables.last_mut())
                    {
                        table.rows.push(row);
                    }
                }
                b"tc" => {
                    if let (Some(cell), Some(row)) = (open_cells.pop(), open_rows.last_mut()) {
                        row.cells.push(cell);
                    }
                }
                b"p" => {
                    if let (Some(p), Some(cell)) = (paragraph.take(), open_cells.last_mut()) {
                        cell.paragraphs.push(p);
                    }
                }
                b"r" => {
                    if let (Some(r), Some(p)) = (run.take(), paragraph.as_mut()) {
                        p.runs.push(r);
                    }
                }
                b"rPr" => in_run_props = false,
                b"t" => in_text = false,
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text {
                    if let Some(r) = run.as_mut() {
                        let decoded = e
                            .xml_content()
                            .map_err(|err| DocxError::Xml(err.to_string()))?;
                        r.text.push_str(&decoded);
                    }
                }
            }
            // `&amp;`, `&#8230;` and friends arrive as their own events.
            Ok(Event::GeneralRef(ref e)) => {
                if in_text {
                    if let Some(r) = run.as_mut() {
                        push_reference(e, &mut r.text)?;
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(DocxError::Xml(e.to_string())),
            _ => {}
        }
    }

    finished.sort_by_key(|(ordinal, _)| *ordinal);
    Ok(DocumentTree {
        tables: finished.into_iter().map(|(_, t)| t).collect(),
    })
}

/// Resolves a general entity reference into the run text.
/// WordprocessingML only carries character references and the five
/// predefined entities; anything else means a broken document part.
fn push_reference(reference: &BytesRef<'_>, out: &mut String) -> Result<(), DocxError> {
    if let Some(ch) = reference
        .resolve_char_ref()
        .map_err(|e| DocxError::Xml(e.to_string()))?
    {
        out.push(ch);
        return Ok(());
    }

    let name = reference
        .decode()
        .map_err(|e| DocxError::Xml(e.to_string()))?;
    match name.as_ref() {
        "amp" => out.push('&'),
        "lt" => out.push('<'),
        "gt" => out.push('>'),
        "apos" => out.push('\''),
        "quot" => out.push('"'),
        other => {
            return Err(DocxError::Xml(format!(
                "unresolvable entity reference '&{other};'"
            )))
        }
    }
    Ok(())
}

/// Applies one `w:rPr` child to the run being built.
fn apply_run_property(element: &BytesStart<'_>, run: Option<&mut Run>) {
    let Some(run) = run else { return };

    match element.local_name().as_ref() {
        b"b" => {
            // Presence means bold unless explicitly switched off.
            let enabled = attribute_value(element, b"val")
                .map(|v| !matches!(v.as_str(), "0" | "false" | "none"))
                .unwrap_or(true);
            run.bold = Some(enabled);
        }
        b"highlight" => {
            if let Some(value) = attribute_value(element, b"val") {
                if value != "none" {
                    run.highlight = Some(value);
                }
            }
        }
        b"rFonts" => {
            if let Some(name) = attribute_value(element, b"ascii") {
                run.font_name = Some(name);
            }
        }
        b"sz" => {
            if let Some(size) = attribute_value(element, b"val").and_then(|v| v.parse().ok()) {
                run.font_size_half_points = Some(size);
            }
        }
        _ => {}
    }
}

fn attribute_value(element: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == name)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}
