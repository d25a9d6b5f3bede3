//! Destination-table handling: locating the JHA template's step table,
//! clearing its stale data rows, and appending one styled row per
//! classified step.

use crate::classify::Classification;
use crate::docx::model::{Cell, DocumentTree, Paragraph, Row, Run, Table};
use crate::extract::StepRecord;

/// The destination table is the first one whose first cell reads like
/// "Sequence of Basic Job Steps".
pub const TARGET_TABLE_MARKER: &str = "Sequence";

/// Font cloned onto every generated run. Name is always applied; size only
/// when the template's reference run specifies one, so an inherited
/// default stays inherited.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceFont {
    pub name: Option<String>,
    pub size_half_points: Option<u32>,
}

/// First table whose first row's first cell text contains
/// [`TARGET_TABLE_MARKER`].
pub fn locate_target_table(doc: &DocumentTree) -> Option<usize> {
    doc.tables.iter().position(|table| {
        table
            .rows
            .first()
            .and_then(|row| row.cells.first())
            .is_some_and(|cell| cell.text().contains(TARGET_TABLE_MARKER))
    })
}

/// Reads the cloning font from the template's second row (its sample data
/// row), first cell, first run. A template without a sample row yields an
/// empty reference and generated runs inherit the document defaults.
pub fn reference_font(table: &Table) -> ReferenceFont {
    table
        .rows
        .get(1)
        .and_then(|row| row.cells.first())
        .and_then(Cell::first_run)
        .map(|run| ReferenceFont {
            name: run.font_name.clone(),
            size_half_points: run.font_size_half_points,
        })
        .unwrap_or_default()
}

/// Drops every row after the header; stale sample data never leaks into
/// the output.
pub fn clear_data_rows(table: &mut Table) {
    table.rows.truncate(1);
}

/// Appends the row for one classified step.
///
/// Column 1 holds a bold `Step {index}:` prefix, a line break, then one
/// run per source segment with its bold/highlight re-applied over the
/// cloned font. Columns 2 and 3 hold the hazard and control labels.
/// `index` is 1-based.
pub fn append_step_row(
    table: &mut Table,
    step: &StepRecord,
    classification: &Classification,
    index: usize,
    reference: &ReferenceFont,
) {
    let mut runs = Vec::with_capacity(step.segments.len() + 2);
    runs.push(styled_run(
        format!("Step {index}:"),
        Some(true),
        None,
        reference,
    ));
    runs.push(Run {
        text: "\n".to_string(),
        ..Run::default()
    });
    for segment in &step.segments {
        // Segment formatting wins over the template default; the font
        // always comes from the reference, never from the source.
        let bold = (segment.bold == Some(true)).then_some(true);
        runs.push(styled_run(
            segment.text.clone(),
            bold,
            segment.highlight.clone(),
            reference,
        ));
    }

    table.rows.push(Row {
        cells: vec![
            Cell {
                paragraphs: vec![Paragraph { runs }],
            },
            label_cell(&classification.hazard, reference),
            label_cell(&classification.control, reference),
        ],
    });
}

fn styled_run(
    text: String,
    bold: Option<bool>,
    highlight: Option<String>,
    reference: &ReferenceFont,
) -> Run {
    Run {
        text,
        bold,
        highlight,
        font_name: reference.name.clone(),
        font_size_half_points: reference.size_half_points,
    }
}

fn label_cell(text: &str, reference: &ReferenceFont) -> Cell {
    Cell {
        paragraphs: vec![Paragraph {
            runs: vec![styled_run(text.to_string(), None, None, reference)],
        }],
    }
}
