//! In-memory representation of the table structure of a WordprocessingML
//! document: tables → rows → cells → paragraphs → runs.
//!
//! Only the pieces the converter needs are modeled (table text plus the
//! run-level formatting that must survive into the generated document).
//! Everything else in the package is preserved verbatim by the writer.

/// A contiguous span of text sharing one formatting set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Run {
    pub text: String,
    /// `None` means "inherit from style".
    pub bold: Option<bool>,
    /// Raw `w:highlight` value, e.g. `"yellow"`.
    pub highlight: Option<String>,
    pub font_name: Option<String>,
    /// Font size in half-points, as stored in `w:sz`.
    pub font_size_half_points: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct Paragraph {
    pub runs: Vec<Run>,
}

#[derive(Debug, Clone, Default)]
pub struct Cell {
    pub paragraphs: Vec<Paragraph>,
}

impl Cell {
    /// Concatenated run text of every paragraph, paragraphs separated by
    /// newlines.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for (i, p) in self.paragraphs.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            for run in &p.runs {
                out.push_str(&run.text);
            }
        }
        out
    }

    /// The first run of the first paragraph, if any.
    pub fn first_run(&self) -> Option<&Run> {
        self.paragraphs.first().and_then(|p| p.runs.first())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Row {
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Default)]
pub struct Table {
    pub rows: Vec<Row>,
}

/// All tables of a document in document order. Nested tables appear as
/// their own entries after their containing table.
#[derive(Debug, Clone, Default)]
pub struct DocumentTree {
    pub tables: Vec<Table>,
}
