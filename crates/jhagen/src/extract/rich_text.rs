use crate::docx::model::Cell;

/// A span of step text with the formatting that must be carried into the
/// generated document.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledSegment {
    pub text: String,
    /// `None` means "inherit from style" and is treated as not bold when
    /// cloning.
    pub bold: Option<bool>,
    pub highlight: Option<String>,
}

/// One retained source step. `plain_text` always equals the concatenation
/// of the segment texts, trimmed.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    pub plain_text: String,
    pub segments: Vec<StyledSegment>,
}

/// Extracts text segments from a cell with their original bold/highlight
/// formatting. A cell without runs yields an empty record.
pub fn extract_rich_text(cell: &Cell) -> StepRecord {
    let mut segments = Vec::new();
    let mut plain_text = String::new();

    for paragraph in &cell.paragraphs {
        for run in &paragraph.runs {
            if run.text.is_empty() {
                continue;
            }
            plain_text.push_str(&run.text);
            segments.push(StyledSegment {
                text: run.text.clone(),
                bold: run.bold,
                highlight: run.highlight.clone(),
            });
        }
    }

    StepRecord {
        plain_text: plain_text.trim().to_string(),
        segments,
    }
}
