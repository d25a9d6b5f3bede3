use crate::docx::model::{DocumentTree, Table};
use crate::extract::StepRecord;
use crate::template::ReferenceFont;

use super::error::ConvertWarning;

/// The located destination table, detached from the template tree so rows
/// can be rebuilt before serialization.
pub struct TemplateTarget {
    /// Raw bytes of the template package; the serializer rewrites these.
    pub bytes: Vec<u8>,
    /// Ordinal of the destination table in document order.
    pub table_index: usize,
    /// Working copy of the destination table (header row plus the rows
    /// built so far).
    pub table: Table,
    pub reference: ReferenceFont,
}

pub struct ConvertContext {
    // Input
    pub mop_bytes: Vec<u8>,

    // Step 1 results — guaranteed Some/non-empty after step_load_documents
    pub mop: Option<DocumentTree>,
    pub template_bytes: Vec<u8>,
    pub template_doc: Option<DocumentTree>,

    // Step 2 result — guaranteed non-empty after step_extract_steps
    pub steps: Vec<StepRecord>,

    // Step 3 result — guaranteed Some after step_locate_template
    pub target: Option<TemplateTarget>,

    // Step 5 result — the serialized output document
    pub output: Option<Vec<u8>>,

    // Non-fatal warnings (per-step classification failures)
    pub warnings: Vec<ConvertWarning>,
}

impl ConvertContext {
    pub fn new(mop_bytes: Vec<u8>) -> Self {
        Self {
            mop_bytes,
            mop: None,
            template_bytes: Vec::new(),
            template_doc: None,
            steps: Vec::new(),
            target: None,
            output: None,
            warnings: Vec::new(),
        }
    }
}
