use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Template file missing at '{path}'")]
    TemplateMissing { path: PathBuf },

    #[error("Failed to read template '{path}': {source}")]
    ReadTemplate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Document processing failed: {0}")]
    Docx(#[from] crate::error::DocxError),

    #[error("Could not find a '{primary}' / '{qualifier}' header column in the MOP")]
    HeaderNotFound { primary: String, qualifier: String },

    #[error("No work steps found below the description header")]
    NoStepsFound,

    #[error("Could not find the 'Sequence of Basic Job Steps' table in the template")]
    TargetTableNotFound,
}

#[derive(Debug, Clone)]
pub enum ConvertWarning {
    /// The classification call for one step failed; its row was written
    /// with the manual-review labels and the batch continued.
    ClassificationFailed { step: usize, error: String },
}
