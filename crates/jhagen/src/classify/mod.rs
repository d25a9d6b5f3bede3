//! Step classification: one request/response text call per work step,
//! with strict output parsing and deterministic fallbacks.

pub mod openai;
pub mod prompt;

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Label pair for an administrative step or a malformed-but-successful
/// response.
pub const NOT_APPLICABLE: &str = "N/A";

/// Label pair written when the classification call itself failed.
pub const MANUAL_REVIEW: &str = "Manual Review Required";

/// Hazard/control pair for one step. The two fields are always set
/// together: both `N/A`, both descriptive, or both the manual-review
/// fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub hazard: String,
    pub control: String,
}

impl Classification {
    pub fn administrative() -> Self {
        Self {
            hazard: NOT_APPLICABLE.to_string(),
            control: NOT_APPLICABLE.to_string(),
        }
    }

    pub fn manual_review() -> Self {
        Self {
            hazard: MANUAL_REVIEW.to_string(),
            control: MANUAL_REVIEW.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Classification request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Classification API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Classification response carried no content")]
    MissingContent,
}

/// Boundary to the external classification capability. The production
/// implementation is [`openai::OpenAiClassifier`]; tests inject fakes.
pub trait Classifier {
    fn classify(&self, step_text: &str) -> Result<Classification, ClassifyError>;
}

fn boilerplate_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(output|response|answer|step \d+|analysis)[:\s-]*")
            .expect("prefix pattern is valid")
    })
}

/// Normalizes raw model output: strips known leading boilerplate
/// ("Output:", "Step 3 -", ...), removes quote characters, trims.
/// Idempotent on already-clean input.
pub fn clean_response(text: &str) -> String {
    let stripped = boilerplate_prefix().replace(text.trim(), "");
    stripped.replace(['"', '\''], "").trim().to_string()
}

/// Parses a cleaned response into a label pair. Split on the first pipe;
/// a response without a pipe parsed but named no hazard, so it degrades
/// to `N/A | N/A` rather than an error.
pub fn parse_classification(cleaned: &str) -> Classification {
    match cleaned.split_once('|') {
        Some((hazard, control)) => Classification {
            hazard: hazard.trim().to_string(),
            control: control.trim().to_string(),
        },
        None => Classification::administrative(),
    }
}
