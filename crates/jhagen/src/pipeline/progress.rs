use tracing::{info, warn};

/// Coarse conversion phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertPhase {
    LoadingDocuments,
    ExtractingSteps,
    LocatingTemplate,
    Classifying,
    Serializing,
}

/// Events emitted by the converter during processing.
pub enum ProgressEvent {
    Phase {
        phase: ConvertPhase,
        message: String,
    },
    /// One step finished classification (index is 1-based).
    StepClassified {
        index: usize,
        total: usize,
    },
    Completed {
        rows: usize,
        warnings: usize,
    },
    Failed {
        error: String,
    },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// No-op reporter for unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Reporter used by the CLI: forwards events to the tracing subscriber.
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Phase { phase, message } => info!(?phase, "{message}"),
            ProgressEvent::StepClassified { index, total } => {
                info!("Classified step {index}/{total}");
            }
            ProgressEvent::Completed { rows, warnings } => {
                if warnings > 0 {
                    warn!("Built {rows} rows ({warnings} flagged for manual review)");
                } else {
                    info!("Built {rows} rows");
                }
            }
            ProgressEvent::Failed { error } => warn!("Conversion failed: {error}"),
        }
    }
}
