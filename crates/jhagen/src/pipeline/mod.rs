pub mod config;
pub mod context;
pub mod error;
pub mod progress;
pub mod runner;

pub use config::ConvertConfig;
pub use context::{ConvertContext, TemplateTarget};
pub use error::{ConvertError, ConvertWarning};
pub use progress::{ConvertPhase, LogProgress, NoopProgress, ProgressEvent, ProgressReporter};
pub use runner::{ConvertOutcome, Converter};
