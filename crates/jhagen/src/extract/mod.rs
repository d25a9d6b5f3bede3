pub mod header;
pub mod rich_text;
pub mod steps;

pub use header::{locate_header, HeaderLocation, HEADER_SCAN_ROWS};
pub use rich_text::{extract_rich_text, StepRecord, StyledSegment};
pub use steps::{step_records, ALWAYS_NOISE_TOKENS};
