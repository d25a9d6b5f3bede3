use crate::docx::model::Table;
use crate::extract::header::HeaderLocation;
use crate::extract::rich_text::{extract_rich_text, StepRecord};

/// Placeholder markers that appear in template-derived MOPs regardless of
/// the authoring organization.
pub const ALWAYS_NOISE_TOKENS: &[&str] = &["DO NOT DELETE"];

/// Yields the retained step records below the header, in source order.
///
/// A row is dropped when it has no cell at the header column, when its
/// trimmed text is at most `min_chars` characters, or when its upper-cased
/// text contains the header token (page-break repeated headers), any
/// `noise_tokens` entry (matched upper-cased), or one of
/// [`ALWAYS_NOISE_TOKENS`]. `header_token` must be non-empty; config
/// validation guarantees that.
pub fn step_records<'a>(
    table: &'a Table,
    header: &HeaderLocation,
    header_token: &str,
    noise_tokens: &'a [String],
    min_chars: usize,
) -> impl Iterator<Item = StepRecord> + 'a {
    let column = header.column;
    let header_token = header_token.to_uppercase();
    table
        .rows
        .iter()
        .skip(header.row + 1)
        .filter_map(move |row| row.cells.get(column))
        .filter_map(move |cell| {
            let text = cell.text();
            let trimmed = text.trim();
            if trimmed.chars().count() <= min_chars {
                return None;
            }
            let upper = trimmed.to_uppercase();
            let noisy = upper.contains(&header_token)
                || ALWAYS_NOISE_TOKENS.iter().any(|t| upper.contains(t))
                || noise_tokens
                    .iter()
                    .any(|t| !t.is_empty() && upper.contains(&t.to_uppercase()));
            if noisy {
                return None;
            }
            Some(extract_rich_text(cell))
        })
}
