//! Extraction of emoji names from the destination's customize page.
//!
//! The page lists every emoji as a `:name:` token inside a table cell, next
//! to cells holding the author, date and other free text.

use crate::models::ExistingSet;

/// How strictly a cell must look like `:name:` to count as an emoji name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanMode {
    /// Any cell containing a colon-delimited token counts; the first token's
    /// inner text is recorded.
    #[default]
    Permissive,
    /// Only cells whose entire trimmed text is one `:name:` token count.
    Strict,
}

/// Collects emoji names from the text of table cells.
///
/// # Examples
///
/// ```
/// use emoji_mover_core::scan::{extract_names, ScanMode};
///
/// let cells = [":smile:", "notes", ":wave:"];
/// let names = extract_names(cells, ScanMode::Permissive);
/// assert!(names.contains("smile") && names.contains("wave"));
/// assert_eq!(names.len(), 2);
/// ```
pub fn extract_names<I, S>(cells: I, mode: ScanMode) -> ExistingSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    cells
        .into_iter()
        .filter_map(|cell| {
            let text = cell.as_ref();
            let name = match mode {
                ScanMode::Permissive => first_token(text),
                ScanMode::Strict => whole_token(text),
            };
            name.map(str::to_string)
        })
        .collect()
}

/// Inner text of the first `:token:` in `text`, where the token is non-empty
/// and holds neither colons nor whitespace.
fn first_token(text: &str) -> Option<&str> {
    let mut rest = text;
    while let Some(open) = rest.find(':') {
        let after = &rest[open + 1..];
        let close = after.find(':')?;
        let inner = &after[..close];
        if is_token(inner) {
            return Some(inner);
        }
        // The closing colon may open the next token.
        rest = &after[close..];
    }
    None
}

fn whole_token(text: &str) -> Option<&str> {
    let inner = text.trim().strip_prefix(':')?.strip_suffix(':')?;
    is_token(inner).then_some(inner)
}

fn is_token(inner: &str) -> bool {
    !inner.is_empty() && !inner.chars().any(|c| c == ':' || c.is_whitespace())
}
