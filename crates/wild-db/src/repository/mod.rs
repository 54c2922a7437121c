//! Repository layer: query functions organized by domain.

pub mod animals;
pub mod comments;
pub mod discussions;
pub mod petitions;
pub mod profiles;
pub mod user_lists;
pub mod votes;

use wild_common::pagination::PageWindow;

/// `LIMIT ... OFFSET ...` suffix for an optional page window.
pub(crate) fn window_clause(window: Option<PageWindow>) -> String {
    match window {
        Some(w) => format!(" LIMIT {} OFFSET {}", w.limit, w.offset),
        None => String::new(),
    }
}

/// `LIKE` pattern matching `needle` anywhere, with wildcards escaped.
/// Use together with `ESCAPE '\'`.
pub(crate) fn contains_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
