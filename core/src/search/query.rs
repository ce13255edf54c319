//! Provider query construction

use crate::config::{MatchMode, SearchOptions};

/// Strip one pair of matching quotes, if the whole input is wrapped in them
pub fn quoted_phrase(input: &str) -> Option<&str> {
    let trimmed = input.trim();
    for quote in ['"', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return Some(&trimmed[1..trimmed.len() - 1]);
        }
    }
    None
}

/// Lower-cased keyword tokens used for filename matching.
///
/// A quoted phrase contributes its inner words.
pub fn keyword_tokens(input: &str) -> Vec<String> {
    let text = quoted_phrase(input).unwrap_or(input);
    text.split_whitespace().map(|t| t.to_lowercase()).collect()
}

/// Build the provider query for `keywords`.
///
/// The path qualifier of the search target is always appended. Quoted
/// phrases pass through verbatim, `any` mode becomes an `OR` group and
/// `all` mode relies on the provider's implicit conjunction.
pub fn build_query(keywords: &str, options: &SearchOptions) -> String {
    let path_query = options.target.path_qualifier();
    let trimmed = keywords.trim();

    if trimmed.is_empty() {
        return path_query;
    }

    if quoted_phrase(trimmed).is_some() {
        return format!("{} {}", trimmed, path_query);
    }

    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    match options.match_mode {
        MatchMode::Any => format!("({}) {}", tokens.join(" OR "), path_query),
        MatchMode::All => format!("{} {}", tokens.join(" "), path_query),
    }
}
