//! Filename keyword filtering

use crate::config::MatchMode;
use crate::search::model::{is_markdown, SearchResult};
use crate::search::query::keyword_tokens;

/// Whether a lower-cased filename satisfies the tokens under `mode`.
/// No tokens means everything matches.
pub fn filename_matches(filename: &str, tokens: &[String], mode: MatchMode) -> bool {
    if tokens.is_empty() {
        return true;
    }

    match mode {
        MatchMode::Any => tokens.iter().any(|t| filename.contains(t.as_str())),
        MatchMode::All => tokens.iter().all(|t| filename.contains(t.as_str())),
    }
}

/// Keep markdown results whose filename matches `keywords`
pub fn filter_by_filename(
    results: Vec<SearchResult>,
    keywords: &str,
    mode: MatchMode,
) -> Vec<SearchResult> {
    let tokens = keyword_tokens(keywords);

    results
        .into_iter()
        .filter(|r| is_markdown(&r.path))
        .filter(|r| filename_matches(&r.file_name_lowercase(), &tokens, mode))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(path: &str) -> SearchResult {
        SearchResult {
            repo: "acme/tools".to_string(),
            path: path.to_string(),
            url: format!("https://github.com/acme/tools/blob/main/{}", path),
            popularity: 0,
            relative_path: format!("acme/tools/{}", path),
        }
    }

    fn paths(results: &[SearchResult]) -> Vec<&str> {
        results.iter().map(|r| r.path.as_str()).collect()
    }

    fn sample() -> Vec<SearchResult> {
        vec![
            result(".claude/agents/code-review.md"),
            result(".claude/agents/review.md"),
            result(".claude/agents/test-writer.md"),
            result(".claude/agents/Code-Linter.md"),
            result(".claude/agents/review/notes.txt"),
        ]
    }

    #[test]
    fn test_all_mode_requires_every_token() {
        let kept = filter_by_filename(sample(), "code review", MatchMode::All);
        assert_eq!(paths(&kept), vec![".claude/agents/code-review.md"]);
    }

    #[test]
    fn test_any_mode_requires_one_token() {
        let kept = filter_by_filename(sample(), "CODE test", MatchMode::Any);
        assert_eq!(
            paths(&kept),
            vec![
                ".claude/agents/code-review.md",
                ".claude/agents/test-writer.md",
                ".claude/agents/Code-Linter.md",
            ]
        );
    }

    #[test]
    fn test_only_filename_is_matched() {
        // "agents" appears in every directory but in no filename
        let kept = filter_by_filename(sample(), "agents", MatchMode::Any);
        assert!(kept.is_empty());
    }

    #[test]
    fn test_empty_keywords_keep_all_markdown() {
        let kept = filter_by_filename(sample(), "", MatchMode::All);
        assert_eq!(kept.len(), 4);
        assert!(kept.iter().all(|r| r.path.ends_with(".md")));
    }

    #[test]
    fn test_filter_properties_hold_for_every_survivor() {
        for keywords in ["code", "review code", "e", "writer test", "zzz"] {
            let tokens = keyword_tokens(keywords);
            for r in filter_by_filename(sample(), keywords, MatchMode::All) {
                let name = r.file_name_lowercase();
                assert!(tokens.iter().all(|t| name.contains(t.as_str())));
            }
            for r in filter_by_filename(sample(), keywords, MatchMode::Any) {
                let name = r.file_name_lowercase();
                assert!(tokens.iter().any(|t| name.contains(t.as_str())));
            }
        }
    }
}
