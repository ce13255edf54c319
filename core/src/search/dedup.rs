//! Identity-key deduplication

use crate::search::model::SearchResult;
use std::collections::HashSet;

/// Drop results whose `(repo, path)` was already seen, keeping first-seen
/// order, and truncate to `limit`.
pub fn deduplicate_and_limit(results: Vec<SearchResult>, limit: usize) -> Vec<SearchResult> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(results.len().min(limit));

    for result in results {
        if unique.len() >= limit {
            break;
        }
        if seen.insert(result.key()) {
            unique.push(result);
        }
    }

    unique
}

/// Distinct repositories in first-seen order
pub fn unique_repos(results: &[SearchResult]) -> Vec<String> {
    let mut seen = HashSet::new();
    results
        .iter()
        .filter(|r| seen.insert(r.repo.as_str()))
        .map(|r| r.repo.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(repo: &str, path: &str) -> SearchResult {
        SearchResult {
            repo: repo.to_string(),
            path: path.to_string(),
            url: String::new(),
            popularity: 0,
            relative_path: format!("{}/{}", repo, path),
        }
    }

    fn input() -> Vec<SearchResult> {
        vec![
            result("a/x", "one.md"),
            result("b/y", "one.md"),
            result("a/x", "one.md"),
            result("a/x", "two.md"),
            result("b/y", "one.md"),
            result("c/z", "three.md"),
        ]
    }

    #[test]
    fn test_first_seen_order_preserved() {
        let unique = deduplicate_and_limit(input(), 10);
        let keys: Vec<_> = unique.iter().map(|r| (r.repo.as_str(), r.path.as_str())).collect();
        assert_eq!(
            keys,
            vec![("a/x", "one.md"), ("b/y", "one.md"), ("a/x", "two.md"), ("c/z", "three.md")]
        );
    }

    #[test]
    fn test_cap_applies_after_dedup() {
        let unique = deduplicate_and_limit(input(), 3);
        assert_eq!(unique.len(), 3);
        assert_eq!(unique[2].path, "two.md");
    }

    #[test]
    fn test_idempotent() {
        let once = deduplicate_and_limit(input(), 10);
        let twice = deduplicate_and_limit(once.clone(), 10);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_cap_invariant() {
        for limit in 1..8 {
            assert!(deduplicate_and_limit(input(), limit).len() <= limit);
        }
    }

    #[test]
    fn test_unique_repos() {
        assert_eq!(unique_repos(&input()), vec!["a/x", "b/y", "c/z"]);
    }
}
