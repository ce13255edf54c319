//! Search result types

use crate::config::SearchTarget;
use crate::provider::RawMatch;
use serde::{Deserialize, Serialize};

/// File extension of definition files
pub const MARKDOWN_EXTENSION: &str = ".md";

/// `(repo, path)` identity shared by results and selections.
///
/// Ordering is lexicographic by repository, then path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdentityKey {
    pub repo: String,
    pub path: String,
}

impl IdentityKey {
    pub fn new(repo: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            path: path.into(),
        }
    }
}

/// One matched definition file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Repository, `owner/name`
    pub repo: String,
    /// Full path inside the repository
    pub path: String,
    /// Canonical web URL of the file
    pub url: String,
    /// Repository star count, 0 until enriched
    pub popularity: u64,
    /// Display path: `repo/` plus the path below the definitions root
    pub relative_path: String,
}

impl SearchResult {
    /// Build an unenriched result from a provider match
    pub fn from_match(raw: RawMatch, target: SearchTarget) -> Self {
        let relative_path = relative_path(&raw.repo, &raw.path, target);
        Self {
            repo: raw.repo,
            path: raw.path,
            url: raw.url,
            popularity: 0,
            relative_path,
        }
    }

    pub fn key(&self) -> IdentityKey {
        IdentityKey::new(self.repo.clone(), self.path.clone())
    }

    /// Lower-cased last path segment
    pub fn file_name_lowercase(&self) -> String {
        file_name(&self.path).to_lowercase()
    }
}

/// Outcome of one search, as shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Results(Vec<SearchResult>),
    NoMatches,
}

impl SearchOutcome {
    /// User-visible message for an empty search
    pub const NO_MATCHES_MESSAGE: &'static str = "no matches found";

    pub fn from_results(results: Vec<SearchResult>) -> Self {
        if results.is_empty() {
            SearchOutcome::NoMatches
        } else {
            SearchOutcome::Results(results)
        }
    }

    pub fn results(&self) -> &[SearchResult] {
        match self {
            SearchOutcome::Results(results) => results,
            SearchOutcome::NoMatches => &[],
        }
    }

    pub fn into_results(self) -> Vec<SearchResult> {
        match self {
            SearchOutcome::Results(results) => results,
            SearchOutcome::NoMatches => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.results().len()
    }

    pub fn is_empty(&self) -> bool {
        self.results().is_empty()
    }
}

/// Last segment of a `/`-separated path
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Whether the path names a markdown file
pub fn is_markdown(path: &str) -> bool {
    let name = file_name(path);
    name.len() > MARKDOWN_EXTENSION.len() && name.to_ascii_lowercase().ends_with(MARKDOWN_EXTENSION)
}

/// Display path for a match.
///
/// Everything up to and including the root marker is replaced by
/// `repo/`. The active target's marker is tried first, then the other
/// one; paths outside both roots are shown as `repo/path`.
pub fn relative_path(repo: &str, path: &str, target: SearchTarget) -> String {
    for marker in [target.root_marker(), target.other().root_marker()] {
        if let Some(idx) = path.find(marker) {
            return format!("{}/{}", repo, &path[idx + marker.len()..]);
        }
    }
    format!("{}/{}", repo, path)
}
