//! Selection types

use crate::provider::{RepoItem, RepoItemKind};
use crate::search::model::{file_name, is_markdown, IdentityKey, SearchResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a selection was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionSource {
    #[serde(rename = "search")]
    Search,
    #[serde(rename = "repo-browser")]
    RepoBrowser,
}

impl SelectionSource {
    pub fn as_str(&self) -> &str {
        match self {
            SelectionSource::Search => "search",
            SelectionSource::RepoBrowser => "repo-browser",
        }
    }
}

impl fmt::Display for SelectionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file picked by the user, from search results or repository browsing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalSelection {
    pub repo: String,
    pub path: String,
    pub url: String,
    pub file_name: String,
    pub source: SelectionSource,
}

impl GlobalSelection {
    pub fn from_result(result: &SearchResult) -> Self {
        Self {
            repo: result.repo.clone(),
            path: result.path.clone(),
            url: result.url.clone(),
            file_name: file_name(&result.path).to_string(),
            source: SelectionSource::Search,
        }
    }

    /// Selection for a browsed file. Directories and non-markdown files
    /// cannot be selected.
    pub fn from_repo_item(repo: &str, item: &RepoItem) -> Option<Self> {
        if item.kind != RepoItemKind::File || !is_markdown(&item.path) {
            return None;
        }

        Some(Self {
            repo: repo.to_string(),
            path: item.path.clone(),
            url: blob_url(repo, &item.path),
            file_name: item.name.clone(),
            source: SelectionSource::RepoBrowser,
        })
    }

    pub fn key(&self) -> IdentityKey {
        IdentityKey::new(self.repo.clone(), self.path.clone())
    }
}

/// Web URL of a file on the default branch
pub fn blob_url(repo: &str, path: &str) -> String {
    format!("https://github.com/{}/blob/main/{}", repo, path)
}
