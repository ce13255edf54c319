//! Provider traits and the raw data they exchange with the engine

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One provider call for a bounded batch of matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    /// Provider query string
    pub query: String,
    /// Maximum matches wanted from this call
    pub limit: usize,
    /// Raw matches already consumed by earlier batches of the same query
    pub offset: usize,
}

impl BatchRequest {
    pub fn new(query: impl Into<String>, limit: usize) -> Self {
        Self {
            query: query.into(),
            limit,
            offset: 0,
        }
    }

    /// Start the batch after the first `offset` raw matches
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

/// A match as reported by the provider, before any filtering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMatch {
    /// Repository identifier, `owner/name`
    pub repo: String,
    /// Path of the file inside the repository
    pub path: String,
    /// Canonical web URL of the file
    pub url: String,
}

impl RawMatch {
    pub fn new(repo: impl Into<String>, path: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            path: path.into(),
            url: url.into(),
        }
    }
}

/// Kind of an entry in a repository listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoItemKind {
    Dir,
    File,
}

/// An entry in a repository directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoItem {
    pub name: String,
    pub path: String,
    pub kind: RepoItemKind,
}

/// Code search backend.
///
/// Implementations make no promise about ordering or exhaustiveness of a
/// single call. An empty list means "no matches", never an error.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run one code search batch
    async fn search(&self, request: &BatchRequest) -> Result<Vec<RawMatch>>;

    /// Match files by name pattern under `path`. Backends without a
    /// filename search return nothing, which makes the engine fall back to
    /// paged content search.
    async fn search_filenames(
        &self,
        _pattern: &str,
        _path: &str,
        _limit: usize,
    ) -> Result<Vec<RawMatch>> {
        Ok(Vec::new())
    }

    /// Get the provider name
    fn provider_name(&self) -> &str;
}

/// Per-repository popularity (star count) lookups
#[async_trait]
pub trait PopularityProvider: Send + Sync {
    async fn popularity(&self, repo: &str) -> Result<u64>;
}

/// Directory listing and raw file access inside one repository
#[async_trait]
pub trait RepositoryBrowser: Send + Sync {
    /// List a directory; the empty path is the repository root
    async fn list_contents(&self, repo: &str, path: &str) -> Result<Vec<RepoItem>>;

    /// Fetch the raw text of a file
    async fn read_file(&self, repo: &str, path: &str) -> Result<String>;
}
