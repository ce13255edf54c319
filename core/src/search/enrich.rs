//! Popularity enrichment with bounded concurrency

use crate::config::EngineConfig;
use crate::error::EnrichmentError;
use crate::provider::PopularityProvider;
use crate::search::dedup::unique_repos;
use crate::search::model::SearchResult;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Looks up repository popularity, at most `max_concurrent_lookups` at a time.
///
/// A failed, timed out or cancelled lookup leaves the popularity at 0 and
/// never fails the search.
pub struct PopularityEnricher<'a> {
    provider: &'a dyn PopularityProvider,
    config: &'a EngineConfig,
    cancel: &'a CancellationToken,
}

impl<'a> PopularityEnricher<'a> {
    pub fn new(
        provider: &'a dyn PopularityProvider,
        config: &'a EngineConfig,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            provider,
            config,
            cancel,
        }
    }

    /// Star counts for each distinct repository
    pub async fn lookup_all(&self, repos: Vec<String>) -> HashMap<String, u64> {
        debug!(
            "Looking up popularity of {} repositories ({} at a time)",
            repos.len(),
            self.config.max_concurrent_lookups
        );

        stream::iter(repos)
            .map(|repo| self.lookup(repo))
            .buffer_unordered(self.config.max_concurrent_lookups.max(1))
            .collect()
            .await
    }

    /// Fill in `popularity` on every result, one lookup per repository
    pub async fn enrich(&self, mut results: Vec<SearchResult>) -> Vec<SearchResult> {
        if results.is_empty() {
            return results;
        }

        let stars = self.lookup_all(unique_repos(&results)).await;
        for result in &mut results {
            result.popularity = stars.get(&result.repo).copied().unwrap_or(0);
        }
        results
    }

    async fn lookup(&self, repo: String) -> (String, u64) {
        if self.cancel.is_cancelled() {
            return (repo, 0);
        }

        let lookup = tokio::time::timeout(
            self.config.call_timeout,
            self.provider.popularity(&repo),
        );
        let stars = tokio::select! {
            _ = self.cancel.cancelled() => 0,
            outcome = lookup => match outcome {
                Ok(Ok(stars)) => stars,
                Ok(Err(e)) => {
                    warn!(
                        "{}",
                        EnrichmentError::LookupFailed {
                            repo: repo.clone(),
                            message: e.to_string(),
                        }
                    );
                    0
                }
                Err(_) => {
                    warn!("{}", EnrichmentError::TimedOut { repo: repo.clone() });
                    0
                }
            },
        };

        (repo, stars)
    }
}
