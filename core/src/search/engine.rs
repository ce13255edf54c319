//! Search orchestration

use crate::config::{EngineConfig, SearchOptions};
use crate::error::{Error, Result};
use crate::provider::{BackendSet, BatchRequest, PopularityProvider, RawMatch, SearchProvider};
use crate::search::dedup::deduplicate_and_limit;
use crate::search::enrich::PopularityEnricher;
use crate::search::filter::filter_by_filename;
use crate::search::model::{is_markdown, SearchOutcome, SearchResult};
use crate::search::paginate::{PageFilter, PaginationController};
use crate::search::query::build_query;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Turns keywords into a ranked, deduplicated list of definition files
pub struct SearchEngine {
    search: Arc<dyn SearchProvider>,
    popularity: Arc<dyn PopularityProvider>,
    config: EngineConfig,
}

impl SearchEngine {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        popularity: Arc<dyn PopularityProvider>,
        config: EngineConfig,
    ) -> Self {
        Self {
            search,
            popularity,
            config,
        }
    }

    /// Engine over the search and popularity halves of a backend
    pub fn from_backends(backends: &BackendSet, config: EngineConfig) -> Self {
        Self::new(backends.search.clone(), backends.popularity.clone(), config)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run a search that cannot be cancelled
    pub async fn search(&self, keywords: &str, options: &SearchOptions) -> Result<SearchOutcome> {
        self.search_with_cancel(keywords, options, &CancellationToken::new())
            .await
    }

    /// Run a search. Once `cancel` fires, whatever was gathered so far is
    /// deduplicated and returned.
    pub async fn search_with_cancel(
        &self,
        keywords: &str,
        options: &SearchOptions,
        cancel: &CancellationToken,
    ) -> Result<SearchOutcome> {
        let keywords = keywords.trim();
        let results = if keywords.is_empty() {
            self.browse(options, cancel).await?
        } else {
            self.keyword_search(keywords, options, cancel).await?
        };

        if results.is_empty() {
            info!("{}", SearchOutcome::NO_MATCHES_MESSAGE);
        } else {
            info!("Found {} results", results.len());
        }
        Ok(SearchOutcome::from_results(results))
    }

    /// Filename probe first, then paged content search
    async fn keyword_search(
        &self,
        keywords: &str,
        options: &SearchOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchResult>> {
        let limit = options.effective_limit(self.config.default_limit);
        let filter = PageFilter {
            keywords,
            match_mode: options.match_mode,
            target: options.target,
        };

        let mut candidates = self.probe_filenames(filter, limit, cancel).await;

        if candidates.is_empty() && !cancel.is_cancelled() {
            let query = build_query(keywords, options);
            debug!("Searching with query: {}", query);

            let controller =
                PaginationController::new(self.search.as_ref(), &self.config, cancel);
            let outcome = controller.collect(&query, filter, limit).await?;
            debug!(
                "Pagination stopped ({:?}) after {} batches, {} raw matches scanned",
                outcome.stop_reason, outcome.batches, outcome.scanned
            );
            candidates = outcome.results;
        }

        let unique = deduplicate_and_limit(candidates, limit);
        Ok(self.enricher(cancel).enrich(unique).await)
    }

    /// Match `*<keywords>*` against file names under the target root.
    /// Any failure just means no probe results.
    async fn probe_filenames(
        &self,
        filter: PageFilter<'_>,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Vec<SearchResult> {
        if cancel.is_cancelled() {
            return Vec::new();
        }

        let pattern = format!("*{}*", filter.keywords);
        let path = filter.target.path_qualifier();
        let probe = tokio::time::timeout(
            self.config.call_timeout,
            self.search.search_filenames(&pattern, &path, limit),
        );

        let raw = tokio::select! {
            _ = cancel.cancelled() => return Vec::new(),
            outcome = probe => match outcome {
                Ok(Ok(raw)) => raw,
                Ok(Err(e)) => {
                    debug!("Filename search failed, falling back to content search: {}", e);
                    return Vec::new();
                }
                Err(_) => {
                    debug!("Filename search timed out, falling back to content search");
                    return Vec::new();
                }
            },
        };

        let candidates = raw
            .into_iter()
            .map(|m| SearchResult::from_match(m, filter.target))
            .collect();
        let kept = filter_by_filename(candidates, filter.keywords, filter.match_mode);
        debug!("Filename search matched {} files", kept.len());
        kept
    }

    /// Empty keywords: one call, markdown only, ranked by popularity
    async fn browse(
        &self,
        options: &SearchOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchResult>> {
        let limit = options.effective_limit(self.config.default_browse_limit);
        let query = build_query("", options);
        debug!("Browsing with query: {}", query);

        let controller = PaginationController::new(self.search.as_ref(), &self.config, cancel);
        let raw: Vec<RawMatch> = match controller
            .search_batch_with_retry(&BatchRequest::new(query, limit))
            .await
        {
            Ok(raw) => raw,
            Err(Error::Cancelled) => Vec::new(),
            Err(e) if e.is_unavailable() => return Err(e),
            Err(e) => {
                warn!("Search failed: {}", e);
                Vec::new()
            }
        };

        let candidates = raw
            .into_iter()
            .filter(|m| is_markdown(&m.path))
            .map(|m| SearchResult::from_match(m, options.target))
            .collect();
        let unique = deduplicate_and_limit(candidates, limit);

        let mut results = self.enricher(cancel).enrich(unique).await;
        sort_by_popularity(&mut results);
        Ok(results)
    }

    fn enricher<'a>(&'a self, cancel: &'a CancellationToken) -> PopularityEnricher<'a> {
        PopularityEnricher::new(self.popularity.as_ref(), &self.config, cancel)
    }
}

/// Most popular first; equal popularity falls back to `(repo, path)` ascending
pub fn sort_by_popularity(results: &mut [SearchResult]) {
    results.sort_by(|a, b| {
        b.popularity
            .cmp(&a.popularity)
            .then_with(|| (&a.repo, &a.path).cmp(&(&b.repo, &b.path)))
    });
}
