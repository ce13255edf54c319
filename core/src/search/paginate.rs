//! Batched, rate-limit aware retrieval of filtered matches

use crate::config::{EngineConfig, MatchMode, SearchTarget};
use crate::error::{Error, ProviderError, Result};
use crate::provider::{BatchRequest, RawMatch, SearchProvider};
use crate::search::filter::filter_by_filename;
use crate::search::model::SearchResult;
use crate::search::retry::{retry_with_policy, sleep_or_cancel, RetryPolicy};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Why the pagination loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Enough filtered matches were collected
    QuotaMet,
    /// The provider ran out of matches
    Exhausted,
    /// A batch failed for good; earlier batches are kept
    BatchFailed,
    /// The cancellation token fired
    Cancelled,
}

/// Accumulated filtered matches, possibly containing duplicates
#[derive(Debug, Clone)]
pub struct PageOutcome {
    pub results: Vec<SearchResult>,
    pub stop_reason: StopReason,
    pub batches: u32,
    pub scanned: usize,
}

/// Keyword and target a paged search filters by
#[derive(Debug, Clone, Copy)]
pub struct PageFilter<'a> {
    pub keywords: &'a str,
    pub match_mode: MatchMode,
    pub target: SearchTarget,
}

/// Drives a [`SearchProvider`] batch by batch until `limit` filtered
/// matches are collected. Provider calls are strictly sequential.
pub struct PaginationController<'a> {
    provider: &'a dyn SearchProvider,
    config: &'a EngineConfig,
    policy: RetryPolicy,
    cancel: &'a CancellationToken,
}

impl<'a> PaginationController<'a> {
    pub fn new(
        provider: &'a dyn SearchProvider,
        config: &'a EngineConfig,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            provider,
            config,
            policy: RetryPolicy::from(config),
            cancel,
        }
    }

    /// Collect up to `limit` filtered matches for `query`.
    ///
    /// Only a provider that cannot run at all on the very first batch turns
    /// into an error; every later failure ends the loop with what has been
    /// gathered so far.
    pub async fn collect(
        &self,
        query: &str,
        filter: PageFilter<'_>,
        limit: usize,
    ) -> Result<PageOutcome> {
        let mut results = Vec::new();
        let mut remaining = limit;
        let mut scanned = 0;
        let mut batches = 0;
        let mut stop_reason = StopReason::QuotaMet;

        while remaining > 0 {
            if scanned >= self.config.max_scanned_matches {
                debug!("Scanned {} matches, stopping", scanned);
                stop_reason = StopReason::Exhausted;
                break;
            }

            let batch = remaining.min(self.config.batch_size);
            let request = BatchRequest::new(query, batch).with_offset(scanned);
            batches += 1;

            let raw = match self.search_batch_with_retry(&request).await {
                Ok(raw) => raw,
                Err(Error::Cancelled) => {
                    stop_reason = StopReason::Cancelled;
                    break;
                }
                Err(e) if e.is_unavailable() && batches == 1 => return Err(e),
                Err(e) => {
                    warn!(
                        "Search batch {} failed, keeping {} results: {}",
                        batches,
                        results.len(),
                        e
                    );
                    stop_reason = StopReason::BatchFailed;
                    break;
                }
            };

            if raw.is_empty() {
                stop_reason = StopReason::Exhausted;
                break;
            }

            let raw_count = raw.len();
            scanned += raw_count;

            let candidates = raw
                .into_iter()
                .map(|m| SearchResult::from_match(m, filter.target))
                .collect();
            let filtered = filter_by_filename(candidates, filter.keywords, filter.match_mode);
            debug!(
                "Batch {}: {} raw matches, {} kept by filename",
                batches,
                raw_count,
                filtered.len()
            );

            remaining = remaining.saturating_sub(filtered.len());
            results.extend(filtered);

            if raw_count < batch {
                stop_reason = StopReason::Exhausted;
                break;
            }

            if remaining > 0 {
                info!(
                    "Waiting {:?} to avoid rate limit...",
                    self.config.inter_batch_delay
                );
                if sleep_or_cancel(self.config.inter_batch_delay, self.cancel)
                    .await
                    .is_err()
                {
                    stop_reason = StopReason::Cancelled;
                    break;
                }
            }
        }

        Ok(PageOutcome {
            results,
            stop_reason,
            batches,
            scanned,
        })
    }

    /// One batch, retried with backoff while the provider reports rate limits
    pub async fn search_batch_with_retry(&self, request: &BatchRequest) -> Result<Vec<RawMatch>> {
        retry_with_policy(&self.policy, self.cancel, Error::is_rate_limited, |attempt| async move {
            if attempt > 0 {
                debug!("Retrying batch (attempt {})", attempt + 1);
            }
            let call = self.provider.search(request);
            match tokio::time::timeout(self.config.call_timeout, call).await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Other {
                    message: format!(
                        "{} search timed out after {:?}",
                        self.provider.provider_name(),
                        self.config.call_timeout
                    ),
                }
                .into()),
            }
        })
        .await
    }
}
