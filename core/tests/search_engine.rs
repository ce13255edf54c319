//! End-to-end search scenarios against in-memory providers

use agent_search_core::error::{ProviderError, Result};
use agent_search_core::provider::{BatchRequest, PopularityProvider, RawMatch, SearchProvider};
use agent_search_core::{EngineConfig, MatchMode, SearchEngine, SearchOptions, SearchTarget};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

enum Step {
    Return(Vec<RawMatch>),
    RateLimited,
}

/// Plays back steps, one per call, then returns nothing
struct ScriptedSearch {
    steps: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<Instant>>,
}

impl ScriptedSearch {
    fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for ScriptedSearch {
    async fn search(&self, _request: &BatchRequest) -> Result<Vec<RawMatch>> {
        self.calls.lock().unwrap().push(Instant::now());
        match self.steps.lock().unwrap().pop_front() {
            Some(Step::Return(matches)) => Ok(matches),
            Some(Step::RateLimited) => Err(ProviderError::RateLimited {
                message: "API rate limit exceeded for user".to_string(),
            }
            .into()),
            None => Ok(Vec::new()),
        }
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }
}

/// Serves a fixed corpus in order, sliced by each request's offset
struct CorpusSearch {
    corpus: Vec<RawMatch>,
    requests: Mutex<Vec<BatchRequest>>,
}

#[async_trait]
impl SearchProvider for CorpusSearch {
    async fn search(&self, request: &BatchRequest) -> Result<Vec<RawMatch>> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self
            .corpus
            .iter()
            .skip(request.offset)
            .take(request.limit)
            .cloned()
            .collect())
    }

    fn provider_name(&self) -> &str {
        "corpus"
    }
}

/// Always rate limited
struct Throttled {
    calls: AtomicUsize,
}

#[async_trait]
impl SearchProvider for Throttled {
    async fn search(&self, _request: &BatchRequest) -> Result<Vec<RawMatch>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ProviderError::classify("HTTP 403: API rate limit exceeded").into())
    }

    fn provider_name(&self) -> &str {
        "throttled"
    }
}

/// Stars equal to the repository name length; tracks concurrency
#[derive(Default)]
struct CountingStars {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    lookups: AtomicUsize,
}

#[async_trait]
impl PopularityProvider for CountingStars {
    async fn popularity(&self, repo: &str) -> Result<u64> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(25)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(repo.len() as u64)
    }
}

fn raw(repo: &str, file: &str) -> RawMatch {
    let path = format!(".claude/agents/{}", file);
    let url = format!("https://github.com/{}/blob/main/{}", repo, path);
    RawMatch::new(repo, path, url)
}

fn options(limit: usize) -> SearchOptions {
    SearchOptions::new(MatchMode::All, SearchTarget::Agents).with_limit(limit)
}

#[tokio::test(start_paused = true)]
async fn review_scenario_drops_non_markdown_and_duplicates() {
    let matches = vec![
        raw("a/one", "review.md"),
        raw("a/one", "code-review.md"),
        raw("b/two", "review.md"),
        raw("b/two", "review.yaml"),
        raw("c/three", "pr-review.md"),
        raw("a/one", "review.md"),
        raw("d/four", "review-security.md"),
        raw("e/five", "review.txt"),
        raw("f/six", "reviewer.md"),
        raw("b/two", "review.md"),
        raw("g/seven", "quick-review.md"),
        raw("h/eight", "review-docs.md"),
    ];
    let search = ScriptedSearch::new(vec![Step::Return(matches)]);
    let stars = Arc::new(CountingStars::default());
    let engine = SearchEngine::new(search.clone(), stars.clone(), EngineConfig::default());

    let outcome = engine.search("review", &options(10)).await.unwrap();

    assert_eq!(outcome.len(), 8);
    assert!(outcome
        .results()
        .iter()
        .all(|r| r.path.rsplit('/').next().unwrap().contains("review")));
    // one lookup per distinct repository
    assert_eq!(stars.lookups.load(Ordering::SeqCst), 7);
    assert_eq!(outcome.results()[0].relative_path, "a/one/review.md");
    assert_eq!(outcome.results()[0].popularity, 5);
}

#[tokio::test(start_paused = true)]
async fn rate_limited_first_call_is_retried_after_backoff() {
    let search = ScriptedSearch::new(vec![
        Step::RateLimited,
        Step::Return(vec![raw("a/b", "review.md")]),
    ]);
    let config = EngineConfig::default();
    let base_delay = config.base_delay;
    let engine = SearchEngine::new(search.clone(), Arc::new(CountingStars::default()), config);

    let outcome = engine.search("review", &options(5)).await.unwrap();

    assert_eq!(outcome.len(), 1);
    assert_eq!(outcome.results()[0].repo, "a/b");
    let calls = search.call_times();
    assert_eq!(calls.len(), 2);
    assert!(calls[1] - calls[0] >= base_delay);
}

#[tokio::test(start_paused = true)]
async fn persistent_rate_limit_gives_up_after_three_attempts() {
    let search = Arc::new(Throttled {
        calls: AtomicUsize::new(0),
    });
    let engine = SearchEngine::new(
        search.clone(),
        Arc::new(CountingStars::default()),
        EngineConfig::default(),
    );

    let outcome = engine.search("review", &options(10)).await.unwrap();

    assert!(outcome.is_empty());
    assert_eq!(search.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn enrichment_never_exceeds_five_lookups_in_flight() {
    let matches: Vec<RawMatch> = (0..25)
        .map(|i| raw(&format!("owner-{}/repo", i), "agent.md"))
        .collect();
    let search = ScriptedSearch::new(vec![Step::Return(matches)]);
    let stars = Arc::new(CountingStars::default());
    let engine = SearchEngine::new(search, stars.clone(), EngineConfig::default());

    let outcome = engine.search("", &options(0)).await.unwrap();

    assert_eq!(outcome.len(), 25);
    assert_eq!(stars.lookups.load(Ordering::SeqCst), 25);
    assert!(stars.peak.load(Ordering::SeqCst) <= 5);
    // browse results are ranked
    let popularity: Vec<u64> = outcome.results().iter().map(|r| r.popularity).collect();
    assert!(popularity.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test(start_paused = true)]
async fn result_count_never_exceeds_limit() {
    for limit in [1, 3, 7] {
        let matches: Vec<RawMatch> = (0..12)
            .map(|i| raw("a/b", &format!("review-{}.md", i)))
            .collect();
        let search =
            ScriptedSearch::new(vec![Step::Return(matches.clone()), Step::Return(matches)]);
        let engine = SearchEngine::new(
            search,
            Arc::new(CountingStars::default()),
            EngineConfig::default(),
        );

        let outcome = engine.search("review", &options(limit)).await.unwrap();
        assert!(outcome.len() <= limit);
    }
}

#[tokio::test(start_paused = true)]
async fn paged_search_fills_quota_with_unique_matches() {
    // every even file matches, so each batch keeps about half of what it reads
    let corpus: Vec<RawMatch> = (0..100)
        .map(|i| {
            let name = if i % 2 == 0 { "review" } else { "notes" };
            raw(&format!("owner-{}/repo", i % 9), &format!("{}-{}.md", name, i))
        })
        .collect();
    let search = Arc::new(CorpusSearch {
        corpus,
        requests: Mutex::new(Vec::new()),
    });
    let engine = SearchEngine::new(
        search.clone(),
        Arc::new(CountingStars::default()),
        EngineConfig::default(),
    );

    let outcome = engine.search("review", &options(40)).await.unwrap();

    assert_eq!(outcome.len(), 40);
    let mut keys: Vec<_> = outcome
        .results()
        .iter()
        .map(|r| (r.repo.clone(), r.path.clone()))
        .collect();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), 40);

    let requests = search.requests.lock().unwrap().clone();
    assert!(requests.len() > 1);
    assert_eq!(requests[0].offset, 0);
    for pair in requests.windows(2) {
        assert_eq!(pair[1].offset, pair[0].offset + pair[0].limit);
    }
}
