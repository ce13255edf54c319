//! In-memory providers for unit tests

use crate::error::{ParseError, ProviderError, Result};
use crate::provider::{BatchRequest, PopularityProvider, RawMatch, SearchProvider};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// A raw match with a GitHub-style blob URL
pub fn md_match(repo: &str, path: &str) -> RawMatch {
    RawMatch::new(
        repo,
        path,
        format!("https://github.com/{}/blob/main/{}", repo, path),
    )
}

/// Scripted answer of the fake search provider
#[derive(Debug, Clone)]
pub enum Reply {
    Matches(Vec<RawMatch>),
    RateLimited,
    Fail(String),
    Unavailable,
    Malformed,
    Hang,
}

/// Search provider replaying scripted replies, truncated to the request limit,
/// or serving slices of a fixed corpus by request offset
pub struct FakeSearchProvider {
    replies: Mutex<VecDeque<Reply>>,
    repeat: Option<Reply>,
    corpus: Option<Vec<RawMatch>>,
    filename_replies: Mutex<VecDeque<Reply>>,
    filename_requests: Mutex<Vec<(String, String)>>,
    requests: Mutex<Vec<BatchRequest>>,
    call_times: Mutex<Vec<Instant>>,
}

impl FakeSearchProvider {
    /// Replies in order, then empty results
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            repeat: None,
            corpus: None,
            filename_replies: Mutex::new(VecDeque::new()),
            filename_requests: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            call_times: Mutex::new(Vec::new()),
        }
    }

    /// The same reply for every call
    pub fn always(reply: Reply) -> Self {
        Self {
            repeat: Some(reply),
            ..Self::new(Vec::new())
        }
    }

    /// Serve `corpus` in order, honouring each request's offset and limit
    pub fn paged(corpus: Vec<RawMatch>) -> Self {
        Self {
            corpus: Some(corpus),
            ..Self::new(Vec::new())
        }
    }

    /// Replies for filename probes
    pub fn with_filename_replies(self, replies: Vec<Reply>) -> Self {
        *self.filename_replies.lock().unwrap() = replies.into();
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<BatchRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// `(pattern, path)` of every filename probe
    pub fn filename_requests(&self) -> Vec<(String, String)> {
        self.filename_requests.lock().unwrap().clone()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.call_times.lock().unwrap().clone()
    }

    async fn answer(reply: Reply, limit: usize) -> Result<Vec<RawMatch>> {
        match reply {
            Reply::Matches(mut matches) => {
                matches.truncate(limit);
                Ok(matches)
            }
            Reply::RateLimited => Err(ProviderError::RateLimited {
                message: "API rate limit exceeded".to_string(),
            }
            .into()),
            Reply::Fail(message) => Err(ProviderError::Other { message }.into()),
            Reply::Unavailable => Err(ProviderError::Unavailable {
                message: "gh not installed".to_string(),
            }
            .into()),
            Reply::Malformed => Err(ParseError::InvalidJson {
                source_name: "fake".to_string(),
                message: "expected value".to_string(),
            }
            .into()),
            Reply::Hang => std::future::pending().await,
        }
    }
}

#[async_trait]
impl SearchProvider for FakeSearchProvider {
    async fn search(&self, request: &BatchRequest) -> Result<Vec<RawMatch>> {
        self.requests.lock().unwrap().push(request.clone());
        self.call_times.lock().unwrap().push(Instant::now());

        if let Some(corpus) = &self.corpus {
            return Ok(corpus
                .iter()
                .skip(request.offset)
                .take(request.limit)
                .cloned()
                .collect());
        }

        let reply = match &self.repeat {
            Some(reply) => reply.clone(),
            None => self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Reply::Matches(Vec::new())),
        };
        Self::answer(reply, request.limit).await
    }

    async fn search_filenames(
        &self,
        pattern: &str,
        path: &str,
        limit: usize,
    ) -> Result<Vec<RawMatch>> {
        self.filename_requests
            .lock()
            .unwrap()
            .push((pattern.to_string(), path.to_string()));
        let reply = self
            .filename_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Reply::Matches(Vec::new()));
        Self::answer(reply, limit).await
    }

    fn provider_name(&self) -> &str {
        "fake"
    }
}

/// Popularity provider that records how many lookups run at once
pub struct FakePopularityProvider {
    stars: HashMap<String, u64>,
    failing: Vec<String>,
    latency: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    lookups: Mutex<Vec<String>>,
}

impl FakePopularityProvider {
    pub fn new(stars: &[(&str, u64)]) -> Self {
        Self {
            stars: stars.iter().map(|(r, s)| (r.to_string(), *s)).collect(),
            failing: Vec::new(),
            latency: Duration::from_millis(10),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            lookups: Mutex::new(Vec::new()),
        }
    }

    /// Repositories whose lookup fails
    pub fn failing(mut self, repos: &[&str]) -> Self {
        self.failing = repos.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl PopularityProvider for FakePopularityProvider {
    async fn popularity(&self, repo: &str) -> Result<u64> {
        self.lookups.lock().unwrap().push(repo.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.latency).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.iter().any(|r| r == repo) {
            return Err(ParseError::NotANumber {
                source_name: "fake".to_string(),
                value: "oops".to_string(),
            }
            .into());
        }
        Ok(self.stars.get(repo).copied().unwrap_or(0))
    }
}
