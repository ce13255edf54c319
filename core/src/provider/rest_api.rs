//! GitHub REST API backend

use crate::config::ProviderSettings;
use crate::error::{ParseError, ProviderError, Result};
use crate::provider::{
    BatchRequest, PopularityProvider, RawMatch, RepoItem, RepoItemKind, RepositoryBrowser,
    SearchProvider,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// GitHub refuses larger pages on the search endpoint
const MAX_PER_PAGE: usize = 100;

/// Code search never serves matches past this position
const SEARCH_CAP: usize = 1000;

const JSON_ACCEPT: &str = "application/vnd.github+json";
const RAW_ACCEPT: &str = "application/vnd.github.v3.raw";

/// GitHub REST API client
pub struct GitHubApiProvider {
    client: Client,
    token: String,
    base_url: String,
}

impl GitHubApiProvider {
    /// Create a new REST client; a token is required
    pub fn new(settings: &ProviderSettings, call_timeout: Duration) -> Result<Self> {
        let token = settings
            .token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ProviderError::Unavailable {
                message: "No GitHub token configured for the REST backend".to_string(),
            })?;

        let client = Client::builder()
            .timeout(call_timeout)
            .user_agent(concat!("agent-search/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::Unavailable {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            token,
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get(&self, path: &str, query: &[(&str, String)], accept: &str) -> Result<String> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header("accept", accept)
            .header("x-github-api-version", "2022-11-28")
            .query(query)
            .send()
            .await
            .map_err(|e| ProviderError::Other {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let remaining = response
                .headers()
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let error_text = response.text().await.unwrap_or_default();
            return Err(classify_status(status, remaining.as_deref(), &error_text).into());
        }

        response.text().await.map_err(|e| {
            ProviderError::Other {
                message: format!("Failed to read response: {}", e),
            }
            .into()
        })
    }
}

#[async_trait]
impl SearchProvider for GitHubApiProvider {
    async fn search(&self, request: &BatchRequest) -> Result<Vec<RawMatch>> {
        let mut matches = Vec::new();

        // pages are fixed at MAX_PER_PAGE; a batch may straddle two of them
        while matches.len() < request.limit {
            let position = request.offset + matches.len();
            if position >= SEARCH_CAP {
                break;
            }
            let (page, skip) = page_for_offset(position);

            let body = self
                .get(
                    "search/code",
                    &[
                        ("q", request.query.clone()),
                        ("per_page", MAX_PER_PAGE.to_string()),
                        ("page", page.to_string()),
                    ],
                    JSON_ACCEPT,
                )
                .await?;

            let items = parse_search_response(&body)?;
            let fetched = items.len();
            let wanted = request.limit - matches.len();
            matches.extend(items.into_iter().skip(skip).take(wanted));

            if fetched < MAX_PER_PAGE {
                break;
            }
        }

        Ok(matches)
    }

    fn provider_name(&self) -> &str {
        "rest_api"
    }
}

#[async_trait]
impl PopularityProvider for GitHubApiProvider {
    async fn popularity(&self, repo: &str) -> Result<u64> {
        let body = self.get(&format!("repos/{}", repo), &[], JSON_ACCEPT).await?;
        parse_repository_stars(&body)
    }
}

#[async_trait]
impl RepositoryBrowser for GitHubApiProvider {
    async fn list_contents(&self, repo: &str, path: &str) -> Result<Vec<RepoItem>> {
        let body = self.get(&contents_path(repo, path), &[], JSON_ACCEPT).await?;

        let items: Vec<ApiContentItem> =
            serde_json::from_str(&body).map_err(|e| ParseError::InvalidJson {
                source_name: "GitHub contents API".to_string(),
                message: e.to_string(),
            })?;

        Ok(items
            .into_iter()
            .map(|item| RepoItem {
                kind: if item.item_type == "dir" {
                    RepoItemKind::Dir
                } else {
                    RepoItemKind::File
                },
                name: item.name,
                path: item.path,
            })
            .collect())
    }

    async fn read_file(&self, repo: &str, path: &str) -> Result<String> {
        self.get(&contents_path(repo, path), &[], RAW_ACCEPT).await
    }
}

/// 1-based page holding the match at `offset`, and its position on that page
fn page_for_offset(offset: usize) -> (usize, usize) {
    (offset / MAX_PER_PAGE + 1, offset % MAX_PER_PAGE)
}

fn contents_path(repo: &str, path: &str) -> String {
    let path = path.trim_matches('/');
    if path.is_empty() {
        format!("repos/{}/contents", repo)
    } else {
        format!("repos/{}/contents/{}", repo, path)
    }
}

/// Map a non-success status to a provider error
fn classify_status(
    status: StatusCode,
    ratelimit_remaining: Option<&str>,
    body: &str,
) -> ProviderError {
    let message = format!("HTTP {}: {}", status.as_u16(), body.trim());

    if status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN && ratelimit_remaining == Some("0"))
    {
        return ProviderError::RateLimited { message };
    }

    ProviderError::classify(message)
}

#[derive(Debug, Deserialize)]
struct ApiSearchResponse {
    #[serde(default)]
    items: Vec<ApiSearchItem>,
}

#[derive(Debug, Deserialize)]
struct ApiSearchItem {
    path: String,
    html_url: String,
    repository: ApiRepository,
}

#[derive(Debug, Deserialize)]
struct ApiRepository {
    full_name: String,
}

#[derive(Debug, Deserialize)]
struct ApiRepositoryStars {
    stargazers_count: u64,
}

#[derive(Debug, Deserialize)]
struct ApiContentItem {
    name: String,
    path: String,
    #[serde(rename = "type")]
    item_type: String,
}

fn parse_search_response(body: &str) -> Result<Vec<RawMatch>> {
    let response: ApiSearchResponse =
        serde_json::from_str(body).map_err(|e| ParseError::InvalidJson {
            source_name: "GitHub code search API".to_string(),
            message: e.to_string(),
        })?;

    Ok(response
        .items
        .into_iter()
        .map(|item| RawMatch::new(item.repository.full_name, item.path, item.html_url))
        .collect())
}

fn parse_repository_stars(body: &str) -> Result<u64> {
    let repo: ApiRepositoryStars =
        serde_json::from_str(body).map_err(|e| ParseError::InvalidJson {
            source_name: "GitHub repository API".to_string(),
            message: e.to_string(),
        })?;
    Ok(repo.stargazers_count)
}
