//! Backend driving the `gh` command line client

use crate::config::ProviderSettings;
use crate::error::{ParseError, ProviderError, Result};
use crate::provider::process::run_program;
use crate::provider::{
    BatchRequest, PopularityProvider, RawMatch, RepoItem, RepoItemKind, RepositoryBrowser,
    SearchProvider,
};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// `gh search code` never returns more than this many matches
const GH_SEARCH_CAP: usize = 1000;

/// Search, popularity and browsing through an installed `gh` executable
pub struct GhCliProvider {
    program: String,
    call_timeout: Duration,
}

impl GhCliProvider {
    /// Create a new provider, checking that the executable can be found
    pub fn new(settings: &ProviderSettings, call_timeout: Duration) -> Result<Self> {
        let program = which::which(&settings.gh_path).map_err(|e| ProviderError::Unavailable {
            message: format!("'{}' executable not found: {}", settings.gh_path, e),
        })?;

        Ok(Self {
            program: program.to_string_lossy().into_owned(),
            call_timeout,
        })
    }

    async fn gh(&self, args: Vec<String>) -> Result<String> {
        let output = run_program(&self.program, &args, self.call_timeout).await?;
        debug!(
            "gh {} exited with {} in {}ms",
            args.join(" "),
            output.exit_code,
            output.duration_ms
        );
        Ok(output.into_result()?)
    }
}

#[async_trait]
impl SearchProvider for GhCliProvider {
    async fn search(&self, request: &BatchRequest) -> Result<Vec<RawMatch>> {
        // gh has no page flag: fetch everything up to the end of the batch and drop the rest
        let (skip, fetch) = match fetch_window(request) {
            Some(window) => window,
            None => return Ok(Vec::new()),
        };

        let stdout = self
            .gh(vec![
                "search".to_string(),
                "code".to_string(),
                request.query.clone(),
                "--limit".to_string(),
                fetch.to_string(),
                "--json".to_string(),
                "repository,path,url".to_string(),
            ])
            .await?;

        let matches = parse_search_output(&stdout)?;
        Ok(matches.into_iter().skip(skip).take(request.limit).collect())
    }

    async fn search_filenames(
        &self,
        pattern: &str,
        path: &str,
        limit: usize,
    ) -> Result<Vec<RawMatch>> {
        let stdout = self
            .gh(vec![
                "search".to_string(),
                "code".to_string(),
                "--filename".to_string(),
                pattern.to_string(),
                "--match".to_string(),
                "path".to_string(),
                path.to_string(),
                "--limit".to_string(),
                limit.min(GH_SEARCH_CAP).to_string(),
                "--json".to_string(),
                "repository,path,url".to_string(),
            ])
            .await?;

        parse_search_output(&stdout)
    }

    fn provider_name(&self) -> &str {
        "gh_cli"
    }
}

#[async_trait]
impl PopularityProvider for GhCliProvider {
    async fn popularity(&self, repo: &str) -> Result<u64> {
        let stdout = self
            .gh(vec![
                "api".to_string(),
                format!("repos/{}", repo),
                "--jq".to_string(),
                ".stargazers_count".to_string(),
            ])
            .await?;

        parse_star_count(&stdout)
    }
}

#[async_trait]
impl RepositoryBrowser for GhCliProvider {
    async fn list_contents(&self, repo: &str, path: &str) -> Result<Vec<RepoItem>> {
        let stdout = self
            .gh(vec![
                "api".to_string(),
                contents_endpoint(repo, path),
                "--paginate".to_string(),
            ])
            .await?;

        parse_contents_listing(&stdout)
    }

    async fn read_file(&self, repo: &str, path: &str) -> Result<String> {
        self.gh(vec![
            "api".to_string(),
            contents_endpoint(repo, path),
            "-H".to_string(),
            "Accept: application/vnd.github.v3.raw".to_string(),
        ])
        .await
    }
}

/// Matches to skip and total to fetch for one batch, `None` past the cap
fn fetch_window(request: &BatchRequest) -> Option<(usize, usize)> {
    if request.offset >= GH_SEARCH_CAP || request.limit == 0 {
        return None;
    }
    let fetch = request.offset.saturating_add(request.limit).min(GH_SEARCH_CAP);
    Some((request.offset, fetch))
}

fn contents_endpoint(repo: &str, path: &str) -> String {
    let path = path.trim_matches('/');
    if path.is_empty() {
        format!("repos/{}/contents", repo)
    } else {
        format!("repos/{}/contents/{}", repo, path)
    }
}

#[derive(Debug, Deserialize)]
struct GhSearchMatch {
    repository: GhRepository,
    path: String,
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GhRepository {
    name_with_owner: String,
}

#[derive(Debug, Deserialize)]
struct GhContentItem {
    name: String,
    path: String,
    #[serde(rename = "type")]
    item_type: String,
}

/// Parse `gh search code --json repository,path,url` output
pub(crate) fn parse_search_output(output: &str) -> Result<Vec<RawMatch>> {
    if output.trim().is_empty() {
        return Ok(Vec::new());
    }

    let matches: Vec<GhSearchMatch> =
        serde_json::from_str(output).map_err(|e| ParseError::InvalidJson {
            source_name: "gh search code".to_string(),
            message: e.to_string(),
        })?;

    Ok(matches
        .into_iter()
        .map(|m| RawMatch::new(m.repository.name_with_owner, m.path, m.url))
        .collect())
}

/// Parse the output of a `.stargazers_count` jq projection
pub(crate) fn parse_star_count(output: &str) -> Result<u64> {
    let trimmed = output.trim();
    trimmed.parse::<u64>().map_err(|_| {
        ParseError::NotANumber {
            source_name: "gh api".to_string(),
            value: trimmed.to_string(),
        }
        .into()
    })
}

/// Parse a contents listing. `--paginate` concatenates one JSON array per
/// page, so the output is read as a stream of arrays.
pub(crate) fn parse_contents_listing(output: &str) -> Result<Vec<RepoItem>> {
    let mut items = Vec::new();
    let stream = serde_json::Deserializer::from_str(output).into_iter::<Vec<GhContentItem>>();

    for page in stream {
        let page = page.map_err(|e| ParseError::InvalidJson {
            source_name: "gh api contents".to_string(),
            message: e.to_string(),
        })?;
        items.extend(page.into_iter().map(|item| RepoItem {
            kind: if item.item_type == "dir" {
                RepoItemKind::Dir
            } else {
                RepoItemKind::File
            },
            name: item.name,
            path: item.path,
        }));
    }

    Ok(items)
}
