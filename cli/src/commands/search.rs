//! Search command

use agent_search_core::browse::download_url;
use agent_search_core::{
    create_backend, GlobalSelection, MatchMode, SearchEngine, SearchOptions, SearchOutcome,
    SearchResult, SearchTarget,
};
use anyhow::Result;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Parsed `search` arguments
#[derive(Debug, Clone)]
pub struct SearchArgs {
    pub keywords: String,
    pub any: bool,
    pub commands: bool,
    pub json: bool,
}

impl SearchArgs {
    fn options(&self, limit: Option<usize>) -> SearchOptions {
        let match_mode = if self.any { MatchMode::Any } else { MatchMode::All };
        let target = if self.commands {
            SearchTarget::Commands
        } else {
            SearchTarget::Agents
        };
        SearchOptions::new(match_mode, target).with_limit(limit.unwrap_or(0))
    }
}

/// JSON shape of one result, ready for the downloader
#[derive(Debug, Serialize)]
struct ResultRecord<'a> {
    #[serde(flatten)]
    result: &'a SearchResult,
    download_url: String,
    selection: GlobalSelection,
}

/// Run a search and print the ranked results
pub async fn search_command(
    args: SearchArgs,
    config_loader: crate::config::CliConfigLoader,
    cancel: CancellationToken,
) -> Result<()> {
    let config = config_loader.load().await?;
    info!("Using backend: {}", config.provider.backend.as_str());

    let backends = create_backend(&config.provider, config.engine.call_timeout)?;
    let engine = SearchEngine::from_backends(&backends, config.engine);

    let options = args.options(config.limit);
    debug!("Search options: {:?}", options);

    let outcome = engine
        .search_with_cancel(&args.keywords, &options, &cancel)
        .await?;

    if args.json {
        println!("{}", render_json(&outcome)?);
    } else {
        println!("{}", render_text(&outcome));
    }

    Ok(())
}

fn render_text(outcome: &SearchOutcome) -> String {
    match outcome {
        SearchOutcome::NoMatches => SearchOutcome::NO_MATCHES_MESSAGE.to_string(),
        SearchOutcome::Results(results) => results
            .iter()
            .map(|r| format!("★ {:>6}  {}  {}", r.popularity, r.relative_path, r.url))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn render_json(outcome: &SearchOutcome) -> Result<String> {
    let records: Vec<ResultRecord<'_>> = outcome
        .results()
        .iter()
        .map(|result| ResultRecord {
            result,
            download_url: download_url(&result.url),
            selection: GlobalSelection::from_result(result),
        })
        .collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> SearchResult {
        SearchResult {
            repo: "acme/tools".to_string(),
            path: ".claude/agents/review.md".to_string(),
            url: "https://github.com/acme/tools/blob/main/.claude/agents/review.md".to_string(),
            popularity: 42,
            relative_path: "acme/tools/review.md".to_string(),
        }
    }

    #[test]
    fn test_options_from_args() {
        let args = SearchArgs {
            keywords: "git commit".to_string(),
            any: true,
            commands: true,
            json: false,
        };
        let options = args.options(Some(12));
        assert_eq!(options.match_mode, MatchMode::Any);
        assert_eq!(options.target, SearchTarget::Commands);
        assert_eq!(options.limit, 12);
        assert_eq!(args.options(None).limit, 0);
    }

    #[test]
    fn test_render_text() {
        assert_eq!(render_text(&SearchOutcome::NoMatches), "no matches found");

        let text = render_text(&SearchOutcome::Results(vec![result()]));
        assert!(text.starts_with("★     42  acme/tools/review.md"));
    }

    #[test]
    fn test_render_json() {
        let json = render_json(&SearchOutcome::Results(vec![result()])).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["repo"], "acme/tools");
        assert_eq!(value[0]["popularity"], 42);
        assert_eq!(
            value[0]["download_url"],
            "https://raw.githubusercontent.com/acme/tools/main/.claude/agents/review.md"
        );
        assert_eq!(value[0]["selection"]["source"], "search");
        assert_eq!(render_json(&SearchOutcome::NoMatches).unwrap(), "[]");
    }
}
