//! Repository browse command

use agent_search_core::browse::{parent_path, sort_listing, truncate_preview, DEFAULT_PREVIEW_LINES};
use agent_search_core::provider::{RepoItem, RepoItemKind, RepositoryBrowser};
use agent_search_core::{create_backend, GlobalSelection};
use anyhow::{anyhow, Result};
use serde::Serialize;
use tracing::info;

/// Parsed `browse` arguments
#[derive(Debug, Clone)]
pub struct BrowseArgs {
    pub repo: String,
    pub path: String,
    pub read: bool,
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ListingEntry<'a> {
    #[serde(flatten)]
    item: &'a RepoItem,
    selectable: bool,
}

/// List a repository directory or preview one file
pub async fn browse_command(
    args: BrowseArgs,
    config_loader: crate::config::CliConfigLoader,
) -> Result<()> {
    if !is_repo_name(&args.repo) {
        return Err(anyhow!(
            "Repository must be given as owner/name, got '{}'",
            args.repo
        ));
    }

    let config = config_loader.load().await?;
    let backends = create_backend(&config.provider, config.engine.call_timeout)?;
    let path = args.path.trim_matches('/');

    if args.read {
        println!("{}", preview(backends.browser.as_ref(), &args.repo, path).await?);
        return Ok(());
    }

    info!("Listing {}/{}", args.repo, path);
    let mut items = backends.browser.list_contents(&args.repo, path).await?;
    sort_listing(&mut items);

    if args.json {
        let entries: Vec<_> = items
            .iter()
            .map(|item| ListingEntry {
                item,
                selectable: GlobalSelection::from_repo_item(&args.repo, item).is_some(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        println!("{}", render_listing(&args.repo, path, &items));
    }

    Ok(())
}

async fn preview(browser: &dyn RepositoryBrowser, repo: &str, path: &str) -> Result<String> {
    if path.is_empty() {
        return Err(anyhow!("--read needs a file path"));
    }
    let content = browser.read_file(repo, path).await?;
    Ok(truncate_preview(&content, DEFAULT_PREVIEW_LINES))
}

fn is_repo_name(repo: &str) -> bool {
    let mut parts = repo.split('/');
    matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty()
    )
}

fn render_listing(repo: &str, path: &str, items: &[RepoItem]) -> String {
    let mut lines = vec![format!("{}/{}", repo, path)];
    if !path.is_empty() {
        lines.push(format!("  ../  ({})", display_dir(parent_path(path))));
    }

    for item in items {
        let line = match item.kind {
            RepoItemKind::Dir => format!("  {}/", item.name),
            RepoItemKind::File if GlobalSelection::from_repo_item(repo, item).is_some() => {
                format!("* {}", item.name)
            }
            RepoItemKind::File => format!("  {}", item.name),
        };
        lines.push(line);
    }

    if items.is_empty() {
        lines.push("  (empty)".to_string());
    }
    lines.join("\n")
}

fn display_dir(path: &str) -> &str {
    if path.is_empty() {
        "/"
    } else {
        path
    }
}
