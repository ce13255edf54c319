//! Repository browsing and file URL helpers

use crate::provider::{RepoItem, RepoItemKind};

/// Lines kept by [`truncate_preview`] when no other limit is given
pub const DEFAULT_PREVIEW_LINES: usize = 100;

/// Raw-content URL the downloader fetches for a file web URL
pub fn download_url(url: &str) -> String {
    url.replacen("github.com", "raw.githubusercontent.com", 1)
        .replacen("/blob/", "/", 1)
}

/// Raw view URL used for previews
pub fn preview_url(url: &str) -> String {
    url.replacen("/blob/", "/raw/", 1)
}

/// Path of the enclosing directory, `""` at the repository root
pub fn parent_path(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => &trimmed[..idx],
        None => "",
    }
}

/// Keep the first `max_lines` lines, noting the cut
pub fn truncate_preview(content: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    if lines.len() <= max_lines {
        return content.to_string();
    }

    format!(
        "{}\n\n... (preview truncated at {} lines)",
        lines[..max_lines].join("\n"),
        max_lines
    )
}

/// Directories first, then files, each group by name
pub fn sort_listing(items: &mut [RepoItem]) {
    items.sort_by(|a, b| {
        let rank = |item: &RepoItem| match item.kind {
            RepoItemKind::Dir => 0,
            RepoItemKind::File => 1,
        };
        rank(a).cmp(&rank(b)).then_with(|| a.name.cmp(&b.name))
    });
}
