//! Process-lifetime registry of selected files

use crate::search::model::IdentityKey;
use crate::selection::types::{GlobalSelection, SelectionSource};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Result of [`SelectionManager::toggle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Selected,
    Unselected,
}

/// Selections keyed by `(repo, path)`. They survive across searches until
/// removed or cleared.
#[derive(Debug, Clone, Default)]
pub struct SelectionManager {
    selections: HashMap<IdentityKey, GlobalSelection>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace
    pub fn add(&mut self, selection: GlobalSelection) {
        debug!("Selected {}/{}", selection.repo, selection.path);
        self.selections.insert(selection.key(), selection);
    }

    pub fn remove(&mut self, repo: &str, path: &str) {
        if self
            .selections
            .remove(&IdentityKey::new(repo, path))
            .is_some()
        {
            debug!("Unselected {}/{}", repo, path);
        }
    }

    pub fn toggle(&mut self, selection: GlobalSelection) -> ToggleOutcome {
        let key = selection.key();
        if self.selections.remove(&key).is_some() {
            ToggleOutcome::Unselected
        } else {
            self.selections.insert(key, selection);
            ToggleOutcome::Selected
        }
    }

    pub fn is_selected(&self, repo: &str, path: &str) -> bool {
        self.selections.contains_key(&IdentityKey::new(repo, path))
    }

    pub fn clear(&mut self) {
        self.selections.clear();
    }

    /// Every selection, sorted by `(repo, path)`
    pub fn get_all(&self) -> Vec<GlobalSelection> {
        let mut all: Vec<_> = self.selections.values().cloned().collect();
        all.sort_by(|a, b| (&a.repo, &a.path).cmp(&(&b.repo, &b.path)));
        all
    }

    /// Selections made while browsing `repo`; search picks are left out
    pub fn get_repo_selections(&self, repo: &str) -> Vec<GlobalSelection> {
        self.get_all()
            .into_iter()
            .filter(|s| s.repo == repo && s.source == SelectionSource::RepoBrowser)
            .collect()
    }

    pub fn count(&self) -> usize {
        self.selections.len()
    }

    pub fn count_by_source(&self, source: SelectionSource) -> usize {
        self.selections
            .values()
            .filter(|s| s.source == source)
            .count()
    }
}

/// [`SelectionManager`] behind a single lock, for several writers
#[derive(Debug, Clone, Default)]
pub struct SharedSelectionManager {
    inner: Arc<Mutex<SelectionManager>>,
}

impl SharedSelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, selection: GlobalSelection) {
        self.inner.lock().await.add(selection);
    }

    pub async fn remove(&self, repo: &str, path: &str) {
        self.inner.lock().await.remove(repo, path);
    }

    pub async fn toggle(&self, selection: GlobalSelection) -> ToggleOutcome {
        self.inner.lock().await.toggle(selection)
    }

    pub async fn is_selected(&self, repo: &str, path: &str) -> bool {
        self.inner.lock().await.is_selected(repo, path)
    }

    pub async fn clear(&self) {
        self.inner.lock().await.clear();
    }

    pub async fn get_all(&self) -> Vec<GlobalSelection> {
        self.inner.lock().await.get_all()
    }

    pub async fn get_repo_selections(&self, repo: &str) -> Vec<GlobalSelection> {
        self.inner.lock().await.get_repo_selections(repo)
    }

    pub async fn count(&self) -> usize {
        self.inner.lock().await.count()
    }

    pub async fn count_by_source(&self, source: SelectionSource) -> usize {
        self.inner.lock().await.count_by_source(source)
    }
}
