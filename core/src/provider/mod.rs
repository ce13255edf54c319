//! Search, popularity and browsing backends

pub mod client;
pub mod gh_cli;
pub mod process;
pub mod rest_api;

pub use client::{
    BatchRequest, PopularityProvider, RawMatch, RepoItem, RepoItemKind, RepositoryBrowser,
    SearchProvider,
};
pub use gh_cli::GhCliProvider;
pub use rest_api::GitHubApiProvider;

use crate::config::{Backend, ProviderSettings};
use crate::error::Result;
use std::sync::Arc;
use std::time::Duration;

/// One backend seen through each capability it provides
#[derive(Clone)]
pub struct BackendSet {
    pub search: Arc<dyn SearchProvider>,
    pub popularity: Arc<dyn PopularityProvider>,
    pub browser: Arc<dyn RepositoryBrowser>,
}

impl BackendSet {
    /// Share a single backend implementing every capability
    pub fn from_backend<T>(backend: T) -> Self
    where
        T: SearchProvider + PopularityProvider + RepositoryBrowser + 'static,
    {
        let backend = Arc::new(backend);
        Self {
            search: backend.clone(),
            popularity: backend.clone(),
            browser: backend,
        }
    }
}

/// Build the backend selected by `settings`
pub fn create_backend(settings: &ProviderSettings, call_timeout: Duration) -> Result<BackendSet> {
    settings.validate()?;

    match settings.backend {
        Backend::GhCli => Ok(BackendSet::from_backend(GhCliProvider::new(
            settings,
            call_timeout,
        )?)),
        Backend::RestApi => Ok(BackendSet::from_backend(GitHubApiProvider::new(
            settings,
            call_timeout,
        )?)),
    }
}
