//! # agent-search Core
//!
//! Core library for agent-search, which finds agent and command definition
//! files across GitHub repositories.
//!
//! This library provides the search engine (query construction, rate-limit
//! aware paginated retrieval, filename filtering, deduplication and
//! popularity ranking), the provider backends it runs on, and the
//! cross-source selection registry.

// Core modules
pub mod browse;
pub mod config;
pub mod error;
pub mod provider;
pub mod search;
pub mod selection;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::{Backend, EngineConfig, MatchMode, ProviderSettings, SearchOptions, SearchTarget};
pub use error::{Error, Result};
pub use provider::{create_backend, BackendSet};
pub use search::{SearchEngine, SearchOutcome, SearchResult};
pub use selection::{GlobalSelection, SelectionManager, SelectionSource, SharedSelectionManager};

/// Current version of the agent-search-core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for the library, writing to stderr
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize tracing with a specific debug mode. `RUST_LOG` wins when set.
pub fn init_tracing_with_debug(debug: bool) {
    let filter = if debug { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}
