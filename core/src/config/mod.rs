//! Minimal configuration module for agent-search core
//!
//! Only exports pure data types. All loading logic is in CLI layer.

pub mod types;

pub use types::{Backend, EngineConfig, MatchMode, ProviderSettings, SearchOptions, SearchTarget};
