//! Configuration types for agent-search core
//!
//! Core only accepts fully resolved, validated configuration.
//! All discovery, loading, and merging happens in CLI layer.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How filename keyword tokens combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Every token must appear (AND)
    #[default]
    All,
    /// At least one token must appear (OR)
    Any,
}

/// Which definition subtree is searched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchTarget {
    #[default]
    Agents,
    Commands,
}

impl SearchTarget {
    /// Root directory marker searched for this target
    pub fn root_marker(&self) -> &'static str {
        match self {
            SearchTarget::Agents => ".claude/agents/",
            SearchTarget::Commands => ".claude/commands/",
        }
    }

    /// Provider path qualifier restricting a query to this target
    pub fn path_qualifier(&self) -> String {
        format!("path:/{}", self.root_marker())
    }

    /// The other target, used when deriving display paths
    pub fn other(&self) -> SearchTarget {
        match self {
            SearchTarget::Agents => SearchTarget::Commands,
            SearchTarget::Commands => SearchTarget::Agents,
        }
    }
}

/// Per-query options. A zero limit means "use the engine default".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    #[serde(default)]
    pub match_mode: MatchMode,
    #[serde(default)]
    pub target: SearchTarget,
    #[serde(default)]
    pub limit: usize,
}

impl SearchOptions {
    pub fn new(match_mode: MatchMode, target: SearchTarget) -> Self {
        Self {
            match_mode,
            target,
            limit: 0,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// The limit to enforce, coercing zero to `default`
    pub fn effective_limit(&self, default: usize) -> usize {
        if self.limit == 0 {
            default.max(1)
        } else {
            self.limit
        }
    }
}

/// Tunables of the search engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on matches requested per provider call
    pub batch_size: usize,
    /// Attempts per batch before giving up on rate-limit failures
    pub max_attempts: u32,
    /// First backoff delay, doubled on every further attempt
    #[serde(rename = "base_delay_secs", with = "duration_secs")]
    pub base_delay: Duration,
    /// Pause between consecutive batches
    #[serde(rename = "inter_batch_delay_secs", with = "duration_secs")]
    pub inter_batch_delay: Duration,
    /// Ceiling on popularity lookups in flight
    pub max_concurrent_lookups: usize,
    /// Deadline for a single provider call
    #[serde(rename = "call_timeout_secs", with = "duration_secs")]
    pub call_timeout: Duration,
    /// Limit applied to keyword searches when none is given
    pub default_limit: usize,
    /// Limit applied to empty-keyword browsing when none is given
    pub default_browse_limit: usize,
    /// Raw matches a paged search may scan before giving up
    pub max_scanned_matches: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_size: 30,
            max_attempts: 3,
            base_delay: Duration::from_secs(10),
            inter_batch_delay: Duration::from_secs(2),
            max_concurrent_lookups: 5,
            call_timeout: Duration::from_secs(60),
            default_limit: 100,
            default_browse_limit: 300,
            max_scanned_matches: 1000,
        }
    }
}

impl EngineConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("batch_size", self.batch_size),
            ("max_attempts", self.max_attempts as usize),
            ("max_concurrent_lookups", self.max_concurrent_lookups),
            ("default_limit", self.default_limit),
            ("default_browse_limit", self.default_browse_limit),
            ("max_scanned_matches", self.max_scanned_matches),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: "0".to_string(),
                });
            }
        }

        if self.call_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "call_timeout_secs".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(())
    }
}

/// Supported search backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Backend {
    /// The `gh` command line client
    #[default]
    #[serde(rename = "gh_cli")]
    GhCli,
    /// The GitHub REST API over HTTPS
    #[serde(rename = "rest_api")]
    RestApi,
}

impl Backend {
    /// Get the backend name as a string
    pub fn as_str(&self) -> &str {
        match self {
            Backend::GhCli => "gh_cli",
            Backend::RestApi => "rest_api",
        }
    }
}

impl std::str::FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gh" | "gh_cli" | "cli" => Ok(Backend::GhCli),
            "api" | "rest" | "rest_api" => Ok(Backend::RestApi),
            other => Err(ConfigError::InvalidValue {
                field: "backend".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Resolved settings for the provider adapters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default)]
    pub backend: Backend,
    /// API token (required for the REST backend)
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_gh_path")]
    pub gh_path: String,
}

fn default_api_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_gh_path() -> String {
    "gh".to_string()
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            token: None,
            api_base_url: default_api_base_url(),
            gh_path: default_gh_path(),
        }
    }
}

impl ProviderSettings {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            ..Self::default()
        }
    }

    /// Set the API token
    pub fn with_token(mut self, token: String) -> Self {
        self.token = Some(token);
        self
    }

    /// Set the REST API base URL
    pub fn with_api_base_url(mut self, base_url: String) -> Self {
        self.api_base_url = base_url;
        self
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.is_empty() {
            return Err(ConfigError::MissingField {
                field: "api_base_url".to_string(),
            });
        }

        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url".to_string(),
                value: self.api_base_url.clone(),
            });
        }

        if self.backend == Backend::RestApi
            && self.token.as_deref().map_or(true, |t| t.trim().is_empty())
        {
            return Err(ConfigError::MissingField {
                field: "token".to_string(),
            });
        }

        if self.gh_path.is_empty() {
            return Err(ConfigError::MissingField {
                field: "gh_path".to_string(),
            });
        }

        Ok(())
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
