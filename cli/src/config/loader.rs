//! CLI configuration loader for agent-search
//!
//! Implements single-source priority loading with flag overrides:
//! 1. --config file/dir (highest priority)
//! 2. Current working directory: ./agent-search.json or ./.agent-search/config.json
//! 3. User config directory: <config_dir>/agent-search/config.json
//! 4. Environment variables only (no files)

use agent_search_core::{Backend, EngineConfig, ProviderSettings};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variables holding a GitHub token, in lookup order
const TOKEN_ENV_VARS: [&str; 2] = ["GITHUB_TOKEN", "GH_TOKEN"];

/// Environment variable selecting the backend
const BACKEND_ENV_VAR: &str = "AGENT_SEARCH_BACKEND";

/// Raw configuration file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawConfig {
    /// Backend name (gh_cli or rest_api)
    #[serde(default)]
    pub backend: Option<String>,
    /// Token (can be "env:VAR_NAME" for environment variable)
    #[serde(default)]
    pub token: Option<String>,
    /// REST API base URL (optional)
    #[serde(default)]
    pub api_base_url: Option<String>,
    /// Path to the gh executable (optional)
    #[serde(default)]
    pub gh_path: Option<String>,
    /// Default result limit (optional)
    #[serde(default)]
    pub limit: Option<usize>,
    /// Engine tunables (optional)
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Fully resolved CLI configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub provider: ProviderSettings,
    pub engine: EngineConfig,
    /// Limit to use when the command line does not give one
    pub limit: Option<usize>,
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// CLI configuration loader
pub struct CliConfigLoader {
    /// Override config file/directory path
    config_override: Option<PathBuf>,
    /// Flag overrides
    backend_override: Option<String>,
    token_override: Option<String>,
    limit_override: Option<usize>,
    /// Search roots, `None` meaning the process defaults
    working_dir: Option<PathBuf>,
    config_dir: Option<PathBuf>,
    env: EnvLookup,
}

impl CliConfigLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self {
            config_override: None,
            backend_override: None,
            token_override: None,
            limit_override: None,
            working_dir: None,
            config_dir: None,
            env: Box::new(|key: &str| std::env::var(key).ok()),
        }
    }

    /// Set config file/directory override
    pub fn with_config_override(mut self, path: PathBuf) -> Self {
        self.config_override = Some(path);
        self
    }

    /// Set backend override
    pub fn with_backend_override(mut self, backend: String) -> Self {
        self.backend_override = Some(backend);
        self
    }

    /// Set token override
    pub fn with_token_override(mut self, token: String) -> Self {
        self.token_override = Some(token);
        self
    }

    /// Set limit override
    pub fn with_limit_override(mut self, limit: usize) -> Self {
        self.limit_override = Some(limit);
        self
    }

    #[cfg(test)]
    fn with_roots(mut self, working_dir: &Path, config_dir: &Path) -> Self {
        self.working_dir = Some(working_dir.to_path_buf());
        self.config_dir = Some(config_dir.to_path_buf());
        self
    }

    #[cfg(test)]
    fn with_env(mut self, vars: &[(&str, &str)]) -> Self {
        let vars: std::collections::HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.env = Box::new(move |key: &str| vars.get(key).cloned());
        self
    }

    /// Load and resolve configuration
    pub async fn load(&self) -> Result<ResolvedConfig> {
        // Step 1: Find and load base configuration
        let mut config = if let Some(override_path) = &self.config_override {
            self.load_from_path(override_path).await.with_context(|| {
                format!(
                    "Failed to load config from override path: {}",
                    override_path.display()
                )
            })?
        } else {
            self.search_and_load().await?
        };

        // Step 2: Apply flag overrides
        if let Some(backend) = &self.backend_override {
            config.backend = Some(backend.clone());
        }
        if let Some(token) = &self.token_override {
            config.token = Some(token.clone());
        }
        if let Some(limit) = self.limit_override {
            config.limit = Some(limit);
        }

        // Step 3: Resolve and validate
        self.resolve_config(config)
    }

    /// Search for config in priority order
    async fn search_and_load(&self) -> Result<RawConfig> {
        if let Some(config) = self.try_load_cwd().await? {
            return Ok(config);
        }

        if let Some(config) = self.try_load_config_dir().await? {
            return Ok(config);
        }

        debug!("No config file found, using environment only");
        Ok(RawConfig {
            backend: self.env_var(BACKEND_ENV_VAR),
            ..RawConfig::default()
        })
    }

    /// Try loading from current working directory
    async fn try_load_cwd(&self) -> Result<Option<RawConfig>> {
        let cwd = match &self.working_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };

        let candidates = [
            cwd.join("agent-search.json"),
            cwd.join(".agent-search").join("config.json"),
        ];
        for path in candidates {
            if path.exists() {
                return Ok(Some(self.load_file(&path).await?));
            }
        }

        Ok(None)
    }

    /// Try loading from the user config directory
    async fn try_load_config_dir(&self) -> Result<Option<RawConfig>> {
        let config_dir = self.config_dir.clone().or_else(dirs::config_dir);
        if let Some(config_dir) = config_dir {
            let config_path = config_dir.join("agent-search").join("config.json");
            if config_path.exists() {
                return Ok(Some(self.load_file(&config_path).await?));
            }
        }
        Ok(None)
    }

    /// Load configuration from a specific path (file or directory)
    async fn load_from_path(&self, path: &Path) -> Result<RawConfig> {
        if path.is_file() {
            self.load_file(path).await
        } else if path.is_dir() {
            let config_file = path.join("config.json");
            if config_file.exists() {
                self.load_file(&config_file).await
            } else {
                Err(anyhow!(
                    "No config.json found in directory: {}",
                    path.display()
                ))
            }
        } else {
            Err(anyhow!("Config path does not exist: {}", path.display()))
        }
    }

    /// Load a single config file
    async fn load_file(&self, path: &Path) -> Result<RawConfig> {
        debug!("Loading config from {}", path.display());
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn env_var(&self, key: &str) -> Option<String> {
        (self.env)(key).filter(|value| !value.trim().is_empty())
    }

    /// Token from the config value (handling `env:`), else the usual variables
    fn resolve_token(&self, token: Option<String>) -> Result<Option<String>> {
        match token {
            Some(token) => match token.strip_prefix("env:") {
                Some(var_name) => self
                    .env_var(var_name)
                    .map(Some)
                    .ok_or_else(|| anyhow!("Environment variable not found: {}", var_name)),
                None => Ok(Some(token)),
            },
            None => Ok(TOKEN_ENV_VARS.iter().find_map(|key| self.env_var(key))),
        }
    }

    /// Resolve raw config to ResolvedConfig
    fn resolve_config(&self, config: RawConfig) -> Result<ResolvedConfig> {
        let backend = match config.backend.or_else(|| self.env_var(BACKEND_ENV_VAR)) {
            Some(name) => name.parse::<Backend>()?,
            None => Backend::default(),
        };

        let mut provider = ProviderSettings::new(backend);
        provider.token = self.resolve_token(config.token)?;
        if let Some(base_url) = config.api_base_url {
            provider.api_base_url = base_url;
        }
        if let Some(gh_path) = config.gh_path {
            provider.gh_path = gh_path;
        }

        provider
            .validate()
            .map_err(|e| anyhow!("Configuration validation failed: {}", e))?;
        config
            .engine
            .validate()
            .map_err(|e| anyhow!("Configuration validation failed: {}", e))?;

        if config.limit == Some(0) {
            return Err(anyhow!("Configuration validation failed: limit must be positive"));
        }

        Ok(ResolvedConfig {
            provider,
            engine: config.engine,
            limit: config.limit,
        })
    }
}

impl Default for CliConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
