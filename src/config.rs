use anyhow::{ Context, Result };
use serde::{ Deserialize, Serialize };
use std::fs;
use std::path::{ Path, PathBuf };

use crate::logger::{ self, LogTag };

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub anthropic: AnthropicConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnthropicConfig {
    /// API key for the Anthropic Messages API. The ANTHROPIC_API_KEY
    /// environment variable takes precedence when set.
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database filename inside the data directory
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,
    pub default_list_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            anthropic: AnthropicConfig::default(),
            database: DatabaseConfig::default(),
            general: GeneralConfig::default(),
        }
    }
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: crate::apis::llm::anthropic::DEFAULT_MODEL.to_string(),
            max_tokens: 16000,
            temperature: 0.7,
            request_timeout_secs: 120, // 2 minutes
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            filename: "deals.db".to_string(),
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            default_list_limit: 100,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            let default_config = Self::default();
            default_config.save(path)?;
            return Ok(default_config);
        }

        let content = fs
            ::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = serde_json
            ::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        // A missing key is not fatal here. Scoring reports it at point of use,
        // everything else works without one.
        if config.resolved_api_key().is_empty() {
            logger::warning(
                LogTag::Config,
                "⚠️ No Anthropic API key configured (set ANTHROPIC_API_KEY or edit the config file)"
            );
        }

        Ok(config)
    }

    /// Load from the standard config location, creating it on first run
    pub fn load_default() -> Result<Self> {
        Self::load(crate::paths::get_config_path())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json
            ::to_string_pretty(self)
            .with_context(|| "Failed to serialize config")?;

        fs
            ::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// API key with environment variable precedence
    pub fn resolved_api_key(&self) -> String {
        match std::env::var("ANTHROPIC_API_KEY") {
            Ok(key) if !key.trim().is_empty() => key,
            _ => self.anthropic.api_key.clone(),
        }
    }

    /// Full path of the deals database
    pub fn database_path(&self) -> PathBuf {
        crate::paths::get_data_directory().join(&self.database.filename)
    }
}
