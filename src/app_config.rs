//! Application configuration module
//! This module handles the application configuration including loading,
//! validating and normalizing configuration settings.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use url::Url;

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (Minecraft locale, e.g. "en_us")
    pub source_language: String,

    /// Target language code (Minecraft locale, e.g. "ja_jp")
    pub target_language: String,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Mod directory layout
    #[serde(default)]
    pub mods: ModsConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    // @field: API key, sent as a bearer token
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Model name
    #[serde(default = "default_model")]
    pub model: String,

    // @field: Base URL of the chat completions API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    // @field: Timeout seconds per request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Keys per request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    // @field: Exclusive attempt ceiling of one conversation;
    // requests sent = max_attempts - 1, so the default of 3 allows one continuation
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    // @field: Fresh conversations tried per batch
    #[serde(default = "default_max_batch_attempts")]
    pub max_batch_attempts: u32,

    // @field: System prompt template path
    #[serde(default = "default_prompt_file")]
    pub prompt_file: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            batch_size: default_batch_size(),
            max_attempts: default_max_attempts(),
            max_batch_attempts: default_max_batch_attempts(),
            prompt_file: default_prompt_file(),
        }
    }
}

/// Where mods are read from and backed up to
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ModsConfig {
    /// Directory holding the mod jars
    #[serde(default = "default_mods_dir")]
    pub mods_dir: String,

    /// Root of the timestamped backup folders
    #[serde(default = "default_backup_dir")]
    pub backup_dir: String,
}

impl Default for ModsConfig {
    fn default() -> Self {
        Self {
            mods_dir: default_mods_dir(),
            backup_dir: default_backup_dir(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` crate filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_model() -> String {
    "gpt-4-1106-preview".to_string()
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    300 // long batches can take minutes to generate
}

fn default_batch_size() -> usize {
    25
}

fn default_max_attempts() -> u32 {
    3
}

fn default_max_batch_attempts() -> u32 {
    3
}

fn default_prompt_file() -> String {
    "prompts/default.txt".to_string()
}

fn default_mods_dir() -> String {
    "mods".to_string()
}

fn default_backup_dir() -> String {
    "MinecraftLanguageTranslator/ModBackup".to_string()
}

impl Config {
    /// Load a configuration file, creating one with defaults when it is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {:?}", path))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            return Ok(config);
        }

        log::warn!("Config file not found at {:?}, creating default config.", path);
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {:?}", path))?;
        Ok(config)
    }

    /// Store both locale codes in the lowercase form Minecraft loads
    ///
    /// Codes that do not parse are left as they are for `validate` to reject.
    pub fn normalize(&mut self) {
        if let Ok(code) = crate::language_utils::validate_locale_code(&self.source_language) {
            self.source_language = code;
        }
        if let Ok(code) = crate::language_utils::validate_locale_code(&self.target_language) {
            self.target_language = code;
        }
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::validate_locale_code(&self.source_language)
            .context("Invalid source language")?;
        crate::language_utils::validate_locale_code(&self.target_language)
            .context("Invalid target language")?;

        if crate::language_utils::locale_codes_match(&self.source_language, &self.target_language) {
            return Err(anyhow!("Source and target language are the same: {}", self.target_language));
        }

        let translation = &self.translation;
        if translation.api_key.trim().is_empty() {
            return Err(anyhow!("Translation API key is required"));
        }
        if translation.model.trim().is_empty() {
            return Err(anyhow!("Model name is required"));
        }
        Url::parse(&translation.endpoint)
            .with_context(|| format!("Invalid API endpoint: {}", translation.endpoint))?;
        if translation.batch_size == 0 {
            return Err(anyhow!("Batch size must be at least 1"));
        }
        // the ceiling is exclusive: 2 is the smallest value that sends a request
        if translation.max_attempts < 2 {
            return Err(anyhow!("Attempt ceiling must be at least 2"));
        }
        if translation.max_batch_attempts == 0 {
            return Err(anyhow!("Batch attempts must be at least 1"));
        }
        if translation.timeout_secs == 0 {
            return Err(anyhow!("Timeout must be at least 1 second"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "en_us".to_string(),
            target_language: "ja_jp".to_string(),
            translation: TranslationConfig::default(),
            mods: ModsConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
