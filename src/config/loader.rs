// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::*;
use crate::errors::ConfigError;
use crate::utils::path_guard::normalize_relative;
use crate::workflow::GenerationType;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure for the generation service.
///
/// Every section is optional and falls back to its defaults, so an empty
/// file is a valid configuration. Loaded from YAML or TOML depending on the
/// file extension.
///
/// # Example
/// ```yaml
/// output_root: ./output
/// model:
///   base_url: https://api.openai.com/v1
///   model: gpt-4o-mini
///   api_key_env: OPENAI_API_KEY
///   timeout_seconds: 120
/// routing:
///   on_unknown: fallback
///   fallback_type: html
/// quality_check:
///   enabled: true
///   max_retries: 2
/// build:
///   enabled: false
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output_root: PathBuf,
    pub model: ModelConfig,
    pub routing: RoutingConfig,
    pub images: ImagesConfig,
    pub generation: GenerationConfig,
    pub quality_check: QualityCheckConfig,
    pub build: BuildConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            model: ModelConfig::default(),
            routing: RoutingConfig::default(),
            images: ImagesConfig::default(),
            generation: GenerationConfig::default(),
            quality_check: QualityCheckConfig::default(),
            build: BuildConfig::default(),
        }
    }
}

/// Model service connection settings.
///
/// # Fields
/// * `base_url` - OpenAI-compatible endpoint root (defaults to the OpenAI API)
/// * `model` - Model identifier
/// * `api_key_env` - Environment variable holding the API key
/// * `timeout_seconds` - Bounded wait for each model round-trip
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub base_url: Option<String>,
    pub model: String,
    pub api_key_env: String,
    pub timeout_seconds: u64,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            model: DEFAULT_MODEL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            timeout_seconds: DEFAULT_MODEL_TIMEOUT_SECONDS,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl ModelConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// What the router does when the model answers outside the closed type set.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnknownTypePolicy {
    /// Fail the execution with a classification error.
    #[default]
    Fail,
    /// Use `fallback_type` and log a warning.
    Fallback,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub on_unknown: UnknownTypePolicy,
    pub fallback_type: GenerationType,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            on_unknown: UnknownTypePolicy::Fail,
            fallback_type: GenerationType::Html,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    pub enabled: bool,
    pub max_images: usize,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_images: DEFAULT_MAX_IMAGES,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub max_tool_rounds: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QualityCheckConfig {
    pub enabled: bool,
    pub max_retries: u32,
}

impl Default for QualityCheckConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_retries: DEFAULT_QUALITY_MAX_RETRIES,
        }
    }
}

/// Project build settings.
///
/// # Fields
/// * `enabled` - Run install and build for project types; when off the sources are published as-is
/// * `install_command` / `build_command` - Program and arguments, run in the code directory
/// * `output_subdir` - Build output inside the project, published as the build result
/// * `timeout_seconds` - Bound on each command
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub enabled: bool,
    pub install_command: Vec<String>,
    pub build_command: Vec<String>,
    pub output_subdir: String,
    pub timeout_seconds: u64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            install_command: DEFAULT_INSTALL_COMMAND.iter().map(|s| s.to_string()).collect(),
            build_command: DEFAULT_BUILD_COMMAND.iter().map(|s| s.to_string()).collect(),
            output_subdir: DEFAULT_BUILD_OUTPUT_SUBDIR.to_string(),
            timeout_seconds: DEFAULT_BUILD_TIMEOUT_SECONDS,
        }
    }
}

impl BuildConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&content)?),
        Some("toml") => Ok(toml::from_str(&content)?),
        other => Err(ConfigError::UnsupportedFormat(
            other.unwrap_or_default().to_string(),
        )),
    }
}

/// Collect every semantic problem with the configuration.
pub fn validate_config(cfg: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if cfg.model.timeout_seconds == 0 {
        errors.push("model.timeout_seconds must be greater than zero".to_string());
    }
    if cfg.model.model.trim().is_empty() {
        errors.push("model.model must not be empty".to_string());
    }
    if cfg.generation.max_tool_rounds == 0 {
        errors.push("generation.max_tool_rounds must be greater than zero".to_string());
    }
    if cfg.build.enabled {
        if cfg.build.timeout_seconds == 0 {
            errors.push("build.timeout_seconds must be greater than zero".to_string());
        }
        if cfg.build.install_command.is_empty() {
            errors.push("build.install_command must not be empty".to_string());
        }
        if cfg.build.build_command.is_empty() {
            errors.push("build.build_command must not be empty".to_string());
        }
    }
    if let Err(violation) = normalize_relative(&cfg.build.output_subdir) {
        errors.push(format!("build.output_subdir: {}", violation));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(errors))
    }
}

pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let cfg = load_config(path)?;
    validate_config(&cfg)?;
    Ok(cfg)
}
