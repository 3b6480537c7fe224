// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for loading and validating configuration.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported config format '{0}', expected .yaml, .yml or .toml")]
    UnsupportedFormat(String),

    /// One or more semantic checks failed.
    #[error("Configuration validation failed:\n{}", .0.join("\n"))]
    Invalid(Vec<String>),

    #[error("API key not found in environment variable '{0}'")]
    MissingApiKey(String),

    #[error("Failed to build model client: {0}")]
    ModelClient(String),

    #[error("Saver registry is incomplete: {0}")]
    Registry(String),
}
