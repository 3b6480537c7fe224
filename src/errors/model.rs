// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors surfaced by the model service boundary.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    /// Connectivity or protocol failure talking to the model service.
    #[error("Transport error: {0}")]
    Transport(String),

    /// 401 / 403, or a missing API key.
    #[error("Provider authentication error: {0}")]
    ProviderAuth(String),

    /// 429 from the provider.
    #[error("Provider quota exceeded: {0}")]
    ProviderQuota(String),

    /// 5xx from the provider.
    #[error("Provider outage: {0}")]
    ProviderOutage(String),

    /// The model answered, but not in the shape the caller asked for.
    #[error("Invalid model response: {0}")]
    InvalidResponse(String),

    /// A prompt template could not be rendered.
    #[error("Prompt template '{template}' is missing parameter '{parameter}'")]
    MissingTemplateParameter { template: String, parameter: String },

    #[error("Misconfiguration: {0}")]
    Misconfiguration(String),
}
