// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::config::Config;
use crate::errors::ConfigError;
use crate::model::OpenAiCompatibleModel;
use crate::saver::{OutputLayout, SaverRegistry};
use crate::traits::ModelService;
use crate::workflow::{PipelineSettings, WorkflowService};

/// Generation runtime builder - wires the model backend, saver registry and
/// pipeline settings into a ready [`WorkflowService`].
///
/// # Examples
///
/// ```no_run
/// use the_codesmith::config::{load_and_validate_config, RuntimeBuilder};
///
/// let config = load_and_validate_config("configs/codesmith.yaml").unwrap();
/// let service = RuntimeBuilder::from_config(&config).unwrap();
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Build the service with the OpenAI-compatible backend described by `cfg.model`.
    ///
    /// Fails when the API key variable is unset or the HTTP client cannot be built.
    pub fn from_config(cfg: &Config) -> Result<WorkflowService, ConfigError> {
        let model = OpenAiCompatibleModel::from_config(&cfg.model)?;
        Self::with_model(cfg, Arc::new(model))
    }

    /// Build the service around an already constructed model backend.
    pub fn with_model(
        cfg: &Config,
        model: Arc<dyn ModelService>,
    ) -> Result<WorkflowService, ConfigError> {
        let savers =
            SaverRegistry::standard().map_err(|e| ConfigError::Registry(e.to_string()))?;
        Ok(WorkflowService::new(
            model,
            Arc::new(savers),
            OutputLayout::new(cfg.output_root.clone()),
            PipelineSettings::from_config(cfg),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::stub::ScriptedModel;

    #[test]
    fn test_missing_api_key_is_reported() {
        let mut cfg = Config::default();
        cfg.model.api_key_env = "CODESMITH_TEST_KEY_THAT_IS_NEVER_SET".to_string();

        let err = RuntimeBuilder::from_config(&cfg).err().unwrap();
        assert!(matches!(err, ConfigError::MissingApiKey(ref var) if var == &cfg.model.api_key_env));
    }

    #[test]
    fn test_with_model_uses_configured_output_root() {
        let mut cfg = Config::default();
        cfg.output_root = "/tmp/codesmith-out".into();

        let service = RuntimeBuilder::with_model(&cfg, Arc::new(ScriptedModel::new())).unwrap();
        assert_eq!(service.layout().root(), std::path::Path::new("/tmp/codesmith-out"));
    }
}
