// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-execution collaborators handed to every stage.
//!
//! The runtime is the explicit replacement for ambient state: stages reach the
//! model, the savers, the output layout and the event sink only through it.

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::{
    BuildConfig, Config, GenerationConfig, ImagesConfig, QualityCheckConfig, RoutingConfig,
};
use crate::errors::WorkflowError;
use crate::model::{ModelRequest, ModelTurn};
use crate::saver::{OutputLayout, SaverRegistry};
use crate::traits::ModelService;
use crate::workflow::events::EventSink;

/// Stage behaviour knobs derived from configuration.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub model_timeout: Duration,
    pub routing: RoutingConfig,
    pub images: ImagesConfig,
    pub generation: GenerationConfig,
    pub quality_check: QualityCheckConfig,
    pub build: BuildConfig,
}

impl PipelineSettings {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            model_timeout: cfg.model.timeout(),
            routing: cfg.routing.clone(),
            images: cfg.images.clone(),
            generation: cfg.generation.clone(),
            quality_check: cfg.quality_check.clone(),
            build: cfg.build.clone(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

pub struct StageRuntime {
    model: Arc<dyn ModelService>,
    savers: Arc<SaverRegistry>,
    layout: OutputLayout,
    settings: Arc<PipelineSettings>,
    sink: EventSink,
}

impl StageRuntime {
    pub fn new(
        model: Arc<dyn ModelService>,
        savers: Arc<SaverRegistry>,
        layout: OutputLayout,
        settings: Arc<PipelineSettings>,
        sink: EventSink,
    ) -> Self {
        Self {
            model,
            savers,
            layout,
            settings,
            sink,
        }
    }

    pub fn savers(&self) -> &SaverRegistry {
        &self.savers
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn sink(&self) -> &EventSink {
        &self.sink
    }

    pub fn cancellation(&self) -> &CancellationToken {
        self.sink.cancellation()
    }

    /// Fail fast if a stop was requested.
    pub fn ensure_active(&self) -> Result<(), WorkflowError> {
        if self.cancellation().is_cancelled() {
            Err(WorkflowError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// One model round-trip, bounded by the model timeout and raced against cancellation.
    pub async fn call_model(&self, request: ModelRequest) -> Result<ModelTurn, WorkflowError> {
        self.ensure_active()?;
        let timeout = self.settings.model_timeout;

        tokio::select! {
            biased;
            _ = self.cancellation().cancelled() => Err(WorkflowError::Cancelled),
            outcome = tokio::time::timeout(timeout, self.model.chat(request, &self.sink)) => {
                match outcome {
                    Ok(result) => result.map_err(WorkflowError::from),
                    Err(_) => Err(WorkflowError::Timeout(timeout)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::stub::ScriptedModel;
    use crate::model::{Message, Purpose};

    fn runtime(model: ScriptedModel, timeout: Duration, cancel: CancellationToken) -> StageRuntime {
        let settings = PipelineSettings {
            model_timeout: timeout,
            ..PipelineSettings::default()
        };
        StageRuntime::new(
            Arc::new(model),
            Arc::new(SaverRegistry::standard().unwrap()),
            OutputLayout::new("unused"),
            Arc::new(settings),
            EventSink::detached().with_cancellation(cancel),
        )
    }

    fn request() -> ModelRequest {
        ModelRequest::new(Purpose::Routing, vec![Message::user("x")])
    }

    #[tokio::test]
    async fn test_hung_model_times_out() {
        let rt = runtime(
            ScriptedModel::new().hang(Purpose::Routing),
            Duration::from_millis(50),
            CancellationToken::new(),
        );
        let err = rt.call_model(request()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_model_call() {
        let cancel = CancellationToken::new();
        let rt = runtime(
            ScriptedModel::new().hang(Purpose::Routing),
            Duration::from_secs(30),
            cancel.clone(),
        );

        let stopper = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        });
        let err = rt.call_model(request()).await.unwrap_err();
        stopper.await.unwrap();
        assert!(matches!(err, WorkflowError::Cancelled));
    }

    #[tokio::test]
    async fn test_model_error_propagates() {
        let rt = runtime(
            ScriptedModel::new().fail(Purpose::Routing, "connection reset"),
            Duration::from_secs(5),
            CancellationToken::new(),
        );
        let err = rt.call_model(request()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Model(_)));
        assert_eq!(err.code().as_i32(), 50000);
    }
}
