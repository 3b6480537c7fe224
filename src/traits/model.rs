// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::errors::ModelError;
use crate::model::{ModelRequest, ModelTurn};
use crate::workflow::EventSink;

/// The language-model backend, consumed as an opaque service.
///
/// Implementations push content deltas to `sink` as `token` events when
/// `request.stream` is set, in the order they arrive. Time bounds and
/// cancellation are applied by the caller.
#[async_trait]
pub trait ModelService: Send + Sync {
    async fn chat(&self, request: ModelRequest, sink: &EventSink) -> Result<ModelTurn, ModelError>;

    fn name(&self) -> &str;
}
