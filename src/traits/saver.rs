// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::Path;

use crate::errors::SaverError;
use crate::saver::GenerationResult;
use crate::workflow::GenerationType;

/// Persistence strategy for one generation output shape.
///
/// Strategies are registered in a [`SaverRegistry`](crate::saver::SaverRegistry),
/// which owns the shared steps: the missing-result check, directory creation
/// and logging.
pub trait CodeSaver: Send + Sync {
    /// Reject results of the wrong shape or with blank required content.
    fn validate_input(&self, result: &GenerationResult) -> Result<(), SaverError>;

    /// Write the result's files beneath `base_dir`, which already exists.
    fn save_files(&self, result: &GenerationResult, base_dir: &Path) -> Result<(), SaverError>;

    fn code_type(&self) -> GenerationType;
}
