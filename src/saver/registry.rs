// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::SaverError;
use crate::observability::messages::{
    saver::{ArtifactRejected, ArtifactSaved},
    StructuredLog,
};
use crate::saver::{GenerationResult, HtmlSaver, MultiFileSaver, ProjectSaver};
use crate::traits::CodeSaver;
use crate::workflow::GenerationType;

/// Dispatches a generation result to the saver for its type.
pub struct SaverRegistry {
    savers: HashMap<GenerationType, Arc<dyn CodeSaver>>,
}

impl SaverRegistry {
    /// The built-in strategy set, one per generation type.
    pub fn standard() -> Result<Self, SaverError> {
        Self::with_savers(vec![
            Arc::new(HtmlSaver),
            Arc::new(MultiFileSaver),
            Arc::new(ProjectSaver::vue()),
            Arc::new(ProjectSaver::react()),
        ])
    }

    /// Build a registry, requiring exactly one saver per generation type.
    pub fn with_savers(savers: Vec<Arc<dyn CodeSaver>>) -> Result<Self, SaverError> {
        let mut map: HashMap<GenerationType, Arc<dyn CodeSaver>> = HashMap::new();
        for saver in savers {
            let kind = saver.code_type();
            if map.insert(kind, saver).is_some() {
                return Err(SaverError::DuplicateStrategy(kind));
            }
        }
        if let Some(missing) = GenerationType::ALL
            .into_iter()
            .find(|kind| !map.contains_key(kind))
        {
            return Err(SaverError::UnmappedType(missing));
        }
        Ok(Self { savers: map })
    }

    /// Validate `result` and write it to `base_dir`, replacing anything left by a previous run.
    ///
    /// Validation runs inline; clearing the directory and writing the files
    /// happen on the blocking pool.
    pub async fn save(
        &self,
        kind: GenerationType,
        result: Option<GenerationResult>,
        base_dir: &Path,
    ) -> Result<PathBuf, SaverError> {
        let saver = self
            .savers
            .get(&kind)
            .ok_or(SaverError::UnmappedType(kind))?;

        let result = result.ok_or_else(|| {
            SaverError::ContentValidation("generation result is missing".to_string())
        })?;
        if let Err(error) = saver.validate_input(&result) {
            ArtifactRejected {
                generation_type: kind.as_str(),
                error: &error,
            }
            .log();
            return Err(error);
        }

        let file_count = result.file_count();
        let saver = Arc::clone(saver);
        let dir = base_dir.to_path_buf();
        tokio::task::spawn_blocking(move || write_fresh(saver.as_ref(), &result, &dir))
            .await
            .map_err(|e| SaverError::Io(io::Error::new(io::ErrorKind::Other, e)))??;

        ArtifactSaved {
            generation_type: kind.as_str(),
            dir: &base_dir.display().to_string(),
            file_count,
        }
        .log();
        Ok(base_dir.to_path_buf())
    }
}

fn write_fresh(
    saver: &dyn CodeSaver,
    result: &GenerationResult,
    base_dir: &Path,
) -> Result<(), SaverError> {
    if base_dir.exists() {
        std::fs::remove_dir_all(base_dir)?;
    }
    std::fs::create_dir_all(base_dir)?;
    saver.save_files(result, base_dir)
}
