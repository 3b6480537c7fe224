// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::Path;

use crate::errors::SaverError;
use crate::saver::multi_file::{validate_members, write_members};
use crate::saver::GenerationResult;
use crate::traits::CodeSaver;
use crate::workflow::GenerationType;

pub const PACKAGE_MANIFEST: &str = "package.json";

/// Framework project snapshot. One instance per project generation type.
pub struct ProjectSaver {
    kind: GenerationType,
}

impl ProjectSaver {
    pub fn vue() -> Self {
        Self {
            kind: GenerationType::VueProject,
        }
    }

    pub fn react() -> Self {
        Self {
            kind: GenerationType::ReactProject,
        }
    }
}

impl CodeSaver for ProjectSaver {
    fn validate_input(&self, result: &GenerationResult) -> Result<(), SaverError> {
        match result {
            GenerationResult::Project { files } => validate_members(files, PACKAGE_MANIFEST),
            other => Err(SaverError::ContentValidation(format!(
                "{} saver cannot persist a {} result",
                self.kind,
                other.shape()
            ))),
        }
    }

    fn save_files(&self, result: &GenerationResult, base_dir: &Path) -> Result<(), SaverError> {
        match result {
            GenerationResult::Project { files } => write_members(files, base_dir),
            other => Err(SaverError::ContentValidation(format!(
                "{} saver cannot persist a {} result",
                self.kind,
                other.shape()
            ))),
        }
    }

    fn code_type(&self) -> GenerationType {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_package_manifest_required() {
        let mut files = BTreeMap::new();
        files.insert("src/main.js".to_string(), "1;".to_string());
        let result = GenerationResult::Project { files };

        let err = ProjectSaver::vue().validate_input(&result).unwrap_err();
        assert!(err.to_string().contains("package.json"));
    }

    #[test]
    fn test_one_type_per_instance() {
        assert_eq!(ProjectSaver::vue().code_type(), GenerationType::VueProject);
        assert_eq!(ProjectSaver::react().code_type(), GenerationType::ReactProject);
    }

    #[test]
    fn test_save_files_refuses_wrong_shape() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = GenerationResult::MultiFile {
            files: BTreeMap::new(),
        };

        let err = ProjectSaver::react().save_files(&result, dir.path()).unwrap_err();
        assert!(err.to_string().contains("react_project saver"), "{}", err);
    }
}
