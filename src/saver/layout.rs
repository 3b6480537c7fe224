// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Deterministic output directories.
//!
//! Every directory is keyed by `<generation_type>_<session_id>`, so two
//! sessions never share a directory and re-running a session reuses its path.

use std::path::{Path, PathBuf};

use crate::workflow::{GenerationType, SessionId};

pub const CODE_OUTPUT_DIR: &str = "code_output";
pub const STAGING_DIR: &str = "workspace";
pub const DEPLOY_DIR: &str = "code_deploy";

#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn keyed(&self, area: &str, kind: GenerationType, session: &SessionId) -> PathBuf {
        self.root
            .join(area)
            .join(format!("{}_{}", kind.as_str(), session.as_str()))
    }

    /// Where the saver writes generated code.
    pub fn code_dir(&self, kind: GenerationType, session: &SessionId) -> PathBuf {
        self.keyed(CODE_OUTPUT_DIR, kind, session)
    }

    /// Tool-loop sandbox for project generation.
    pub fn staging_dir(&self, kind: GenerationType, session: &SessionId) -> PathBuf {
        self.keyed(STAGING_DIR, kind, session)
    }

    /// Where the project builder publishes the build result.
    pub fn deploy_dir(&self, kind: GenerationType, session: &SessionId) -> PathBuf {
        self.keyed(DEPLOY_DIR, kind, session)
    }
}
