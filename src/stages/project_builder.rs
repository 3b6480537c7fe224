// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Publishes the build result.
//!
//! HTML and multi-file code is published as-is. Projects run the configured
//! install and build commands in the code directory when building is enabled
//! and publish `output_subdir`; otherwise the sources are published as-is.
//! The build-result directory is replaced on every run.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

use crate::errors::WorkflowError;
use crate::observability::messages::{stages::BuildCommandCompleted, StructuredLog};
use crate::stages::failure;
use crate::traits::{Stage, StageName};
use crate::utils::fs::replace_dir_with_copy;
use crate::utils::path_guard::{canonical_root, resolve_within};
use crate::workflow::runtime::StageRuntime;
use crate::workflow::WorkflowContext;

const STDERR_TAIL_LINES: usize = 20;

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    all[all.len().saturating_sub(lines)..].join("\n")
}

async fn run_command(
    argv: &[String],
    dir: &Path,
    timeout: Duration,
    rt: &StageRuntime,
) -> Result<(), WorkflowError> {
    let stage = StageName::ProjectBuilder;
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| failure(stage, "build command is empty"))?;
    let display = argv.join(" ");
    let started = Instant::now();

    let child = Command::new(program)
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| failure(stage, format!("failed to start '{}': {}", display, e)))?;

    let output = tokio::select! {
        biased;
        _ = rt.cancellation().cancelled() => return Err(WorkflowError::Cancelled),
        waited = tokio::time::timeout(timeout, child.wait_with_output()) => match waited {
            Ok(output) => output.map_err(|e| failure(stage, format!("'{}': {}", display, e)))?,
            Err(_) => {
                return Err(failure(stage, format!("'{}' timed out after {:?}", display, timeout)));
            }
        },
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(failure(
            stage,
            format!(
                "'{}' exited with {}: {}",
                display,
                output.status,
                tail(&stderr, STDERR_TAIL_LINES)
            ),
        ));
    }

    BuildCommandCompleted {
        command: &display,
        dir: &dir.display().to_string(),
        duration: started.elapsed(),
    }
    .log();
    Ok(())
}

async fn publish(src: PathBuf, dst: PathBuf) -> Result<(), WorkflowError> {
    let stage = StageName::ProjectBuilder;
    tokio::task::spawn_blocking(move || replace_dir_with_copy(&src, &dst))
        .await
        .map_err(|e| failure(stage, e))?
        .map_err(|e| failure(stage, e))?;
    Ok(())
}

pub struct ProjectBuilderStage;

#[async_trait]
impl Stage for ProjectBuilderStage {
    async fn run(&self, ctx: &mut WorkflowContext, rt: &StageRuntime) -> Result<(), WorkflowError> {
        let kind = ctx
            .generation_type()
            .ok_or_else(|| WorkflowError::Context("generation type is not set".to_string()))?;
        let code_dir = ctx
            .generated_code_dir()
            .ok_or_else(|| WorkflowError::Context("generated code dir is not set".to_string()))?
            .to_path_buf();
        let deploy_dir = rt.layout().deploy_dir(kind, ctx.session_id());
        let build = &rt.settings().build;

        let source = if kind.is_project() && build.enabled {
            run_command(&build.install_command, &code_dir, build.timeout(), rt).await?;
            rt.ensure_active()?;
            run_command(&build.build_command, &code_dir, build.timeout(), rt).await?;

            let root = canonical_root(&code_dir).map_err(|e| failure(self.name(), e))?;
            let output = resolve_within(&root, &build.output_subdir)
                .map_err(|e| failure(self.name(), e))?;
            if !output.is_dir() {
                return Err(failure(
                    self.name(),
                    format!("build produced no '{}' directory", build.output_subdir),
                ));
            }
            output
        } else {
            code_dir
        };

        rt.ensure_active()?;
        publish(source, deploy_dir.clone()).await?;
        ctx.set_build_result_dir(deploy_dir)
    }

    fn name(&self) -> StageName {
        StageName::ProjectBuilder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::stub::ScriptedModel;
    use crate::stages::testing;
    use crate::workflow::runtime::PipelineSettings;
    use crate::workflow::GenerationType;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn generated(root: &Path, kind: GenerationType, files: &[(&str, &str)]) -> WorkflowContext {
        let code_dir = root.join("code_output").join(format!("{}_s-1", kind.as_str()));
        for (path, content) in files {
            let target = code_dir.join(path);
            std::fs::create_dir_all(target.parent().unwrap()).unwrap();
            std::fs::write(target, content).unwrap();
        }
        let mut ctx = testing::context("x");
        ctx.set_generation_type(kind).unwrap();
        ctx.set_generated_code_dir(code_dir).unwrap();
        ctx
    }

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    #[tokio::test]
    async fn test_html_published_as_is() {
        let dir = TempDir::new().unwrap();
        let mut ctx = generated(dir.path(), GenerationType::Html, &[("index.html", "<p>x</p>")]);
        let (rt, _rx) = testing::runtime(Arc::new(ScriptedModel::new()), dir.path(), PipelineSettings::default());

        ProjectBuilderStage.run(&mut ctx, &rt).await.unwrap();

        let deploy = ctx.build_result_dir().unwrap();
        assert!(deploy.ends_with("code_deploy/html_s-1"));
        assert_eq!(std::fs::read_to_string(deploy.join("index.html")).unwrap(), "<p>x</p>");
        assert!(ctx.is_complete());
    }

    #[tokio::test]
    async fn test_project_with_build_disabled_copies_sources() {
        let dir = TempDir::new().unwrap();
        let mut ctx = generated(
            dir.path(),
            GenerationType::VueProject,
            &[("package.json", "{}"), ("src/App.vue", "<template/>")],
        );
        let mut settings = PipelineSettings::default();
        settings.build.enabled = false;
        let (rt, _rx) = testing::runtime(Arc::new(ScriptedModel::new()), dir.path(), settings);

        ProjectBuilderStage.run(&mut ctx, &rt).await.unwrap();
        assert!(ctx.build_result_dir().unwrap().join("src/App.vue").is_file());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_project_build_publishes_output_subdir() {
        let dir = TempDir::new().unwrap();
        let mut ctx = generated(dir.path(), GenerationType::ReactProject, &[("package.json", "{}")]);
        let mut settings = PipelineSettings::default();
        settings.build.install_command = sh("touch installed");
        settings.build.build_command = sh("mkdir -p dist && echo built > dist/index.html");
        let (rt, _rx) = testing::runtime(Arc::new(ScriptedModel::new()), dir.path(), settings);

        ProjectBuilderStage.run(&mut ctx, &rt).await.unwrap();

        let deploy = ctx.build_result_dir().unwrap();
        assert_eq!(std::fs::read_to_string(deploy.join("index.html")).unwrap(), "built\n");
        assert!(!deploy.join("package.json").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_build_reports_stderr_tail() {
        let dir = TempDir::new().unwrap();
        let mut ctx = generated(dir.path(), GenerationType::ReactProject, &[("package.json", "{}")]);
        let mut settings = PipelineSettings::default();
        settings.build.install_command = sh("true");
        settings.build.build_command = sh("echo 'vite: syntax error' >&2; exit 3");
        let (rt, _rx) = testing::runtime(Arc::new(ScriptedModel::new()), dir.path(), settings);

        let err = ProjectBuilderStage.run(&mut ctx, &rt).await.unwrap_err();
        assert!(err.to_string().contains("vite: syntax error"), "{}", err);
        assert!(ctx.build_result_dir().is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_missing_output_subdir_fails() {
        let dir = TempDir::new().unwrap();
        let mut ctx = generated(dir.path(), GenerationType::VueProject, &[("package.json", "{}")]);
        let mut settings = PipelineSettings::default();
        settings.build.install_command = sh("true");
        settings.build.build_command = sh("true");
        let (rt, _rx) = testing::runtime(Arc::new(ScriptedModel::new()), dir.path(), settings);

        let err = ProjectBuilderStage.run(&mut ctx, &rt).await.unwrap_err();
        assert!(err.to_string().contains("no 'dist' directory"));
    }

    #[test]
    fn test_tail_keeps_last_lines() {
        assert_eq!(tail("a\nb\nc", 2), "b\nc");
        assert_eq!(tail("a", 5), "a");
    }
}
