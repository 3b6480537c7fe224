// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{bail, Context};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use the_codesmith::config::{load_and_validate_config, Config, RuntimeBuilder};
use the_codesmith::workflow::GenerationOutcome;

/// Generate a web page or frontend project from a natural-language prompt.
///
/// Events are written to stdout in server-sent-events framing; logs go to stderr.
#[derive(Parser)]
#[command(name = "the-codesmith")]
#[command(version)]
struct Cli {
    /// Configuration file (.yaml, .yml or .toml); built-in defaults apply when omitted
    #[arg(short, long, env = "CODESMITH_CONFIG")]
    config: Option<PathBuf>,

    /// Session id; keys the output directories
    #[arg(short, long, default_value = "default")]
    session: String,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "CODESMITH_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// What to build
    prompt: String,
}

fn init_tracing(level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let config = match &cli.config {
        Some(path) => load_and_validate_config(path)
            .with_context(|| format!("failed to load config '{}'", path.display()))?,
        None => Config::default(),
    };
    let service = Arc::new(
        RuntimeBuilder::from_config(&config).context("failed to build generation runtime")?,
    );

    let (mut events, handle) = service.generate(cli.session.clone(), cli.prompt);
    let mut stdout = std::io::stdout();
    let mut stop_requested = false;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => {
                    stdout.write_all(event.to_sse().as_bytes())?;
                    stdout.flush()?;
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c(), if !stop_requested => {
                stop_requested = true;
                tracing::warn!(session_id = %cli.session, "Interrupted; stopping generation");
                service.stop(&cli.session);
            }
        }
    }

    match handle.await.context("generation task aborted")? {
        GenerationOutcome::Completed(ctx) => {
            if let Some(dir) = ctx.build_result_dir() {
                tracing::info!(build_result_dir = %dir.display(), "Generation finished");
            }
            Ok(())
        }
        GenerationOutcome::Failed { error, .. } | GenerationOutcome::Rejected(error) => {
            bail!("generation failed ({}): {}", error.code().as_i32(), error)
        }
    }
}
