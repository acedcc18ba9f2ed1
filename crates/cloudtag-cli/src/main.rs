#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod report;
mod telemetry;

use std::process;

use anyhow::Context;
use cloudtag_runtime::{RunMode, SmartTagger};

use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "cloudtag_cli::startup";
pub const TRACING_TARGET_CONFIG: &str = "cloudtag_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_STARTUP,
            error = %format!("{error:#}"),
            "cloudtag terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Parses arguments, runs the requested command and prints the report.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();
    telemetry::init_tracing()?;
    cli.log();

    let config = cli
        .tagger
        .to_config()
        .context("invalid tagger configuration")?;
    let tagger = SmartTagger::connect(config)
        .await
        .context("failed to connect storage and language model")?;

    let mode = cli.command.mode();
    let result = match mode {
        RunMode::Preview => tagger.preview(None).await,
        RunMode::Apply => tagger.apply(None).await,
    }
    .with_context(|| format!("{mode} run failed"))?;

    report::print(&tagger, &result, cli.format)
}
