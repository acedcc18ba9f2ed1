//! CLI configuration.
//!
//! ```text
//! Cli
//! ├── command: Command        # preview | apply
//! ├── tagger: TaggerArgs      # location, schema, backends, budget, prompt
//! └── format: OutputFormat    # text | json
//! ```
//!
//! Every option can be given as an argument or through its `CLOUDTAG_*`
//! environment variable.

mod tagger;

use std::process;

use clap::{Parser, Subcommand};
use cloudtag_runtime::RunMode;
pub use tagger::TaggerArgs;

use crate::report::OutputFormat;
use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "cloudtag")]
#[command(about = "Tag cloud storage objects with values chosen by a language model")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Tagger configuration.
    #[clap(flatten)]
    pub tagger: TaggerArgs,

    /// Report format written to stdout.
    #[arg(long, env = "CLOUDTAG_FORMAT", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// What to do with the proposed tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Propose tags for every object without writing them.
    Preview,
    /// Propose tags and write them merged over the existing tags.
    Apply,
}

impl Command {
    pub fn mode(self) -> RunMode {
        match self {
            Self::Preview => RunMode::Preview,
            Self::Apply => RunMode::Apply,
        }
    }
}

impl Cli {
    /// Loads the `.env` file (if enabled) and parses the arguments.
    ///
    /// The `.env` file is loaded first so its variables serve as argument
    /// defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Logs the configuration without credentials.
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            features = ?Self::enabled_features(),
            "Build information"
        );
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            command = ?self.command,
            location = %self.tagger.location,
            schema = %self.tagger.schema.display(),
            llm = %self.tagger.llm,
            model = ?self.tagger.model,
            max_bytes = self.tagger.max_bytes.get(),
            custom_prompt = self.tagger.prompt_template.is_some(),
            "Tagger configuration"
        );
    }

    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
