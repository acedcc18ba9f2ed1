//! Run reports written to stdout.

use std::fmt::Display;
use std::io::{self, Write};

use clap::ValueEnum;
use cloudtag_core::tags::Tags;
use cloudtag_runtime::{RunResult, SmartTagger, TagInfo};

/// Report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable listing.
    Text,
    /// One JSON document with the full result.
    Json,
}

/// Writes the report for `result` to stdout.
pub fn print(tagger: &SmartTagger, result: &RunResult, format: OutputFormat) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    match format {
        OutputFormat::Text => write_text(
            &mut out,
            tagger.storage_info(),
            tagger.llm_info(),
            &tagger.tags_info(),
            result,
        )?,
        OutputFormat::Json => {
            let report = serde_json::json!({
                "storage": tagger.storage_info(),
                "llm": tagger.llm_info(),
                "tags": tagger.tags_info(),
                "result": result,
            });
            serde_json::to_writer_pretty(&mut out, &report)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn write_text(
    out: &mut impl Write,
    storage: impl Display,
    llm: impl Display,
    tags: &[TagInfo],
    result: &RunResult,
) -> io::Result<()> {
    writeln!(out, "Storage: {storage}")?;
    writeln!(out, "LLM: {llm}")?;
    writeln!(out, "Tags:")?;
    for tag in tags {
        writeln!(out, "  {tag}")?;
    }
    writeln!(out, "Mode: {}", result.mode)?;

    for record in &result.records {
        writeln!(out)?;
        writeln!(out, "{}", record.key)?;
        if let Some(reason) = record.skip_reason() {
            writeln!(out, "  skipped: {reason}")?;
        }
        if !record.existing().is_empty() {
            writeln!(out, "  existing: {}", format_tags(record.existing()))?;
        }
        if let Some(proposed) = record.proposed() {
            writeln!(out, "  proposed: {}", format_tags(proposed))?;
        }
        if let Some(applied) = record.applied() {
            writeln!(out, "  applied: {}", format_tags(applied))?;
        }
    }

    writeln!(out)?;
    writeln!(out, "Summary: {}", result.summary)
}

fn format_tags(tags: &Tags) -> String {
    tags.iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(", ")
}
