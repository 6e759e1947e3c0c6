use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::handlers::ResultsView;
use crate::models::AnalysisResponse;
use crate::services::summarizer::Summarizer;

#[derive(Parser)]
#[command(name = "bill-scanner")]
#[command(about = "Calorie breakdown for analyzed restaurant bills", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the results screen for an analysis response
    Results {
        /// Response JSON file (stdin when omitted or "-")
        input: Option<PathBuf>,

        /// Also print the clipboard report
        #[arg(long)]
        copy: bool,
    },

    /// Produce the clipboard report for an analysis response
    Report {
        /// Response JSON file (stdin when omitted or "-")
        input: Option<PathBuf>,

        /// Write the report to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Reject negative or non-finite calorie values
        #[arg(long)]
        strict: bool,
    },

    /// Serve the results endpoint over HTTP
    #[cfg(feature = "results-server")]
    Serve {
        /// Listen address (default: RESULTS_ADDR or 0.0.0.0:8080)
        #[arg(long)]
        addr: Option<String>,
    },
}

/// Read the raw response bytes from a file, or stdin for `None` / "-".
/// Bytes are not checked for UTF-8 here; the parser reports bad encodings.
pub fn read_input(input: Option<&Path>) -> Result<Vec<u8>> {
    match input {
        Some(path) if path != Path::new("-") => std::fs::read(path)
            .with_context(|| format!("failed to read response file {}", path.display())),
        _ => {
            let mut raw = Vec::new();
            std::io::stdin()
                .read_to_end(&mut raw)
                .context("failed to read response from stdin")?;
            Ok(raw)
        }
    }
}

/// Output of the `results` command and whether the failure view was shown
pub fn run_results(raw: &[u8], summarizer: &Summarizer, copy: bool) -> (String, bool) {
    let view = ResultsView::from_raw(raw, summarizer);
    let mut out = view.render_text();

    if copy {
        match view.copy_text() {
            Ok(text) => {
                out.push('\n');
                out.push_str(&text);
            }
            Err(e) => log::error!("❌ {}", e.user_message()),
        }
    }

    (out, view.is_failed())
}

pub fn build_report(raw: &[u8], summarizer: &Summarizer, strict: bool) -> crate::error::Result<String> {
    if strict {
        AnalysisResponse::parse_bytes(raw)?.validate()?;
    }
    summarizer.clipboard_text(raw)
}

pub fn write_report(path: &Path, report: &str) -> Result<()> {
    std::fs::write(path, report)
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    log::info!("📋 Report written to {}", path.display());
    Ok(())
}
