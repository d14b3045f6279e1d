//! Command-line parsing for the bid processing tools.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! pipelines. Each subcommand stands in for one page of the tool: upload a
//! sheet, process it row by row, download the result.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::ModelVariant;
use crate::keywords::DEFAULT_THRESHOLD;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "bids", version, about = "Bid Processing Suite: memo extraction and keyword tagging")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Suppress per-row progress output.
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract sponsor, type, title, institution and dates from bid memos.
    ///
    /// Input columns: UID, State, Bid Document Url, Bid Url, Memo.
    Extract(ExtractArgs),
    /// Tag bid titles with keywords using the local classifier.
    ///
    /// Input columns: Bid Title, Data Miner Keywords, QC Keywords, with the
    /// header on line 3 and two lines skipped beneath it by default.
    Tag(TagArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct ExtractArgs {
    /// Input CSV with one memo per row.
    #[arg(short, long, value_name = "CSV")]
    pub input: PathBuf,

    /// Output CSV (14-column schema).
    #[arg(short, long, value_name = "CSV", default_value = "structured_output.csv")]
    pub output: PathBuf,

    /// Fine-tuned model version (v2 gives more detailed titles, may miss some v1 edge cases).
    #[arg(long, value_enum, default_value_t = ModelVariant::V1)]
    pub variant: ModelVariant,

    /// Base URL of the OpenAI-compatible API (defaults to OPENAI_BASE_URL, then api.openai.com).
    #[arg(long, value_name = "URL")]
    pub api_base: Option<String>,

    /// Per-request timeout in seconds (default: HTTP client default).
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Parser, Clone)]
pub struct TagArgs {
    /// Input CSV with bid titles.
    #[arg(short, long, value_name = "CSV")]
    pub input: PathBuf,

    /// Output CSV (input columns plus `AI Keywords`).
    #[arg(short, long, value_name = "CSV", default_value = "keyword_tagged_output.csv")]
    pub output: PathBuf,

    /// Directory with keywords.json, tokenizer.json and model.onnx.
    #[arg(long, value_name = "DIR", default_value = "model_artifacts")]
    pub artifacts: PathBuf,

    /// Probability a label must exceed to be selected.
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: f32,

    /// Zero-based line holding the column names.
    #[arg(long, default_value_t = 2)]
    pub header_row: usize,

    /// Lines beneath the header that are not data.
    #[arg(long, default_value_t = 2)]
    pub skip_rows: usize,

    /// Write per-row confidence tiers (with fill colours) to this JSON file.
    #[arg(long, value_name = "JSON")]
    pub tiers: Option<PathBuf>,
}
