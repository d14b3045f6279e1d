//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the input sheet and the model (remote or local)
//! - streams rows through the pipeline with progress on stderr
//! - writes the output files and prints a run summary

use std::time::Duration;

use clap::Parser;

use crate::cli::{Command, ExtractArgs, TagArgs};
use crate::domain::Progress;
use crate::error::AppError;
use crate::io::ingest::KeywordLayout;
use crate::keywords::ArtifactPaths;
use crate::memo::{CompletionService, MemoExtractor, OpenAiClient};
use crate::report::{ExtractionSummary, KeywordSummary};

pub mod pipeline;

/// Entry point for the `bids` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Extract(args) => handle_extract(args, cli.quiet),
        Command::Tag(args) => handle_tag(args, cli.quiet),
    }
}

fn handle_extract(args: ExtractArgs, quiet: bool) -> Result<(), AppError> {
    extract_with(args, quiet, |args| {
        OpenAiClient::from_env(args.api_base.as_deref(), args.timeout_secs.map(Duration::from_secs))
    })
}

/// The client is built before the sheet is read, so a missing API key fails first.
fn extract_with<C: CompletionService>(
    args: ExtractArgs,
    quiet: bool,
    connect: impl FnOnce(&ExtractArgs) -> Result<C, AppError>,
) -> Result<(), AppError> {
    let extractor = MemoExtractor::new(connect(&args)?);
    let table = crate::io::ingest::read_table(&args.input)?;

    let outcomes = pipeline::extract_table(&table, &extractor, args.variant, |p| {
        report_progress(p, "Processing", "memo", quiet);
    })?;

    let rows: Vec<_> = outcomes.iter().map(|o| o.row.clone()).collect();
    crate::io::export::write_extraction_csv(&args.output, &rows)?;

    let summary = ExtractionSummary::from_outcomes(&outcomes);
    println!("{}", crate::report::format_extraction_summary(&summary, args.variant));
    println!("Wrote {}", args.output.display());
    Ok(())
}

fn handle_tag(args: TagArgs, quiet: bool) -> Result<(), AppError> {
    let layout = KeywordLayout {
        header_row: args.header_row,
        skip_rows: args.skip_rows,
    };
    let table = crate::io::ingest::read_keyword_table(&args.input, layout)?;
    let engine = crate::keywords::load_engine(&ArtifactPaths::new(&args.artifacts))?;

    let tagged = pipeline::tag_table(&table, &engine, args.threshold, |p| {
        report_progress(p, "Tagging", "row", quiet);
    })?;

    crate::io::export::write_keyword_csv(&args.output, &table, &tagged)?;
    if let Some(path) = &args.tiers {
        crate::io::export::write_tier_report(path, &tagged)?;
    }

    let summary = KeywordSummary::from_rows(&tagged);
    println!("{}", crate::report::format_keyword_summary(&summary, args.threshold));
    println!("Wrote {}", args.output.display());
    if let Some(path) = &args.tiers {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn report_progress<T>(progress: &Progress<T>, verb: &str, noun: &str, quiet: bool) {
    if !quiet {
        eprintln!("{}", crate::report::format_progress(progress, verb, noun));
    }
}
