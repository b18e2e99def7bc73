//! CLI entry point for Studyflow.
//!
//! This binary provides the `studyflow` command with subcommands for parsing
//! requests, dispatching them to the demo adapters, an interactive loop and
//! a status summary.

mod cli;
mod config;
mod helpers;
mod repl;
mod report;

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use studyflow_adapters::ActionRunner;
use studyflow_intent::ParsedRequest;

use crate::cli::{Cli, Commands, RequestArgs};
use crate::config::StudyflowConfig;
use crate::helpers::{build_parser, env_non_empty, init_tracing};
use crate::report::RunReport;

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(if cli.verbose { "debug" } else { "warn" });

    let mut config = StudyflowConfig::load(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    if let Some(language) = cli.language {
        config.parser.language = language;
    }

    match cli.command {
        Commands::Parse { request } => cmd_parse(&config, &request).await,
        Commands::Run { request } => cmd_run(&config, &request).await,
        Commands::Repl { parse_only } => {
            let parser = build_parser(&config, false)?;
            let runner = ActionRunner::demo();
            repl::cmd_repl(&parser, &runner, parse_only).await
        }
        Commands::Status => cmd_status(&cli.config, &config).await,
    }
}

fn request_from(args: &RequestArgs) -> ParsedRequest {
    let text = args.text();
    match args.now {
        Some(instant) => ParsedRequest::new(text, instant),
        None => ParsedRequest::now(text),
    }
}

// ---------------------------------------------------------------------------
// Subcommand: parse
// ---------------------------------------------------------------------------

async fn cmd_parse(config: &StudyflowConfig, args: &RequestArgs) -> Result<()> {
    let parser = build_parser(config, args.rules_only)?;
    let request = request_from(args);

    let outcome = parser.parse(&request).await;
    info!(source = ?outcome.source, tasks = outcome.batch.len(), "request parsed");

    let json = serde_json::to_string_pretty(&outcome).context("failed to serialize intents")?;
    println!("{json}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Subcommand: run
// ---------------------------------------------------------------------------

async fn cmd_run(config: &StudyflowConfig, args: &RequestArgs) -> Result<()> {
    let started = Instant::now();
    let parser = build_parser(config, args.rules_only)?;
    let runner = ActionRunner::demo();
    let request = request_from(args);

    let outcome = parser.parse(&request).await;
    let results = runner.execute_batch(&outcome.batch).await;
    let report = RunReport::new(
        request.text,
        outcome,
        results,
        started.elapsed().as_secs_f64(),
    );
    info!(
        results = report.results.len(),
        errors = report.error_count(),
        elapsed = report.execution_time,
        "request dispatched"
    );

    let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
    println!("{json}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Subcommand: status
// ---------------------------------------------------------------------------

async fn cmd_status(config_path: &Path, config: &StudyflowConfig) -> Result<()> {
    println!();
    println!("  Studyflow v{}", env!("CARGO_PKG_VERSION"));
    println!();

    let config_state = if config_path.exists() {
        "found"
    } else {
        "missing, using defaults"
    };
    println!("  Config: {} ({config_state})", config_path.display());
    println!("  Parser mode: {}", config.parser.mode);
    println!("  Language: {}", config.parser.language);
    println!("  LLM provider: {}", config.llm.provider);
    println!("  LLM model: {}", config.llm.model);
    if let Some(url) = &config.llm.base_url {
        println!("  LLM base URL: {url}");
    }
    let key_state = if config.api_key(env_non_empty).is_some() {
        "set"
    } else {
        "not set"
    };
    println!("  API key ({}): {key_state}", config.llm.api_key_env);

    println!();
    println!("  Adapters:");
    let runner = ActionRunner::demo();
    for health in runner.health().await {
        println!(
            "    {:<16} {:<16} {:?}",
            health.id,
            health.app.as_str(),
            health.status
        );
    }
    println!();
    Ok(())
}
