//! Subcommand: `studyflow repl` -- interactive parse/dispatch loop.

use std::io::{self, BufRead, Write};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;

use studyflow_adapters::ActionRunner;
use studyflow_intent::{IntentParser, ParsedRequest};

use crate::report::RunReport;

/// Run the REPL on stdin/stdout.
pub async fn cmd_repl(parser: &IntentParser, runner: &ActionRunner, parse_only: bool) -> Result<()> {
    println!();
    println!("  Studyflow v{}", env!("CARGO_PKG_VERSION"));
    println!("  Language: {}", parser.language());
    println!("  Parser: {}", parser.strategy_name());
    if parse_only {
        println!("  Mode: parse only");
    }
    println!("  Type a request, or 'quit' to exit.");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    repl_loop(stdin.lock(), &mut stdout, parser, runner, parse_only).await?;

    info!("shutting down");
    Ok(())
}

/// Read requests from `input` until EOF or `quit`/`exit`, writing results
/// to `output`.  Returns the number of requests handled.
pub async fn repl_loop<R: BufRead, W: Write>(
    mut input: R,
    output: &mut W,
    parser: &IntentParser,
    runner: &ActionRunner,
    parse_only: bool,
) -> Result<usize> {
    let mut line_buf = String::new();
    let mut handled = 0;

    loop {
        write!(output, "> ")?;
        output.flush().ok();

        line_buf.clear();
        if input
            .read_line(&mut line_buf)
            .context("failed to read input")?
            == 0
        {
            writeln!(output)?;
            info!("EOF received, exiting");
            break;
        }

        let trimmed = line_buf.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == "quit" || trimmed == "exit" {
            info!("user requested exit");
            break;
        }

        let started = Instant::now();
        let request = ParsedRequest::now(trimmed);
        let outcome = parser.parse(&request).await;
        handled += 1;

        if parse_only {
            writeln!(output, "{}", serde_json::to_string_pretty(&outcome)?)?;
            writeln!(output)?;
            continue;
        }

        let results = runner.execute_batch(&outcome.batch).await;
        let report = RunReport::new(
            trimmed,
            outcome,
            results,
            started.elapsed().as_secs_f64(),
        );
        for line in report.summary_lines() {
            writeln!(output, "{line}")?;
        }
        writeln!(output)?;
    }

    Ok(handled)
}
