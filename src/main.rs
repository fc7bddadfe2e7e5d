//! junit-insight CLI
//!
//! Replays a test session from a JSON-lines outcome log and enriches the
//! session's JUnit XML report with AI failure analysis.

use anyhow::{anyhow, Result};
use junit_insight::cli::{parse_args, run_cli, EXIT_FAILURE};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let parsed = match parse_args(std::env::args()) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Run with --help for usage");
            std::process::exit(EXIT_FAILURE);
        }
    };

    if parsed.show_version {
        println!("junit-insight v{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if parsed.show_help {
        print_help();
        return Ok(());
    }

    if let Err(e) = init_logging(parsed.log_json) {
        eprintln!("Warning: {}", e);
    }

    let exit_code = run_cli(parsed);
    std::process::exit(exit_code);
}

/// Log to stderr, filtered by RUST_LOG (default: junit_insight=info)
fn init_logging(json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("junit_insight=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow!("Failed to initialise logging: {}", e))
}

fn print_help() {
    println!("junit-insight: enrich a JUnit XML report with AI failure analysis");
    println!();
    println!("USAGE:");
    println!("  junit-insight --report <report.xml> [--outcomes <file.jsonl>] [--config <file.toml>]");
    println!();
    println!("OPTIONS:");
    println!("  --report <path>     JUnit XML report to enrich (required)");
    println!("  --outcomes <path>   JSON-lines phase outcomes; '-' or absent reads stdin");
    println!("  --config <path>     TOML config; JJI_* environment variables override it");
    println!("  --log-json          Emit logs as JSON");
    println!("  --version, -v       Show version");
    println!("  --help, -h          Show this help");
    println!();
    println!("ENVIRONMENT:");
    println!("  JJI_SERVER_URL      Analysis service base URL (required)");
    println!("  JJI_TIMEOUT         Request timeout in seconds (default: 600)");
    println!("  JJI_AI_PROVIDER     AI provider, e.g. claude, gemini, cursor (required)");
    println!("  JJI_AI_MODEL        AI model (required)");
    println!("  RUST_LOG            Log filter (default: junit_insight=info)");
    println!();
    println!("The exit code is 0 whenever arguments are valid, whatever enrichment does.");
}
