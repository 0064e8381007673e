#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;

use std::process;

use anyhow::Context;
use pagewise::{Connection, MemoryRowSource, Paginator};

use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "pagewise_cli::startup";
pub const TRACING_TARGET_CONFIG: &str = "pagewise_cli::config";
pub const TRACING_TARGET_REQUEST: &str = "pagewise_cli::request";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_STARTUP,
            error = %error,
            "pagewise terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    Cli::init_tracing();
    cli.log();

    let paginator =
        Paginator::new(cli.pagination.clone()).context("invalid pagination configuration")?;

    let source = load_rows(&cli).await?;
    let args = cli.request.connection_args()?;
    let field_map = cli.request.field_map()?;

    let result = match cli.request.raw_query() {
        Some(query) => {
            paginator
                .paginate_raw(&source, &query, &args, field_map.as_ref())
                .await
        }
        None => paginator.paginate(&source, &args, field_map.as_ref()).await,
    };

    // Internal failure detail is logged, never printed.
    let connection = result.map_err(pagewise::Error::into_public)?;

    tracing::info!(
        target: TRACING_TARGET_REQUEST,
        edges = connection.total_count,
        full_count = connection.full_count,
        has_next_page = connection.page_info.has_next_page,
        has_previous_page = connection.page_info.has_previous_page,
        "paginated rows"
    );

    print_connection(&connection, cli.request.compact)
}

/// Reads the data file into an in-memory row source.
async fn load_rows(cli: &Cli) -> anyhow::Result<MemoryRowSource> {
    let path = &cli.request.data;
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;

    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    let source = MemoryRowSource::from_json(value)
        .with_context(|| format!("failed to load rows from {}", path.display()))?;

    tracing::debug!(
        target: TRACING_TARGET_REQUEST,
        rows = source.len(),
        path = %path.display(),
        "loaded rows"
    );

    Ok(source)
}

fn print_connection(connection: &Connection, compact: bool) -> anyhow::Result<()> {
    let output = if compact {
        serde_json::to_string(connection)
    } else {
        serde_json::to_string_pretty(connection)
    }
    .context("failed to serialize connection")?;

    println!("{output}");
    Ok(())
}
