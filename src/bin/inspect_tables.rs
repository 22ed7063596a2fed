//! Print a sample of every known table, then probe for tables commonly present
//! in a Supabase project.

use anyhow::anyhow;
use clap::Parser;
use std::sync::Arc;

use centro_datos::core::config::SupabaseConfig;
use centro_datos::core::telemetry::init_tracing;
use centro_datos::features::reporting::render::{render_discovery, render_inspections};
use centro_datos::features::reporting::TableReportService;
use centro_datos::modules::storage::SupabaseClient;
use centro_datos::shared::constants::{COMMON_TABLE_GUESSES, DEFAULT_SAMPLE_ROWS, KNOWN_TABLES};

/// Inspect the tables of the Centro de Datos Supabase project
#[derive(Parser, Debug)]
#[command(name = "inspect-tables")]
#[command(about = "Show columns and sample rows of the Centro de Datos tables")]
struct Args {
    /// Table to inspect (repeatable). Defaults to the known tables
    #[arg(short, long = "table")]
    tables: Vec<String>,

    /// Rows sampled per table
    #[arg(short, long, default_value_t = DEFAULT_SAMPLE_ROWS)]
    limit: usize,

    /// Skip probing for additional tables
    #[arg(long, default_value = "false")]
    no_discovery: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing("warn");

    let args = Args::parse();
    let tables = if args.tables.is_empty() {
        KNOWN_TABLES.iter().map(|t| t.to_string()).collect()
    } else {
        args.tables
    };

    let config = SupabaseConfig::from_env().map_err(|e| anyhow!(e))?;
    let client = SupabaseClient::new(&config)
        .map_err(|e| anyhow!("Failed to initialize Supabase client: {}", e))?;
    let service = TableReportService::new(Arc::new(client));

    let inspections = service.inspect_tables(&tables, args.limit).await;
    print!("{}", render_inspections(&inspections));

    if !args.no_discovery {
        let found = service.discover_tables(COMMON_TABLE_GUESSES, &tables).await;
        print!("{}", render_discovery(&found));
    }

    Ok(())
}
