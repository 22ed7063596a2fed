//! List the uploaded projects and the inventory, newest first.

use anyhow::anyhow;
use clap::Parser;
use std::sync::Arc;

use centro_datos::core::config::SupabaseConfig;
use centro_datos::core::telemetry::init_tracing;
use centro_datos::features::reporting::render::render_projects;
use centro_datos::features::reporting::TableReportService;
use centro_datos::modules::storage::SupabaseClient;

#[derive(Parser, Debug)]
#[command(name = "list-projects")]
#[command(about = "List the projects uploaded to the Centro de Datos")]
struct Args {
    /// Table holding the file records. Defaults to SUPABASE_FILES_TABLE
    #[arg(long)]
    files_table: Option<String>,

    /// Table holding the inventory. Defaults to SUPABASE_INVENTORY_TABLE
    #[arg(long)]
    inventory_table: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing("warn");

    let args = Args::parse();

    let config = SupabaseConfig::from_env().map_err(|e| anyhow!(e))?;
    let files_table = args
        .files_table
        .unwrap_or_else(|| config.files_table.clone());
    let inventory_table = args
        .inventory_table
        .unwrap_or_else(|| config.inventory_table.clone());
    let client = SupabaseClient::new(&config)
        .map_err(|e| anyhow!("Failed to initialize Supabase client: {}", e))?;
    let service = TableReportService::new(Arc::new(client));

    let report = service
        .list_projects(&files_table, &inventory_table)
        .await;
    print!("{}", render_projects(&report));

    Ok(())
}
