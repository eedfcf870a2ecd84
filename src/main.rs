use analytics::{InsightGenerator, KpiSimulator, SimulationReport};
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Table};
use configuration::{LogFormat, Settings};
use core_types::{records_from_json, SubscriptionRecord};
use datastore::CsvTable;
use std::path::{Path, PathBuf};

/// The main entry point for the Revpulse application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the config file and defaults still apply.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let mut settings = configuration::load_config(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    if let Some(format) = cli.log_format {
        settings.logging.format = format;
    }
    let _log_guard = configuration::init_tracing(&settings.logging)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Serve => web_server::run_server(settings).await,
        Commands::Simulate(args) => handle_simulate(args, &settings).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Subscription KPIs, MRR and churn insights from CSV exports.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Missing files fall back to defaults.
    #[arg(long, global = true, default_value = "revpulse.toml")]
    config: PathBuf,

    /// Overrides the configured log output format.
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API.
    Serve,
    /// Compute KPIs for a set of subscription records and print them.
    Simulate(SimulateArgs),
}

#[derive(Parser)]
struct SimulateArgs {
    /// A JSON array of records, or a CSV export with a header row.
    #[arg(long)]
    input: PathBuf,

    /// Print the full report as JSON instead of tables.
    #[arg(long)]
    json: bool,
}

// ==============================================================================
// Simulate Command Logic
// ==============================================================================

/// Runs the simulator over a local file and prints the report.
async fn handle_simulate(args: SimulateArgs, settings: &Settings) -> anyhow::Result<()> {
    let records = read_records(&args.input).await?;
    tracing::info!(path = %args.input.display(), records = records.len(), "Loaded records.");

    let simulator = KpiSimulator::new(InsightGenerator::new(
        settings.insights.currency_symbol.clone(),
        settings.insights.churn_alert_threshold_pct,
    ));
    let report = simulator.simulate(&records)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

async fn read_records(path: &Path) -> anyhow::Result<Vec<SubscriptionRecord>> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => {
            let payload: serde_json::Value = serde_json::from_slice(&bytes)
                .with_context(|| format!("{} is not valid JSON", path.display()))?;
            Ok(records_from_json(payload)?)
        }
        Some(ext) if ext.eq_ignore_ascii_case("csv") => {
            Ok(CsvTable::from_reader(bytes.as_slice())?.records())
        }
        _ => bail!(
            "unsupported input '{}': expected a .json or .csv file",
            path.display()
        ),
    }
}

fn print_report(report: &SimulationReport) {
    let kpis = &report.kpis;
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["KPI", "Value"]);
    for (name, value) in [
        ("Total subscriptions", kpis.total_subscriptions.to_string()),
        ("Active subscriptions", kpis.active_subscriptions.to_string()),
        ("Churned subscriptions", kpis.churned_subscriptions.to_string()),
        ("Total MRR", kpis.total_mrr.to_string()),
        ("Churn rate %", kpis.churn_rate_percent.to_string()),
    ] {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(value).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{table}");

    if !report.monthly_mrr.is_empty() {
        let mut monthly = Table::new();
        monthly.load_preset(UTF8_FULL).set_header(vec!["Month", "MRR"]);
        for entry in &report.monthly_mrr {
            monthly.add_row(vec![
                Cell::new(entry.month),
                Cell::new(entry.mrr_amount).set_alignment(CellAlignment::Right),
            ]);
        }
        println!("{monthly}");
    }

    for insight in &report.insights {
        println!("- {insight}");
    }
}
