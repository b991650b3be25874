use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use payment_schedule_backend::{PaymentScheduleService, RunConfig};

/// Recompute next allowance payment days from the allowance event log
#[derive(Debug, Parser)]
#[command(name = "payment-schedule", version)]
struct CliArgs {
    /// YAML run configuration
    #[arg(short, long, env = "PAYMENT_SCHEDULE_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the input tables
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory the updated tables are written to
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// As-of date of the run (YYYY-MM-DD)
    #[arg(long)]
    reference_date: Option<NaiveDate>,

    /// Keep disabled allowances in the payment schedule
    #[arg(long)]
    include_disabled: bool,

    /// Compute and report without writing any table
    #[arg(long)]
    dry_run: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    let mut config =
        RunConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    if let Some(dir) = args.data_dir {
        config.data_directory = dir;
    }
    if let Some(dir) = args.output_dir {
        config.output_directory = dir;
    }
    if let Some(date) = args.reference_date {
        config.reference_date = date;
    }
    if args.include_disabled {
        config.only_enabled = false;
    }

    info!(
        "Reading tables from {:?}, reference date {}",
        config.data_directory, config.reference_date
    );

    let service = PaymentScheduleService::from_config(&config);
    let report = if args.dry_run {
        service.compute(config.reference_date)?
    } else {
        service.run(config.reference_date)?
    };
    let summary = report.summary();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Reference date:     {}", summary.reference_date);
    println!("Events loaded:      {}", summary.events_loaded);
    println!("Users reconciled:   {}", summary.users_reconciled);
    println!("Failed schedules:   {}", summary.failed_schedules);
    println!("Allowance rows:     {}", summary.allowance_rows);
    println!("Schedule rows:      {}", summary.schedule_rows);
    println!();
    if summary.changes.is_empty() {
        println!("No changes.");
    } else {
        println!("{:<38} {:<18} {:>10} {:>10}", "uuid", "column", "original", "updated");
        for change in &summary.changes {
            println!(
                "{:<38} {:<18} {:>10} {:>10}",
                change.uuid,
                change.column,
                change.original.as_deref().unwrap_or("-"),
                change.updated.as_deref().unwrap_or("-"),
            );
        }
    }
    if !args.dry_run {
        println!();
        println!("Updated tables written to {:?}", config.output_directory);
    }

    Ok(())
}
