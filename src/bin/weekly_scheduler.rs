use anyhow::Context;
use chrono::Local;
use clap::Parser;
use site_visit_export::core::schedule::{ExportInvoker, WeeklySchedule};
use site_visit_export::utils::logger;
use std::path::PathBuf;
use std::time::Duration;

/// Wake-up granularity. Short enough to notice clock jumps and suspends.
const POLL_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Parser)]
#[command(name = "weekly-scheduler")]
#[command(about = "Runs site-visit-export once a week")]
struct Args {
    /// Day of the week to run on
    #[arg(long, default_value = "sunday")]
    weekday: String,

    /// Local time of day to run at (HH:MM)
    #[arg(long, default_value = "00:00")]
    at: String,

    /// Exporter binary; defaults to site-visit-export next to this executable
    #[arg(long)]
    exporter: Option<PathBuf>,

    /// Extra arguments passed through to the exporter
    #[arg(last = true)]
    exporter_args: Vec<String>,

    /// Do not run an export immediately on start
    #[arg(long)]
    skip_initial: bool,

    /// Log as JSON lines
    #[arg(long)]
    json_logs: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn default_exporter() -> anyhow::Result<PathBuf> {
    let current = std::env::current_exe().context("cannot locate the scheduler executable")?;
    Ok(current.with_file_name(format!(
        "site-visit-export{}",
        std::env::consts::EXE_SUFFIX
    )))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    let schedule = WeeklySchedule::parse(&args.weekday, &args.at)?;
    let exporter = match args.exporter.clone() {
        Some(path) => path,
        None => default_exporter()?,
    };
    let invoker = ExportInvoker::new(exporter).with_args(args.exporter_args.clone());

    println!("{}", "=".repeat(60));
    println!("SITE VISIT WEEKLY EXPORT SCHEDULER");
    println!("{}", "=".repeat(60));
    println!();
    println!(
        "Schedule: every {:?} at {}",
        schedule.weekday,
        schedule.at.format("%H:%M")
    );
    println!("Exporter: {}", invoker.program().display());
    println!("Press Ctrl+C to stop");
    println!();

    tokio::select! {
        _ = run_loop(&schedule, &invoker, !args.skip_initial) => {}
        _ = tokio::signal::ctrl_c() => {
            println!();
            println!("Scheduler stopped by user");
        }
    }

    Ok(())
}

async fn run_loop(schedule: &WeeklySchedule, invoker: &ExportInvoker, initial: bool) {
    if initial {
        println!("Running initial export...");
        invoker.run().await;
        println!();
    }

    println!("Scheduler running. Waiting for next scheduled run...");
    loop {
        let next = schedule.next_after(Local::now().naive_local());
        tracing::info!("Next export at {}", next);

        loop {
            let now = Local::now().naive_local();
            if now >= next {
                break;
            }
            let remaining = (next - now).to_std().unwrap_or_default();
            tokio::time::sleep(remaining.min(POLL_INTERVAL)).await;
        }

        invoker.run().await;
    }
}
