use clap::Parser;
use site_visit_export::core::ExportOutcome;
use site_visit_export::utils::{logger, validation::Validate};
use site_visit_export::{
    CliArgs, EtlEngine, ExportError, ExportPipeline, LocalStorage, SupabaseSource,
};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    // Before logging, so RUST_LOG can come from the file too.
    let env_loaded = dotenvy::from_path(&args.env_file).is_ok();

    logger::init_cli_logger(args.verbose);

    println!("{}", "=".repeat(60));
    println!("SITE VISIT EXPORT");
    println!("{}", "=".repeat(60));
    println!();
    if env_loaded {
        println!("Loading environment from: {}", args.env_file.display());
    }

    match run(&args).await {
        Ok(outcome) => {
            if let ExportOutcome::Written { latest, .. } = outcome {
                tracing::info!("📁 Latest workbook: {}", latest);
            }
            println!();
            println!("Export completed successfully!");
        }
        Err(e) => {
            tracing::error!("❌ Export failed: {} (Category: {:?})", e, e.category());
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!();
            eprintln!("❌ Error: {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            // Full chain, plus a backtrace when RUST_BACKTRACE is set.
            eprintln!("{:?}", anyhow::Error::from(e));
            std::process::exit(1);
        }
    }
}

async fn run(args: &CliArgs) -> Result<ExportOutcome, ExportError> {
    let config = args.load_config()?;
    if args.verbose {
        tracing::debug!("Export config: {:?}", config);
    }

    config.validate()?;
    let credentials = config.credentials()?;

    let source = SupabaseSource::new(&credentials, config.timeout())?;
    let storage = LocalStorage::new(config.output_directory().to_string());
    let pipeline = ExportPipeline::new(storage, source, config);

    EtlEngine::new(pipeline).run().await
}
