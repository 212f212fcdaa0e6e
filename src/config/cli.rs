use crate::config::ExportConfig;
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "site-visit-export")]
#[command(about = "Export site visit requests and customer quotas to a styled XLSX workbook")]
pub struct CliArgs {
    /// Optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory the workbooks are written to (created on demand)
    #[arg(long)]
    pub output_dir: Option<String>,

    /// File name prefix for both the timestamped and the latest workbook
    #[arg(long)]
    pub prefix: Option<String>,

    /// Environment file with SUPABASE_URL / SUPABASE_SERVICE_KEY; ignored when missing
    #[arg(long, default_value = ".env")]
    pub env_file: PathBuf,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliArgs {
    /// File values first, then environment, then command line flags.
    pub fn load_config(&self) -> Result<ExportConfig> {
        let mut config = match &self.config {
            Some(path) => ExportConfig::from_file(path)?,
            None => ExportConfig::default(),
        };

        config.apply_env();

        if let Some(dir) = &self.output_dir {
            config.output.directory = dir.clone();
        }
        if let Some(prefix) = &self.prefix {
            config.output.prefix = prefix.clone();
        }

        Ok(config)
    }
}
