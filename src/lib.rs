pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use adapters::{LocalStorage, SupabaseSource};
pub use config::ExportConfig;
pub use core::{etl::EtlEngine, pipeline::ExportPipeline};
pub use utils::error::{ExportError, Result};
