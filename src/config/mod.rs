#[cfg(feature = "cli")]
pub mod cli;
pub mod export_config;

pub use export_config::{
    Credentials, ExportConfig, LimitsConfig, OutputConfig, SourceConfig, QUOTAS_ROW_LIMIT,
    REQUESTS_ROW_LIMIT,
};
