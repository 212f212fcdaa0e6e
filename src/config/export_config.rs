use crate::core::ConfigProvider;
use crate::utils::error::{ExportError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Hard cap on request rows per run. Rows past the cap are dropped, not paginated.
pub const REQUESTS_ROW_LIMIT: usize = 10_000;
/// Hard cap on quota rows per run. Same truncation policy as requests.
pub const QUOTAS_ROW_LIMIT: usize = 1_000;

pub const DEFAULT_OUTPUT_DIR: &str = "exports";
pub const DEFAULT_OUTPUT_PREFIX: &str = "site_visit_requests";

pub const URL_ENV: &str = "SUPABASE_URL";
pub const SERVICE_KEY_ENV: &str = "SUPABASE_SERVICE_KEY";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub source: SourceConfig,
    pub limits: LimitsConfig,
    pub output: OutputConfig,
}

#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub url: Option<String>,
    pub service_key: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl std::fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceConfig")
            .field("url", &self.url)
            .field("service_key", &self.service_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub requests: usize,
    pub quotas: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            requests: REQUESTS_ROW_LIMIT,
            quotas: QUOTAS_ROW_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: String,
    pub prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: DEFAULT_OUTPUT_DIR.to_string(),
            prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
        }
    }
}

/// Connection details for the record source.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub url: String,
    pub service_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("url", &self.url)
            .field("service_key", &"<redacted>")
            .finish()
    }
}

impl ExportConfig {
    /// Loads a TOML file, substituting `${VAR}` references first.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ExportError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content)
            .map_err(|e| ExportError::config(format!("TOML parsing error: {}", e)))
    }

    /// Replaces `${VAR}` with the variable's value; unknown variables are left as is.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid pattern"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    /// Overlays credentials from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Set, non-empty variables win over values from the file.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty(URL_ENV) {
            self.source.url = Some(url);
        }
        if let Some(key) = non_empty(SERVICE_KEY_ENV) {
            self.source.service_key = Some(key);
        }
    }

    pub fn credentials(&self) -> Result<Credentials> {
        let url = validation::validate_required_field(URL_ENV, &self.source.url)?;
        let service_key =
            validation::validate_required_field(SERVICE_KEY_ENV, &self.source.service_key)?;

        Ok(Credentials {
            url: url.clone(),
            service_key: service_key.clone(),
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.source.timeout_seconds.map(Duration::from_secs)
    }

    pub fn output_directory(&self) -> &str {
        &self.output.directory
    }
}

impl ConfigProvider for ExportConfig {
    fn requests_limit(&self) -> usize {
        self.limits.requests
    }

    fn quotas_limit(&self) -> usize {
        self.limits.quotas
    }

    fn output_prefix(&self) -> &str {
        &self.output.prefix
    }
}

impl Validate for ExportConfig {
    /// Pre-flight check; runs before any fetch.
    fn validate(&self) -> Result<()> {
        let credentials = self.credentials()?;
        validation::validate_url(URL_ENV, &credentials.url)?;
        validation::validate_non_empty_string(SERVICE_KEY_ENV, &credentials.service_key)?;

        validation::validate_positive_number("limits.requests", self.limits.requests, 1)?;
        validation::validate_positive_number("limits.quotas", self.limits.quotas, 1)?;

        validation::validate_path("output.directory", &self.output.directory)?;
        validation::validate_file_prefix("output.prefix", &self.output.prefix)?;

        Ok(())
    }
}
