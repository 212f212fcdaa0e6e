use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Source unavailable for table '{table}': {message}")]
    SourceUnavailable { table: String, message: String },

    #[error("API client error: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Render error: {0}")]
    RenderError(#[from] rust_xlsxwriter::XlsxError),

    #[error("Render error: no sheet has any rows")]
    EmptyReport,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Source,
    Render,
    Io,
}

impl ExportError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn source_unavailable(table: &str, message: impl ToString) -> Self {
        Self::SourceUnavailable {
            table: table.to_string(),
            message: message.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::SourceUnavailable { .. } | Self::ApiError(_) => ErrorCategory::Source,
            Self::RenderError(_) | Self::EmptyReport => ErrorCategory::Render,
            Self::IoError(_) => ErrorCategory::Io,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::MissingConfigError { field } => {
                format!("{} must be set before running the export", field)
            }
            Self::SourceUnavailable { table, .. } => {
                format!("Could not fetch '{}' from the database", table)
            }
            Self::RenderError(_) | Self::EmptyReport => {
                "The spreadsheet could not be produced".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Set SUPABASE_URL and SUPABASE_SERVICE_KEY (environment or .env file) and check the config file"
            }
            ErrorCategory::Source => {
                "Check network access, the project URL and that the service key is still valid"
            }
            ErrorCategory::Render => "Check that no cell value exceeds spreadsheet limits",
            ErrorCategory::Io => "Check that the output directory is writable",
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
