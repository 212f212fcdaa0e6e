use crate::utils::error::{ExportError, Result};
use chrono::{Datelike, Duration, Local, NaiveDateTime, NaiveTime, Weekday};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// A fixed weekly slot, e.g. every Sunday at 00:00 local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklySchedule {
    pub weekday: Weekday,
    pub at: NaiveTime,
}

impl Default for WeeklySchedule {
    fn default() -> Self {
        Self {
            weekday: Weekday::Sun,
            at: NaiveTime::MIN,
        }
    }
}

impl WeeklySchedule {
    /// Parses a weekday ("sun", "Sunday", ...) and a `HH:MM` time.
    pub fn parse(weekday: &str, at: &str) -> Result<Self> {
        let weekday = weekday
            .parse::<Weekday>()
            .map_err(|_| ExportError::InvalidConfigValueError {
                field: "weekday".to_string(),
                value: weekday.to_string(),
                reason: "Expected a weekday name such as 'sunday' or 'sun'".to_string(),
            })?;

        let at = NaiveTime::parse_from_str(at, "%H:%M").map_err(|e| {
            ExportError::InvalidConfigValueError {
                field: "at".to_string(),
                value: at.to_string(),
                reason: format!("Expected HH:MM: {}", e),
            }
        })?;

        Ok(Self { weekday, at })
    }

    /// First slot strictly after `now`.
    pub fn next_after(&self, now: NaiveDateTime) -> NaiveDateTime {
        let days_ahead = (7 + self.weekday.num_days_from_monday() as i64
            - now.weekday().num_days_from_monday() as i64)
            % 7;
        let candidate = (now.date() + Duration::days(days_ahead)).and_time(self.at);

        if candidate > now {
            candidate
        } else {
            candidate + Duration::weeks(1)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Succeeded,
    Failed { code: Option<i32>, stderr: String },
    SpawnFailed(String),
}

/// Invokes the exporter binary as a child process, one run at a time.
#[derive(Debug, Clone)]
pub struct ExportInvoker {
    program: PathBuf,
    args: Vec<String>,
}

impl ExportInvoker {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Runs the exporter to completion, forwarding its stdout. Failures are
    /// reported, never propagated: the next slot is the retry.
    pub async fn run(&self) -> RunStatus {
        println!("[{}] Starting weekly export...", Local::now());
        tracing::info!("Invoking exporter {}", self.program.display());

        let output = match Command::new(&self.program).args(&self.args).output().await {
            Ok(output) => output,
            Err(e) => {
                println!("[{}] Error running export: {}", Local::now(), e);
                tracing::error!("Failed to spawn {}: {}", self.program.display(), e);
                return RunStatus::SpawnFailed(e.to_string());
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.is_empty() {
            println!("{}", stdout);
        }

        if output.status.success() {
            println!("[{}] Export completed successfully", Local::now());
            return RunStatus::Succeeded;
        }

        let code = output.status.code();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        match code {
            Some(code) => println!("[{}] Export failed (exit code: {}):", Local::now(), code),
            None => println!("[{}] Export failed (terminated by signal):", Local::now()),
        }
        if stderr.trim().is_empty() {
            println!("No error details available");
        } else {
            println!("STDERR: {}", stderr);
        }
        tracing::warn!("Exporter exited with {:?}", code);

        RunStatus::Failed { code, stderr }
    }
}
