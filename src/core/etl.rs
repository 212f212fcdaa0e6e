use crate::core::{ExportOutcome, Pipeline};
use crate::utils::error::Result;
use std::time::Instant;

/// Runs one pipeline strictly in sequence: extract, transform, load.
pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<ExportOutcome> {
        let started = Instant::now();
        tracing::info!("Starting export run");

        let raw_data = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} requests and {} quotas",
            raw_data.requests.len(),
            raw_data.quotas.len()
        );

        let transformed = self.pipeline.transform(raw_data).await?;
        tracing::info!(
            "Transformed into {}x{} request table and {}x{} quota table",
            transformed.requests.rows.len(),
            transformed.requests.columns.len(),
            transformed.quotas.rows.len(),
            transformed.quotas.columns.len()
        );

        let outcome = self.pipeline.load(transformed).await?;
        match &outcome {
            ExportOutcome::Written { timestamped, latest } => {
                tracing::info!("Wrote {} and {}", timestamped, latest);
            }
            ExportOutcome::NoRecords => tracing::warn!("No request records, nothing rendered"),
        }

        tracing::info!("Export run finished in {:?}", started.elapsed());
        Ok(outcome)
    }
}
