use crate::core::derive::AVAILABLE_HOURS;
use crate::core::normalize::{normalize, DisplaySchema};
use crate::core::output::OutputSlot;
use crate::core::render::{ReportRenderer, Sheet, QUOTAS_STYLE, REQUESTS_STYLE};
use crate::core::{
    ConfigProvider, ExportOutcome, ExtractedData, Pipeline, RecordSource, Storage,
    SummaryCounts, TransformResult,
};
use crate::utils::error::Result;
use chrono::{Local, NaiveDateTime};
use std::sync::Arc;

pub const REQUESTS_TABLE: &str = "site_visit_requests";
pub const QUOTAS_TABLE: &str = "customer_quotas";

pub const REQUESTS_SHEET: &str = "Site Visit Requests";
pub const QUOTAS_SHEET: &str = "Customer Quotas";

type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Requests and quotas to one styled workbook, written twice per run.
pub struct ExportPipeline<S: Storage, R: RecordSource, C: ConfigProvider> {
    storage: S,
    source: R,
    config: C,
    renderer: ReportRenderer,
    clock: Clock,
}

impl<S: Storage, R: RecordSource, C: ConfigProvider> ExportPipeline<S, R, C> {
    pub fn new(storage: S, source: R, config: C) -> Self {
        Self {
            storage,
            source,
            config,
            renderer: ReportRenderer::new(),
            clock: Arc::new(|| Local::now().naive_local()),
        }
    }

    /// Overrides the local clock used to stamp artifact names.
    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDateTime + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    fn render(&self, result: &TransformResult) -> Result<Vec<u8>> {
        self.renderer.render(&[
            Sheet {
                name: REQUESTS_SHEET,
                table: &result.requests,
                style: REQUESTS_STYLE,
            },
            Sheet {
                name: QUOTAS_SHEET,
                table: &result.quotas,
                style: QUOTAS_STYLE,
            },
        ])
    }
}

#[async_trait::async_trait]
impl<S: Storage, R: RecordSource, C: ConfigProvider> Pipeline for ExportPipeline<S, R, C> {
    async fn extract(&self) -> Result<ExtractedData> {
        println!("Fetching site visit requests...");
        let requests = self
            .source
            .fetch(REQUESTS_TABLE, self.config.requests_limit())
            .await?;
        println!("Fetched {} records", requests.len());

        println!("Fetching customer quotas...");
        let quotas = self
            .source
            .fetch(QUOTAS_TABLE, self.config.quotas_limit())
            .await?;
        println!("Fetched {} quota records", quotas.len());

        Ok(ExtractedData { requests, quotas })
    }

    async fn transform(&self, data: ExtractedData) -> Result<TransformResult> {
        let summary = SummaryCounts::from_dataset(&data.requests);
        println!("{}", summary);

        let requests = normalize(&data.requests, &DisplaySchema::site_visit_requests());
        let quotas = AVAILABLE_HOURS.apply(normalize(&data.quotas, &DisplaySchema::customer_quotas()));

        tracing::debug!(
            "Request table: {} columns, quota table: {} columns",
            requests.columns.len(),
            quotas.columns.len()
        );

        Ok(TransformResult {
            summary,
            requests,
            quotas,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<ExportOutcome> {
        if result.summary.total == 0 {
            println!("No records found in the database");
            return Ok(ExportOutcome::NoRecords);
        }

        let prefix = self.config.output_prefix();

        let stamped = OutputSlot::Timestamped((self.clock)()).file_name(prefix);
        let stamped_location = self.storage.location(&stamped);
        println!("Exporting to {}...", stamped_location);
        let workbook = self.render(&result)?;
        self.storage.write_file(&stamped, &workbook).await?;
        println!("✓ Export complete: {}", stamped_location);

        // Rendered again rather than copied so the latest slot is a complete
        // workbook in its own right.
        let latest = OutputSlot::Latest.file_name(prefix);
        let latest_location = self.storage.location(&latest);
        let workbook = self.render(&result)?;
        self.storage.replace_file(&latest, &workbook).await?;
        println!("✓ Latest copy updated: {}", latest_location);

        Ok(ExportOutcome::Written {
            timestamped: stamped_location,
            latest: latest_location,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportConfig;
    use crate::core::{Dataset, Record};
    use crate::utils::error::ExportError;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn file_names(&self) -> Vec<String> {
            let files = self.files.lock().await;
            let mut names: Vec<String> = files.keys().cloned().collect();
            names.sort();
            names
        }

        async fn contents(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }

        async fn replace_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.write_file(path, data).await
        }

        fn location(&self, path: &str) -> String {
            format!("mock://{}", path)
        }
    }

    struct MockSource {
        tables: HashMap<String, Vec<Record>>,
        calls: Mutex<Vec<(String, usize)>>,
    }

    impl MockSource {
        fn new(requests: Value, quotas: Value) -> Self {
            let mut tables = HashMap::new();
            tables.insert(REQUESTS_TABLE.to_string(), records(requests));
            tables.insert(QUOTAS_TABLE.to_string(), records(quotas));
            Self {
                tables,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RecordSource for MockSource {
        async fn fetch(&self, table: &str, limit: usize) -> Result<Dataset> {
            self.calls.lock().await.push((table.to_string(), limit));
            let records = self
                .tables
                .get(table)
                .ok_or_else(|| ExportError::source_unavailable(table, "HTTP 404"))?;
            Ok(Dataset::new(table, records.iter().take(limit).cloned().collect()))
        }
    }

    fn records(rows: Value) -> Vec<Record> {
        rows.as_array()
            .unwrap()
            .iter()
            .map(|r| Record::from(r.as_object().unwrap().clone()))
            .collect()
    }

    fn fixed_clock() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 2)
            .unwrap()
            .and_hms_opt(0, 0, 1)
            .unwrap()
    }

    #[tokio::test]
    async fn test_extract_uses_row_caps() {
        let source = MockSource::new(json!([{"id": 1}]), json!([]));
        let pipeline = ExportPipeline::new(MockStorage::new(), source, ExportConfig::default());

        let data = pipeline.extract().await.unwrap();

        assert_eq!(data.requests.len(), 1);
        assert!(data.quotas.is_empty());
        let calls = pipeline.source.calls.lock().await.clone();
        assert_eq!(
            calls,
            vec![
                (REQUESTS_TABLE.to_string(), 10_000),
                (QUOTAS_TABLE.to_string(), 1_000)
            ]
        );
    }

    #[tokio::test]
    async fn test_extract_fails_whole_run_on_source_error() {
        let mut source = MockSource::new(json!([{"id": 1}]), json!([]));
        source.tables.remove(QUOTAS_TABLE);
        let pipeline = ExportPipeline::new(MockStorage::new(), source, ExportConfig::default());

        let err = pipeline.extract().await.unwrap_err();

        assert!(matches!(err, ExportError::SourceUnavailable { ref table, .. } if table == QUOTAS_TABLE));
    }

    #[tokio::test]
    async fn test_transform_normalizes_and_derives() {
        let source = MockSource::new(
            json!([{"id": "r-1", "status": "pending", "secret": "x"}]),
            json!([
                {"id": 1, "customer_email": "a@x.co", "total_hours": 10, "used_hours": 4},
                {"id": 2, "customer_email": "b@x.co", "total_hours": 5, "used_hours": 7}
            ]),
        );
        let pipeline = ExportPipeline::new(MockStorage::new(), source, ExportConfig::default());

        let data = pipeline.extract().await.unwrap();
        let result = pipeline.transform(data).await.unwrap();

        assert_eq!(result.summary.total, 1);
        assert_eq!(result.requests.columns, vec!["Request ID", "Request Status"]);
        assert_eq!(
            result.quotas.columns,
            vec!["Customer Email", "Total Hours Quota", "Used Hours", "Available Hours"]
        );
        assert_eq!(
            result.quotas.column("Available Hours").unwrap(),
            vec![&json!(6), &json!(-2)]
        );
    }

    #[tokio::test]
    async fn test_load_skips_render_without_requests() {
        let storage = MockStorage::new();
        let source = MockSource::new(
            json!([]),
            json!([{"customer_email": "a@x.co", "total_hours": 10, "used_hours": 4}]),
        );
        let pipeline = ExportPipeline::new(storage.clone(), source, ExportConfig::default());

        let data = pipeline.extract().await.unwrap();
        let result = pipeline.transform(data).await.unwrap();
        let outcome = pipeline.load(result).await.unwrap();

        assert_eq!(outcome, ExportOutcome::NoRecords);
        assert!(storage.file_names().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_writes_timestamped_and_latest_slots() {
        let storage = MockStorage::new();
        let source = MockSource::new(json!([{"id": "r-1", "status": "approved"}]), json!([]));
        let pipeline = ExportPipeline::new(storage.clone(), source, ExportConfig::default())
            .with_clock(fixed_clock);

        let data = pipeline.extract().await.unwrap();
        let result = pipeline.transform(data).await.unwrap();
        let outcome = pipeline.load(result).await.unwrap();

        assert_eq!(
            outcome,
            ExportOutcome::Written {
                timestamped: "mock://site_visit_requests_20240602_000001.xlsx".to_string(),
                latest: "mock://site_visit_requests_latest.xlsx".to_string(),
            }
        );
        assert_eq!(
            storage.file_names().await,
            vec![
                "site_visit_requests_20240602_000001.xlsx",
                "site_visit_requests_latest.xlsx"
            ]
        );

        let latest = storage
            .contents("site_visit_requests_latest.xlsx")
            .await
            .unwrap();
        assert_eq!(&latest[..2], b"PK");
    }
}
