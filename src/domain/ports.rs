use crate::domain::model::{Dataset, ExportOutcome, ExtractedData, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Output sink for rendered workbooks. Write-only: nothing in a run reads
/// an artifact back.
pub trait Storage: Send + Sync {
    /// Writes `data`, creating parent directories on demand.
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Like `write_file`, but readers only ever see the old or the new content.
    fn replace_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Human-readable location of `path`, for progress output.
    fn location(&self, path: &str) -> String;
}

pub trait ConfigProvider: Send + Sync {
    fn requests_limit(&self) -> usize;
    fn quotas_limit(&self) -> usize;
    fn output_prefix(&self) -> &str;
}

/// Fetches a capped set of records for one table. Rows beyond `limit` are
/// omitted, never paginated.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch(&self, table: &str, limit: usize) -> Result<Dataset>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<ExtractedData>;
    async fn transform(&self, data: ExtractedData) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<ExportOutcome>;
}
