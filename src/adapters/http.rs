use crate::config::Credentials;
use crate::core::{Dataset, Record, RecordSource};
use crate::utils::error::{ExportError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// PostgREST client for a Supabase project (`{url}/rest/v1/{table}`).
#[derive(Debug, Clone)]
pub struct SupabaseSource {
    client: Client,
    base_url: String,
    service_key: String,
}

impl SupabaseSource {
    pub fn new(credentials: &Credentials, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: credentials.url.trim_end_matches('/').to_string(),
            service_key: credentials.service_key.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }
}

#[async_trait]
impl RecordSource for SupabaseSource {
    /// `select=*` with a hard `limit`; rows past the limit are never fetched.
    async fn fetch(&self, table: &str, limit: usize) -> Result<Dataset> {
        let url = self.table_url(table);
        tracing::debug!("GET {} (limit {})", url, limit);

        let response = self
            .client
            .get(&url)
            .query(&[("select", "*".to_string()), ("limit", limit.to_string())])
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ExportError::source_unavailable(table, e))?;

        let status = response.status();
        tracing::debug!("Response status for {}: {}", table, status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExportError::source_unavailable(
                table,
                format!("HTTP {}: {}", status, body.trim()),
            ));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ExportError::source_unavailable(table, e))?;

        let Value::Array(items) = body else {
            return Err(ExportError::source_unavailable(
                table,
                "expected a JSON array of rows",
            ));
        };

        let records = items
            .into_iter()
            .map(|item| match item {
                Value::Object(obj) => Ok(Record::from(obj)),
                other => Err(ExportError::source_unavailable(
                    table,
                    format!("expected row objects, got {}", other),
                )),
            })
            .collect::<Result<Vec<_>>>()?;

        if records.len() >= limit {
            tracing::warn!(
                "Fetched {} rows from '{}', which is the row cap; any further rows were not exported",
                records.len(),
                table
            );
        }

        Ok(Dataset::new(table, records))
    }
}
