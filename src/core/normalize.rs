use crate::domain::model::{Dataset, Table};
use serde_json::Value;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub raw: String,
    pub display: String,
}

/// Ordered raw-to-display column mapping. Order here is output column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySchema {
    columns: Vec<ColumnMapping>,
}

impl DisplaySchema {
    pub fn new<R, D>(pairs: impl IntoIterator<Item = (R, D)>) -> Self
    where
        R: Into<String>,
        D: Into<String>,
    {
        Self {
            columns: pairs
                .into_iter()
                .map(|(raw, display)| ColumnMapping {
                    raw: raw.into(),
                    display: display.into(),
                })
                .collect(),
        }
    }

    pub fn columns(&self) -> &[ColumnMapping] {
        &self.columns
    }

    pub fn site_visit_requests() -> Self {
        Self::new([
            ("id", "Request ID"),
            ("created_at", "Created At"),
            ("requester_name", "Requester Name"),
            ("requester_email", "Requester Email"),
            ("site_location", "Site Location"),
            ("problem_desc", "Problem Description"),
            ("status", "Request Status"),
            ("visit_status", "Visit Status"),
            ("requested_date", "Requested Date"),
            ("duration_hours", "Planned Hours"),
            ("approved_at", "Approved At"),
            ("scheduled_date", "Scheduled Date"),
            ("actual_start_time", "Actual Start Time"),
            ("actual_end_time", "Actual End Time"),
            ("customer_confirmed_at", "Customer Confirmed At"),
            ("technician_notes", "Technician Notes"),
            ("customer_notes", "Customer Notes"),
            ("rejection_reason", "Rejection Reason"),
            ("document_url", "Document URL"),
        ])
    }

    /// `Available Hours` is not listed here; it is derived after normalization.
    pub fn customer_quotas() -> Self {
        Self::new([
            ("customer_email", "Customer Email"),
            ("total_hours", "Total Hours Quota"),
            ("used_hours", "Used Hours"),
            ("created_at", "Created At"),
            ("updated_at", "Updated At"),
        ])
    }
}

/// Renames, filters and reorders `dataset` into `schema` order.
///
/// Output columns are the schema entries whose raw field occurs in at least
/// one record. Values pass through untouched; a record lacking an observed
/// field gets a null cell. An empty dataset yields a table with no columns.
pub fn normalize(dataset: &Dataset, schema: &DisplaySchema) -> Table {
    if dataset.is_empty() {
        return Table::default();
    }

    let observed: HashSet<&str> = dataset.records.iter().flat_map(|r| r.fields()).collect();

    let selected: Vec<&ColumnMapping> = schema
        .columns()
        .iter()
        .filter(|c| observed.contains(c.raw.as_str()))
        .collect();

    let rows = dataset
        .records
        .iter()
        .map(|record| {
            selected
                .iter()
                .map(|c| record.get(&c.raw).cloned().unwrap_or(Value::Null))
                .collect()
        })
        .collect();

    tracing::debug!(
        "Normalized {} rows of '{}' into {} columns ({} fields observed)",
        dataset.len(),
        dataset.table,
        selected.len(),
        observed.len()
    );

    Table {
        columns: selected.iter().map(|c| c.display.clone()).collect(),
        rows,
    }
}
