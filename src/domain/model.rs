use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One row as returned by the source. Field sets vary between rows and tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, Value>,
}

impl Record {
    /// Raw lookup. `Some(Value::Null)` means the column exists but is empty.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// A field is present when it exists and is neither null nor an empty string.
    pub fn is_present(&self, field: &str) -> bool {
        match self.data.get(field) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.data.get(field).and_then(Value::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }
}

impl From<serde_json::Map<String, Value>> for Record {
    fn from(obj: serde_json::Map<String, Value>) -> Self {
        Self {
            data: obj.into_iter().collect(),
        }
    }
}

/// Records fetched from one table, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub table: String,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(table: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            table: table.into(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Ordered-column table produced by normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// No rows. Rows whose fields all fell outside the schema still count.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Inserts a column at `at`. `values` must have one entry per row.
    pub fn insert_column(&mut self, at: usize, name: impl Into<String>, values: Vec<Value>) {
        debug_assert_eq!(values.len(), self.rows.len());
        self.columns.insert(at, name.into());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.insert(at, value);
        }
    }
}

/// Counts over the raw request records, printed before the workbook is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryCounts {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub confirmed: i64,
    pub scheduled: i64,
    /// `approved - scheduled - confirmed`; negative when the data is inconsistent.
    pub approved_not_scheduled: i64,
}

/// Both raw datasets of one run.
#[derive(Debug, Clone, Default)]
pub struct ExtractedData {
    pub requests: Dataset,
    pub quotas: Dataset,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub summary: SummaryCounts,
    pub requests: Table,
    pub quotas: Table,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Paths of the timestamped artifact and the rolling latest copy.
    Written { timestamped: String, latest: String },
    NoRecords,
}
