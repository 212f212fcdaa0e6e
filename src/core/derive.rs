use crate::domain::model::Table;
use serde_json::{Number, Value};

/// A column computed as `minuend - subtrahend`, placed right after the subtrahend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedDifference {
    pub name: &'static str,
    pub minuend: &'static str,
    pub subtrahend: &'static str,
}

pub const AVAILABLE_HOURS: DerivedDifference = DerivedDifference {
    name: "Available Hours",
    minuend: "Total Hours Quota",
    subtrahend: "Used Hours",
};

impl DerivedDifference {
    /// Adds the derived column when both inputs exist. Otherwise returns the
    /// table unchanged. Results are not clamped.
    pub fn apply(&self, mut table: Table) -> Table {
        let (Some(lhs), Some(rhs)) = (
            table.column_index(self.minuend),
            table.column_index(self.subtrahend),
        ) else {
            tracing::debug!(
                "Skipping '{}': needs both '{}' and '{}'",
                self.name,
                self.minuend,
                self.subtrahend
            );
            return table;
        };

        let values = table
            .rows
            .iter()
            .map(|row| subtract(&row[lhs], &row[rhs]))
            .collect();

        table.insert_column(rhs + 1, self.name, values);
        table
    }
}

/// Integer inputs stay integers; anything else numeric goes through f64.
/// Null or non-numeric inputs give null.
fn subtract(lhs: &Value, rhs: &Value) -> Value {
    if let (Some(a), Some(b)) = (lhs.as_i64(), rhs.as_i64()) {
        if let Some(diff) = a.checked_sub(b) {
            return Value::from(diff);
        }
    }

    match (lhs.as_f64(), rhs.as_f64()) {
        (Some(a), Some(b)) => Number::from_f64(a - b)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn quota_table(columns: &[&str], rows: Vec<Vec<Value>>) -> Table {
        Table {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    #[test]
    fn test_available_hours_allows_negative() {
        let table = quota_table(
            &["Customer Email", "Total Hours Quota", "Used Hours", "Created At"],
            vec![
                vec![json!("a@x.co"), json!(10), json!(4), json!("2024-01-01")],
                vec![json!("b@x.co"), json!(5), json!(7), json!("2024-01-02")],
            ],
        );

        let table = AVAILABLE_HOURS.apply(table);

        assert_eq!(
            table.columns,
            vec![
                "Customer Email",
                "Total Hours Quota",
                "Used Hours",
                "Available Hours",
                "Created At"
            ]
        );
        assert_eq!(
            table.column("Available Hours").unwrap(),
            vec![&json!(6), &json!(-2)]
        );
    }

    #[test]
    fn test_available_hours_requires_both_inputs() {
        let table = quota_table(
            &["Customer Email", "Total Hours Quota"],
            vec![vec![json!("a@x.co"), json!(10)]],
        );

        let table = AVAILABLE_HOURS.apply(table);

        assert!(!table.has_column("Available Hours"));
        assert_eq!(table.columns.len(), 2);
    }

    #[test]
    fn test_available_hours_with_fractional_and_null_inputs() {
        let table = quota_table(
            &["Total Hours Quota", "Used Hours"],
            vec![
                vec![json!(7.5), json!(2)],
                vec![json!(8), Value::Null],
                vec![json!("ten"), json!(1)],
            ],
        );

        let table = AVAILABLE_HOURS.apply(table);

        assert_eq!(
            table.column("Available Hours").unwrap(),
            vec![&json!(5.5), &Value::Null, &Value::Null]
        );
    }
}
