use core_types::SubscriptionRecord;
use serde_json::{Map, Number, Value};
use std::io::Read;

use crate::error::DataError;

/// A CSV file held in memory as header names plus raw string cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// The JSON kind a column is rendered as, decided from all of its non-empty cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Integer,
    Float,
    Text,
}

impl CsvTable {
    /// Parses comma-separated data with a header row. Short rows are allowed;
    /// their missing cells read as empty.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers()?.iter().map(str::to_string).collect();
        let rows = rdr
            .records()
            .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
            .collect::<Result<Vec<Vec<String>>, csv::Error>>()?;

        Ok(Self { headers, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    fn cell(&self, row: usize, column: usize) -> &str {
        self.rows[row].get(column).map(String::as_str).unwrap_or("")
    }

    /// Rows as JSON objects with typed cells: a column whose non-empty cells are
    /// all integers renders as integers, all numeric as floats, anything else as
    /// strings. Empty cells are `null`.
    pub fn typed_rows(&self) -> Vec<Map<String, Value>> {
        let kinds: Vec<ColumnKind> = (0..self.headers.len())
            .map(|column| self.column_kind(column))
            .collect();

        (0..self.rows.len())
            .map(|row| {
                self.headers
                    .iter()
                    .enumerate()
                    .map(|(column, name)| {
                        (name.clone(), typed_cell(self.cell(row, column), kinds[column]))
                    })
                    .collect::<Map<String, Value>>()
            })
            .collect()
    }

    /// The first `limit` rows with trimmed header names and every cell as a string.
    pub fn string_rows(&self, limit: usize) -> Vec<Map<String, Value>> {
        (0..self.rows.len().min(limit))
            .map(|row| {
                self.headers
                    .iter()
                    .enumerate()
                    .map(|(column, name)| {
                        (
                            name.trim().to_string(),
                            Value::String(self.cell(row, column).to_string()),
                        )
                    })
                    .collect::<Map<String, Value>>()
            })
            .collect()
    }

    /// Rows as subscription records built from the same cells as
    /// [`string_rows`](Self::string_rows): every field is text and an empty cell
    /// is `""`, so a blank `subscription_id` marks the row as deleted.
    pub fn records(&self) -> Vec<SubscriptionRecord> {
        self.string_rows(self.rows.len())
            .into_iter()
            .map(|row| row.into_iter().collect::<SubscriptionRecord>())
            .collect()
    }

    fn column_kind(&self, column: usize) -> ColumnKind {
        let mut kind = ColumnKind::Integer;
        for row in 0..self.rows.len() {
            let cell = self.cell(row, column).trim();
            if cell.is_empty() {
                continue;
            }
            if cell.parse::<i64>().is_ok() {
                continue;
            }
            if cell.parse::<f64>().is_ok_and(f64::is_finite) {
                kind = ColumnKind::Float;
                continue;
            }
            return ColumnKind::Text;
        }
        kind
    }
}

fn typed_cell(raw: &str, kind: ColumnKind) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    match kind {
        ColumnKind::Integer => trimmed
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
        ColumnKind::Float => trimmed
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(raw.to_string())),
        ColumnKind::Text => Value::String(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::FieldValue;
    use serde_json::json;

    fn table(csv: &str) -> CsvTable {
        CsvTable::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn infers_column_kinds() {
        let t = table("month,mrr_amount,note,count\n2024-01,1000,ok,3\n2024-02,1250.5,,4\n");
        let rows = t.typed_rows();
        assert_eq!(
            Value::Object(rows[0].clone()),
            json!({"month": "2024-01", "mrr_amount": 1000.0, "note": "ok", "count": 3})
        );
        assert_eq!(
            Value::Object(rows[1].clone()),
            json!({"month": "2024-02", "mrr_amount": 1250.5, "note": null, "count": 4})
        );
    }

    #[test]
    fn short_rows_read_as_empty_cells() {
        let t = table("a,b,c\n1,2\n");
        assert_eq!(Value::Object(t.typed_rows()[0].clone()), json!({"a": 1, "b": 2, "c": null}));
        assert_eq!(
            Value::Object(t.string_rows(10)[0].clone()),
            json!({"a": "1", "b": "2", "c": ""})
        );
    }

    #[test]
    fn string_rows_trim_headers_and_respect_limit() {
        let t = table(" subscription_id , mrr_amount\n1,100\n2,200\n3,300\n");
        let rows = t.string_rows(2);
        assert_eq!(rows.len(), 2);
        assert_eq!(
            Value::Object(rows[1].clone()),
            json!({"subscription_id": "2", "mrr_amount": "200"})
        );
    }

    #[test]
    fn records_keep_empty_cells_as_blank_text() {
        let t = table("subscription_id,mrr_amount,churn_flag\n1,100,\n,50,1\n");
        let records = t.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("churn_flag"), Some(&FieldValue::from("")));
        assert_eq!(records[0].get("mrr_amount"), Some(&FieldValue::from("100")));
        assert!(records[1].get("subscription_id").is_some_and(FieldValue::is_blank));
    }

    #[test]
    fn records_match_the_preview_cells() {
        let t = table(" subscription_id ,mrr_amount\nS1,100\n,50\n");
        let preview: Vec<SubscriptionRecord> = t
            .string_rows(usize::MAX)
            .into_iter()
            .map(|row| row.into_iter().collect())
            .collect();
        assert_eq!(t.records(), preview);
        assert_eq!(t.records()[1].get("subscription_id"), Some(&FieldValue::from("")));
    }

    #[test]
    fn header_only_file_is_empty() {
        let t = table("month,mrr_amount\n");
        assert!(t.is_empty());
        assert!(t.has_column("month"));
        assert!(!t.has_column("churn_flag"));
        assert!(t.records().is_empty());
    }
}
