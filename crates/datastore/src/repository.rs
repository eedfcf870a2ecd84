use configuration::DataSettings;
use core_types::FieldValue;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::error::DataError;
use crate::table::CsvTable;

const CHURN_RATE_COLUMN: &str = "churn_rate_percent";
const MRR_AMOUNT_COLUMN: &str = "mrr_amount";

/// The `CsvRepository` provides read access to the precomputed KPI files and
/// the raw subscription export.
///
/// Files are re-read on every call, so edits on disk show up without a restart.
#[derive(Debug, Clone)]
pub struct CsvRepository {
    data: DataSettings,
}

impl CsvRepository {
    /// File names are resolved against `data.directory`.
    pub fn new(data: DataSettings) -> Self {
        Self { data }
    }

    async fn load(&self, file: &str) -> Result<CsvTable, DataError> {
        let path = self.data.directory.join(file);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| DataError::Io { path: path.clone(), source })?;
        let table = CsvTable::from_reader(bytes.as_slice())?;
        tracing::debug!(path = %path.display(), rows = table.len(), "Loaded CSV file.");
        Ok(table)
    }

    /// The headline KPI row: the first row of the summary file.
    pub async fn kpi_summary(&self) -> Result<Map<String, Value>, DataError> {
        let table = self.load(&self.data.kpi_summary_file).await?;
        table
            .typed_rows()
            .into_iter()
            .next()
            .ok_or_else(|| DataError::Empty(self.data.kpi_summary_file.clone()))
    }

    /// Every row of the monthly MRR file, in file order.
    pub async fn monthly_mrr(&self) -> Result<Vec<Map<String, Value>>, DataError> {
        let table = self.load(&self.data.monthly_mrr_file).await?;
        Ok(table.typed_rows())
    }

    /// The leading rows of the subscription export, every cell as text.
    pub async fn subscriptions_preview(&self, limit: usize) -> Result<Vec<Map<String, Value>>, DataError> {
        let table = self.load(&self.data.subscriptions_file).await?;
        Ok(table.string_rows(limit))
    }

    /// The churn rate recorded in the summary file. A non-numeric value reads as 0.
    pub async fn summary_churn_rate(&self) -> Result<Decimal, DataError> {
        let summary = self.kpi_summary().await?;
        let value = summary
            .get(CHURN_RATE_COLUMN)
            .cloned()
            .ok_or_else(|| DataError::MissingColumn {
                file: self.data.kpi_summary_file.clone(),
                column: CHURN_RATE_COLUMN.to_string(),
            })?;
        Ok(FieldValue::from(value).to_decimal_or_zero())
    }

    /// The `mrr_amount` column of the monthly file in file order.
    pub async fn monthly_mrr_amounts(&self) -> Result<Vec<Decimal>, DataError> {
        let table = self.load(&self.data.monthly_mrr_file).await?;
        if !table.has_column(MRR_AMOUNT_COLUMN) {
            return Err(DataError::MissingColumn {
                file: self.data.monthly_mrr_file.clone(),
                column: MRR_AMOUNT_COLUMN.to_string(),
            });
        }
        Ok(table
            .typed_rows()
            .into_iter()
            .map(|mut row| {
                row.remove(MRR_AMOUNT_COLUMN)
                    .map(|v| FieldValue::from(v).to_decimal_or_zero())
                    .unwrap_or(Decimal::ZERO)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::fs;
    use std::path::Path;

    fn repository_in(dir: &Path) -> CsvRepository {
        CsvRepository::new(DataSettings {
            directory: dir.to_path_buf(),
            ..DataSettings::default()
        })
    }

    fn fixture() -> (tempfile::TempDir, CsvRepository) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("kpi_summary.csv"),
            "total_subscriptions,active_subscriptions,churned_subscriptions,total_mrr,churn_rate_percent\n120,108,12,45230.5,10.0\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("kpi_monthly_mrr.csv"),
            "month,mrr_amount\n2024-01,12000.0\n2024-02,13500.75\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("subscriptions.csv"),
            "subscription_id ,customer,mrr_amount\nS1,Acme,100\nS2,,0\nS3,Globex,250\n",
        )
        .unwrap();
        let repo = repository_in(dir.path());
        (dir, repo)
    }

    #[tokio::test]
    async fn summary_is_the_first_typed_row() {
        let (_dir, repo) = fixture();
        let summary = repo.kpi_summary().await.unwrap();
        assert_eq!(
            Value::Object(summary),
            json!({
                "total_subscriptions": 120,
                "active_subscriptions": 108,
                "churned_subscriptions": 12,
                "total_mrr": 45230.5,
                "churn_rate_percent": 10.0
            })
        );
        assert_eq!(repo.summary_churn_rate().await.unwrap(), dec!(10));
    }

    #[tokio::test]
    async fn monthly_rows_and_amounts_keep_file_order() {
        let (_dir, repo) = fixture();
        let rows = repo.monthly_mrr().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["month"], json!("2024-01"));
        assert_eq!(
            repo.monthly_mrr_amounts().await.unwrap(),
            vec![dec!(12000), dec!(13500.75)]
        );
    }

    #[tokio::test]
    async fn preview_is_stringly_typed_and_limited() {
        let (_dir, repo) = fixture();
        let rows = repo.subscriptions_preview(2).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            Value::Object(rows[1].clone()),
            json!({"subscription_id": "S2", "customer": "", "mrr_amount": "0"})
        );
    }

    #[tokio::test]
    async fn file_names_come_from_the_data_settings() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("monthly.csv"), "month,mrr_amount\n2024-03,75.5\n").unwrap();
        let repo = CsvRepository::new(DataSettings {
            directory: dir.path().to_path_buf(),
            monthly_mrr_file: "monthly.csv".to_string(),
            ..DataSettings::default()
        });
        assert_eq!(repo.monthly_mrr_amounts().await.unwrap(), vec![dec!(75.5)]);
        let err = repo.kpi_summary().await.unwrap_err();
        assert!(err.to_string().contains("kpi_summary.csv"));
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error_naming_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repository_in(dir.path());
        let err = repo.kpi_summary().await.unwrap_err();
        assert!(matches!(err, DataError::Io { .. }));
        assert!(err.to_string().contains("kpi_summary.csv"));
    }

    #[tokio::test]
    async fn header_only_summary_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("kpi_summary.csv"), "churn_rate_percent\n").unwrap();
        let repo = repository_in(dir.path());
        assert!(matches!(repo.kpi_summary().await, Err(DataError::Empty(_))));
    }

    #[tokio::test]
    async fn summary_without_churn_column_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("kpi_summary.csv"), "total_mrr\n10\n").unwrap();
        let repo = repository_in(dir.path());
        let err = repo.summary_churn_rate().await.unwrap_err();
        assert!(err.to_string().contains("churn_rate_percent"));
    }
}
