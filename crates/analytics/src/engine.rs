use crate::error::AnalyticsError;
use crate::insights::InsightGenerator;
use crate::report::{KpiTotals, MonthlyMrr, SimulationReport, YearMonth};
use core_types::{fields, FieldValue, Schema, SubscriptionRecord};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// A stateless calculator that derives subscription KPIs from a batch of records.
///
/// Each call recomputes everything from its input, so one simulator can be shared
/// across any number of concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct KpiSimulator {
    insights: InsightGenerator,
}

/// The numeric view of one retained record after coercion.
#[derive(Debug, Clone, Copy)]
struct CoercedRow {
    mrr_amount: Decimal,
    churn_flag: Decimal,
    month: Option<YearMonth>,
}

impl KpiSimulator {
    pub fn new(insights: InsightGenerator) -> Self {
        Self { insights }
    }

    /// The main entry point: simulate KPIs for `records`, deriving the schema
    /// from the union of their field names.
    pub fn simulate(&self, records: &[SubscriptionRecord]) -> Result<SimulationReport, AnalyticsError> {
        let schema = Schema::from_records(records);
        self.simulate_with_schema(records, &schema)
    }

    /// Simulates KPIs against an explicit schema.
    ///
    /// # Arguments
    ///
    /// * `records` - The subscription rows, in caller order.
    /// * `schema` - The field names considered present for the batch. Field-level
    ///   rules (deletion filter, churn flag, monthly grouping) only apply to
    ///   fields listed here.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `SimulationReport` or an `AnalyticsError` if the
    /// MRR total leaves the exact decimal range.
    pub fn simulate_with_schema(
        &self,
        records: &[SubscriptionRecord],
        schema: &Schema,
    ) -> Result<SimulationReport, AnalyticsError> {
        let rows = self.coerce_rows(records, schema);
        let totals = self.calculate_totals(&rows, schema)?;

        let monthly_mrr = if schema.contains(fields::START_DATE) {
            self.calculate_monthly_mrr(&rows)?
        } else {
            Vec::new()
        };

        let insights = self.insights.simulation(&totals);

        tracing::debug!(
            input = records.len(),
            retained = totals.total_subscriptions,
            churned = totals.churned_subscriptions,
            months = monthly_mrr.len(),
            "KPI simulation complete."
        );

        Ok(SimulationReport {
            kpis: totals.summary(),
            monthly_mrr,
            insights,
        })
    }

    /// Applies the deletion filter and coerces the recognised fields of every
    /// surviving record.
    fn coerce_rows(&self, records: &[SubscriptionRecord], schema: &Schema) -> Vec<CoercedRow> {
        let filter_deleted = schema.contains(fields::SUBSCRIPTION_ID);
        let group_by_month = schema.contains(fields::START_DATE);

        records
            .iter()
            .filter(|record| {
                !(filter_deleted
                    && record
                        .get(fields::SUBSCRIPTION_ID)
                        .is_some_and(FieldValue::is_blank))
            })
            .map(|record| CoercedRow {
                mrr_amount: numeric(record, fields::MRR_AMOUNT),
                churn_flag: numeric(record, fields::CHURN_FLAG),
                month: group_by_month
                    .then(|| record.get(fields::START_DATE).and_then(FieldValue::to_date))
                    .flatten()
                    .map(YearMonth::from),
            })
            .collect()
    }

    /// Counts, MRR total and churn rate.
    ///
    /// A row is churned when its flag equals 1 or it contributes no revenue. The
    /// flag criterion only exists when the schema carries `churn_flag`; rows that
    /// lack the field in a batch that has it count as flag 0.
    fn calculate_totals(&self, rows: &[CoercedRow], schema: &Schema) -> Result<KpiTotals, AnalyticsError> {
        let uses_churn_flag = schema.contains(fields::CHURN_FLAG);

        let mut total_mrr = Decimal::ZERO;
        let mut churned = 0usize;

        for row in rows {
            total_mrr = checked_sum(total_mrr, row.mrr_amount)?;
            if (uses_churn_flag && row.churn_flag == Decimal::ONE) || row.mrr_amount.is_zero() {
                churned += 1;
            }
        }

        let total = rows.len();
        let churn_rate_percent = if total > 0 {
            Decimal::from(churned) * Decimal::ONE_HUNDRED / Decimal::from(total)
        } else {
            Decimal::ZERO
        };

        Ok(KpiTotals {
            total_subscriptions: total,
            churned_subscriptions: churned,
            total_mrr,
            churn_rate_percent,
        })
    }

    /// Sums MRR per calendar month, ascending. Rows without a usable start date
    /// are left out of the breakdown only.
    fn calculate_monthly_mrr(&self, rows: &[CoercedRow]) -> Result<Vec<MonthlyMrr>, AnalyticsError> {
        let mut by_month: BTreeMap<YearMonth, Decimal> = BTreeMap::new();

        for row in rows {
            if let Some(month) = row.month {
                let entry = by_month.entry(month).or_insert(Decimal::ZERO);
                *entry = checked_sum(*entry, row.mrr_amount)?;
            }
        }

        Ok(by_month
            .into_iter()
            .map(|(month, mrr_amount)| MonthlyMrr { month, mrr_amount })
            .collect())
    }
}

fn numeric(record: &SubscriptionRecord, field: &str) -> Decimal {
    record
        .get(field)
        .map(FieldValue::to_decimal_or_zero)
        .unwrap_or(Decimal::ZERO)
}

fn checked_sum(acc: Decimal, amount: Decimal) -> Result<Decimal, AnalyticsError> {
    acc.checked_add(amount).ok_or_else(|| {
        AnalyticsError::Calculation("MRR total exceeds the supported decimal range".to_string())
    })
}
