use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Serialize, Serializer};
use std::fmt;

/// The full output of a simulation run, serialised as the `/simulate` response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub kpis: KpiSummary,
    pub monthly_mrr: Vec<MonthlyMrr>,
    pub insights: Vec<String>,
}

/// Headline subscription KPIs, rounded for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub total_subscriptions: usize,
    pub active_subscriptions: usize,
    pub churned_subscriptions: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_mrr: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub churn_rate_percent: Decimal,
}

/// Unrounded aggregates. Insight text is rendered from these, the summary from
/// their rounded form.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiTotals {
    pub total_subscriptions: usize,
    pub churned_subscriptions: usize,
    pub total_mrr: Decimal,
    pub churn_rate_percent: Decimal,
}

impl KpiTotals {
    pub fn active_subscriptions(&self) -> usize {
        self.total_subscriptions - self.churned_subscriptions
    }

    pub fn summary(&self) -> KpiSummary {
        KpiSummary {
            total_subscriptions: self.total_subscriptions,
            active_subscriptions: self.active_subscriptions(),
            churned_subscriptions: self.churned_subscriptions,
            total_mrr: round2(self.total_mrr),
            churn_rate_percent: round2(self.churn_rate_percent),
        }
    }
}

/// Rounds half-to-even at two decimal places.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// MRR attributed to one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyMrr {
    pub month: YearMonth,
    #[serde(with = "rust_decimal::serde::float")]
    pub mrr_amount: Decimal,
}

/// A calendar month, ordered chronologically and rendered as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
