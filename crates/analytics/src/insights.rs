use rust_decimal::Decimal;

use crate::format::{format_currency, format_percent, truncate_to_int};
use crate::report::KpiTotals;

/// Renders the templated sentences that accompany KPI figures.
///
/// Insights are regenerated on every call from the aggregates they describe;
/// nothing here is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightGenerator {
    currency_symbol: String,
    churn_alert_threshold_pct: Decimal,
}

impl Default for InsightGenerator {
    fn default() -> Self {
        Self::new("₹", Decimal::TEN)
    }
}

impl InsightGenerator {
    /// `churn_alert_threshold_pct` is the churn rate (in percent) above which
    /// the churn sentence turns cautionary.
    pub fn new(currency_symbol: impl Into<String>, churn_alert_threshold_pct: Decimal) -> Self {
        Self {
            currency_symbol: currency_symbol.into(),
            churn_alert_threshold_pct,
        }
    }

    fn churn_is_high(&self, churn_rate_percent: Decimal) -> bool {
        churn_rate_percent > self.churn_alert_threshold_pct
    }

    /// Sentences for a what-if simulation: total MRR, churn commentary, and a
    /// note on the reduced active base when any subscription churned.
    pub fn simulation(&self, totals: &KpiTotals) -> Vec<String> {
        let mut insights = Vec::with_capacity(3);

        insights.push(format!(
            "After simulation, total MRR is {}, reflecting the impact of edited subscription values.",
            format_currency(totals.total_mrr, &self.currency_symbol)
        ));

        let rate = format_percent(totals.churn_rate_percent);
        if self.churn_is_high(totals.churn_rate_percent) {
            insights.push(format!(
                "Simulated churn rate is {}%, which may negatively impact revenue growth.",
                rate
            ));
        } else {
            insights.push(format!(
                "Simulated churn rate is {}%, indicating healthy retention under this scenario.",
                rate
            ));
        }

        let active = totals.active_subscriptions();
        if active < totals.total_subscriptions {
            insights.push(format!(
                "Active subscriptions reduced to {}, directly affecting recurring revenue stability.",
                active
            ));
        }

        insights
    }

    /// Sentences for the precomputed dashboard figures.
    ///
    /// `monthly_mrr` is the MRR series in chronological order. The
    /// month-over-month sentence needs at least two months and is skipped
    /// otherwise.
    pub fn dashboard(&self, churn_rate_percent: Decimal, monthly_mrr: &[Decimal]) -> Vec<String> {
        let mut insights = Vec::with_capacity(2);

        if let [.., previous, latest] = monthly_mrr {
            if latest > previous {
                insights.push(format!(
                    "Monthly recurring revenue increased from {} to {}, indicating revenue growth.",
                    truncate_to_int(*previous),
                    truncate_to_int(*latest)
                ));
            } else {
                insights.push(
                    "Monthly recurring revenue declined compared to the previous month, suggesting potential churn or reduced upgrades."
                        .to_string(),
                );
            }
        }

        let rate = format_percent(churn_rate_percent);
        if self.churn_is_high(churn_rate_percent) {
            insights.push(format!(
                "Churn rate is {}%, which is relatively high and may require retention strategies.",
                rate
            ));
        } else {
            insights.push(format!(
                "Churn rate is {}%, indicating healthy customer retention.",
                rate
            ));
        }

        insights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn totals(total: usize, churned: usize, mrr: Decimal, rate: Decimal) -> KpiTotals {
        KpiTotals {
            total_subscriptions: total,
            churned_subscriptions: churned,
            total_mrr: mrr,
            churn_rate_percent: rate,
        }
    }

    #[test]
    fn healthy_simulation_has_two_sentences() {
        let insights = InsightGenerator::default().simulation(&totals(3, 0, dec!(125430.75), dec!(0)));
        assert_eq!(
            insights,
            vec![
                "After simulation, total MRR is ₹125,430, reflecting the impact of edited subscription values.",
                "Simulated churn rate is 0.00%, indicating healthy retention under this scenario.",
            ]
        );
    }

    #[test]
    fn churned_simulation_warns_and_reports_active_count() {
        let insights = InsightGenerator::default().simulation(&totals(2, 1, dec!(100), dec!(50)));
        assert_eq!(insights.len(), 3);
        assert_eq!(
            insights[1],
            "Simulated churn rate is 50.00%, which may negatively impact revenue growth."
        );
        assert_eq!(
            insights[2],
            "Active subscriptions reduced to 1, directly affecting recurring revenue stability."
        );
    }

    #[test]
    fn threshold_is_exclusive() {
        let generator = InsightGenerator::default();
        let at_threshold = generator.simulation(&totals(10, 1, dec!(900), dec!(10)));
        assert!(at_threshold[1].contains("healthy retention"));
        let above = generator.simulation(&totals(1000, 101, dec!(900), dec!(10.1)));
        assert!(above[1].contains("negatively impact"));
    }

    #[test]
    fn custom_symbol_and_threshold_apply() {
        let generator = InsightGenerator::new("$", dec!(5));
        let insights = generator.simulation(&totals(20, 0, dec!(2500), dec!(6)));
        assert!(insights[0].contains("$2,500"));
        assert!(insights[1].contains("negatively impact"));
    }

    #[test]
    fn dashboard_reports_growth_without_grouping() {
        let insights = InsightGenerator::default()
            .dashboard(dec!(4.5), &[dec!(900), dec!(11000.9), dec!(12500.4)]);
        assert_eq!(
            insights,
            vec![
                "Monthly recurring revenue increased from 11000 to 12500, indicating revenue growth.",
                "Churn rate is 4.50%, indicating healthy customer retention.",
            ]
        );
    }

    #[test]
    fn dashboard_flat_or_falling_revenue_is_a_decline() {
        let insights = InsightGenerator::default().dashboard(dec!(12.345), &[dec!(500), dec!(500)]);
        assert!(insights[0].starts_with("Monthly recurring revenue declined"));
        assert_eq!(
            insights[1],
            "Churn rate is 12.34%, which is relatively high and may require retention strategies."
        );
    }

    #[test]
    fn dashboard_skips_comparison_with_one_month() {
        let insights = InsightGenerator::default().dashboard(dec!(1), &[dec!(500)]);
        assert_eq!(insights.len(), 1);
        assert!(insights[0].starts_with("Churn rate is 1.00%"));
    }
}
