//! # Revpulse Analytics Engine
//!
//! This crate turns subscription records into business KPIs: subscription
//! counts, monthly recurring revenue, churn rate, and the templated insight
//! sentences that accompany them.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** No I/O and no knowledge of HTTP or files. It depends only on
//!   `core-types` for the record model.
//! - **Stateless Calculation:** The `KpiSimulator` takes records as input and
//!   produces a `SimulationReport` as output, recomputing everything per call.
//!
//! ## Public API
//!
//! - `KpiSimulator`: The deletion filter, coercion, churn and MRR aggregation.
//! - `InsightGenerator`: Renders simulation and dashboard insight sentences.
//! - `SimulationReport`, `KpiSummary`, `MonthlyMrr`: The serialisable results.
//! - `format`: Currency and percentage rendering helpers.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod format;
pub mod insights;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use engine::KpiSimulator;
pub use error::AnalyticsError;
pub use insights::InsightGenerator;
pub use report::{KpiSummary, KpiTotals, MonthlyMrr, SimulationReport, YearMonth};
