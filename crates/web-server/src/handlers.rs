use crate::{error::AppError, AppState};
use analytics::SimulationReport;
use axum::{extract::State, Json};
use core_types::records_from_json;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub insights: Vec<String>,
}

/// # GET /
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "AI Business Intelligence API running" }))
}

/// # GET /favicon.ico
pub async fn favicon() -> Json<Value> {
    Json(json!({}))
}

/// # GET /kpis
/// The precomputed headline KPIs.
pub async fn get_kpis(State(state): State<Arc<AppState>>) -> Result<Json<Map<String, Value>>, AppError> {
    let summary = state.repository.kpi_summary().await?;
    Ok(Json(summary))
}

/// # GET /monthly-mrr
pub async fn get_monthly_mrr(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Map<String, Value>>>, AppError> {
    let rows = state.repository.monthly_mrr().await?;
    Ok(Json(rows))
}

/// # GET /insights
/// Month-over-month and churn commentary on the precomputed figures.
pub async fn get_insights(State(state): State<Arc<AppState>>) -> Result<Json<InsightsResponse>, AppError> {
    let (churn_rate, monthly) = tokio::try_join!(
        state.repository.summary_churn_rate(),
        state.repository.monthly_mrr_amounts(),
    )?;
    let insights = state.insights.dashboard(churn_rate, &monthly);
    Ok(Json(InsightsResponse { insights }))
}

/// # GET /subscriptions
/// Raw preview of the subscription export, every cell as text.
pub async fn get_subscriptions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Map<String, Value>>>, AppError> {
    let rows = state.repository.subscriptions_preview(state.preview_rows).await?;
    Ok(Json(rows))
}

/// # POST /simulate
/// Recomputes KPIs from caller-supplied records without persisting anything.
pub async fn simulate(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Value>,
) -> Result<Json<SimulationReport>, AppError> {
    let records = records_from_json(payload)?;
    let report = state.simulator.simulate(&records)?;
    tracing::info!(
        records = records.len(),
        retained = report.kpis.total_subscriptions,
        churn_rate = %report.kpis.churn_rate_percent,
        "Simulation served."
    );
    Ok(Json(report))
}
