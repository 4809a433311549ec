use crate::{errors::ServiceError, AppState};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RevenueParams {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

async fn order_cost_report(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let report = state.services.reports.order_cost_report(id).await?;
    Ok(Json(report))
}

async fn revenue_summary(
    State(state): State<AppState>,
    Query(params): Query<RevenueParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let summary = state
        .services
        .reports
        .revenue_summary(params.from, params.to)
        .await?;
    Ok(Json(summary))
}

pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/orders/:id/costs", get(order_cost_report))
        .route("/revenue", get(revenue_summary))
}
