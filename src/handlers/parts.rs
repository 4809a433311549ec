use super::{PaginatedResponse, PaginationParams, SearchParams};
use crate::{
    auth::{AuthUser, Role},
    errors::ServiceError,
    services::parts::{CreatePartRequest, UpdatePartRequest},
    AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AdjustStockRequest {
    pub delta: i32,
}

#[derive(Debug, Deserialize)]
pub struct SetStockRequest {
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityParams {
    pub quantity: i32,
}

async fn create_part(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreatePartRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_any(&[Role::Admin, Role::Receptionist])?;
    let part = state.services.parts.create_part(request).await?;
    Ok((StatusCode::CREATED, Json(part)))
}

async fn get_part(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let part = state.services.parts.get_part(id).await?;
    Ok(Json(part))
}

async fn list_parts(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let (page, per_page) = params.normalized();
    let (items, total) = state.services.parts.list_parts(page, per_page).await?;
    Ok(Json(PaginatedResponse {
        items,
        total,
        page,
        per_page,
    }))
}

async fn search_parts(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let parts = state.services.parts.search_parts(&params.q).await?;
    Ok(Json(parts))
}

async fn low_stock_parts(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let parts = state.services.parts.low_stock_parts().await?;
    Ok(Json(parts))
}

async fn update_part(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    user: AuthUser,
    Json(request): Json<UpdatePartRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_any(&[Role::Admin, Role::Receptionist])?;
    let part = state.services.parts.update_part(id, request).await?;
    Ok(Json(part))
}

async fn delete_part(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_any(&[Role::Admin])?;
    state.services.parts.delete_part(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn adjust_stock(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    user: AuthUser,
    Json(request): Json<AdjustStockRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_any(&[Role::Admin, Role::Receptionist])?;
    let part = state.services.parts.adjust_stock(id, request.delta).await?;
    Ok(Json(part))
}

async fn set_stock(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    user: AuthUser,
    Json(request): Json<SetStockRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_any(&[Role::Admin, Role::Receptionist])?;
    let part = state
        .services
        .parts
        .set_stock_quantity(id, request.quantity)
        .await?;
    Ok(Json(part))
}

async fn check_availability(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(params): Query<AvailabilityParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let available = state
        .services
        .parts
        .is_part_available(id, params.quantity)
        .await?;
    Ok(Json(serde_json::json!({ "available": available })))
}

pub fn part_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_part))
        .route("/", get(list_parts))
        .route("/search", get(search_parts))
        .route("/low-stock", get(low_stock_parts))
        .route("/:id", get(get_part))
        .route("/:id", put(update_part))
        .route("/:id", delete(delete_part))
        .route("/:id/adjust-stock", post(adjust_stock))
        .route("/:id/stock", put(set_stock))
        .route("/:id/availability", get(check_availability))
}
