use super::{PaginatedResponse, PaginationParams};
use crate::{
    auth::AuthUser,
    entities::service_order::OrderStatus,
    errors::ServiceError,
    services::orders::{AddCommentRequest, AddTaskRequest, CreateOrderRequest, UpdateOrderRequest},
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
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct AssignMechanicRequest {
    pub mechanic_id: String,
}

async fn create_order(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(request): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.orders.create_order(request).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.orders.get_order_with_totals(id).await?;
    Ok(Json(order))
}

async fn list_orders(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let (page, per_page) = params.normalized();
    let (items, total) = state.services.orders.list_orders(page, per_page).await?;
    Ok(Json(PaginatedResponse {
        items,
        total,
        page,
        per_page,
    }))
}

async fn active_orders(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let orders = state.services.orders.active_orders().await?;
    Ok(Json(orders))
}

async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _user: AuthUser,
    Json(request): Json<UpdateOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.orders.update_order(id, request).await?;
    Ok(Json(order))
}

async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.orders.delete_order(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _user: AuthUser,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state
        .services
        .orders
        .update_order_status(id, request.status)
        .await?;
    Ok(Json(order))
}

async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.orders.cancel_order(id).await?;
    Ok(Json(order))
}

async fn assign_mechanic(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _user: AuthUser,
    Json(request): Json<AssignMechanicRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state
        .services
        .orders
        .assign_mechanic(id, &request.mechanic_id)
        .await?;
    Ok(Json(order))
}

async fn add_task(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _user: AuthUser,
    Json(request): Json<AddTaskRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let task = state.services.orders.add_task(id, request).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn list_tasks(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let tasks = state.services.orders.get_order_tasks(id).await?;
    Ok(Json(tasks))
}

async fn add_comment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    user: AuthUser,
    Json(request): Json<AddCommentRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let comment = state
        .services
        .orders
        .add_comment(id, &user.user_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let comments = state.services.orders.list_comments(id).await?;
    Ok(Json(comments))
}

async fn list_used_parts(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let parts = state.services.orders.list_order_used_parts(id).await?;
    Ok(Json(parts))
}

pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_order))
        .route("/", get(list_orders))
        .route("/active", get(active_orders))
        .route("/:id", get(get_order))
        .route("/:id", put(update_order))
        .route("/:id", delete(delete_order))
        .route("/:id/status", put(update_status))
        .route("/:id/cancel", post(cancel_order))
        .route("/:id/assign-mechanic", post(assign_mechanic))
        .route("/:id/tasks", post(add_task))
        .route("/:id/tasks", get(list_tasks))
        .route("/:id/comments", post(add_comment))
        .route("/:id/comments", get(list_comments))
        .route("/:id/used-parts", get(list_used_parts))
}
