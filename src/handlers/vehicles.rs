use super::{PaginatedResponse, PaginationParams};
use crate::{
    auth::AuthUser,
    errors::ServiceError,
    services::vehicles::{CreateVehicleRequest, UpdateVehicleRequest},
    AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};

async fn create_vehicle(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(request): Json<CreateVehicleRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let vehicle = state.services.vehicles.create_vehicle(request).await?;
    Ok((StatusCode::CREATED, Json(vehicle)))
}

async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let vehicle = state.services.vehicles.get_vehicle(id).await?;
    Ok(Json(vehicle))
}

async fn list_vehicles(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let (page, per_page) = params.normalized();
    let (items, total) = state.services.vehicles.list_vehicles(page, per_page).await?;
    Ok(Json(PaginatedResponse {
        items,
        total,
        page,
        per_page,
    }))
}

async fn update_vehicle(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _user: AuthUser,
    Json(request): Json<UpdateVehicleRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let vehicle = state.services.vehicles.update_vehicle(id, request).await?;
    Ok(Json(vehicle))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.vehicles.delete_vehicle(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn vehicle_orders(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.vehicles.get_vehicle(id).await?;
    let orders = state.services.orders.get_vehicle_orders(id).await?;
    Ok(Json(orders))
}

pub fn vehicle_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_vehicle))
        .route("/", get(list_vehicles))
        .route("/:id", get(get_vehicle))
        .route("/:id", put(update_vehicle))
        .route("/:id", delete(delete_vehicle))
        .route("/:id/service-orders", get(vehicle_orders))
}
