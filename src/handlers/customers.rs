use super::{PaginatedResponse, PaginationParams, SearchParams};
use crate::{
    auth::AuthUser,
    errors::ServiceError,
    services::customers::{CreateCustomerRequest, UpdateCustomerRequest},
    AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};

async fn create_customer(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let customer = state.services.customers.create_customer(request).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let customer = state.services.customers.get_customer(id).await?;
    Ok(Json(customer))
}

async fn list_customers(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let (page, per_page) = params.normalized();
    let (items, total) = state
        .services
        .customers
        .list_customers(page, per_page)
        .await?;
    Ok(Json(PaginatedResponse {
        items,
        total,
        page,
        per_page,
    }))
}

async fn search_customers(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let customers = state.services.customers.search_customers(&params.q).await?;
    Ok(Json(customers))
}

async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _user: AuthUser,
    Json(request): Json<UpdateCustomerRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let customer = state
        .services
        .customers
        .update_customer(id, request)
        .await?;
    Ok(Json(customer))
}

async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.customers.delete_customer(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn customer_vehicles(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    // 404 for unknown customers rather than an empty list
    state.services.customers.get_customer(id).await?;
    let vehicles = state.services.vehicles.get_customer_vehicles(id).await?;
    Ok(Json(vehicles))
}

pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_customer))
        .route("/", get(list_customers))
        .route("/search", get(search_customers))
        .route("/:id", get(get_customer))
        .route("/:id", put(update_customer))
        .route("/:id", delete(delete_customer))
        .route("/:id/vehicles", get(customer_vehicles))
}
