use crate::{
    auth::{AuthUser, Role},
    errors::ServiceError,
    services::tasks::{RecordUsedPartRequest, UpdateTaskRequest},
    AppState,
};
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};

async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let task = state.services.tasks.get_task_with_parts(id).await?;
    Ok(Json(task))
}

async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _user: AuthUser,
    Json(request): Json<UpdateTaskRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let task = state.services.tasks.update_task(id, request).await?;
    Ok(Json(task))
}

async fn complete_task(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let task = state.services.tasks.complete_task(id).await?;
    Ok(Json(task))
}

async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.tasks.delete_task(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn record_used_part(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    user: AuthUser,
    Json(request): Json<RecordUsedPartRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    user.require_any(&[Role::Admin, Role::Mechanic, Role::Receptionist])?;
    let usage = state.services.tasks.record_used_part(id, request).await?;
    Ok((StatusCode::CREATED, Json(usage)))
}

async fn list_task_parts(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let parts = state.services.tasks.get_task_parts(id).await?;
    Ok(Json(parts))
}

async fn mechanic_tasks(
    State(state): State<AppState>,
    Path(mechanic_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let tasks = state.services.tasks.get_mechanic_tasks(&mechanic_id).await?;
    Ok(Json(tasks))
}

pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/:id", get(get_task))
        .route("/:id", put(update_task))
        .route("/:id", delete(delete_task))
        .route("/:id/complete", post(complete_task))
        .route("/:id/used-parts", post(record_used_part))
        .route("/:id/used-parts", get(list_task_parts))
        .route("/mechanic/:mechanic_id", get(mechanic_tasks))
}
