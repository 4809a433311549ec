pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod services;

pub use config::AppConfig;
pub use errors::ServiceError;

use crate::auth::{AuthService, SharedAuthService};
use crate::db::DbPool;
use crate::events::EventSender;
use axum::{response::IntoResponse, routing::get, Json, Router};
use std::sync::Arc;
use std::time::Duration;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub customers: services::customers::CustomerService,
    pub vehicles: services::vehicles::VehicleService,
    pub parts: services::parts::PartService,
    pub orders: services::orders::OrderService,
    pub tasks: services::tasks::TaskService,
    pub reports: services::reports::ReportService,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            customers: services::customers::CustomerService::new(db_pool.clone()),
            vehicles: services::vehicles::VehicleService::new(db_pool.clone()),
            parts: services::parts::PartService::new(db_pool.clone(), event_sender.clone()),
            orders: services::orders::OrderService::new(db_pool.clone(), event_sender.clone()),
            tasks: services::tasks::TaskService::new(db_pool.clone(), event_sender),
            reports: services::reports::ReportService::new(db_pool),
        }
    }
}

/// Shared application state passed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: Arc<AppConfig>,
    pub auth: SharedAuthService,
    pub event_sender: Option<Arc<EventSender>>,
    pub services: AppServices,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        db: Arc<DbPool>,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        let auth: SharedAuthService = Arc::new(AuthService::new(
            &config.jwt_secret,
            Duration::from_secs(config.jwt_expiration),
        ));
        let services = AppServices::new(db.clone(), event_sender.clone());
        Self {
            db,
            config,
            auth,
            event_sender,
            services,
        }
    }
}

async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl IntoResponse {
    let database = match db::check_connection(&state.db).await {
        Ok(()) => "up",
        Err(_) => "down",
    };
    Json(serde_json::json!({
        "status": if database == "up" { "ok" } else { "degraded" },
        "database": database,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Versioned API surface. Nested under `/api/v1` by the binary.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .nest("/customers", handlers::customers::customer_routes())
        .nest("/vehicles", handlers::vehicles::vehicle_routes())
        .nest("/parts", handlers::parts::part_routes())
        .nest("/service-orders", handlers::orders::order_routes())
        .nest("/service-tasks", handlers::tasks::task_routes())
        .nest("/reports", handlers::reports::report_routes())
}

/// Full application router including the unversioned health probe
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_v1_routes())
}
