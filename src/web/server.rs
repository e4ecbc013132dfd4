use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::api::alerts as alert_handlers;
use super::api::settings as settings_handlers;
use super::api_doc::ApiDoc;
use super::auth::AppState;
use super::ui::handlers as ui_handlers;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // UI routes
        .route("/", get(ui_handlers::dashboard))
        // Settings API endpoints
        .route(
            "/api/settings",
            get(settings_handlers::get_settings).put(settings_handlers::put_settings),
        )
        // Alert API endpoints
        .route("/api/alerts", get(alert_handlers::list_alerts))
        .route("/api/alerts/test/warning", post(alert_handlers::test_warning))
        .route("/api/alerts/test/urgent", post(alert_handlers::test_urgent))
        .route("/api/alerts/ledger", delete(alert_handlers::reset_ledger))
        .route("/api/passes", get(alert_handlers::list_passes))
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(bind_addr: &str, state: AppState) -> std::io::Result<()> {
    let app = router(state);

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await
}
