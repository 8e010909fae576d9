use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::flyover::PlanSettings;
use crate::predict::{Location, Sgp4Ephemeris};

use super::api::passes as pass_handlers;
use super::api_doc::ApiDoc;
use super::state::AppState;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/passes", get(pass_handlers::list_passes))
        .route("/api/station", get(pass_handlers::station))
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(
    config: Config,
    location: Location,
    settings: PlanSettings,
    ephemeris: Sgp4Ephemeris,
) -> std::io::Result<()> {
    let bind_addr = config.web.bind.clone();
    let state = AppState {
        config: Arc::new(config),
        location,
        settings: Arc::new(settings),
        ephemeris: Arc::new(ephemeris),
    };

    let app = router(state);

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await
}
