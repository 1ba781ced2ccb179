use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::elements::{source_from_location, Catalog, ElementStore};
use crate::service::{PositionService, SystemClock};

use super::api::satellites as satellite_handlers;
use super::api_doc::ApiDoc;
use super::config::Config;
use super::state::AppState;
use super::ui::handlers as ui_handlers;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // UI routes
        .route("/", get(ui_handlers::dashboard))
        // Position API endpoints
        .route("/api/satellites", get(satellite_handlers::list_satellites))
        .route(
            "/api/position/{name}",
            get(satellite_handlers::get_position),
        )
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: Config) -> std::io::Result<()> {
    let source = source_from_location(
        &config.elements.source_url,
        config.elements.fetch_timeout,
    )
    .map_err(std::io::Error::other)?;

    let service = PositionService::new(
        Catalog::new(ElementStore::new(source)),
        Arc::new(SystemClock),
    );
    let state = AppState {
        service: Arc::new(service),
    };
    let app = build_router(state);

    let bind_addr = config.web.bind;
    log::info!(
        "Starting server on {} (elements from {})",
        bind_addr,
        config.elements.source_url
    );

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await
}
