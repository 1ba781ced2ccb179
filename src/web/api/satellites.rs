use axum::{
    extract::{Path, State},
    Json,
};

use crate::propagate::PositionReport;
use crate::web::api::error::{ApiResult, ErrorResponse};
use crate::web::state::AppState;

#[utoipa::path(
    get,
    path = "/api/satellites",
    responses(
        (status = 200, description = "Object names in feed order", body = Vec<String>),
        (status = 500, description = "Element source unavailable", body = ErrorResponse)
    ),
    tag = "satellites"
)]
pub async fn list_satellites(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    let names = state.service.list_satellites().await?;
    Ok(Json(names))
}

#[utoipa::path(
    get,
    path = "/api/position/{name}",
    params(
        ("name" = String, Path, description = "Exact object name, percent-encoded")
    ),
    responses(
        (status = 200, description = "Current geodetic subpoint", body = PositionReport),
        (status = 404, description = "Unknown object", body = ErrorResponse),
        (status = 500, description = "Source or propagation failure", body = ErrorResponse)
    ),
    tag = "satellites"
)]
pub async fn get_position(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<PositionReport>> {
    let sample = state.service.get_position(&name).await?;
    Ok(Json(sample.into()))
}
