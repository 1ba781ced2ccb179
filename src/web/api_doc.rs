use utoipa::OpenApi;

use super::api::error::ErrorResponse;
use crate::propagate::PositionReport;

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::satellites::list_satellites,
        super::api::satellites::get_position,
    ),
    components(schemas(PositionReport, ErrorResponse)),
    info(
        title = "Sat-Track Position API",
        description = "Live geodetic positions of catalogued orbiting objects",
        version = "0.1.0"
    ),
    tags(
        (name = "satellites", description = "Catalog and position lookup")
    )
)]
pub struct ApiDoc;
