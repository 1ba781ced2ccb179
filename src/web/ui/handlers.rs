use axum::{extract::State, response::IntoResponse};

use crate::client::endpoint;
use crate::web::state::AppState;

use super::templates::{DashboardTemplate, SatelliteLink};

pub async fn dashboard(State(state): State<AppState>) -> impl IntoResponse {
    let (satellites, error) = match state.service.list_satellites().await {
        Ok(names) => (
            names
                .into_iter()
                .map(|name| SatelliteLink {
                    href: position_href(&name),
                    name,
                })
                .collect(),
            None,
        ),
        Err(e) => (Vec::new(), Some(e.to_string())),
    };

    DashboardTemplate {
        source: state.service.source_location().to_string(),
        cache_state: state.service.cache_state().to_string(),
        satellites,
        error,
    }
}

fn position_href(name: &str) -> String {
    endpoint("http://localhost", &["api", "position", name])
        .map(|url| url.path().to_string())
        .unwrap_or_else(|_| "/api/satellites".to_string())
}
