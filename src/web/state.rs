use std::sync::Arc;

use crate::service::PositionService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PositionService>,
}
