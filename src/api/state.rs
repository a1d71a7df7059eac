use std::sync::Arc;

use crate::services::LunchService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub lunch: Arc<LunchService>,
}

impl AppState {
    pub fn new(lunch: LunchService) -> Self {
        Self {
            lunch: Arc::new(lunch),
        }
    }
}
