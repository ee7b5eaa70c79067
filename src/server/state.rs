use crate::router::RouterHandle;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub router: RouterHandle,
}

impl AppState {
    pub fn new(router: RouterHandle) -> Self {
        Self { router }
    }
}
