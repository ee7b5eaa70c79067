//! HTTP surface: the command endpoint, the SSE broadcast feed, and the
//! health/status routes.

pub mod handlers;
pub mod state;

pub use handlers::create_router;
pub use state::AppState;
