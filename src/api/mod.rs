//! Shelf-Eye HTTP API
//! Upload endpoints for shelf audits and the reference shelf

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

pub use handlers::AppState;
pub use routes::create_router;
pub use types::*;
