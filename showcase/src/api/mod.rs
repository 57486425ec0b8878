//! HTTP API for the showcase

pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use middleware::ForwardedToken;
pub use routes::{AppState, MAX_LAYOUT_ITEMS};
pub use server::{router, ApiServer, ApiServerConfig};
