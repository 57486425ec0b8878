pub mod api;
pub mod config;
pub mod github;

pub use api::{router, ApiServer, ApiServerConfig, AppState};
pub use config::AppConfig;
pub use github::{client_from_config, GithubClient};
