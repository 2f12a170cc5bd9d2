pub mod app;
pub mod auth;
pub mod cache;
pub mod cli;
pub mod cms;
pub mod config;
pub mod content;
pub mod error;
pub mod external;
pub mod handlers;
pub mod middleware;
pub mod migrate;
pub mod model;
pub mod render;
pub mod sanitize;
pub mod state;

#[cfg(test)]
pub mod testing;

pub use app::app;
pub use config::AppConfig;
pub use state::AppState;
