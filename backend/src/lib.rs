pub mod constants;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;
pub mod store;
pub mod utils;

pub use error::CoreError;
pub use state::AppState;
pub use utils::config::Config;

// Re-export common types
pub use anyhow::Result;
pub use chrono::{DateTime, Utc};
pub use uuid::Uuid;
