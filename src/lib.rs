//! Augur - multi-timeframe cryptocurrency trading signal engine

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

use config::Config;
use services::MarketAnalyzer;
use std::sync::Arc;

pub use error::AppError;
pub use types::*;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub analyzer: Arc<MarketAnalyzer>,
}
