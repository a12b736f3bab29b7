pub mod health;
pub mod opportunities;
pub mod signals;

use crate::AppState;
use axum::Router;
use serde::Serialize;

/// API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
    pub meta: ApiMeta,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMeta {
    /// Candle history provider.
    pub source: String,
    pub quote: String,
    pub timestamp: i64,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T, state: &AppState) -> Self {
        let (source, _) = state.analyzer.source_names();
        Self {
            data,
            meta: ApiMeta {
                source: source.to_string(),
                quote: state.analyzer.config().quote_asset.clone(),
                timestamp: chrono::Utc::now().timestamp_millis(),
            },
        }
    }
}

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/api/signals", signals::router())
        .nest("/api/opportunities", opportunities::router())
}
