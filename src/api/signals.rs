//! Single-asset signal endpoint.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::api::ApiResponse;
use crate::error::Result;
use crate::types::DisplaySignal;
use crate::AppState;

/// Create the signals router.
pub fn router() -> Router<AppState> {
    Router::new().route("/:symbol", get(get_signal))
}

/// GET /api/signals/:symbol
///
/// `data` is null when the asset was analysed but no clear signal emerged.
async fn get_signal(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<Option<DisplaySignal>>>> {
    let signal = state.analyzer.analyze_symbol(&symbol).await?;
    let quote = &state.analyzer.config().quote_asset;
    let display = signal.map(|s| DisplaySignal::from_signal(&s, None, quote));

    Ok(Json(ApiResponse::new(display, &state)))
}
