//! Market-wide opportunity scan endpoint.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::ApiResponse;
use crate::error::{AppError, Result};
use crate::types::DisplaySignal;
use crate::AppState;

/// Largest listing a single scan may request.
const MAX_ASSETS_LIMIT: usize = 250;

/// Query parameters for the scan endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct OpportunitiesQuery {
    pub max_assets: Option<usize>,
    pub top: Option<usize>,
}

impl OpportunitiesQuery {
    /// Resolve against configured defaults.
    fn resolve(&self, default_max_assets: usize, default_top: usize) -> Result<(usize, usize)> {
        let max_assets = self.max_assets.unwrap_or(default_max_assets);
        let top = self.top.unwrap_or(default_top);

        if max_assets == 0 || max_assets > MAX_ASSETS_LIMIT {
            return Err(AppError::BadRequest(format!(
                "max_assets must be between 1 and {}",
                MAX_ASSETS_LIMIT
            )));
        }
        if top == 0 {
            return Err(AppError::BadRequest("top must be at least 1".to_string()));
        }
        Ok((max_assets, top))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunitiesResponse {
    pub signals: Vec<DisplaySignal>,
    pub total_candidates: usize,
    pub total_analyzed: usize,
    pub total_failed: usize,
    pub total_found: usize,
    pub analysis_time_secs: f64,
    pub timestamp: String,
}

/// Create the opportunities router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_opportunities))
}

/// GET /api/opportunities?max_assets=&top=
async fn get_opportunities(
    State(state): State<AppState>,
    Query(query): Query<OpportunitiesQuery>,
) -> Result<Json<ApiResponse<OpportunitiesResponse>>> {
    let (max_assets, top) =
        query.resolve(state.config.default_max_assets, state.config.default_top_n)?;

    let report = state.analyzer.find_opportunities(max_assets, top).await?;
    let quote = &state.analyzer.config().quote_asset;

    let response = OpportunitiesResponse {
        signals: report
            .signals
            .iter()
            .map(|ranked| DisplaySignal::from_ranked(ranked, quote))
            .collect(),
        total_candidates: report.total_candidates,
        total_analyzed: report.total_analyzed,
        total_failed: report.total_failed,
        total_found: report.total_found,
        analysis_time_secs: report.analysis_time_secs,
        timestamp: report.timestamp,
    };

    Ok(Json(ApiResponse::new(response, &state)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::demo_state;

    #[test]
    fn test_query_parsing() {
        let query: OpportunitiesQuery =
            serde_urlencoded::from_str("max_assets=20&top=3").unwrap();
        assert_eq!(query.max_assets, Some(20));
        assert_eq!(query.top, Some(3));

        let empty: OpportunitiesQuery = serde_urlencoded::from_str("").unwrap();
        assert!(empty.max_assets.is_none());
        assert!(empty.top.is_none());
    }

    #[test]
    fn test_query_defaults_and_bounds() {
        assert_eq!(OpportunitiesQuery::default().resolve(30, 5).unwrap(), (30, 5));

        let zero_top = OpportunitiesQuery {
            max_assets: None,
            top: Some(0),
        };
        assert!(matches!(zero_top.resolve(30, 5), Err(AppError::BadRequest(_))));

        let too_many = OpportunitiesQuery {
            max_assets: Some(MAX_ASSETS_LIMIT + 1),
            top: None,
        };
        assert!(too_many.resolve(30, 5).is_err());
    }

    #[tokio::test]
    async fn test_get_opportunities_with_demo_data() {
        let query = OpportunitiesQuery {
            max_assets: Some(8),
            top: Some(2),
        };
        let Json(response) = get_opportunities(State(demo_state()), Query(query))
            .await
            .unwrap();

        let data = response.data;
        assert!(data.signals.len() <= 2);
        assert_eq!(data.total_analyzed + data.total_failed, data.total_candidates);
        assert!(data
            .signals
            .windows(2)
            .all(|w| w[0].score >= w[1].score));
        assert!(data.signals.iter().all(|s| s.symbol != "USDT"));
    }
}
