use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    data_source: String,
    market_source: String,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (data, market) = state.analyzer.source_names();
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        data_source: data.to_string(),
        market_source: market.to_string(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::demo_state;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "ok",
            version: "1.0.0",
            data_source: "binance".to_string(),
            market_source: "coingecko".to_string(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"version\":\"1.0.0\""));
        assert!(json.contains("\"dataSource\":\"binance\""));
    }

    #[tokio::test]
    async fn test_health_handler() {
        let Json(response) = health(State(demo_state())).await;
        assert_eq!(response.status, "ok");
        assert_eq!(response.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(response.data_source, "demo");
        assert_eq!(response.market_source, "demo");
    }
}
