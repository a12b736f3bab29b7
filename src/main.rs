use augur::config::{Config, DataSourceKind};
use augur::services::{
    CachedSource, MarketAnalyzer, MarketScreener, OpportunityRanker, SignalGenerator,
};
use augur::sources::{BinanceClient, CoinGeckoClient, DataSource, DemoSource, MarketDataSource};
use augur::{api, AppState};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build the history and listing sources for the configured backend.
fn build_sources(config: &Config) -> (Arc<dyn DataSource>, Arc<dyn MarketDataSource>) {
    match config.data_source {
        DataSourceKind::Binance => {
            let binance = BinanceClient::new(config.binance_api_key.clone());
            let data: Arc<dyn DataSource> = Arc::new(CachedSource::new(binance, config.cache_ttl));
            let market: Arc<dyn MarketDataSource> =
                Arc::new(CoinGeckoClient::new(config.coingecko_api_key.clone()));
            (data, market)
        }
        DataSourceKind::Demo => {
            let demo = DemoSource::default();
            let market: Arc<dyn MarketDataSource> = Arc::new(demo.clone());
            let data: Arc<dyn DataSource> = Arc::new(CachedSource::new(demo, config.cache_ttl));
            (data, market)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "augur=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env());
    info!("Starting Augur server on {}:{}", config.host, config.port);

    let (data, market) = build_sources(&config);
    info!(
        "Using {} for history and {} for market listings (cache ttl {}s)",
        data.name(),
        market.name(),
        config.cache_ttl.as_secs()
    );

    let analyzer = MarketAnalyzer::new(
        data,
        market,
        SignalGenerator::new(config.signal_config()),
        MarketScreener::new(config.screener_config()),
        OpportunityRanker::default(),
        config.analyzer_config(),
    );

    let state = AppState {
        config: config.clone(),
        analyzer,
    };

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the router
    let app = Router::new()
        .merge(api::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start the server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Augur server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
