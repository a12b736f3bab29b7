use crate::error::AppError;
use crate::sources::{error_excerpt, DataSource, SourceFuture};
use crate::types::{AssetPair, OhlcPoint, OhlcvSeries, Timeframe};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

const BINANCE_API_URL: &str = "https://api.binance.com/api/v3";
/// Largest page the klines endpoint serves.
const MAX_KLINES: usize = 1000;
/// Binance error code for an unknown trading pair.
const INVALID_SYMBOL_CODE: i64 = -1121;

/// Binance ticker price response.
#[derive(Debug, Deserialize)]
struct BinanceTickerPrice {
    symbol: String,
    price: String,
}

/// Binance error body.
#[derive(Debug, Deserialize)]
struct BinanceError {
    code: i64,
    msg: String,
}

/// Binance REST client for klines and spot prices.
#[derive(Clone)]
pub struct BinanceClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl BinanceClient {
    /// Create a new Binance client.
    pub fn new(api_key: Option<String>) -> Self {
        let client = Client::builder()
            .user_agent("Augur/1.0")
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            base_url: BINANCE_API_URL.to_string(),
        }
    }

    /// Point the client at another API root (mirrors, testnet).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Send a GET and decode the body, mapping "invalid symbol" to `None`.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<Option<T>, AppError> {
        let mut request = self.client.get(url);
        if let Some(ref key) = self.api_key {
            request = request.header("X-MBX-APIKEY", key);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::BAD_REQUEST {
            let text = response.text().await.unwrap_or_default();
            if let Ok(err) = serde_json::from_str::<BinanceError>(&text) {
                if err.code == INVALID_SYMBOL_CODE {
                    return Ok(None);
                }
                return Err(AppError::ExternalApi(format!(
                    "Binance error {}: {}",
                    err.code, err.msg
                )));
            }
            return Err(AppError::ExternalApi(format!("Binance API error: {}", status)));
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!("Binance API returned {}: {}", status, error_excerpt(&text));
            return Err(AppError::ExternalApi(format!("Binance API error: {}", status)));
        }

        Ok(Some(response.json().await?))
    }

    async fn fetch_klines(
        &self,
        pair: &AssetPair,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Option<OhlcvSeries>, AppError> {
        let url = format!(
            "{}/klines?symbol={}&interval={}&limit={}",
            self.base_url,
            pair.joined(),
            timeframe.label(),
            limit.clamp(1, MAX_KLINES)
        );

        let Some(rows) = self.get_json::<Vec<Vec<Value>>>(&url).await? else {
            debug!("Binance does not list {}", pair);
            return Ok(None);
        };
        if rows.is_empty() {
            return Ok(None);
        }

        let candles = rows
            .iter()
            .map(|row| parse_kline(row))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| AppError::ExternalApi(format!("malformed kline for {}", pair)))?;

        debug!(
            "Fetched {} {} candles for {} from Binance",
            candles.len(),
            timeframe,
            pair
        );
        Ok(Some(OhlcvSeries::new(candles)?))
    }

    async fn fetch_price(&self, pair: &AssetPair) -> Result<Option<f64>, AppError> {
        let url = format!("{}/ticker/price?symbol={}", self.base_url, pair.joined());
        let Some(ticker) = self.get_json::<BinanceTickerPrice>(&url).await? else {
            return Ok(None);
        };

        let price: f64 = ticker.price.parse().unwrap_or(0.0);
        if price > 0.0 {
            debug!("Binance price: {} = ${}", ticker.symbol, price);
            Ok(Some(price))
        } else {
            Ok(None)
        }
    }
}

/// Parse one kline row: `[open_time, "open", "high", "low", "close", "volume", ...]`.
fn parse_kline(row: &[Value]) -> Option<OhlcPoint> {
    let num = |i: usize| -> Option<f64> {
        match row.get(i)? {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    };

    Some(OhlcPoint {
        time: row.first()?.as_i64()?,
        open: num(1)?,
        high: num(2)?,
        low: num(3)?,
        close: num(4)?,
        volume: num(5)?,
    })
}

impl DataSource for BinanceClient {
    fn name(&self) -> &str {
        "binance"
    }

    fn get_history<'a>(
        &'a self,
        pair: &'a AssetPair,
        timeframe: Timeframe,
        limit: usize,
    ) -> SourceFuture<'a, Option<OhlcvSeries>> {
        Box::pin(self.fetch_klines(pair, timeframe, limit))
    }

    fn get_current_price<'a>(&'a self, pair: &'a AssetPair) -> SourceFuture<'a, Option<f64>> {
        Box::pin(self.fetch_price(pair))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kline_row() {
        let json = r#"[
            1499040000000, "0.01634790", "0.80000000", "0.01575800", "0.01577100",
            "148976.11427815", 1499644799999, "2434.19055334", 308, "1756.87402397",
            "28.46694368", "0"
        ]"#;
        let row: Vec<Value> = serde_json::from_str(json).unwrap();
        let candle = parse_kline(&row).unwrap();

        assert_eq!(candle.time, 1499040000000);
        assert_eq!(candle.open, 0.0163479);
        assert_eq!(candle.high, 0.8);
        assert_eq!(candle.close, 0.015771);
        assert!((candle.volume - 148976.11427815).abs() < 1e-6);
    }

    #[test]
    fn test_parse_kline_rejects_short_row() {
        let row: Vec<Value> = serde_json::from_str(r#"[1499040000000, "1.0", "2.0"]"#).unwrap();
        assert!(parse_kline(&row).is_none());
    }

    #[test]
    fn test_binance_error_deserialization() {
        let json = r#"{"code": -1121, "msg": "Invalid symbol."}"#;
        let err: BinanceError = serde_json::from_str(json).unwrap();
        assert_eq!(err.code, INVALID_SYMBOL_CODE);
        assert_eq!(err.msg, "Invalid symbol.");
    }

    #[test]
    fn test_ticker_price_deserialization() {
        let json = r#"{"symbol": "BTCUSDT", "price": "43500.50"}"#;
        let ticker: BinanceTickerPrice = serde_json::from_str(json).unwrap();
        assert_eq!(ticker.symbol, "BTCUSDT");
        assert_eq!(ticker.price.parse::<f64>().unwrap(), 43500.5);
    }

    #[test]
    fn test_client_name() {
        let client = BinanceClient::new(None).with_base_url("http://localhost:1");
        assert_eq!(client.name(), "binance");
        assert_eq!(client.base_url, "http://localhost:1");
    }
}
