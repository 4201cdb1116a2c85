use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use rand::{Rng, RngCore};
use reqwest::Client;
use serde::Deserialize;
use crate::config::sources::StockConfig;
use crate::error::{Error, Result};
use crate::feeds::http::send_checked;
use crate::feeds::{SourceAdapter, SourceKind};
use crate::types::{DataOrigin, StockQuote};

/// Intraday quotes for the configured tickers from a Yahoo-style v8 chart
/// API. One request per symbol; symbols are reported in configured order.
pub struct StockAdapter {
    client: Client,
    config: StockConfig,
}

impl StockAdapter {
    pub fn new(client: Client, config: StockConfig) -> Self {
        StockAdapter { client, config }
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!(
            "{}/v8/finance/chart/{}",
            self.config.api_url.trim_end_matches('/'),
            symbol
        )
    }

    /// `Ok(None)` when the symbol has no trades in the current session.
    async fn fetch_symbol(&self, symbol: &str) -> Result<Option<StockQuote>> {
        let request = self.client
            .get(self.chart_url(symbol))
            .query(&[("range", "1d"), ("interval", "1m")]);

        let chart: ChartResponse = send_checked(request).await?.json().await?;
        let Some(data) = chart.chart.result.and_then(|r| r.into_iter().next()) else {
            return Ok(None);
        };

        let quote = data.indicators.quote.into_iter().next().unwrap_or_default();
        let Some(price) = last_present(&quote.close) else {
            return Ok(None);
        };
        let previous_close = data.meta.chart_previous_close
            .or(data.meta.previous_close)
            .unwrap_or(price);
        let volume = last_present(&quote.volume).unwrap_or(0);

        Ok(Some(StockQuote::from_session(symbol, price, previous_close, volume, DataOrigin::Live)))
    }
}

fn last_present<T: Copy>(values: &[Option<T>]) -> Option<T> {
    values.iter().rev().find_map(|v| *v)
}

#[async_trait]
impl SourceAdapter for StockAdapter {
    type Record = Vec<StockQuote>;

    fn kind(&self) -> SourceKind {
        SourceKind::Stocks
    }

    /// Symbols that fail or have no session data are omitted. Only when
    /// every symbol comes back empty does the whole fetch fail.
    async fn fetch_live(&self) -> Result<Vec<StockQuote>> {
        let results = join_all(self.config.symbols.iter().map(|s| self.fetch_symbol(s))).await;

        let mut quotes = Vec::with_capacity(results.len());
        let mut first_error = None;
        for (symbol, result) in self.config.symbols.iter().zip(results) {
            match result {
                Ok(Some(quote)) => quotes.push(quote),
                Ok(None) => tracing::debug!(symbol = %symbol, "No session data, omitting symbol"),
                Err(e) => {
                    tracing::debug!(symbol = %symbol, error = %e, "Quote fetch failed, omitting symbol");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        if quotes.is_empty() {
            return Err(first_error.unwrap_or(Error::EmptyResult("stocks")));
        }
        Ok(quotes)
    }

    fn synthesize(&self, rng: &mut dyn RngCore) -> Vec<StockQuote> {
        let jitter = self.config.jitter;
        self.config.symbols
            .iter()
            .map(|symbol| StockQuote {
                symbol: symbol.clone(),
                price: self.config.base_price(symbol) + rng.gen_range(-jitter..=jitter),
                change: rng.gen_range(-5.0..=5.0),
                change_percent: rng.gen_range(-3.0..=3.0),
                volume: rng.gen_range(1_000_000..=10_000_000),
                collected_at: Utc::now(),
                origin: DataOrigin::Synthetic,
            })
            .collect()
    }
}

#[derive(Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartData>>,
}

#[derive(Deserialize)]
struct ChartData {
    meta: ChartMeta,
    indicators: Indicators,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    chart_previous_close: Option<f64>,
    previous_close: Option<f64>,
}

#[derive(Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteSeries>,
}

#[derive(Deserialize, Default)]
struct QuoteSeries {
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;
    use std::collections::HashMap;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(url: String, symbols: &[&str]) -> StockConfig {
        StockConfig {
            api_url: url,
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            base_prices: HashMap::from([("AAPL".to_string(), 100.0), ("MSFT".to_string(), 200.0)]),
            default_base_price: 50.0,
            jitter: 10.0,
        }
    }

    fn chart(previous_close: f64, closes: serde_json::Value, volumes: serde_json::Value) -> serde_json::Value {
        json!({
            "chart": {
                "result": [{
                    "meta": { "chartPreviousClose": previous_close },
                    "indicators": { "quote": [{ "close": closes, "volume": volumes }] }
                }],
                "error": null
            }
        })
    }

    #[test]
    fn synthetic_quotes_follow_the_base_price_table() {
        let adapter = StockAdapter::new(Client::new(), config("http://unused".into(), &["AAPL", "MSFT", "IBM"]));
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..200 {
            let quotes = adapter.synthesize(&mut rng);
            let symbols: Vec<_> = quotes.iter().map(|q| q.symbol.as_str()).collect();
            assert_eq!(symbols, ["AAPL", "MSFT", "IBM"]);

            assert!((90.0..=110.0).contains(&quotes[0].price));
            assert!((190.0..=210.0).contains(&quotes[1].price));
            assert!((40.0..=60.0).contains(&quotes[2].price));
            for q in &quotes {
                assert!((1_000_000..=10_000_000).contains(&q.volume));
                assert!((-5.0..=5.0).contains(&q.change));
                assert!((-3.0..=3.0).contains(&q.change_percent));
                assert_eq!(q.origin, DataOrigin::Synthetic);
            }
        }
    }

    #[tokio::test]
    async fn computes_change_against_previous_close() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/AAPL"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chart(
                200.0,
                json!([209.0, 210.0, null]),
                json!([1200, 3400, null]),
            )))
            .mount(&server)
            .await;

        let adapter = StockAdapter::new(Client::new(), config(server.uri(), &["AAPL"]));
        let quotes = adapter.fetch_live().await.unwrap();

        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].price, 210.0);
        assert!((quotes[0].change - 10.0).abs() < 1e-9);
        assert!((quotes[0].change_percent - 5.0).abs() < 1e-9);
        assert_eq!(quotes[0].volume, 3400);
        assert_eq!(quotes[0].origin, DataOrigin::Live);
    }

    #[tokio::test]
    async fn symbols_without_session_data_are_omitted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/AAPL"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chart(100.0, json!([101.0]), json!([10]))))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/MSFT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chart(200.0, json!([null]), json!([null]))))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/TSLA"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let adapter = StockAdapter::new(Client::new(), config(server.uri(), &["AAPL", "MSFT", "TSLA"]));
        let quotes = adapter.fetch_live().await.unwrap();

        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].symbol, "AAPL");
    }

    #[tokio::test]
    async fn all_symbols_empty_is_an_empty_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "chart": { "result": null, "error": { "code": "Not Found" } }
            })))
            .mount(&server)
            .await;

        let adapter = StockAdapter::new(Client::new(), config(server.uri(), &["AAPL", "MSFT"]));
        let err = adapter.fetch_live().await.unwrap_err();
        assert!(matches!(err, Error::EmptyResult("stocks")));
    }

    #[tokio::test]
    async fn all_symbols_failing_reports_the_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let adapter = StockAdapter::new(Client::new(), config(server.uri(), &["AAPL", "MSFT"]));
        let err = adapter.fetch_live().await.unwrap_err();
        assert!(matches!(err, Error::ResponseFailure { status: 500, .. }));
    }
}
