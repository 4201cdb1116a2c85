use std::collections::HashMap;
use async_trait::async_trait;
use chrono::Utc;
use rand::{Rng, RngCore};
use reqwest::Client;
use serde::Deserialize;
use crate::config::sources::CryptoConfig;
use crate::error::{Error, Result};
use crate::feeds::http::send_checked;
use crate::feeds::{SourceAdapter, SourceKind};
use crate::types::{CryptoQuote, DataOrigin};

const ASSET_ID: &str = "bitcoin";

/// Bitcoin spot price. Synthetic-only unless an API base URL is configured,
/// in which case a CoinGecko-style `simple/price` endpoint is queried.
pub struct CryptoAdapter {
    client: Client,
    config: CryptoConfig,
}

impl CryptoAdapter {
    pub fn new(client: Client, config: CryptoConfig) -> Self {
        CryptoAdapter { client, config }
    }
}

#[async_trait]
impl SourceAdapter for CryptoAdapter {
    type Record = CryptoQuote;

    fn kind(&self) -> SourceKind {
        SourceKind::Crypto
    }

    fn live_enabled(&self) -> bool {
        self.config.api_url.is_some()
    }

    async fn fetch_live(&self) -> Result<CryptoQuote> {
        let Some(base) = self.config.api_url.as_deref() else {
            return Err(Error::EmptyResult("crypto"));
        };

        let request = self.client
            .get(format!("{}/simple/price", base.trim_end_matches('/')))
            .query(&[
                ("ids", ASSET_ID),
                ("vs_currencies", "usd"),
                ("include_24hr_change", "true"),
            ]);

        let mut prices: HashMap<String, SimplePrice> = send_checked(request).await?.json().await?;
        let price = prices.remove(ASSET_ID).ok_or(Error::EmptyResult("crypto"))?;

        Ok(CryptoQuote {
            price: price.usd,
            change_24h: price.usd_24h_change.unwrap_or(0.0),
            collected_at: Utc::now(),
            origin: DataOrigin::Live,
        })
    }

    fn synthesize(&self, rng: &mut dyn RngCore) -> CryptoQuote {
        CryptoQuote {
            price: rng.gen_range(40_000.0..=70_000.0),
            change_24h: rng.gen_range(-8.0..=8.0),
            collected_at: Utc::now(),
            origin: DataOrigin::Synthetic,
        }
    }
}

#[derive(Deserialize)]
struct SimplePrice {
    usd: f64,
    usd_24h_change: Option<f64>,
}
