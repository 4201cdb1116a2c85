pub mod circuit_breaker;
pub mod fallback;
pub mod http;
pub mod weather;
pub mod stocks;
pub mod news;
pub mod crypto;

use async_trait::async_trait;
use rand::RngCore;
use std::fmt;
use crate::error::Result;

pub use fallback::{fetch_with_fallback, Feed, FetchPolicy, Fetched};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Weather,
    Stocks,
    News,
    Crypto,
}

impl SourceKind {
    pub const ALL: [SourceKind; 4] = [
        SourceKind::Weather,
        SourceKind::Stocks,
        SourceKind::News,
        SourceKind::Crypto,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Weather => "weather",
            SourceKind::Stocks => "stocks",
            SourceKind::News => "news",
            SourceKind::Crypto => "crypto",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One external record type, as a pair of interchangeable strategies:
/// a live fetch that may fail, and a synthetic generator that cannot.
///
/// Adapters are stateless between calls. Callers never use `fetch_live`
/// directly; they go through [`fetch_with_fallback`], which bounds it with
/// a timeout and substitutes `synthesize` on any failure.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    type Record: Send + 'static;

    fn kind(&self) -> SourceKind;

    /// Whether a live path is wired up at all.
    fn live_enabled(&self) -> bool {
        true
    }

    async fn fetch_live(&self) -> Result<Self::Record>;

    fn synthesize(&self, rng: &mut dyn RngCore) -> Self::Record;
}
