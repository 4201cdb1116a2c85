use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use reqwest::Client;
use crate::config::sources::NewsConfig;
use crate::error::{Error, Result};
use crate::feeds::http::send_checked;
use crate::feeds::{SourceAdapter, SourceKind};
use crate::types::news::MAX_HEADLINES;
use crate::types::{DataOrigin, NewsDigest};

const FILLER_HEADLINES: [&str; 8] = [
    "AI Breakthrough in Machine Learning",
    "New Programming Language Released",
    "Tech Stock Prices Surge",
    "Open Source Project Gains Attention",
    "Data Science Discovery Made",
    "Quantum Computing Advancement",
    "Cybersecurity Alert Issued",
    "Cloud Infrastructure Update",
];
const FILLER_SAMPLE: usize = 5;

// Current front page wraps each story link in a `titleline` span; older
// markup put a `storylink` class on the anchor itself.
const TITLE_MARKERS: [&str; 2] = ["class=\"titleline\"", "class=\"storylink\""];

/// Headlines scraped from a Hacker News style front page.
pub struct NewsAdapter {
    client: Client,
    config: NewsConfig,
}

impl NewsAdapter {
    pub fn new(client: Client, config: NewsConfig) -> Self {
        NewsAdapter { client, config }
    }
}

#[async_trait]
impl SourceAdapter for NewsAdapter {
    type Record = NewsDigest;

    fn kind(&self) -> SourceKind {
        SourceKind::News
    }

    async fn fetch_live(&self) -> Result<NewsDigest> {
        let page = send_checked(self.client.get(&self.config.page_url))
            .await?
            .text()
            .await?;

        let limit = self.config.max_headlines.min(MAX_HEADLINES);
        let headlines = extract_headlines(&page, limit);
        if headlines.is_empty() {
            return Err(Error::EmptyResult("news"));
        }

        Ok(NewsDigest::new(headlines.len(), headlines, DataOrigin::Live))
    }

    fn synthesize(&self, rng: &mut dyn RngCore) -> NewsDigest {
        let headlines = FILLER_HEADLINES
            .choose_multiple(rng, FILLER_SAMPLE)
            .map(|h| h.to_string())
            .collect();

        NewsDigest::new(rng.gen_range(8..=15), headlines, DataOrigin::Synthetic)
    }
}

/// Pull anchor texts following the title markers, in page order.
pub fn extract_headlines(html: &str, limit: usize) -> Vec<String> {
    let mut headlines = Vec::new();

    for marker in TITLE_MARKERS {
        let mut rest = html;
        while headlines.len() < limit {
            let Some(pos) = rest.find(marker) else { break };
            rest = &rest[pos + marker.len()..];

            // for `titleline` the marker sits on the wrapping span; a span
            // without an anchor is skipped
            if marker == TITLE_MARKERS[0] {
                match rest[..span_end(rest, marker)].find("<a") {
                    Some(anchor) => rest = &rest[anchor..],
                    None => continue,
                }
            }

            let Some(open_end) = rest.find('>') else { break };
            rest = &rest[open_end + 1..];
            let Some(close) = rest.find("</a>") else { break };

            let title = decode_entities(rest[..close].trim());
            if !title.is_empty() {
                headlines.push(title);
            }
            rest = &rest[close..];
        }

        if !headlines.is_empty() {
            break;
        }
    }

    headlines
}

/// First `</span>` or next marker, whichever comes first.
fn span_end(rest: &str, marker: &str) -> usize {
    let close = rest.find("</span>").unwrap_or(rest.len());
    let next = rest.find(marker).unwrap_or(rest.len());
    close.min(next)
}

/// Longest reference we try to decode, `&` and `;` included.
const MAX_ENTITY_LEN: usize = 10;

/// Decode named and numeric (`&#NNN;`, `&#xHH;`) character references in
/// one pass. Anything unrecognised is kept verbatim.
fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest
            .find(';')
            .filter(|&end| end < MAX_ENTITY_LEN)
            .and_then(|end| decode_entity(&rest[1..end]).map(|c| (c, end)));

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    if let Some(number) = name.strip_prefix('#') {
        let code = match number.strip_prefix('x').or_else(|| number.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => number.parse().ok()?,
        };
        return char::from_u32(code);
    }

    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        "ndash" => Some('\u{2013}'),
        "mdash" => Some('\u{2014}'),
        _ => None,
    }
}
