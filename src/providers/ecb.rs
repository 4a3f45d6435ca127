//! European Central Bank reference rate feed

use crate::core::currency::{CurrencyRecord, DateRecord};
use crate::core::error::{FxError, Result};
use crate::core::rate_set::RateSet;
use crate::core::source::{RateSource, SourceOptions};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

pub const SOURCE_KEY: &str = "ecb";

/// The ECB publishes rates against the euro and leaves the euro itself out.
pub const REFERENCE_CURRENCY: &str = "EUR";

/// One published day of the feed, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedDay {
    pub date: String,
    pub rates: Vec<FeedRate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRate {
    pub code: String,
    pub value: String,
}

// <gesmes:Envelope><Cube><Cube time=".."><Cube currency=".." rate=".."/>
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "Cube")]
    cube: TimeSeries,
}

#[derive(Debug, Deserialize)]
struct TimeSeries {
    #[serde(rename = "Cube", default)]
    days: Vec<DayCube>,
}

#[derive(Debug, Deserialize)]
struct DayCube {
    #[serde(rename = "@time")]
    time: String,
    #[serde(rename = "Cube", default)]
    rates: Vec<RateCube>,
}

#[derive(Debug, Deserialize)]
struct RateCube {
    #[serde(rename = "@currency")]
    currency: String,
    #[serde(rename = "@rate", default)]
    rate: String,
}

/// Reads the feed's XML envelope into per-day records.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedDay>> {
    let envelope: Envelope =
        quick_xml::de::from_str(xml).map_err(|e| FxError::InvalidFeed(e.to_string()))?;

    Ok(envelope
        .cube
        .days
        .into_iter()
        .map(|day| FeedDay {
            date: day.time,
            rates: day
                .rates
                .into_iter()
                .map(|rate| FeedRate {
                    code: rate.currency,
                    value: rate.rate,
                })
                .collect(),
        })
        .collect())
}

fn parse_feed_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| FxError::InvalidFeed(format!("bad day date '{raw}': {e}")))
}

/// Most recent day published in the feed.
pub fn latest_feed_date(days: &[FeedDay]) -> Result<NaiveDate> {
    days.iter()
        .map(|day| parse_feed_date(&day.date))
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .max()
        .ok_or_else(|| FxError::InvalidFeed("feed contains no days".to_string()))
}

/// Builds the rate set, adding the euro at a rate of one to every day.
pub fn normalize(days: Vec<FeedDay>) -> Result<RateSet> {
    let mut rate_set = RateSet::new();

    for day in days {
        let date = parse_feed_date(&day.date)?;
        let currencies = day
            .rates
            .into_iter()
            .map(|rate| CurrencyRecord::from_feed(rate.code, &rate.value));
        rate_set.insert(DateRecord::new(date, currencies, REFERENCE_CURRENCY));
    }

    Ok(rate_set)
}

pub struct EcbSource {
    url: String,
}

impl EcbSource {
    pub fn new(url: &str) -> Self {
        EcbSource {
            url: url.to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Downloads the raw feed text from the configured endpoint.
    pub async fn fetch_remote(&self) -> Result<String> {
        debug!("Requesting rate feed from {}", self.url);
        let unavailable = |reason: String| FxError::DataUnavailable {
            source_key: SOURCE_KEY.to_string(),
            reason,
        };

        let client = reqwest::Client::builder()
            .user_agent("fxrate/1.0")
            .build()
            .map_err(|e| unavailable(format!("Failed to build HTTP client: {e}")))?;
        let response = client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| unavailable(format!("Request error: {} URL: {}", e, self.url)))?;

        if !response.status().is_success() {
            return Err(unavailable(format!(
                "HTTP error: {} URL: {}",
                response.status(),
                self.url
            )));
        }

        response
            .text()
            .await
            .map_err(|e| unavailable(format!("Failed to read response body: {e}")))
    }

    async fn load_raw(&self, options: &SourceOptions) -> Result<String> {
        if let Some(path) = &options.cache_path {
            if path.is_file() {
                match tokio::fs::read_to_string(path).await {
                    Ok(text) => {
                        debug!("Using local rate snapshot {}", path.display());
                        return Ok(text);
                    }
                    Err(e) => warn!(
                        "Could not read rate snapshot {}: {}. Fetching remote feed",
                        path.display(),
                        e
                    ),
                }
            } else {
                debug!("No rate snapshot at {}", path.display());
            }
        }

        self.fetch_remote().await
    }
}

#[async_trait]
impl RateSource for EcbSource {
    #[instrument(
        name = "EcbRateFetch",
        skip(self, options),
        fields(cache_path = ?options.cache_path, permissive = options.permissive)
    )]
    async fn fetch_rate_set(&self, options: &SourceOptions) -> Result<RateSet> {
        let raw = self.load_raw(options).await?;
        let rate_set = normalize(parse_feed(&raw)?)?;
        debug!(days = rate_set.len(), "Parsed ECB rate feed");
        Ok(rate_set)
    }
}
