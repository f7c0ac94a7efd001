//! Batch report: both sides of every configured fiat, summarised and
//! serialized into the `rates` object consumed by the static page.

pub mod template;

use crate::listings::{ListingSource, WalkSettings, walk};
use crate::models::{ListingQuery, TradeSide};
use crate::orderset::OrderSetState;
use crate::stats::{Summary, round2};
use indexmap::IndexMap;
use serde::Serialize;
use std::time::Duration;

/// Quartile breakdown as shown on the page, rounded to cents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SideStats {
    #[serde(rename = "Q1")]
    pub q1: f64,
    #[serde(rename = "Q2")]
    pub q2: f64,
    #[serde(rename = "Q3")]
    pub q3: f64,
    pub min: f64,
    pub max: f64,
}

impl From<&Summary> for SideStats {
    fn from(s: &Summary) -> Self {
        Self {
            q1: round2(s.q1),
            q2: round2(s.q2),
            q3: round2(s.q3),
            min: round2(s.min),
            max: round2(s.max),
        }
    }
}

/// One entry of the `rates` object. Medians and volumes are pre-formatted strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyReport {
    pub buy: String,
    pub sell: String,
    pub buy_volume: String,
    pub sell_volume: String,
    pub buy_stats: SideStats,
    pub sell_stats: SideStats,
}

impl CurrencyReport {
    pub fn new(buy: &Summary, sell: &Summary) -> Self {
        Self {
            buy: format!("{:.2}", buy.median),
            sell: format!("{:.2}", sell.median),
            buy_volume: format!("{:.2}", buy.total_volume),
            sell_volume: format!("{:.2}", sell.total_volume),
            buy_stats: SideStats::from(buy),
            sell_stats: SideStats::from(sell),
        }
    }
}

/// Keyed by lower-case fiat code, in the order the currencies were walked.
pub type Rates = IndexMap<String, CurrencyReport>;

#[derive(Debug, Clone)]
pub struct BatchSettings {
    pub asset: String,
    pub walk: WalkSettings,
    pub currency_delay: Duration,
}

async fn summarise(
    source: &dyn ListingSource,
    query: &ListingQuery,
    settings: WalkSettings,
) -> Option<Summary> {
    let result = walk(source, query, settings).await;
    OrderSetState::from_records(result.records).summary()
}

/// Walks BUY then SELL for each fiat in order. A fiat is included only
/// when both sides produced at least one record.
pub async fn build_rates(
    source: &dyn ListingSource,
    currencies: &[String],
    settings: &BatchSettings,
) -> Rates {
    let mut rates = Rates::new();

    for (i, fiat) in currencies.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(settings.currency_delay).await;
        }

        let buy_query = ListingQuery::new(fiat, &settings.asset, TradeSide::Buy);
        let sell_query = ListingQuery::new(fiat, &settings.asset, TradeSide::Sell);

        let buy = summarise(source, &buy_query, settings.walk).await;
        let sell = summarise(source, &sell_query, settings.walk).await;

        match (buy, sell) {
            (Some(buy), Some(sell)) => {
                tracing::info!(
                    "{fiat}: buy median {:.2} ({:.2} vol), sell median {:.2} ({:.2} vol)",
                    buy.median,
                    buy.total_volume,
                    sell.median,
                    sell.total_volume
                );
                rates.insert(fiat.to_lowercase(), CurrencyReport::new(&buy, &sell));
            }
            (buy, sell) => {
                tracing::warn!(
                    "{fiat}: skipped (buy side {}, sell side {})",
                    if buy.is_some() { "ok" } else { "empty" },
                    if sell.is_some() { "ok" } else { "empty" }
                );
            }
        }
    }

    rates
}

pub fn render_rates(rates: &Rates) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(rates)
}
