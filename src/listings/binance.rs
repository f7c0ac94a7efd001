use super::ListingSource;
use crate::errors::ListingError;
use crate::models::{ListingQuery, OrderRecord, TradeSide};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Body of the advertisement search POST.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    page: u32,
    rows: u32,
    pay_types: Vec<String>,
    asset: &'a str,
    fiat: &'a str,
    trade_type: TradeSide,
}

/// The raw JSON shape Binance sends back. Only `data` matters here;
/// it may be missing or null once the listings run out.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Option<Vec<AdEntry>>,
}

#[derive(Debug, Deserialize)]
struct AdEntry {
    adv: Adv,
}

/// Prices and amounts arrive as decimal strings.
#[derive(Debug, Deserialize)]
struct Adv {
    price: String,

    #[serde(rename = "surplusAmount")]
    surplus_amount: String,
}

/// Binance C2C (P2P) advertisement search.
pub struct BinanceP2p {
    client: reqwest::Client,
    endpoint: String,
}

impl BinanceP2p {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

fn to_record(adv: Adv) -> Result<OrderRecord, ListingError> {
    let price = adv
        .price
        .parse::<f64>()
        .map_err(|e| ListingError::UnexpectedData(format!("price {:?}: {e}", adv.price)))?;
    let amount = adv.surplus_amount.parse::<f64>().map_err(|e| {
        ListingError::UnexpectedData(format!("surplusAmount {:?}: {e}", adv.surplus_amount))
    })?;

    OrderRecord::new(price, amount).ok_or_else(|| {
        ListingError::UnexpectedData(format!("out of range advert: price={price} amount={amount}"))
    })
}

#[async_trait]
impl ListingSource for BinanceP2p {
    fn name(&self) -> &'static str {
        "binance-p2p"
    }

    /// POSTs one search page and maps each advert into an [`OrderRecord`].
    /// Any status other than 200 is an error; so is any advert that does not parse.
    async fn fetch_page(
        &self,
        query: &ListingQuery,
        page: u32,
        rows: u32,
    ) -> Result<Vec<OrderRecord>, ListingError> {
        let body = SearchRequest {
            page,
            rows,
            pay_types: Vec::new(),
            asset: &query.asset,
            fiat: &query.fiat,
            trade_type: query.side,
        };

        let response = self.client.post(&self.endpoint).json(&body).send().await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(ListingError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        let parsed: SearchResponse = serde_json::from_str(&text)?;

        parsed
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|ad| to_record(ad.adv))
            .collect()
    }
}
