use serde::Serialize;
use std::fmt;

/// One advertisement snapshot: the quoted price and what is left to trade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderRecord {
    pub price: f64,
    pub amount: f64,
}

impl OrderRecord {
    /// Returns `None` unless price is finite and > 0 and amount is finite and >= 0.
    pub fn new(price: f64, amount: f64) -> Option<Self> {
        let price_ok = price.is_finite() && price > 0.0;
        let amount_ok = amount.is_finite() && amount >= 0.0;
        (price_ok && amount_ok).then_some(Self { price, amount })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => "BUY",
            TradeSide::Sell => "SELL",
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The (fiat, asset, side) triple a listing walk is run for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    pub fiat: String,
    pub asset: String,
    pub side: TradeSide,
}

impl ListingQuery {
    pub fn new(fiat: &str, asset: &str, side: TradeSide) -> Self {
        Self {
            fiat: fiat.trim().to_uppercase(),
            asset: asset.trim().to_uppercase(),
            side,
        }
    }
}

impl fmt::Display for ListingQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} {}", self.fiat, self.asset, self.side)
    }
}
