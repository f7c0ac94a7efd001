use crate::errors::ConfigError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://c2c.binance.com/bapi/c2c/v2/friendly/c2c/adv/search";

const DEFAULT_CURRENCIES: &str = "AED,AUD,COP,EUR,HKD,IDR,INR,KHR,LAK,MXN,PKR,TRY,TZS,USD,VND,ZAR";

#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: String,
    pub asset: String,
    pub currencies: Vec<String>,
    pub page_rows: u32,
    pub page_delay: Duration,
    pub currency_delay: Duration,
    pub template_path: PathBuf,
    pub output_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = lookup("P2P_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let asset = lookup("P2P_ASSET")
            .unwrap_or_else(|| "USDT".to_string())
            .trim()
            .to_uppercase();

        let currencies: Vec<String> = lookup("P2P_CURRENCIES")
            .unwrap_or_else(|| DEFAULT_CURRENCIES.to_string())
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();

        let page_rows = parse_or(&lookup, "P2P_PAGE_ROWS", 20u32)?;
        if page_rows == 0 {
            return Err(ConfigError::Invalid {
                key: "P2P_PAGE_ROWS",
                value: "0".to_string(),
            });
        }

        let page_delay = Duration::from_millis(parse_or(&lookup, "P2P_PAGE_DELAY_MS", 300u64)?);
        let currency_delay =
            Duration::from_millis(parse_or(&lookup, "P2P_CURRENCY_DELAY_MS", 2000u64)?);

        let template_path = lookup("P2P_TEMPLATE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("index.html"));
        let output_dir = lookup("P2P_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            endpoint,
            asset,
            currencies,
            page_rows,
            page_delay,
            currency_delay,
            template_path,
            output_dir,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}
