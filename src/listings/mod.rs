use crate::errors::ListingError;
use crate::models::{ListingQuery, OrderRecord};
use async_trait::async_trait;
use std::time::Duration;

pub mod binance;

/// A paged source of advertisements.
#[async_trait]
pub trait ListingSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fetches one 1-based page. An empty `Vec` means there is nothing left.
    async fn fetch_page(
        &self,
        query: &ListingQuery,
        page: u32,
        rows: u32,
    ) -> Result<Vec<OrderRecord>, ListingError>;
}

/// Why a walk ended. Neither case is fatal to the caller.
#[derive(Debug)]
pub enum StopReason {
    /// A page came back empty after `pages` non-empty pages.
    Exhausted { pages: u32 },
    /// `page` failed; records from earlier pages are kept.
    Failed { page: u32, error: ListingError },
}

#[derive(Debug)]
pub struct Walk {
    pub records: Vec<OrderRecord>,
    pub stop: StopReason,
}

#[derive(Debug, Clone, Copy)]
pub struct WalkSettings {
    pub rows: u32,
    pub delay: Duration,
}

/// Requests pages 1, 2, ... until one is empty or fails, sleeping `delay`
/// after each page that produced rows. Nothing is retried.
pub async fn walk(source: &dyn ListingSource, query: &ListingQuery, settings: WalkSettings) -> Walk {
    let name = source.name();
    let mut records = Vec::new();
    let mut page = 1u32;

    let stop = loop {
        match source.fetch_page(query, page, settings.rows).await {
            Ok(rows) if rows.is_empty() => {
                break StopReason::Exhausted { pages: page - 1 };
            }
            Ok(rows) => {
                tracing::debug!("[{name}] {query} page {page}: {} rows", rows.len());
                records.extend(rows);
                page += 1;
                tokio::time::sleep(settings.delay).await;
            }
            Err(error) => {
                tracing::warn!("[{name}] {query} page {page} failed: {error}");
                break StopReason::Failed { page, error };
            }
        }
    };

    tracing::info!("[{name}] {query}: {} records", records.len());
    Walk { records, stop }
}
