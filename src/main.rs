use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use p2p_rates::config::Config;
use p2p_rates::listings::binance::BinanceP2p;
use p2p_rates::listings::{self, StopReason, WalkSettings};
use p2p_rates::models::{ListingQuery, TradeSide};
use p2p_rates::orderset::OrderSetState;
use p2p_rates::orderset::rat::{self, ParsePolicy};
use p2p_rates::report::{self, BatchSettings};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "p2p-rates")]
#[command(about = "Scrape P2P exchange adverts and summarise their prices")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Side {
    Buy,
    Sell,
}

impl From<Side> for TradeSide {
    fn from(side: Side) -> Self {
        match side {
            Side::Buy => TradeSide::Buy,
            Side::Sell => TradeSide::Sell,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Walk every advert page for one market and save it as a .rat file
    Fetch {
        /// Fiat code, e.g. COP
        fiat: String,
        #[arg(value_enum)]
        side: Side,
        /// Asset code; defaults to P2P_ASSET
        #[arg(long)]
        asset: Option<String>,
        /// Delay between pages in milliseconds; defaults to P2P_PAGE_DELAY_MS
        #[arg(long)]
        delay_ms: Option<u64>,
        /// Directory for the .rat file; defaults to P2P_OUTPUT_DIR
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Print summary statistics for .rat files
    Analyze {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Fail on malformed lines instead of skipping them
        #[arg(long)]
        strict: bool,
        /// Also print the average price
        #[arg(long)]
        average: bool,
        /// Also print the nearest-rank deciles
        #[arg(long)]
        deciles: bool,
    },
    /// Summarise both sides of every configured fiat into the template page
    Report {
        /// Template to update; defaults to P2P_TEMPLATE
        #[arg(long)]
        template: Option<PathBuf>,
        /// Comma separated fiat codes; defaults to P2P_CURRENCIES
        #[arg(long, value_delimiter = ',')]
        currencies: Option<Vec<String>>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("invalid configuration")?;

    match cli.command {
        Commands::Fetch {
            fiat,
            side,
            asset,
            delay_ms,
            out_dir,
        } => {
            let asset = asset.unwrap_or_else(|| config.asset.clone());
            let query = ListingQuery::new(&fiat, &asset, side.into());
            let settings = WalkSettings {
                rows: config.page_rows,
                delay: delay_ms.map_or(config.page_delay, Duration::from_millis),
            };
            let dir = out_dir.unwrap_or_else(|| config.output_dir.clone());
            fetch(&config, &query, settings, &dir).await
        }
        Commands::Analyze {
            files,
            strict,
            average,
            deciles,
        } => {
            let policy = if strict {
                ParsePolicy::Strict
            } else {
                ParsePolicy::Lenient
            };
            let AnalyzeOutcome { loaded, failed } = analyze_files(&files, policy, average, deciles);
            tracing::debug!("{loaded} of {} files had data", files.len());
            if failed.is_empty() {
                Ok(())
            } else {
                anyhow::bail!("{} of {} files could not be analyzed", failed.len(), files.len())
            }
        }
        Commands::Report {
            template,
            currencies,
        } => {
            let template = template.unwrap_or_else(|| config.template_path.clone());
            let currencies = currencies
                .map(|list| list.iter().map(|c| c.trim().to_uppercase()).collect())
                .unwrap_or_else(|| config.currencies.clone());
            run_report(&config, &currencies, &template).await
        }
    }
}

async fn fetch(
    config: &Config,
    query: &ListingQuery,
    settings: WalkSettings,
    dir: &std::path::Path,
) -> anyhow::Result<()> {
    let source = BinanceP2p::new(config.endpoint.clone());
    tracing::info!("Fetching {query} from {}", config.endpoint);

    let walk = listings::walk(&source, query, settings).await;
    if let StopReason::Failed { page, error } = &walk.stop {
        tracing::warn!("{query}: stopped at page {page}: {error}");
    }

    let path = rat::save(dir, query, &chrono::Local::now(), &walk.records)
        .with_context(|| format!("writing records for {query}"))?;
    tracing::info!("Saved {} records to {}", walk.records.len(), path.display());
    Ok(())
}

#[derive(Debug, Default)]
struct AnalyzeOutcome {
    loaded: usize,
    failed: Vec<PathBuf>,
}

/// Analyzes every file in turn; a file that fails to parse is logged and skipped.
fn analyze_files(
    files: &[PathBuf],
    policy: ParsePolicy,
    average: bool,
    deciles: bool,
) -> AnalyzeOutcome {
    let mut outcome = AnalyzeOutcome::default();

    for file in files {
        match analyze(file, policy, average, deciles) {
            Ok(true) => outcome.loaded += 1,
            Ok(false) => {}
            Err(e) => {
                tracing::error!("{e:#}");
                outcome.failed.push(file.clone());
            }
        }
    }

    outcome
}

/// Prints the summary for one file. Returns whether any data was loaded.
fn analyze(
    file: &std::path::Path,
    policy: ParsePolicy,
    average: bool,
    deciles: bool,
) -> anyhow::Result<bool> {
    let state = OrderSetState::load(file, policy)
        .with_context(|| format!("parsing {}", file.display()))?;

    let Some(set) = state.as_loaded() else {
        println!("{}: no data loaded", file.display());
        return Ok(false);
    };

    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().to_uppercase())
        .unwrap_or_default();
    let side = if name.contains("BUY") { "buy" } else { "sell" };

    println!("\n{} ({side} orders, {} records)", file.display(), set.len());
    println!("  total amount: {:.2}", set.total_amount());
    if average {
        println!("  average price: {:.2}", set.average_price());
    }
    println!("  median price: {:.2}", set.median_price());
    if deciles {
        for (p, value) in set.deciles() {
            println!("  p{p}: {value:.2}");
        }
    }
    Ok(true)
}

async fn run_report(
    config: &Config,
    currencies: &[String],
    template: &std::path::Path,
) -> anyhow::Result<()> {
    let source = BinanceP2p::new(config.endpoint.clone());
    let settings = BatchSettings {
        asset: config.asset.clone(),
        walk: WalkSettings {
            rows: config.page_rows,
            delay: config.page_delay,
        },
        currency_delay: config.currency_delay,
    };

    tracing::info!(
        "Report starting: {} currencies, template {}",
        currencies.len(),
        template.display()
    );

    let rates = report::build_rates(&source, currencies, &settings).await;
    let json = report::render_rates(&rates).context("serializing rates")?;
    report::template::update_file(template, &json)
        .with_context(|| format!("updating {}", template.display()))?;

    tracing::info!("{} updated with {} currencies", template.display(), rates.len());
    Ok(())
}
