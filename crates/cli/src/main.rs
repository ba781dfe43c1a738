use anyhow::Context;
use clap::{Parser, Subcommand};
use fingenius_core::compare::ComparisonEngine;
use fingenius_core::config::Settings;
use fingenius_core::dispatch::RequestDispatcher;
use fingenius_core::domain::contract::RecommendRequest;
use fingenius_core::domain::portfolio::PortfolioEntry;
use fingenius_core::engine::similarity::SimilarityRecommender;
use fingenius_core::engine::RecommendationEngine;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "fingenius")]
struct Args {
    /// Stock table CSV. Defaults to STOCKS_CSV or the data directory.
    #[arg(long, global = true)]
    stocks: Option<PathBuf>,

    /// Stored user portfolios CSV. Defaults to PORTFOLIOS_CSV or the data directory.
    #[arg(long, global = true)]
    portfolios: Option<PathBuf>,

    /// Number of recommendations to return.
    #[arg(long, global = true)]
    top_n: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compare two stocks head to head.
    Compare { ticker1: String, ticker2: String },

    /// Recommend stocks for a stored user or an explicit portfolio.
    Recommend {
        #[arg(long)]
        user_id: Option<String>,

        /// Comma-separated TICKER=WEIGHT pairs, e.g. AAPL=0.6,MSFT=0.4
        #[arg(long, value_parser = parse_portfolio)]
        portfolio: Option<PortfolioArg>,
    },

    /// Load and prepare the dataset, then report its size.
    Check,
}

#[derive(Debug, Clone)]
struct PortfolioArg(Vec<PortfolioEntry>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    if let Some(path) = args.stocks {
        settings.stocks_csv = path;
    }
    if let Some(path) = args.portfolios {
        settings.portfolios_csv = path;
    }
    if let Some(n) = args.top_n {
        anyhow::ensure!(n >= 1, "--top-n must be >= 1");
        settings.top_n = n;
    }

    let res = run(&settings, args.command).await;
    if let Err(err) = &res {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %format!("{err:#}"), "command failed");
    }
    res
}

async fn run(settings: &Settings, command: Command) -> anyhow::Result<()> {
    settings.require_data_files()?;

    let mut engine = SimilarityRecommender::new(settings.top_n);
    engine
        .load(&settings.stocks_csv, &settings.portfolios_csv)
        .context("dataset load failed")?;
    engine
        .prepare_features()
        .context("feature preparation failed")?;

    match command {
        Command::Compare { ticker1, ticker2 } => {
            let comparison = ComparisonEngine::new(engine.catalog()?);
            let result = comparison.compare(&ticker1, &ticker2)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Recommend { user_id, portfolio } => {
            let dispatcher = RequestDispatcher::new(Arc::new(engine));
            let result = dispatcher
                .recommend(RecommendRequest {
                    user_id,
                    portfolio: portfolio.map(|p| p.0),
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Check => {
            let catalog = engine.catalog()?;
            tracing::info!(
                stocks = catalog.len(),
                users = engine.user_count(),
                "dataset ok"
            );
        }
    }

    Ok(())
}

fn parse_portfolio(s: &str) -> anyhow::Result<PortfolioArg> {
    let mut out = Vec::new();
    for part in s.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (ticker, weight) = part
            .split_once('=')
            .with_context(|| format!("expected TICKER=WEIGHT, got {part:?}"))?;
        let weight = weight
            .trim()
            .parse::<f64>()
            .with_context(|| format!("invalid weight for {}", ticker.trim()))?;
        out.push(PortfolioEntry {
            ticker: ticker.trim().to_string(),
            weight,
        });
    }
    anyhow::ensure!(!out.is_empty(), "portfolio must list at least one ticker");
    Ok(PortfolioArg(out))
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
