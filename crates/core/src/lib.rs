pub mod catalog;
pub mod compare;
pub mod dispatch;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ingest;

pub mod config {
    use anyhow::Context;
    use std::path::PathBuf;

    const DEFAULT_DATA_DIR: &str = "stock_recommender_data";
    const STOCKS_FILE: &str = "stocks_data.csv";
    const PORTFOLIOS_FILE: &str = "users_unique_portfolio.csv";
    const DEFAULT_TOP_N: usize = 5;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub stocks_csv: PathBuf,
        pub portfolios_csv: PathBuf,
        pub top_n: usize,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let data_dir = std::env::var("FINGENIUS_DATA_DIR")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

            let stocks_csv = std::env::var("STOCKS_CSV")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join(STOCKS_FILE));

            let portfolios_csv = std::env::var("PORTFOLIOS_CSV")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join(PORTFOLIOS_FILE));

            let top_n = match std::env::var("RECOMMEND_TOP_N") {
                Ok(s) => s
                    .trim()
                    .parse::<usize>()
                    .with_context(|| format!("RECOMMEND_TOP_N is not a number: {s}"))?,
                Err(_) => DEFAULT_TOP_N,
            };
            anyhow::ensure!(top_n >= 1, "RECOMMEND_TOP_N must be >= 1");

            Ok(Self {
                stocks_csv,
                portfolios_csv,
                top_n,
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        /// Both dataset files must exist before the engine may load.
        pub fn require_data_files(&self) -> anyhow::Result<()> {
            anyhow::ensure!(
                self.stocks_csv.is_file() && self.portfolios_csv.is_file(),
                "Required data files not found (stocks={}, portfolios={})",
                self.stocks_csv.display(),
                self.portfolios_csv.display()
            );
            Ok(())
        }
    }
}
