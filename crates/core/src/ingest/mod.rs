pub mod loader;
pub mod types;

pub use loader::{load_portfolios, load_stocks, read_portfolios, read_stocks, UserPortfolios};
