pub mod cache;
pub mod config;
pub mod extractor;
pub mod images;
pub mod models;
pub mod plugins;
pub mod price;
pub mod scraper;
pub mod session;
pub mod snapshot;
pub mod utils;
pub mod web;

// Re-export commonly used types
pub use cache::{MemoryPriceCache, PriceCache, RedisPriceCache};
pub use config::AppConfig;
pub use models::{Product, ProxyConfig, ScrapeSummary};
pub use plugins::PluginManager;
pub use session::{ScrapeSession, SessionRequest};
pub use utils::error::{AppError, Result};
