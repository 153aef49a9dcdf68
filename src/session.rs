use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::cache::{ChangeDetector, PriceCache};
use crate::config::AppConfig;
use crate::extractor::ProductExtractor;
use crate::images::ImageRetriever;
use crate::models::{Product, ProxyConfig, ScrapeSummary};
use crate::plugins::{NotificationEvent, PluginManager};
use crate::price::normalize_price;
use crate::scraper::{HttpFetcher, PageFetcher};
use crate::snapshot::SnapshotStore;
use crate::utils::error::Result;

pub const DEFAULT_PAGES: u32 = 5;
pub const DEFAULT_MAX_PRODUCTS: usize = 10;

/// Bounds for one session, as sent in the start-scrape query string.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct SessionRequest {
    #[serde(default = "default_pages")]
    #[validate(range(min = 1))]
    pub pages: u32,
    #[serde(default = "default_max_products")]
    #[validate(range(min = 1))]
    pub max_products: usize,
}

fn default_pages() -> u32 {
    DEFAULT_PAGES
}

fn default_max_products() -> usize {
    DEFAULT_MAX_PRODUCTS
}

impl Default for SessionRequest {
    fn default() -> Self {
        Self {
            pages: DEFAULT_PAGES,
            max_products: DEFAULT_MAX_PRODUCTS,
        }
    }
}

/// Listing page `n` under `base_url`, which gains a trailing `/` if it lacks one.
pub fn page_url(base_url: &str, page: u32) -> String {
    if base_url.ends_with('/') {
        format!("{}page/{}/", base_url, page)
    } else {
        format!("{}/page/{}/", base_url, page)
    }
}

/// One bounded pass over the listing: fetch, extract, detect changes, persist, notify.
pub struct ScrapeSession {
    id: Uuid,
    base_url: String,
    fetcher: Arc<dyn PageFetcher>,
    extractor: ProductExtractor,
    detector: ChangeDetector,
    images: ImageRetriever,
    snapshot: SnapshotStore,
    plugins: PluginManager,
}

impl ScrapeSession {
    pub fn new(
        config: &AppConfig,
        fetcher: Arc<dyn PageFetcher>,
        cache: Arc<dyn PriceCache>,
        plugins: PluginManager,
    ) -> Result<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            base_url: config.scraper.base_url.clone(),
            extractor: ProductExtractor::new()?,
            detector: ChangeDetector::new(cache),
            images: ImageRetriever::new(Arc::clone(&fetcher), config.storage.images_dir.clone()),
            snapshot: SnapshotStore::from_config(&config.storage),
            fetcher,
            plugins,
        })
    }

    /// Session whose requests all go through `proxy`. Fails before any network call
    /// when the descriptor is empty or malformed.
    pub fn with_proxy(
        config: &AppConfig,
        proxy: &ProxyConfig,
        cache: Arc<dyn PriceCache>,
        plugins: PluginManager,
    ) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.scraper, proxy)?;
        Self::new(config, Arc::new(fetcher), cache, plugins)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Run to completion. Any fetch or cache error aborts the session before the
    /// snapshot is written or anyone is notified.
    #[instrument(
        name = "scrape_session",
        skip_all,
        fields(session_id = %self.id, pages = request.pages, max_products = request.max_products)
    )]
    pub async fn run(&self, request: &SessionRequest) -> Result<ScrapeSummary> {
        info!("Starting scrape of {}", self.base_url);
        let mut summary = ScrapeSummary::default();

        for page in 1..=request.pages {
            let url = page_url(&self.base_url, page);
            let html = self.fetcher.fetch_page(&url).await?;
            let items = self.extractor.extract(&html);
            debug!(page, found = items.len(), "Extracted listing page");

            for raw in items {
                if summary.scraped_count >= request.max_products {
                    break;
                }

                let price = normalize_price(&raw.price_text);
                if self.detector.is_unchanged(&raw.title, &price).await? {
                    debug!(title = %raw.title, "Price unchanged, skipping");
                    continue;
                }

                let image_path = self.images.retrieve(&raw.image_url, &raw.title).await;
                self.detector.record(&raw.title, &price).await?;

                summary.push(Product {
                    title: raw.title,
                    price,
                    image_path: image_path.to_string_lossy().into_owned(),
                });
            }

            if summary.scraped_count >= request.max_products {
                debug!(page, "Product limit reached");
                break;
            }
        }

        self.snapshot.write(&summary.products).await?;

        let event = NotificationEvent::session_completed(self.id, summary.scraped_count);
        self.plugins.notify_all(&event).await;

        info!("Scrape finished with {} products", summary.scraped_count);
        Ok(summary)
    }
}
