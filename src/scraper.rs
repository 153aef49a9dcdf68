use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::time::sleep;
use tokio_retry::strategy::FixedInterval;
use tracing::{debug, warn};

use crate::config::ScraperConfig;
use crate::models::ProxyConfig;
use crate::utils::error::{AppError, Result};

/// Outbound HTTP used by a scrape session.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GET a listing page, retrying until a 200 arrives or attempts run out.
    async fn fetch_page(&self, url: &str) -> Result<String>;

    /// Single GET returning the raw body; status is not inspected.
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

/// reqwest-backed fetcher bound to one proxy descriptor.
pub struct HttpFetcher {
    client: Client,
    proxy: ProxyConfig,
    max_retries: u32,
    retry_delay: Duration,
}

impl HttpFetcher {
    pub fn new(config: &ScraperConfig, proxy: &ProxyConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.request_timeout());

        for entry in proxy.to_reqwest()? {
            builder = builder.proxy(entry);
        }
        proxy.ensure_routes(&config.base_url)?;

        Ok(Self {
            client: builder.build()?,
            proxy: proxy.clone(),
            max_retries: config.max_retries.max(1),
            retry_delay: config.retry_delay(),
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        self.proxy.ensure_routes(url)?;

        // The delay also follows the final failed attempt.
        let delays = FixedInterval::new(self.retry_delay).take(self.max_retries as usize);

        for (attempt, delay) in (1u32..).zip(delays) {
            debug!(url, attempt, "GET");

            match self.client.get(url).send().await {
                Ok(response) if response.status() == StatusCode::OK => match response.text().await {
                    Ok(body) => return Ok(body),
                    Err(e) => warn!(url, attempt, error = %e, "Failed to read response body, retrying"),
                },
                Ok(response) => {
                    warn!(url, attempt, status = %response.status(), "Unexpected status, retrying");
                }
                Err(e) => {
                    warn!(url, attempt, error = %e, "Request failed, retrying");
                }
            }

            sleep(delay).await;
        }

        Err(AppError::FetchExhausted {
            url: url.to_string(),
            attempts: self.max_retries,
        })
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.proxy.ensure_routes(url)?;
        debug!(url, "GET bytes");
        let response = self.client.get(url).send().await?;
        Ok(response.bytes().await?.to_vec())
    }
}
