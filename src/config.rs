use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Bearer token accepted by the start-scrape endpoint.
    #[serde(default = "default_api_token")]
    pub api_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Listing root; pages are fetched from `{base_url}page/{n}/`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Redis,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_backend")]
    pub backend: CacheBackend,
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_images_dir")]
    pub images_dir: PathBuf,
    #[serde(default = "default_snapshot_file")]
    pub snapshot_file: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default)]
    pub discord: DiscordConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    pub webhook_url: Option<String>,
    #[serde(default = "default_discord_username")]
    pub username: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
    #[serde(default)]
    pub json: bool,
}

// Defaults

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_api_token() -> String {
    "static-token".to_string()
}
fn default_base_url() -> String {
    "https://dentalstall.com/shop/".to_string()
}
fn default_max_retries() -> u32 {
    3
}
fn default_retry_delay_ms() -> u64 {
    3000
}
fn default_request_timeout() -> u64 {
    30
}
fn default_user_agent() -> String {
    concat!("shopscrape/", env!("CARGO_PKG_VERSION")).to_string()
}
fn default_cache_backend() -> CacheBackend {
    CacheBackend::Redis
}
fn default_redis_url() -> String {
    "redis://127.0.0.1:6379/0".to_string()
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("scraped_data")
}
fn default_images_dir() -> PathBuf {
    PathBuf::from("images")
}
fn default_snapshot_file() -> String {
    "products.json".to_string()
}
fn default_discord_username() -> String {
    "Shopscrape".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            api_token: default_api_token(),
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: default_cache_backend(),
            redis_url: default_redis_url(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            images_dir: default_images_dir(),
            snapshot_file: default_snapshot_file(),
        }
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            username: default_discord_username(),
        }
    }
}

impl ScraperConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

impl StorageConfig {
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(&self.snapshot_file)
    }
}

impl AppConfig {
    /// Load from `config_dir` (default, run mode, local) with `SHOPSCRAPE__` env overrides.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let layer = |name: &str| config_dir.join(name).to_string_lossy().into_owned();

        let s = Config::builder()
            .add_source(File::with_name(&layer("default")).required(false))
            .add_source(File::with_name(&layer(&run_mode)).required(false))
            // Add local config (ignored by git)
            .add_source(File::with_name(&layer("local")).required(false))
            .add_source(Environment::with_prefix("SHOPSCRAPE").separator("__"))
            .build()?;

        let config: AppConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("Server port must be greater than 0".into()));
        }

        if self.security.api_token.trim().is_empty() {
            return Err(ConfigError::Message("Security api_token must not be empty".into()));
        }

        match Url::parse(&self.scraper.base_url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            _ => return Err(ConfigError::Message("Invalid scraper base_url format".into())),
        }

        if self.scraper.max_retries == 0 {
            return Err(ConfigError::Message("Scraper max_retries must be greater than 0".into()));
        }

        if self.scraper.request_timeout == 0 {
            return Err(ConfigError::Message("Scraper request_timeout must be greater than 0".into()));
        }

        if self.cache.backend == CacheBackend::Redis && !self.cache.redis_url.starts_with("redis") {
            return Err(ConfigError::Message("Cache redis_url must use the redis:// or rediss:// scheme".into()));
        }

        if self.storage.snapshot_file.trim().is_empty() {
            return Err(ConfigError::Message("Storage snapshot_file must not be empty".into()));
        }

        if let Some(webhook) = &self.notifications.discord.webhook_url {
            if !webhook.starts_with("https://discord.com/api/webhooks/") {
                return Err(ConfigError::Message("Invalid Discord webhook URL format".into()));
            }
        }

        Ok(())
    }
}
