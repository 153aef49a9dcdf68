// Integration tests for Shopscrape
// These tests drive the router and whole sessions against a mock proxy

pub mod api_tests;
pub mod session_tests;

use axum::{
    body::Body,
    http::{header, Method, Request},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shopscrape::{
    config::{CacheBackend, CacheConfig, ScraperConfig, StorageConfig},
    plugins::PluginManager,
    snapshot,
    web::{create_router, AppState},
    AppConfig, MemoryPriceCache,
};

pub const TEST_TOKEN: &str = "test-token";
/// Never resolved: every request reaches the mock server acting as the proxy.
pub const SHOP_BASE: &str = "http://shop.invalid/shop/";

/// Test configuration rooted in a temporary directory
pub fn get_test_config(root: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.security.api_token = TEST_TOKEN.to_string();
    config.scraper = ScraperConfig {
        base_url: SHOP_BASE.to_string(),
        max_retries: 2,
        retry_delay_ms: 0,
        request_timeout: 5,
        user_agent: "Shopscrape-Test/1.0".to_string(),
    };
    config.cache = CacheConfig {
        backend: CacheBackend::Memory,
        redis_url: String::new(),
    };
    config.storage = StorageConfig {
        data_dir: root.path().join("scraped_data"),
        images_dir: root.path().join("images"),
        snapshot_file: "products.json".to_string(),
    };
    config
}

pub struct TestApp {
    pub root: TempDir,
    pub config: AppConfig,
    pub cache: MemoryPriceCache,
    pub router: Router,
}

/// Router over an in-memory cache with directories already created
pub async fn create_test_app() -> anyhow::Result<TestApp> {
    let root = tempfile::tempdir()?;
    let config = get_test_config(&root);
    snapshot::ensure_dirs(&config.storage).await?;

    let cache = MemoryPriceCache::new();
    let plugins = PluginManager::from_config(&config).await;
    let state = AppState::new(config.clone(), Arc::new(cache.clone()), plugins);

    Ok(TestApp {
        root,
        config,
        cache,
        router: create_router(state),
    })
}

/// Helper to make HTTP requests to the test app
pub async fn make_request(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<String>,
) -> anyhow::Result<(axum::http::StatusCode, Value)> {
    let mut request = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    if body.is_some() {
        request = request.header(header::CONTENT_TYPE, "application/json");
    }

    let request = request.body(Body::from(body.unwrap_or_default()))?;
    let response = app.clone().oneshot(request).await?;

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };

    Ok((status, json))
}

/// Proxy body pointing every http request at `server`
pub fn proxy_body(server: &MockServer) -> String {
    serde_json::json!({ "http": server.uri() }).to_string()
}

/// WooCommerce-style listing with one card per `(title, price)`
pub fn listing_html(items: &[(&str, &str)]) -> String {
    let cards: String = items
        .iter()
        .map(|(title, price)| {
            let slug = title.replace(' ', "-").to_lowercase();
            format!(
                r#"<li class="product type-product">
                    <div class="mf-product-thumbnail">
                        <img class="mf-product-thumbnail" src="http://cdn.invalid/img/{slug}.jpg">
                    </div>
                    <h2 class="woo-loop-product__title"><a href="/p/{slug}">{title}</a></h2>
                    <span class="price"><span class="woocommerce-Price-amount amount"><bdi>₹{price}</bdi></span></span>
                </li>"#
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html><html><body><ul class="products">{}</ul></body></html>"#,
        cards
    )
}

/// Serve listing page `n` and accept any image download
pub async fn mount_page(server: &MockServer, page: u32, items: &[(&str, &str)]) {
    Mock::given(method("GET"))
        .and(path(format!("/shop/page/{}/", page)))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(items)))
        .mount(server)
        .await;
}

pub async fn mount_images(server: &MockServer) {
    Mock::given(method("GET"))
        .and(wiremock::matchers::path_regex(r"^/img/.*\.jpg$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, 0xFF, 0xE0]))
        .mount(server)
        .await;
}
