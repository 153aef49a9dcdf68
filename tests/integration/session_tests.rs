use super::*;
use shopscrape::{ProxyConfig, ScrapeSession, SessionRequest};
use shopscrape::snapshot::SnapshotStore;

fn proxy_for(server: &MockServer) -> ProxyConfig {
    ProxyConfig::new().with("http", server.uri())
}

async fn run_session(
    app: &TestApp,
    server: &MockServer,
    request: SessionRequest,
) -> shopscrape::Result<shopscrape::ScrapeSummary> {
    let plugins = PluginManager::from_config(&app.config).await;
    let session = ScrapeSession::with_proxy(
        &app.config,
        &proxy_for(server),
        Arc::new(app.cache.clone()),
        plugins,
    )?;
    session.run(&request).await
}

#[tokio::test]
async fn test_full_session_persists_everything() -> anyhow::Result<()> {
    let app = create_test_app().await?;
    let server = MockServer::start().await;
    mount_page(&server, 1, &[("Dental Mirror", "₹1,250.00"), ("Probe", "99")]).await;
    mount_page(&server, 2, &[("Scaler 5/8", "3,400")]).await;
    mount_images(&server).await;

    let summary = run_session(&app, &server, SessionRequest { pages: 2, max_products: 10 }).await?;

    assert_eq!(summary.scraped_count, 3);
    let prices: Vec<_> = summary.products.iter().map(|p| p.price.as_str()).collect();
    assert_eq!(prices, vec!["1250.00", "99.00", "34.00"]);

    // Image files use the sanitized title
    let images = &app.config.storage.images_dir;
    assert!(images.join("Dental_Mirror.jpg").exists());
    assert!(images.join("Scaler_5_8.jpg").exists());
    assert_eq!(std::fs::read(images.join("Probe.jpg"))?, vec![0xFF, 0xD8, 0xFF, 0xE0]);

    // Snapshot mirrors the summary, with the document keys
    let raw = std::fs::read_to_string(app.config.storage.snapshot_path())?;
    assert!(raw.contains("\"product_title\": \"Dental Mirror\""));
    let written = SnapshotStore::from_config(&app.config.storage).read().await?;
    assert_eq!(written, summary.products);

    let cache = app.cache.snapshot().await;
    assert_eq!(cache.get("product:Probe").map(String::as_str), Some("99.00"));
    Ok(())
}

#[tokio::test]
async fn test_second_session_skips_unchanged_prices() -> anyhow::Result<()> {
    let app = create_test_app().await?;
    let server = MockServer::start().await;
    mount_page(&server, 1, &[("Mirror", "450"), ("Probe", "1,299")]).await;
    mount_images(&server).await;

    let request = SessionRequest { pages: 1, max_products: 10 };
    let first = run_session(&app, &server, request).await?;
    assert_eq!(first.scraped_count, 2);

    let second = run_session(&app, &server, request).await?;
    assert_eq!(second.scraped_count, 0);

    // The snapshot is rewritten even when nothing changed
    let written = SnapshotStore::from_config(&app.config.storage).read().await?;
    assert!(written.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_limit_prevents_fetching_later_pages() -> anyhow::Result<()> {
    let app = create_test_app().await?;
    let server = MockServer::start().await;
    mount_page(
        &server,
        1,
        &[("A", "100"), ("B", "200"), ("C", "300"), ("D", "400"), ("E", "500")],
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/shop/page/2/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(&[("F", "600")])))
        .expect(0)
        .mount(&server)
        .await;
    mount_images(&server).await;

    let summary = run_session(&app, &server, SessionRequest { pages: 3, max_products: 3 }).await?;

    assert_eq!(summary.scraped_count, 3);
    assert_eq!(app.cache.snapshot().await.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_failed_image_download_keeps_product() -> anyhow::Result<()> {
    let app = create_test_app().await?;
    let server = MockServer::start().await;
    mount_page(&server, 1, &[("Mirror", "450")]).await;
    // No image mock: the proxy answers 404, whose body is still saved

    let summary = run_session(&app, &server, SessionRequest { pages: 1, max_products: 10 }).await?;

    assert_eq!(summary.scraped_count, 1);
    assert!(summary.products[0].image_path.ends_with("Mirror.jpg"));
    Ok(())
}

#[tokio::test]
async fn test_failure_on_later_page_discards_session() -> anyhow::Result<()> {
    let app = create_test_app().await?;
    let server = MockServer::start().await;
    mount_page(&server, 1, &[("Mirror", "450")]).await;
    Mock::given(method("GET"))
        .and(path("/shop/page/2/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;
    mount_images(&server).await;

    let result = run_session(&app, &server, SessionRequest { pages: 2, max_products: 10 }).await;

    assert!(matches!(
        result,
        Err(shopscrape::AppError::FetchExhausted { attempts: 2, .. })
    ));
    assert!(!app.config.storage.snapshot_path().exists());
    // Products processed before the failure were already recorded
    assert_eq!(
        app.cache.snapshot().await.get("product:Mirror").map(String::as_str),
        Some("4.50")
    );
    Ok(())
}
