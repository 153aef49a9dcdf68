use super::*;
use axum::http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn test_liveness() -> anyhow::Result<()> {
    let app = create_test_app().await?;

    let (status, body) = make_request(&app.router, Method::GET, "/", None, None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Scraping service is running!" }));
    Ok(())
}

#[tokio::test]
async fn test_health_check() -> anyhow::Result<()> {
    let app = create_test_app().await?;

    let (status, body) = make_request(&app.router, Method::GET, "/health", None, None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["checks"][0]["name"], "cache");
    Ok(())
}

#[tokio::test]
async fn test_scrape_requires_bearer_token() -> anyhow::Result<()> {
    let app = create_test_app().await?;
    let body = Some(json!({ "http": "http://10.0.0.1:3128" }).to_string());

    let (status, response) =
        make_request(&app.router, Method::POST, "/scrape/", None, body.clone()).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(response["success"], false);
    assert_eq!(response["error"]["code"], "UNAUTHORIZED");

    let (status, _) =
        make_request(&app.router, Method::POST, "/scrape/", Some("wrong"), body).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_non_bearer_scheme_rejected() -> anyhow::Result<()> {
    let app = create_test_app().await?;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/scrape/")
        .header(header::AUTHORIZATION, TEST_TOKEN)
        .body(Body::empty())?;
    let response = app.router.clone().oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
    Ok(())
}

#[tokio::test]
async fn test_missing_proxy_is_bad_request() -> anyhow::Result<()> {
    let app = create_test_app().await?;

    for body in [None, Some("null".to_string()), Some("{}".to_string())] {
        let (status, response) =
            make_request(&app.router, Method::POST, "/scrape/", Some(TEST_TOKEN), body).await?;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"]["code"], "BAD_REQUEST");
        assert_eq!(response["error"]["message"], "Proxy is required.");
    }

    // Nothing ran, so nothing was written
    assert!(!app.config.storage.snapshot_path().exists());
    Ok(())
}

#[tokio::test]
async fn test_malformed_proxy_is_bad_request() -> anyhow::Result<()> {
    let app = create_test_app().await?;
    let body = Some(json!({ "http": "not a url" }).to_string());

    let (status, response) =
        make_request(&app.router, Method::POST, "/scrape/", Some(TEST_TOKEN), body).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["error"]["message"]
        .as_str()
        .unwrap_or_default()
        .contains("Invalid proxy"));
    Ok(())
}

#[tokio::test]
async fn test_proxy_must_route_listing_scheme() -> anyhow::Result<()> {
    let app = create_test_app().await?;
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    // The listing is served over http, which an https-only descriptor does not route
    let body = Some(json!({ "https": server.uri() }).to_string());

    let (status, response) =
        make_request(&app.router, Method::POST, "/scrape/", Some(TEST_TOKEN), body).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["error"]["message"]
        .as_str()
        .unwrap_or_default()
        .contains("Invalid proxy for scheme 'http'"));
    assert!(!app.config.storage.snapshot_path().exists());
    Ok(())
}

#[tokio::test]
async fn test_large_bounds_are_accepted() -> anyhow::Result<()> {
    let app = create_test_app().await?;
    let server = MockServer::start().await;
    mount_page(&server, 1, &[("Mirror", "450")]).await;
    mount_images(&server).await;

    // One product stops the loop after the first page
    let (status, response) = make_request(
        &app.router,
        Method::POST,
        "/scrape/?pages=500&max_products=1",
        Some(TEST_TOKEN),
        Some(proxy_body(&server)),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["data"]["scraped_count"], 1);
    Ok(())
}

#[tokio::test]
async fn test_out_of_range_query_is_bad_request() -> anyhow::Result<()> {
    let app = create_test_app().await?;
    let body = Some(json!({ "http": "http://10.0.0.1:3128" }).to_string());

    for uri in [
        "/scrape/?pages=0",
        "/scrape/?max_products=0",
        "/scrape/?pages=abc",
        "/scrape/?max_products=-1",
    ] {
        let (status, _) =
            make_request(&app.router, Method::POST, uri, Some(TEST_TOKEN), body.clone()).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
    }
    Ok(())
}

#[tokio::test]
async fn test_scrape_reaches_requested_count() -> anyhow::Result<()> {
    let app = create_test_app().await?;
    let server = MockServer::start().await;
    mount_page(&server, 1, &[("Mirror", "450"), ("Probe", "1,299"), ("Forceps", "2,000")]).await;
    mount_images(&server).await;

    let (status, response) = make_request(
        &app.router,
        Method::POST,
        "/scrape/?pages=1&max_products=2",
        Some(TEST_TOKEN),
        Some(proxy_body(&server)),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["success"], true);
    assert_eq!(response["data"]["message"], "Successfully scraped 2 products!");
    assert_eq!(response["data"]["scraped_count"], 2);
    assert_eq!(response["data"]["max_products"], 2);
    Ok(())
}

#[tokio::test]
async fn test_scrape_reports_shortfall() -> anyhow::Result<()> {
    let app = create_test_app().await?;
    let server = MockServer::start().await;
    mount_page(&server, 1, &[("Mirror", "450")]).await;
    mount_images(&server).await;

    let (status, response) = make_request(
        &app.router,
        Method::POST,
        "/scrape/?pages=1&max_products=10",
        Some(TEST_TOKEN),
        Some(proxy_body(&server)),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        response["data"]["message"],
        "Scraped only 1 products (less than the requested 10)."
    );
    Ok(())
}

#[tokio::test]
async fn test_exhausted_fetch_is_server_error() -> anyhow::Result<()> {
    let app = create_test_app().await?;
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/shop/page/1/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let (status, response) = make_request(
        &app.router,
        Method::POST,
        "/scrape/?pages=1&max_products=5",
        Some(TEST_TOKEN),
        Some(proxy_body(&server)),
    )
    .await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response["error"]["message"],
        "Scraping failed: Failed to retrieve http://shop.invalid/shop/page/1/ after 2 attempts"
    );
    assert!(!app.config.storage.snapshot_path().exists());
    Ok(())
}
