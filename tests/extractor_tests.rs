use std::time::Duration;

use axum::{Router, http::StatusCode, response::Html, routing::get};
use linkshelf::clients::{ExtractedMetadata, MetadataExtractor, OpenGraphClient};
use linkshelf::config::ExtractorConfig;
use linkshelf::domain::LinkType;

const OG_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Fallback title</title>
  <meta property="og:title" content="Rust &amp; Friends">
  <meta content="A page about crabs" property="og:description" />
  <meta property="og:image" content="https://example.com/crab.png">
</head>
<body></body>
</html>"#;

const TITLE_ONLY_PAGE: &str = "<html><head><title>\n  Just a title  \n</title></head></html>";

/// Serves a few fixture pages on an ephemeral port.
async fn spawn_fixture_server() -> String {
    let app = Router::new()
        .route("/og", get(|| async { Html(OG_PAGE) }))
        .route("/title", get(|| async { Html(TITLE_ONLY_PAGE) }))
        .route(
            "/broken",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, Html(OG_PAGE)) }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Html(OG_PAGE)
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

fn client(timeout_seconds: u64) -> OpenGraphClient {
    OpenGraphClient::from_config(&ExtractorConfig {
        timeout_seconds,
        ..ExtractorConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_extracts_open_graph_tags() {
    let base = spawn_fixture_server().await;
    let url = format!("{base}/og");

    let meta = client(5).extract(&url).await;

    assert_eq!(meta.title, "Rust & Friends");
    assert_eq!(meta.description, "A page about crabs");
    assert_eq!(meta.image, "https://example.com/crab.png");
    assert_eq!(meta.link_type, LinkType::Website);
    assert_eq!(meta.url, url);
}

#[tokio::test]
async fn test_falls_back_to_document_title() {
    let base = spawn_fixture_server().await;
    let url = format!("{base}/title");

    let meta = client(5).extract(&url).await;

    assert_eq!(meta.title, "Just a title");
    assert_eq!(meta.description, "");
    assert_eq!(meta.image, "");
}

#[tokio::test]
async fn test_error_status_yields_fallback() {
    let base = spawn_fixture_server().await;
    let url = format!("{base}/broken");

    let meta = client(5).extract(&url).await;

    assert_eq!(meta, ExtractedMetadata::fallback(&url));
}

#[tokio::test]
async fn test_timeout_yields_fallback() {
    let base = spawn_fixture_server().await;
    let url = format!("{base}/slow");

    let started = std::time::Instant::now();
    let meta = client(1).extract(&url).await;

    assert_eq!(meta, ExtractedMetadata::fallback(&url));
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn test_connection_refused_yields_fallback() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let url = format!("http://{addr}/");
    let meta = client(2).extract(&url).await;

    assert_eq!(meta, ExtractedMetadata::fallback(&url));
}
