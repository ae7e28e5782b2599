mod common;

use axum::http::StatusCode;
use common::spawn_app;
use serde_json::json;

#[tokio::test]
async fn test_create_link_uses_scraped_metadata() {
    let app = spawn_app().await;
    let token = app.user("alice").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/links",
            Some(&token),
            Some(json!({ "url": "https://example.com/post" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let link = &body["data"];
    assert_eq!(link["title"], "Title of https://example.com/post");
    assert_eq!(link["url"], "https://example.com/post");
    assert_eq!(link["image"], "https://cdn.example.com/cover.png");
    assert_eq!(link["link_type"], "website");
    assert_eq!(link["description"], "ignored");
    assert!(link["created_at"].is_string());
}

#[tokio::test]
async fn test_create_link_survives_failed_extraction() {
    let app = spawn_app().await;
    let token = app.user("alice").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/links",
            Some(&token),
            Some(json!({ "url": "https://unreachable.invalid/" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["title"], "");
    assert_eq!(body["data"]["image"], "");
}

#[tokio::test]
async fn test_create_link_requires_url() {
    let app = spawn_app().await;
    let token = app.user("alice").await;

    for payload in [json!({}), json!({ "url": "" })] {
        let (status, body) = app
            .request("POST", "/api/links", Some(&token), Some(payload))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"]["url"], "URL is required.");
    }
}

#[tokio::test]
async fn test_duplicate_url_is_rejected_across_users() {
    let app = spawn_app().await;
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;

    app.link(&alice, "https://example.com/shared").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/links",
            Some(&bob),
            Some(json!({ "url": "https://example.com/shared" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"]["url"], "link with this url already exists.");
}

#[tokio::test]
async fn test_links_are_scoped_to_owner() {
    let app = spawn_app().await;
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;

    let first = app.link(&alice, "https://example.com/1").await;
    let second = app.link(&alice, "https://example.com/2").await;
    app.link(&bob, "https://example.com/3").await;

    let (status, body) = app.request("GET", "/api/links", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![first, second]);

    let uri = format!("/api/links/{first}");
    let (status, _) = app.request("GET", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.request("DELETE", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.request("GET", &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_replace_link() {
    let app = spawn_app().await;
    let token = app.user("alice").await;
    let id = app.link(&token, "https://example.com/a").await;
    let uri = format!("/api/links/{id}");

    let (status, body) = app
        .request(
            "PUT",
            &uri,
            Some(&token),
            Some(json!({
                "title": "Renamed",
                "description": "Notes",
                "url": "https://example.com/b",
                "link_type": "video",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["title"], "Renamed");
    assert_eq!(body["data"]["description"], "Notes");
    assert_eq!(body["data"]["url"], "https://example.com/b");
    assert_eq!(body["data"]["link_type"], "video");
    // Omitted on PUT, so kept.
    assert_eq!(body["data"]["image"], "https://cdn.example.com/cover.png");

    let (status, body) = app
        .request(
            "PUT",
            &uri,
            Some(&token),
            Some(json!({ "url": "ftp://example.com", "link_type": "podcast" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"]["title"], "This field is required.");
    assert_eq!(body["errors"]["url"], "Enter a valid URL.");
    assert_eq!(body["errors"]["link_type"], "\"podcast\" is not a valid choice.");
}

#[tokio::test]
async fn test_put_keeps_omitted_optionals_and_clears_nulls() {
    let app = spawn_app().await;
    let token = app.user("alice").await;
    let id = app.link(&token, "https://example.com/a").await;
    let uri = format!("/api/links/{id}");

    app.request(
        "PATCH",
        &uri,
        Some(&token),
        Some(json!({ "link_type": "article" })),
    )
    .await;

    let (status, body) = app
        .request(
            "PUT",
            &uri,
            Some(&token),
            Some(json!({ "title": "Only title", "url": "https://example.com/a" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["title"], "Only title");
    assert_eq!(body["data"]["description"], "ignored");
    assert_eq!(body["data"]["image"], "https://cdn.example.com/cover.png");
    assert_eq!(body["data"]["link_type"], "article");

    let (status, body) = app
        .request(
            "PUT",
            &uri,
            Some(&token),
            Some(json!({
                "title": "Only title",
                "url": "https://example.com/a",
                "description": null,
                "image": null,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["data"]["description"].is_null());
    assert!(body["data"]["image"].is_null());
    assert_eq!(body["data"]["link_type"], "article");
}

#[tokio::test]
async fn test_patch_link_updates_only_given_fields() {
    let app = spawn_app().await;
    let token = app.user("alice").await;
    let id = app.link(&token, "https://example.com/a").await;
    let uri = format!("/api/links/{id}");

    let (status, body) = app
        .request(
            "PATCH",
            &uri,
            Some(&token),
            Some(json!({ "description": "Later", "link_type": "book" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Title of https://example.com/a");
    assert_eq!(body["data"]["description"], "Later");
    assert_eq!(body["data"]["link_type"], "book");
    assert_eq!(body["data"]["image"], "https://cdn.example.com/cover.png");

    let (status, body) = app
        .request("PATCH", &uri, Some(&token), Some(json!({ "image": null })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["image"].is_null());
    assert_eq!(body["data"]["description"], "Later");

    let (status, body) = app
        .request("PATCH", &uri, Some(&token), Some(json!({ "title": "   " })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"]["title"], "This field may not be blank.");
}

#[tokio::test]
async fn test_update_to_taken_url_is_rejected() {
    let app = spawn_app().await;
    let token = app.user("alice").await;
    app.link(&token, "https://example.com/a").await;
    let id = app.link(&token, "https://example.com/b").await;

    let (status, body) = app
        .request(
            "PATCH",
            &format!("/api/links/{id}"),
            Some(&token),
            Some(json!({ "url": "https://example.com/a" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"]["url"], "link with this url already exists.");
}

#[tokio::test]
async fn test_missing_link_is_reported_before_bad_body() {
    let app = spawn_app().await;
    let token = app.user("alice").await;

    let (status, _) = app
        .request("PUT", "/api/links/999", Some(&token), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_link() {
    let app = spawn_app().await;
    let token = app.user("alice").await;
    let id = app.link(&token, "https://example.com/a").await;
    let uri = format!("/api/links/{id}");

    let (status, body) = app.request("DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = app.request("GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The url is free again.
    app.link(&token, "https://example.com/a").await;
}
