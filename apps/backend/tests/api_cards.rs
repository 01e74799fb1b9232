//! Card and batch import API tests.
//!
//! These tests require a running PostgreSQL database.
//! Set DATABASE_URL before running.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;

use common::fixtures;
use common::TestContext;

/// Test creating a card starts it as new.
#[tokio::test]
#[ignore = "requires database"]
async fn test_create_card() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let notebook_id = ctx.create_notebook("cards").await;

    let response = server
        .post(&format!("/api/notebooks/{}/cards", notebook_id))
        .json(&fixtures::create_card_request(" happy ", "adjective", "快樂的"))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["english"], "happy");
    assert_eq!(body["status"], "new");
    assert_eq!(body["current_interval"], 0);
    assert_eq!(body["consecutive_familiar_count"], 0);
    assert!(body["next_review_at"].is_null());

    ctx.cleanup().await;
}

/// Test card without chinese is rejected.
#[tokio::test]
#[ignore = "requires database"]
async fn test_create_card_requires_chinese() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let notebook_id = ctx.create_notebook("cards").await;

    let response = server
        .post(&format!("/api/notebooks/{}/cards", notebook_id))
        .json(&fixtures::create_card_request("happy", "adjective", " "))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    ctx.cleanup().await;
}

/// Test batch import creates valid lines and reports the rest.
#[tokio::test]
#[ignore = "requires database"]
async fn test_batch_import() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let notebook_id = ctx.create_notebook("batch").await;

    let text = format!("{}\nnot a card", fixtures::batch_text(4, '|'));
    let response = server
        .post(&format!("/api/notebooks/{}/cards/batch", notebook_id))
        .json(&fixtures::import_request(&text, "pipe"))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["created"].as_array().unwrap().len(), 4);
    assert_eq!(body["invalid"].as_array().unwrap().len(), 1);
    assert_eq!(body["invalid"][0]["line"], 5);

    let response = server
        .get(&format!("/api/notebooks/{}/cards", notebook_id))
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["cards"].as_array().unwrap().len(), 4);

    ctx.cleanup().await;
}

/// Test batch import with nothing valid is rejected.
#[tokio::test]
#[ignore = "requires database"]
async fn test_batch_import_nothing_valid() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let notebook_id = ctx.create_notebook("batch").await;

    let response = server
        .post(&format!("/api/notebooks/{}/cards/batch", notebook_id))
        .json(&fixtures::import_request("only,two", "comma"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    ctx.cleanup().await;
}

/// Test search matches english and chinese and sorts alphabetically.
#[tokio::test]
#[ignore = "requires database"]
async fn test_search_cards() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let notebook_id = ctx.create_notebook("search").await;

    let marker = fixtures::unique_name("zq");
    let words = [format!("{}b", marker), format!("{}a", marker)];
    ctx.create_cards(notebook_id, &[words[0].as_str(), words[1].as_str()])
        .await;

    let response = server
        .get("/api/cards")
        .add_query_param("q", marker.to_uppercase())
        .add_query_param("sort", "alpha")
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let cards = body["cards"].as_array().unwrap();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0]["english"], words[1].as_str());

    ctx.cleanup().await;
}

/// Test search matches part of speech and names the notebook.
#[tokio::test]
#[ignore = "requires database"]
async fn test_search_by_part_of_speech() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let notebook_id = ctx.create_notebook("pos").await;

    let pos = fixtures::unique_name("phrasal");
    server
        .post(&format!("/api/notebooks/{}/cards", notebook_id))
        .json(&fixtures::create_card_request("give up", &pos, "放棄"))
        .await
        .assert_status(StatusCode::CREATED);

    let notebook = ctx.db.get_notebook(notebook_id).await.unwrap().unwrap();
    let response = server.get("/api/cards").add_query_param("q", &pos).await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let cards = body["cards"].as_array().unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0]["english"], "give up");
    assert_eq!(cards[0]["part_of_speech"], pos.as_str());
    assert_eq!(cards[0]["notebook_name"], notebook.name.as_str());

    ctx.cleanup().await;
}

/// Test updating and deleting a card.
#[tokio::test]
#[ignore = "requires database"]
async fn test_update_and_delete_card() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let notebook_id = ctx.create_notebook("edit").await;
    let ids = ctx.create_cards(notebook_id, &["colour"]).await;

    let response = server
        .put(&format!("/api/cards/{}", ids[0]))
        .json(&serde_json::json!({ "english": "color" }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["english"], "color");

    let response = server.delete(&format!("/api/cards/{}", ids[0])).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["deleted"], true);

    ctx.cleanup().await;
}
