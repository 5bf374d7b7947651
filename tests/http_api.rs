use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use quill::model::{DraftPost, HttpApi, Model, PostRecord, PostsApi, WriteOutcome};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn record(id: u64) -> PostRecord {
    PostRecord {
        id,
        user_id: 1,
        title: format!("post {id}"),
        body: "body".to_string(),
    }
}

#[tokio::test]
async fn list_decodes_the_posts_collection() {
    init_logs();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "userId": 1, "title": "post 1", "body": "body" },
            { "id": 2, "userId": 3, "title": "post 2", "body": "body" }
        ])))
        .mount(&server)
        .await;

    let api = HttpApi::new(server.uri());
    let posts = api.list().await.expect("list");
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0], record(1));
    assert_eq!(posts[1].user_id, 3);
}

#[tokio::test]
async fn list_surfaces_server_errors() {
    init_logs();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let api = HttpApi::new(server.uri());
    let error = api.list().await.expect_err("should fail");
    assert!(error.contains("list_posts"));
}

#[tokio::test]
async fn create_posts_the_draft_and_decodes_the_echo() {
    init_logs();
    let server = MockServer::start().await;
    let draft = DraftPost {
        title: "new".to_string(),
        body: "post".to_string(),
        user_id: 4,
    };
    Mock::given(method("POST"))
        .and(path("/posts"))
        .and(body_json(json!({ "title": "new", "body": "post", "userId": 4 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!(
            { "id": 101, "userId": 4, "title": "new", "body": "post" }
        )))
        .mount(&server)
        .await;

    let api = HttpApi::new(server.uri());
    let echo = api.create(&draft).await.expect("create");
    assert_eq!(echo.id, 101);
    assert_eq!(echo.user_id, 4);
}

#[tokio::test]
async fn update_puts_the_record_by_id() {
    init_logs();
    let server = MockServer::start().await;
    let rec = record(7);
    Mock::given(method("PUT"))
        .and(path("/posts/7"))
        .and(body_json(json!(
            { "id": 7, "userId": 1, "title": "post 7", "body": "body" }
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(
            { "id": 7, "userId": 1, "title": "post 7", "body": "body" }
        )))
        .mount(&server)
        .await;

    let api = HttpApi::new(server.uri());
    let echo = api.update(&rec).await.expect("update");
    assert_eq!(echo, rec);
}

#[tokio::test]
async fn delete_with_200_resolves_done() {
    init_logs();
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/posts/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let model = Model::new(Arc::new(HttpApi::new(server.uri())));
    assert_eq!(model.delete_post(7).await, WriteOutcome::Done(7));
}

#[tokio::test]
async fn delete_with_other_codes_resolves_rejected() {
    init_logs();
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/posts/7"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let model = Model::new(Arc::new(HttpApi::new(server.uri())));
    match model.delete_post(7).await {
        WriteOutcome::Rejected(description) => assert!(description.starts_with("500:")),
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn an_unreachable_server_resolves_failed() {
    init_logs();
    // nothing listens on port 1
    let model = Model::new(Arc::new(HttpApi::new("http://127.0.0.1:1")));

    assert!(model.posts().await.is_err());
    assert!(matches!(
        model.update_post(&record(1)).await,
        WriteOutcome::Failed(_)
    ));
    assert!(matches!(
        model.delete_post(1).await,
        WriteOutcome::Failed(_)
    ));
}
