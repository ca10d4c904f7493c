//! End-to-end tests: a real server on an ephemeral port, driven with reqwest.

use std::sync::Arc;

use postboard::Server;
use postboard::middleware::Cors;
use postboard::posts::{Post, PostStore};
use reqwest::StatusCode;
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// Bind to port 0 and return the base URL.
async fn start_server(store: PostStore, cors: Cors) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let server = Server::from_listener(listener).cors(cors);
    let addr = server.local_addr().unwrap();
    let app = postboard::app(Arc::new(store));
    tokio::spawn(async move {
        server.serve_with_shutdown(app, std::future::pending()).await.unwrap();
    });
    format!("http://{addr}")
}

async fn seeded() -> String {
    start_server(PostStore::seeded(), Cors::permissive()).await
}

async fn get_json(url: &str) -> (StatusCode, Value) {
    let resp = reqwest::get(url).await.unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

fn titles(body: &Value) -> Vec<&str> {
    body.as_array().unwrap().iter().map(|p| p["title"].as_str().unwrap()).collect()
}

#[tokio::test]
async fn lists_seed_posts_in_insertion_order() {
    let base = seeded().await;
    let (status, body) = get_json(&format!("{base}/api/posts")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            { "id": 1, "title": "First post", "content": "This is the first post." },
            { "id": 2, "title": "Second post", "content": "This is the second post." },
        ])
    );
}

#[tokio::test]
async fn sorting_persists_across_requests() {
    let base = seeded().await;

    let (status, body) = get_json(&format!("{base}/api/posts?sort=title&direction=desc")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), ["Second post", "First post"]);

    let (_, body) = get_json(&format!("{base}/api/posts")).await;
    assert_eq!(titles(&body), ["Second post", "First post"]);

    let (_, body) = get_json(&format!("{base}/api/posts?sort=content")).await;
    assert_eq!(titles(&body), ["First post", "Second post"]);
}

#[tokio::test]
async fn rejects_invalid_sort_parameters() {
    let base = seeded().await;

    let (status, body) = get_json(&format!("{base}/api/posts?sort=id&direction=up")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid sort field. Use 'title' or 'content'." }));

    let (status, body) = get_json(&format!("{base}/api/posts?direction=up")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid sort direction. Use 'asc' or 'desc'." }));

    // direction alone is accepted and ignored
    let (status, body) = get_json(&format!("{base}/api/posts?direction=desc")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), ["First post", "Second post"]);
}

#[tokio::test]
async fn created_post_appears_in_listing() {
    let base = seeded().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/posts"))
        .json(&json!({ "title": "T", "content": "C", "author": "ada", "id": 77 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.unwrap();
    assert_eq!(created, json!({ "id": 3, "title": "T", "content": "C", "author": "ada" }));

    let (_, body) = get_json(&format!("{base}/api/posts")).await;
    let posts: Vec<Post> = serde_json::from_value(body).unwrap();
    assert_eq!(posts.len(), 3);
    assert_eq!(serde_json::to_value(&posts[2]).unwrap(), created);
}

#[tokio::test]
async fn create_lists_every_missing_field() {
    let base = seeded().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/posts"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Missing fields: title, content" }));
}

#[tokio::test]
async fn malformed_json_is_a_client_error() {
    let base = seeded().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/posts"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));

    let resp = client
        .put(format!("{base}/api/posts/1"))
        .json(&json!(["title"]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_on_empty_collection_starts_at_one() {
    let base = start_server(PostStore::new(), Cors::permissive()).await;
    let resp = reqwest::Client::new()
        .post(format!("{base}/api/posts"))
        .json(&json!({ "title": "T", "content": "C" }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["id"], 1);
}

#[tokio::test]
async fn delete_removes_exactly_one_post() {
    let base = seeded().await;
    let client = reqwest::Client::new();

    let resp = client.delete(format!("{base}/api/posts/1")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "message": "Post with id 1 has been deleted successfully." }));

    let (_, body) = get_json(&format!("{base}/api/posts")).await;
    assert_eq!(titles(&body), ["Second post"]);
}

#[tokio::test]
async fn delete_unknown_id_is_not_found() {
    let base = seeded().await;
    let client = reqwest::Client::new();

    let resp = client.delete(format!("{base}/api/posts/9999")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Post with id 9999 is not found." }));

    let (_, body) = get_json(&format!("{base}/api/posts")).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let resp = client.delete(format!("{base}/api/posts/abc")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_changes_only_given_fields() {
    let base = seeded().await;
    let client = reqwest::Client::new();

    let resp = client
        .put(format!("{base}/api/posts/1"))
        .json(&json!({ "content": "new text", "id": 50 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "id": 1, "title": "First post", "content": "new text" }));

    let (_, body) = get_json(&format!("{base}/api/posts")).await;
    assert_eq!(body[0], json!({ "id": 1, "title": "First post", "content": "new text" }));
}

#[tokio::test]
async fn update_unknown_id_is_not_found() {
    let base = seeded().await;
    let resp = reqwest::Client::new()
        .put(format!("{base}/api/posts/42"))
        .json(&json!({ "title": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Post with id 42 not found." }));
}

#[tokio::test]
async fn search_matches_case_insensitive_substrings() {
    let base = seeded().await;

    let (status, body) = get_json(&format!("{base}/api/posts/search?title=FIRST")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), ["First post"]);

    let (_, body) = get_json(&format!("{base}/api/posts/search")).await;
    assert_eq!(titles(&body), ["First post", "Second post"]);

    let (_, body) = get_json(&format!("{base}/api/posts/search?title=post&content=second")).await;
    assert_eq!(titles(&body), ["Second post"]);

    let (status, body) = get_json(&format!("{base}/api/posts/search?content=nothing%20here")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn unknown_routes_and_methods() {
    let base = seeded().await;
    let client = reqwest::Client::new();

    let (status, body) = get_json(&format!("{base}/api/users")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Not found" }));

    let resp = client.patch(format!("{base}/api/posts/1")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(resp.headers()["allow"], "DELETE, PUT");
}

#[tokio::test]
async fn every_response_allows_any_origin() {
    let base = seeded().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{base}/api/posts"))
        .header("origin", "https://frontend.example")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");

    let resp = client.delete(format!("{base}/api/posts/9999")).send().await.unwrap();
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn answers_preflight_requests() {
    let base = seeded().await;
    let resp = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("{base}/api/posts/1"))
        .header("origin", "https://frontend.example")
        .header("access-control-request-method", "PUT")
        .header("access-control-request-headers", "content-type")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    assert_eq!(resp.headers()["access-control-allow-methods"], "GET, POST, PUT, DELETE, OPTIONS");
    assert_eq!(resp.headers()["access-control-allow-headers"], "content-type");
}

#[tokio::test]
async fn origin_list_only_echoes_known_origins() {
    let base = start_server(PostStore::seeded(), Cors::from_list("https://a.example")).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{base}/api/posts"))
        .header("origin", "https://a.example")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["access-control-allow-origin"], "https://a.example");

    let resp = client
        .get(format!("{base}/api/posts"))
        .header("origin", "https://b.example")
        .send()
        .await
        .unwrap();
    assert!(resp.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn health_probes() {
    let base = seeded().await;
    let (status, body) = get_json(&format!("{base}/healthz")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));

    let (_, body) = get_json(&format!("{base}/readyz")).await;
    assert_eq!(body, json!({ "status": "ready" }));
}

#[tokio::test]
async fn shuts_down_when_signalled() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let server = Server::from_listener(listener);
    let handle = tokio::spawn(async move {
        server
            .serve_with_shutdown(postboard::app(Arc::new(PostStore::seeded())), async {
                let _ = rx.await;
            })
            .await
    });
    tx.send(()).unwrap();
    assert!(handle.await.unwrap().is_ok());
}

#[tokio::test]
async fn shutdown_closes_idle_keep_alive_connections() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let server = Server::from_listener(listener);
    let base = format!("http://{}", server.local_addr().unwrap());
    let handle = tokio::spawn(async move {
        server
            .serve_with_shutdown(postboard::app(Arc::new(PostStore::seeded())), async {
                let _ = rx.await;
            })
            .await
    });

    // The client keeps its pooled connection open after the response.
    let client = reqwest::Client::new();
    let resp = client.get(format!("{base}/api/posts")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    resp.bytes().await.unwrap();

    tx.send(()).unwrap();
    let stopped = tokio::time::timeout(std::time::Duration::from_secs(5), handle).await;
    assert!(stopped.expect("server still running with an idle connection open").unwrap().is_ok());
    drop(client);
}

#[tokio::test]
async fn signed_ids_do_not_match_a_post() {
    let base = seeded().await;
    let client = reqwest::Client::new();

    let resp = client.delete(format!("{base}/api/posts/+1")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client
        .put(format!("{base}/api/posts/+2"))
        .json(&json!({ "title": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let (_, body) = get_json(&format!("{base}/api/posts")).await;
    assert_eq!(titles(&body), ["First post", "Second post"]);
}

#[tokio::test]
async fn search_path_only_allows_get() {
    let base = seeded().await;
    let client = reqwest::Client::new();

    let resp = client.delete(format!("{base}/api/posts/search")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(resp.headers()["allow"], "GET");

    let resp = client
        .put(format!("{base}/api/posts/search"))
        .json(&json!({ "title": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}
