use super::*;
use crate::engine::test_helpers::{TestEngine, create_test_engine, links, start};
use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use serde_json::Value;
use tower::ServiceExt;


/// Send one request through a fresh clone of `app`, returning status and parsed body
///
/// An empty body parses as `Value::Null`.
async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

fn post_task() -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/task")
        .body(Body::empty())
        .unwrap()
}

fn patch_links(id: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("PATCH")
        .uri(format!("/task/{id}"))
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

fn links_body(links: &[String]) -> String {
    serde_json::json!({ "links": links }).to_string()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Router over an engine with fake collaborators; the dispatcher is not started
fn test_router(max_active_tasks: usize, max_links_per_task: usize) -> (Router, TestEngine) {
    let test = create_test_engine(max_active_tasks, max_links_per_task);
    (create_router(test.engine.clone()), test)
}

/// Create a task over HTTP and return its id
async fn create(app: &Router) -> String {
    let (status, json) = send(app, post_task()).await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn serve_api_stops_when_token_is_cancelled() {
    let test = create_test_engine(1, 1);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let shutdown = CancellationToken::new();

    let server = tokio::spawn(serve_api(
        listener,
        test.engine.clone(),
        Duration::from_secs(1),
        shutdown.clone(),
    ));

    let stream = tokio::net::TcpStream::connect(address).await;
    assert!(stream.is_ok(), "server should accept connections");
    drop(stream);

    shutdown.cancel();
    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server should stop after cancellation")
        .unwrap();
    assert!(result.is_ok(), "{result:?}");
}

#[tokio::test]
async fn start_api_server_fails_on_unbindable_address() {
    let test = create_test_engine(1, 1);
    let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let mut config = Config::default();
    config.server.address = taken.local_addr().unwrap().to_string();

    let result = start_api_server(test.engine, Arc::new(config), CancellationToken::new()).await;

    assert!(matches!(result, Err(crate::error::Error::Io(_))), "{result:?}");
}

#[tokio::test]
async fn unknown_route_is_404() {
    let (app, _test) = test_router(1, 1);

    let (status, _) = send(&app, get("/tasks")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn wrong_method_is_405() {
    let (app, _test) = test_router(1, 1);

    let request = Request::builder()
        .method("DELETE")
        .uri("/task/abc")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}
