//! Root endpoint over a real socket.

use greeting_service::config::ServiceConfig;
use greeting_service::http::{GREETING, X_REQUEST_ID};
use reqwest::StatusCode;
use serde_json::{json, Value};

mod common;

#[tokio::test]
async fn root_returns_greeting_on_every_call() {
    let server = common::start_server(ServiceConfig::default(), None).await;
    let client = reqwest::Client::builder().no_proxy().build().unwrap();

    for _ in 0..25 {
        let res = client.get(server.url("/")).send().await.expect("server unreachable");
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key(X_REQUEST_ID));

        let body: Value = res.json().await.unwrap();
        assert_eq!(body, json!({ "message": GREETING }));
        assert_eq!(body, json!({ "message": "Hello from FastAPI" }));
    }

    server.stop().await;
}

#[tokio::test]
async fn concurrent_requests_all_succeed() {
    let server = common::start_server(ServiceConfig::default(), None).await;
    let client = reqwest::Client::builder().no_proxy().build().unwrap();

    let mut tasks = Vec::new();
    for _ in 0..20 {
        let client = client.clone();
        let url = server.url("/");
        tasks.push(tokio::spawn(async move {
            let res = client.get(url).send().await.unwrap();
            (res.status(), res.text().await.unwrap())
        }));
    }

    for task in tasks {
        let (status, body) = task.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"message":"Hello from FastAPI"}"#);
    }

    server.stop().await;
}

#[tokio::test]
async fn server_stops_on_shutdown() {
    let server = common::start_server(ServiceConfig::default(), None).await;
    let addr = server.addr;
    server.stop().await;

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    assert!(client.get(format!("http://{addr}/")).send().await.is_err());
}
