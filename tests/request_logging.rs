//! One log record per request.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use greeting_service::config::{LogFormat, ServiceConfig};
use greeting_service::http::HttpServer;
use greeting_service::observability::build_subscriber;
use tower::ServiceExt;
use tracing_subscriber::EnvFilter;

mod common;

const RECORD: &str = "Received request at /";

#[tokio::test]
async fn exactly_one_record_per_request() {
    let capture = common::Capture::default();
    let subscriber = build_subscriber(LogFormat::Plain, EnvFilter::new("info"), capture.clone());
    let _guard = tracing::subscriber::set_default(subscriber);

    let app = HttpServer::new(ServiceConfig::default(), None).router();
    for _ in 0..4 {
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    let lines = capture.lines();
    assert_eq!(lines.len(), 4, "{lines:#?}");
    for line in &lines {
        assert!(line.ends_with(&format!(" - INFO - {RECORD}")), "{line}");
    }
}

#[tokio::test]
async fn other_paths_do_not_log_the_record() {
    let capture = common::Capture::default();
    let subscriber = build_subscriber(LogFormat::Json, EnvFilter::new("info"), capture.clone());
    let _guard = tracing::subscriber::set_default(subscriber);

    let app = HttpServer::new(ServiceConfig::default(), None).router();
    let req = Request::builder().uri("/elsewhere").body(Body::empty()).unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    assert!(capture.lines().iter().all(|line| !line.contains(RECORD)));
}
