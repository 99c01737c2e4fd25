//! Records reach the collector as NDJSON.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use greeting_service::config::{LogFormat, Profile, ServiceConfig};
use greeting_service::http::HttpServer;
use greeting_service::lifecycle::Shutdown;
use greeting_service::observability::{build_subscriber, forward};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tower::ServiceExt;
use tracing_subscriber::EnvFilter;

#[tokio::test]
async fn each_request_ships_one_json_record() {
    let collector = TcpListener::bind("127.0.0.1:0").await.unwrap();

    let mut config = ServiceConfig::default();
    config.apply_profile(Profile::Backend);
    config.logging.forward.address = collector.local_addr().unwrap().to_string();
    assert_eq!(config.logging.format, LogFormat::Json);

    let (writer, task) = forward::connect(&config.logging.forward).await.unwrap();
    let (socket, _) = collector.accept().await.unwrap();

    let flush = Shutdown::new();
    let forwarder = tokio::spawn(task.run(flush.subscribe()));

    let subscriber = build_subscriber(config.logging.format, EnvFilter::new("info"), writer);
    let _guard = tracing::subscriber::set_default(subscriber);

    let app = HttpServer::new(config, None).router();
    for _ in 0..2 {
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    let mut lines = BufReader::new(socket).lines();
    for _ in 0..2 {
        let line = lines.next_line().await.unwrap().expect("collector closed early");
        let record: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(record["message"], "Received request at /");
        assert_eq!(record["levelname"], "INFO");
        assert!(record["asctime"].is_string(), "{record}");
    }

    flush.trigger();
    forwarder.await.unwrap();
    assert_eq!(lines.next_line().await.unwrap(), None);
}

#[tokio::test]
async fn unreachable_collector_fails_at_startup() {
    let address = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().to_string()
    };

    let mut config = ServiceConfig::default();
    config.apply_profile(Profile::Backend);
    config.logging.forward.address = address;

    let err = greeting_service::lifecycle::startup::run(config)
        .await
        .unwrap_err();
    assert!(
        matches!(err, greeting_service::ServiceError::Forward(_)),
        "{err}"
    );
}
