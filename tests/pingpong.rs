//! Ping/pong exchange between live servers.

use serde_json::{json, Value};

use pingpong_service::config::Settings;

mod common;

#[tokio::test]
async fn test_ping_round_trip_shares_trace() {
    let server = common::TestServer::start(Settings::default()).await;

    let response = reqwest::Client::new()
        .post(server.url("/api/v1/ping"))
        .header("traceparent", common::traceparent())
        .json(&json!({"url": server.base_url()}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"success": true, "response_message": "Pong"}));

    let records = server.records();
    let correlated: Vec<&Value> = records
        .iter()
        .filter(|r| r.get("req_method").is_some() || r.get("ping_message").is_some())
        .collect();
    // started/completed for /ping and /pong, plus the handler records.
    assert!(correlated.len() >= 6);
    for record in correlated {
        assert_eq!(record["trace_id"], common::TRACE_ID, "{record}");
    }

    let received = common::with_message(&records, "Received response from remote service");
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["status_code"], 200);
    assert_eq!(received[0]["trace_id"], common::TRACE_ID);
}

#[tokio::test]
async fn test_ping_with_wrong_message_is_not_success() {
    let server = common::TestServer::start(Settings::default()).await;

    let body: Value = reqwest::Client::new()
        .post(server.url("/api/v1/ping"))
        .json(&json!({"url": server.base_url(), "message": "Hello"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["success"], false);
    assert_eq!(
        body["response_message"],
        "Message must be \"Ping\" to receive \"Pong\" response"
    );

    let records = server.records();
    assert_eq!(
        common::with_message(&records, "Invalid ping message received").len(),
        1
    );
    let warned = common::with_message(&records, "Unexpected response message from remote service");
    assert_eq!(warned.len(), 1);
    assert_eq!(warned[0]["level"], "WARNING");
}

#[tokio::test]
async fn test_ping_unreachable_peer() {
    let server = common::TestServer::start(Settings::default()).await;

    let body: Value = reqwest::Client::new()
        .post(server.url("/api/v1/ping"))
        .json(&json!({"url": "http://127.0.0.1:1"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body, json!({"success": false, "response_message": null}));

    let records = server.records();
    let errors = common::with_message(&records, "Request error when sending ping");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["level"], "ERROR");
    assert!(errors[0]["err"].as_str().is_some());
}

#[tokio::test]
async fn test_ping_peer_http_error() {
    let server = common::TestServer::start(Settings::default()).await;

    // The peer's /api/v1/pong path does not exist under this prefix.
    let body: Value = reqwest::Client::new()
        .post(server.url("/api/v1/ping"))
        .json(&json!({"url": server.url("/missing")}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body, json!({"success": false, "response_message": null}));

    let records = server.records();
    let errors = common::with_message(&records, "HTTP error when sending ping");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["status_code"], 404);
}

#[tokio::test]
async fn test_pong_answers_ping_case_insensitively() {
    let server = common::TestServer::start(Settings::default()).await;
    let client = reqwest::Client::new();

    for (message, expected) in [
        ("Ping", "Pong"),
        ("  pInG ", "Pong"),
        ("pong", "Message must be \"Ping\" to receive \"Pong\" response"),
    ] {
        let body: Value = client
            .post(server.url("/api/v1/pong"))
            .json(&json!({"message": message}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["message"], expected, "{message}");
    }
}

#[tokio::test]
async fn test_request_id_echoed() {
    let server = common::TestServer::start(Settings::default()).await;

    let response = reqwest::Client::new()
        .get(server.url("/api/v1/health"))
        .header("x-request-id", "caller-supplied")
        .send()
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "caller-supplied");

    let response = reqwest::get(server.url("/api/v1/health")).await.unwrap();
    let generated = response.headers()["x-request-id"].to_str().unwrap();
    assert_eq!(generated.len(), 36);
}
