//! Integration tests for the Africa's Talking sender against a mock API.
//!
//! The provider answers 200/201 for requests that never reach a handset,
//! so these tests pin down how each response shape is classified.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use msgutils_notify::{AfricasTalkingCredentials, AfricasTalkingSender, NotifyError, SmsSender};

const RECEIVER: &str = "+254711000000";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn credentials() -> AfricasTalkingCredentials {
    AfricasTalkingCredentials {
        api_key: "test-api-key".to_string(),
        username: "sandbox".to_string(),
        sender_id: "ALERTS".to_string(),
    }
}

fn sender(server: &MockServer) -> AfricasTalkingSender {
    AfricasTalkingSender::new(credentials()).with_base_url(server.uri())
}

async fn respond_with(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/version1/messaging"))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn billed_send_succeeds() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/version1/messaging"))
        .and(header("apiKey", "test-api-key"))
        .and(header("content-type", "application/json"))
        .and(header("accept", "application/json"))
        .and(body_json(json!({
            "username": "sandbox",
            "to": RECEIVER,
            "message": "Your code is 1234",
            "from": "ALERTS",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "SMSMessageData": {"Message": "Sent to 1/1 Total Cost: KES 1.50"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    sender(&server)
        .send(Some("Your code is 1234"), RECEIVER)
        .await
        .expect("billed send should succeed");
}

#[tokio::test]
async fn zero_cost_response_is_logical_failure() {
    let server = MockServer::start().await;
    respond_with(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "SMSMessageData": {"Message": "Sent to 1/1 Total Cost: KES 0.00"}
        })),
    )
    .await;

    let err = sender(&server).send(Some("hello"), RECEIVER).await.unwrap_err();
    match err {
        NotifyError::NotDelivered { response, .. } => {
            assert_eq!(response, "Sent to 1/1 Total Cost: KES 0.00");
        }
        other => panic!("expected NotDelivered, got: {other:?}"),
    }
}

#[tokio::test]
async fn non_success_status_is_rejection_with_body() {
    let server = MockServer::start().await;
    respond_with(
        &server,
        ResponseTemplate::new(401).set_body_string("Invalid apiKey"),
    )
    .await;

    let err = sender(&server).send(Some("hello"), RECEIVER).await.unwrap_err();
    let msg = err.to_string();
    match err {
        NotifyError::Rejected { status, body, .. } => {
            assert_eq!(status, 401);
            assert_eq!(body, "Invalid apiKey");
        }
        other => panic!("expected Rejected, got: {other:?}"),
    }
    assert!(msg.contains("401") && msg.contains("Invalid apiKey"), "got: {msg}");
}

#[tokio::test]
async fn accepted_status_other_than_200_201_is_rejection() {
    let server = MockServer::start().await;
    respond_with(&server, ResponseTemplate::new(202).set_body_string("queued")).await;

    let err = sender(&server).send(Some("hello"), RECEIVER).await.unwrap_err();
    assert!(
        matches!(err, NotifyError::Rejected { status: 202, .. }),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn unparseable_success_body_is_ambiguous() {
    let server = MockServer::start().await;
    respond_with(
        &server,
        ResponseTemplate::new(200).set_body_string("<html>gateway</html>"),
    )
    .await;

    let err = sender(&server).send(Some("hello"), RECEIVER).await.unwrap_err();
    assert!(err.is_ambiguous(), "got: {err:?}");
    assert!(!matches!(err, NotifyError::NotDelivered { .. }));
}

#[tokio::test]
async fn missing_message_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let err = sender(&server).send(None, RECEIVER).await.unwrap_err();
    assert!(matches!(err, NotifyError::Validation(_)), "got: {err:?}");
    server.verify().await;
}

#[tokio::test]
async fn empty_sender_id_is_omitted_from_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/version1/messaging"))
        .and(body_json(json!({
            "username": "sandbox",
            "to": RECEIVER,
            "message": "hi",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "SMSMessageData": {"Message": "Sent to 1/1 Total Cost: KES 0.80"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let creds = AfricasTalkingCredentials {
        sender_id: String::new(),
        ..credentials()
    };
    AfricasTalkingSender::new(creds)
        .with_base_url(server.uri())
        .send(Some("hi"), RECEIVER)
        .await
        .expect("send without sender id");
}

#[tokio::test]
async fn identical_sends_are_not_deduplicated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/version1/messaging"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "SMSMessageData": {"Message": "Sent to 1/1 Total Cost: KES 0.80"}
        })))
        .expect(2)
        .mount(&server)
        .await;

    let sender = sender(&server);
    sender.send(Some("same"), RECEIVER).await.unwrap();
    sender.send(Some("same"), RECEIVER).await.unwrap();
}

#[tokio::test]
async fn connection_failure_is_transport_error() {
    let sender = AfricasTalkingSender::new(credentials()).with_base_url("http://127.0.0.1:1");
    let err = sender.send(Some("hello"), RECEIVER).await.unwrap_err();
    assert!(matches!(err, NotifyError::Http(_)), "got: {err:?}");
}
