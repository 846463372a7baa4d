//! End-to-end relay scenarios against a real server and real WebSocket clients.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use futures::{SinkExt, StreamExt};
use relay::Manager;
use service::config::Config;
use service::AppState;
use tokio::net::TcpListener;
use tokio::time::{sleep, timeout, Instant};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

const TIMEOUT: Duration = Duration::from_secs(5);

type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

struct TestServer {
    base_url: String,
    ws_url: String,
    manager: Arc<Manager>,
}

/// Boot a relay on an ephemeral port with both broadcast loops running.
async fn boot_server() -> TestServer {
    let config = Config::try_parse_from(["fanout_relay", "--disable-poller"]).unwrap();
    let (manager, broadcasters) = Manager::new();
    let manager = Arc::new(manager);
    broadcasters.spawn();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app_state = AppState::new(config, &manager);
    tokio::spawn(web::serve(listener, app_state));

    TestServer {
        base_url: format!("http://{addr}"),
        ws_url: format!("ws://{addr}/ws"),
        manager,
    }
}

async fn wait_for_clients(manager: &Manager, expected: usize) {
    let deadline = Instant::now() + TIMEOUT;
    while manager.connection_count() != expected {
        assert!(
            Instant::now() < deadline,
            "expected {expected} client(s), have {}",
            manager.connection_count()
        );
        sleep(Duration::from_millis(10)).await;
    }
}

async fn connect(server: &TestServer) -> WsStream {
    let (ws, _) = connect_async(server.ws_url.as_str()).await.unwrap();
    ws
}

async fn post_record(server: &TestServer, body: &'static str) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{}/req", server.base_url))
        .body(body)
        .send()
        .await
        .unwrap()
}

async fn next_text(ws: &mut WsStream) -> String {
    loop {
        match timeout(TIMEOUT, ws.next()).await {
            Ok(Some(Ok(Message::Text(text)))) => return text,
            Ok(Some(Ok(Message::Ping(_) | Message::Pong(_)))) => continue,
            other => panic!("expected a text frame, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn every_connected_client_receives_a_submitted_record() {
    let server = boot_server().await;
    let mut first = connect(&server).await;
    let mut second = connect(&server).await;
    wait_for_clients(&server.manager, 2).await;

    let response = post_record(&server, r#"{"name":"alice","age":"30"}"#).await;

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "");
    assert_eq!(next_text(&mut first).await, r#"{"name":"alice","age":"30"}"#);
    assert_eq!(next_text(&mut second).await, r#"{"name":"alice","age":"30"}"#);
}

#[tokio::test]
async fn a_departed_client_is_unregistered_and_submissions_still_succeed() {
    let server = boot_server().await;
    let mut ws = connect(&server).await;
    wait_for_clients(&server.manager, 1).await;

    ws.close(None).await.unwrap();
    wait_for_clients(&server.manager, 0).await;

    let response = post_record(&server, r#"{"name":"bob","age":"41"}"#).await;

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(server.manager.connection_count(), 0);
}

#[tokio::test]
async fn records_arrive_in_submission_order() {
    let server = boot_server().await;
    let mut ws = connect(&server).await;
    wait_for_clients(&server.manager, 1).await;

    post_record(&server, r#"{"name":"r1","age":"1"}"#).await;
    post_record(&server, r#"{"name":"r2","age":"2"}"#).await;

    assert_eq!(next_text(&mut ws).await, r#"{"name":"r1","age":"1"}"#);
    assert_eq!(next_text(&mut ws).await, r#"{"name":"r2","age":"2"}"#);
}

#[tokio::test]
async fn a_malformed_submission_is_rejected_without_a_broadcast() {
    let server = boot_server().await;
    let mut ws = connect(&server).await;
    wait_for_clients(&server.manager, 1).await;

    for body in [r#"{"name":"alice","age":30}"#, r#"["alice","30"]"#] {
        let response = post_record(&server, body).await;
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    }

    // The next frame must be the following valid record, not the rejected one.
    post_record(&server, r#"{"name":"carol","age":"25"}"#).await;
    assert_eq!(next_text(&mut ws).await, r#"{"name":"carol","age":"25"}"#);
}

#[tokio::test]
async fn a_record_with_missing_fields_is_broadcast_with_empty_strings() {
    let server = boot_server().await;
    let mut ws = connect(&server).await;
    wait_for_clients(&server.manager, 1).await;

    post_record(&server, r#"{"name":"dave"}"#).await;

    assert_eq!(next_text(&mut ws).await, r#"{"name":"dave","age":""}"#);
}
