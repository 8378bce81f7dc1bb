//! End-to-end tests: HTTP request in, SMTP conversation with a local stub relay out.

#![allow(clippy::unwrap_used)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum_test::TestServer;
use contactline::http::errors::ErrorResponse;
use contactline::http::handlers::{EMAIL_SENT, NOTIFICATION_DISABLED, SuccessResponse};
use contactline::{AppState, CredentialSource, router};
use contactline_smtp::{Credentials, Mailer, PlainConnector, RelayConfig};
use serde_json::json;
use testresult::TestResult;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Behavior {
    Accept,
    Unavailable,
    RejectAuth,
}

/// A relay on localhost that follows a fixed script.
struct StubRelay {
    address: SocketAddr,
    connections: Arc<AtomicUsize>,
    received: Arc<Mutex<String>>,
}

impl StubRelay {
    async fn start(behavior: Behavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let connections = Arc::new(AtomicUsize::new(0));
        let received = Arc::new(Mutex::new(String::new()));

        let counter = Arc::clone(&connections);
        let log = Arc::clone(&received);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                let log = Arc::clone(&log);
                tokio::spawn(async move {
                    let _ = converse(stream, behavior, log).await;
                });
            }
        });

        Self {
            address,
            connections,
            received,
        }
    }

    fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    fn received(&self) -> String {
        self.received.lock().unwrap().clone()
    }

    fn state(&self, credentials: Option<Credentials>) -> AppState<PlainConnector> {
        let relay = RelayConfig::new(self.address.ip().to_string(), self.address.port());
        AppState::new(
            Mailer::new(PlainConnector, relay),
            CredentialSource::Static(credentials),
            "Portfolio Contact Form",
        )
    }
}

async fn converse(
    stream: TcpStream,
    behavior: Behavior,
    log: Arc<Mutex<String>>,
) -> std::io::Result<()> {
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();

    if behavior == Behavior::Unavailable {
        write.write_all(b"421 Service unavailable\r\n").await?;
        return write.shutdown().await;
    }
    write.write_all(b"220 stub.relay ESMTP ready\r\n").await?;

    let mut auth_lines = 0;
    while let Some(line) = lines.next_line().await? {
        log.lock().unwrap().push_str(&format!("{line}\r\n"));

        let reply = if auth_lines > 0 {
            auth_lines -= 1;
            match (auth_lines, behavior) {
                (1, _) => "334 UGFzc3dvcmQ6",
                (_, Behavior::RejectAuth) => "535 5.7.8 Authentication failed",
                _ => "235 2.7.0 Accepted",
            }
        } else if line.starts_with("EHLO ") {
            "250-stub.relay\r\n250 AUTH LOGIN PLAIN"
        } else if line == "AUTH LOGIN" {
            auth_lines = 2;
            "334 VXNlcm5hbWU6"
        } else if line.starts_with("MAIL FROM:") || line.starts_with("RCPT TO:") {
            "250 2.1.0 OK"
        } else if line == "DATA" {
            write.write_all(b"354 Go ahead\r\n").await?;
            while let Some(data) = lines.next_line().await? {
                log.lock().unwrap().push_str(&format!("{data}\r\n"));
                if data == "." {
                    break;
                }
            }
            "250 2.0.0 OK queued"
        } else if line == "QUIT" {
            write.write_all(b"221 2.0.0 Bye\r\n").await?;
            return write.shutdown().await;
        } else {
            "500 5.5.2 Unrecognized command"
        };

        write.write_all(format!("{reply}\r\n").as_bytes()).await?;
    }

    Ok(())
}

fn credentials() -> Option<Credentials> {
    Some(Credentials::new("studio.bot@example.com", "app-password"))
}

fn submission() -> serde_json::Value {
    json!({
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "phone": "+44 20 7946 0958",
        "message": "Hello\n.\nAre you free in May?",
        "recipientEmail": "studio@example.com",
    })
}

#[tokio::test]
async fn test_notification_sent() -> TestResult {
    let relay = StubRelay::start(Behavior::Accept).await;

    let response = TestServer::new(router(relay.state(credentials())))?
        .post("/send-contact-email")
        .json(&submission())
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let json = response.json::<SuccessResponse>();
    assert!(json.success);
    assert_eq!(json.message, EMAIL_SENT);
    assert_eq!(relay.connections(), 1);

    let received = relay.received();
    let order = [
        "EHLO ",
        "AUTH LOGIN\r\n",
        "MAIL FROM:<studio.bot@example.com>\r\n",
        "RCPT TO:<studio@example.com>\r\n",
        "DATA\r\n",
        "Subject: New Contact Form Message from Ada Lovelace\r\n",
        "From: Ada Lovelace\r\n",
        "Phone: +44 20 7946 0958\r\n",
        "\r\n..\r\n",
        "\r\n.\r\n",
        "QUIT\r\n",
    ];
    let mut cursor = 0;
    for needle in order {
        let found = received[cursor..]
            .find(needle)
            .unwrap_or_else(|| panic!("{needle:?} missing after byte {cursor} in {received:?}"));
        cursor += found + needle.len();
    }
    assert!(received.contains("From: Portfolio Contact Form <studio.bot@example.com>\r\n"));
    assert!(received.contains("Reply-To: ada@example.com\r\n"));

    Ok(())
}

#[tokio::test]
async fn test_notification_disabled_without_credentials() -> TestResult {
    let relay = StubRelay::start(Behavior::Accept).await;

    let response = TestServer::new(router(relay.state(None)))?
        .post("/")
        .json(&submission())
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let json = response.json::<SuccessResponse>();
    assert!(json.success);
    assert_eq!(json.message, NOTIFICATION_DISABLED);
    assert_eq!(relay.connections(), 0);

    Ok(())
}

#[tokio::test]
async fn test_missing_message_is_rejected_before_relay() -> TestResult {
    let relay = StubRelay::start(Behavior::Accept).await;
    let mut body = submission();
    body.as_object_mut().unwrap().remove("message");

    let response = TestServer::new(router(relay.state(credentials())))?
        .post("/")
        .json(&body)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<ErrorResponse>().error,
        "Missing required fields"
    );
    assert_eq!(relay.connections(), 0);

    Ok(())
}

#[tokio::test]
async fn test_unavailable_relay() -> TestResult {
    let relay = StubRelay::start(Behavior::Unavailable).await;

    let response = TestServer::new(router(relay.state(credentials())))?
        .post("/")
        .json(&submission())
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let error = response.json::<ErrorResponse>().error;
    assert!(error.contains("421 Service unavailable"), "{error}");
    assert_eq!(relay.connections(), 1);
    assert!(relay.received().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_rejected_credentials() -> TestResult {
    let relay = StubRelay::start(Behavior::RejectAuth).await;

    let response = TestServer::new(router(relay.state(credentials())))?
        .post("/")
        .json(&submission())
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<ErrorResponse>().error,
        "SMTP AUTH failed: 535 5.7.8 Authentication failed"
    );
    assert!(!relay.received().contains("MAIL FROM"));

    Ok(())
}
