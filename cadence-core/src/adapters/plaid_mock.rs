//! Mock Plaid API server for testing
//!
//! Serves the subset of the Plaid API used by `PlaidClient` over plain HTTP so
//! the real adapter can be exercised end to end:
//! - POST /transactions/get returns { total_transactions, transactions, request_id },
//!   honouring `options.offset` and a fixed page size
//! - POST /item/public_token/exchange returns { access_token, item_id, request_id }
//! - POST /item/remove returns { removed, request_id }

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use chrono::{Duration, NaiveDate};
use serde_json::{json, Value as JsonValue};

/// Mock Plaid server for testing
pub struct MockPlaidServer {
    port: u16,
    running: Arc<AtomicBool>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

/// A request body as received by the mock
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub body: JsonValue,
}

/// Configuration for mock behaviour
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Transactions served by /transactions/get, in delivery order
    pub transactions: Vec<JsonValue>,
    /// Maximum transactions per page
    pub page_size: usize,
    /// Respond to every request with this Plaid error (status, error_code)
    pub api_error: Option<(u16, String)>,
    /// Respond to /transactions/get with a 200 that is not valid JSON
    pub malformed: bool,
    /// Respond with a 500 and a non-JSON body
    pub server_error: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            transactions: generate_mock_transactions(10),
            page_size: 100,
            api_error: None,
            malformed: false,
            server_error: false,
        }
    }
}

impl MockPlaidServer {
    /// Start a new mock server on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let requests_clone = requests.clone();

        // Non-blocking so the accept loop can notice shutdown
        listener.set_nonblocking(true)?;

        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let _ = stream.set_nonblocking(false);
                        handle_connection(stream, &config, &requests_clone);
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(5));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            requests,
            thread_handle: Some(thread_handle),
        })
    }

    /// Get the base URL for this mock server
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Bodies received so far, in arrival order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockPlaidServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Read headers, then exactly Content-Length bytes of body
fn read_request(stream: &mut TcpStream) -> Option<(String, String, String)> {
    let mut data = Vec::new();
    let mut buffer = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buffer[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while data.len() < header_end + content_length {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..n]);
    }

    let mut parts = head.lines().next()?.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();
    let body = String::from_utf8_lossy(&data[header_end..]).to_string();
    Some((method, path, body))
}

fn handle_connection(
    mut stream: TcpStream,
    config: &MockConfig,
    requests: &Mutex<Vec<RecordedRequest>>,
) {
    let Some((method, path, body)) = read_request(&mut stream) else {
        return;
    };

    let body: JsonValue = serde_json::from_str(&body).unwrap_or(JsonValue::Null);
    if let Ok(mut recorded) = requests.lock() {
        recorded.push(RecordedRequest {
            path: path.clone(),
            body: body.clone(),
        });
    }

    if method != "POST" {
        send_response(&mut stream, 405, "Method Not Allowed", r#"{"error": "Method not allowed"}"#);
        return;
    }

    if config.server_error {
        send_response(&mut stream, 500, "Internal Server Error", "upstream exploded");
        return;
    }

    if let Some((status, code)) = &config.api_error {
        let error = json!({
            "error_type": "ITEM_ERROR",
            "error_code": code,
            "error_message": format!("mock error {}", code),
            "display_message": null,
            "request_id": "mock-request",
        });
        send_response(&mut stream, *status, "Bad Request", &error.to_string());
        return;
    }

    match path.as_str() {
        "/transactions/get" => {
            if config.malformed {
                send_response(&mut stream, 200, "OK", r#"{"total_transactions": "#);
                return;
            }
            let offset = body
                .pointer("/options/offset")
                .and_then(|v| v.as_u64())
                .unwrap_or(0) as usize;
            let start = offset.min(config.transactions.len());
            let end = (start + config.page_size).min(config.transactions.len());
            let response = json!({
                "accounts": [],
                "item": { "item_id": "mock-item" },
                "total_transactions": config.transactions.len(),
                "transactions": &config.transactions[start..end],
                "request_id": "mock-request",
            });
            send_response(&mut stream, 200, "OK", &response.to_string());
        }
        "/item/public_token/exchange" => {
            let public_token = body["public_token"].as_str().unwrap_or_default();
            let response = json!({
                "access_token": format!("access-sandbox-{}", public_token),
                "item_id": "mock-item",
                "request_id": "mock-request",
            });
            send_response(&mut stream, 200, "OK", &response.to_string());
        }
        "/item/remove" => {
            send_response(
                &mut stream,
                200,
                "OK",
                r#"{"removed": true, "request_id": "mock-request"}"#,
            );
        }
        _ => {
            send_response(&mut stream, 404, "Not Found", r#"{"error": "Endpoint not found"}"#);
        }
    }
}

fn send_response(stream: &mut TcpStream, status: u16, status_text: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

/// Monthly subscriptions plus one-off purchases, newest first
pub fn generate_mock_transactions(count: usize) -> Vec<JsonValue> {
    let merchants = [
        ("Netflix", 9.99),
        ("Tesco", 45.23),
        ("Spotify", 4.99),
        ("Shell", 52.00),
        ("Costa Coffee", 4.50),
    ];
    let newest = NaiveDate::from_ymd_opt(2018, 12, 28).unwrap_or_default();

    (0..count)
        .map(|i| {
            let (merchant, amount) = merchants[i % merchants.len()];
            let month = (i / merchants.len()) as i64;
            let date = newest - Duration::days(month * 30 + (i % merchants.len()) as i64);
            json!({
                "account_id": "mock-account",
                "amount": amount,
                "category": ["Service"],
                "date": date.format("%Y-%m-%d").to_string(),
                "iso_currency_code": "USD",
                "name": merchant,
                "pending": false,
                "transaction_id": format!("tx_{}", i + 1),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::plaid::PlaidClient;
    use crate::domain::AccessToken;
    use crate::ports::{ItemProvider, ProviderError, TransactionProvider};
    use crate::services::{PaginatedFetcher, RecurringClassifier, TransactionService};

    fn client(server: &MockPlaidServer) -> PlaidClient {
        PlaidClient::new_with_base_url("client_id", "secret", &server.base_url(), 5).unwrap()
    }

    fn dates() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2018, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2018, 12, 31).unwrap(),
        )
    }

    #[test]
    fn test_single_page_request_body() {
        let server = MockPlaidServer::start(MockConfig::default()).unwrap();
        let client = client(&server);
        let (start, end) = dates();

        let result = PaginatedFetcher::new(&client)
            .fetch_all(&AccessToken::new("access-sandbox-1"), start, end)
            .unwrap();

        assert_eq!(result.len(), 10);
        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, "/transactions/get");
        assert_eq!(requests[0].body["client_id"], "client_id");
        assert_eq!(requests[0].body["access_token"], "access-sandbox-1");
        assert_eq!(requests[0].body["start_date"], "2018-09-01");
        assert_eq!(requests[0].body["end_date"], "2018-12-31");
        assert!(requests[0].body.get("options").is_none());
    }

    #[test]
    fn test_pagination_offsets() {
        let server = MockPlaidServer::start(MockConfig {
            transactions: generate_mock_transactions(6),
            page_size: 3,
            ..Default::default()
        })
        .unwrap();
        let client = client(&server);
        let (start, end) = dates();

        let result = PaginatedFetcher::new(&client)
            .fetch_all(&AccessToken::new("tok"), start, end)
            .unwrap();

        assert_eq!(result.len(), 6);
        let requests = server.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].body["options"]["offset"], 3);

        let ids: Vec<_> = result
            .iter()
            .map(|t| t.extra("transaction_id").cloned().unwrap_or_default())
            .collect();
        let expected: Vec<_> = (1..=6).map(|i| json!(format!("tx_{}", i))).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_service_flags_monthly_subscriptions() {
        let server = MockPlaidServer::start(MockConfig {
            transactions: generate_mock_transactions(15),
            page_size: 4,
            ..Default::default()
        })
        .unwrap();
        let client = Arc::new(client(&server));
        let service = TransactionService::new(client.clone(), client, RecurringClassifier::default());
        let (start, end) = dates();

        let result = service.transactions(&AccessToken::new("tok"), start, end).unwrap();

        assert_eq!(result.len(), 15);
        // Every merchant appears three times, exactly 30 days apart, same amount
        assert!(result.iter().all(|t| t.recurring == Some(true)));
        let first = serde_json::to_value(&result[0]).unwrap();
        assert_eq!(first["recurring"], true);
        assert_eq!(first["iso_currency_code"], "USD");
    }

    #[test]
    fn test_api_error() {
        let server = MockPlaidServer::start(MockConfig {
            api_error: Some((400, "PRODUCT_NOT_READY".to_string())),
            ..Default::default()
        })
        .unwrap();
        let client = client(&server);
        let (start, end) = dates();

        let err = client
            .get_transactions(&crate::ports::TransactionQuery {
                access_token: &AccessToken::new("tok"),
                start_date: start,
                end_date: end,
                offset: None,
            })
            .unwrap_err();

        match err {
            ProviderError::Api { error_code, error_message, .. } => {
                assert_eq!(error_code, "PRODUCT_NOT_READY");
                assert_eq!(error_message, "mock error PRODUCT_NOT_READY");
            }
            other => panic!("expected api error, got {:?}", other),
        }
    }

    #[test]
    fn test_api_error_through_fetcher() {
        let server = MockPlaidServer::start(MockConfig {
            api_error: Some((400, "ITEM_LOGIN_REQUIRED".to_string())),
            ..Default::default()
        })
        .unwrap();
        let client = client(&server);
        let (start, end) = dates();

        let err = PaginatedFetcher::new(&client)
            .fetch_all(&AccessToken::new("tok"), start, end)
            .unwrap_err();

        assert_eq!(err.error_code.as_deref(), Some("ITEM_LOGIN_REQUIRED"));
        assert_eq!(
            err.error_message,
            "Received error from Plaid: mock error ITEM_LOGIN_REQUIRED"
        );
    }

    #[test]
    fn test_malformed_response_is_transport_error() {
        let server = MockPlaidServer::start(MockConfig {
            malformed: true,
            ..Default::default()
        })
        .unwrap();
        let client = client(&server);
        let (start, end) = dates();

        let err = PaginatedFetcher::new(&client)
            .fetch_all(&AccessToken::new("tok"), start, end)
            .unwrap_err();

        assert!(err.error_code.is_none());
        assert!(err.error_message.starts_with("Received error from Plaid: Malformed /transactions/get response"));
    }

    #[test]
    fn test_missing_transaction_field_is_transport_error() {
        let server = MockPlaidServer::start(MockConfig {
            transactions: vec![json!({ "name": "ACME", "amount": 1 })],
            ..Default::default()
        })
        .unwrap();
        let client = client(&server);
        let (start, end) = dates();

        let err = PaginatedFetcher::new(&client)
            .fetch_all(&AccessToken::new("tok"), start, end)
            .unwrap_err();

        assert!(err.error_code.is_none());
        assert!(err.error_message.contains("date"));
    }

    #[test]
    fn test_server_error_without_body_is_transport_error() {
        let server = MockPlaidServer::start(MockConfig {
            server_error: true,
            ..Default::default()
        })
        .unwrap();
        let client = client(&server);
        let (start, end) = dates();

        let err = PaginatedFetcher::new(&client)
            .fetch_all(&AccessToken::new("tok"), start, end)
            .unwrap_err();

        assert_eq!(err.error_code, None);
        assert_eq!(err.error_message, "Received error from Plaid: Plaid API error: HTTP 500");
    }

    #[test]
    fn test_connection_refused_is_transport_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = PlaidClient::new_with_base_url(
            "client_id",
            "secret",
            &format!("http://127.0.0.1:{}", port),
            2,
        )
        .unwrap();
        let (start, end) = dates();

        let err = PaginatedFetcher::new(&client)
            .fetch_all(&AccessToken::new("tok"), start, end)
            .unwrap_err();

        assert!(err.error_code.is_none());
        let prefix = "Received error from Plaid: Unable to connect to Plaid servers: ";
        assert!(err.error_message.starts_with(prefix), "{}", err.error_message);
        assert!(err.error_message.len() > prefix.len());
    }

    #[test]
    fn test_timeout_keeps_underlying_error() {
        // Accepts the connection but never answers
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let client = PlaidClient::new_with_base_url(
            "client_id",
            "secret",
            &format!("http://127.0.0.1:{}", port),
            1,
        )
        .unwrap();
        let (start, end) = dates();

        let err = PaginatedFetcher::new(&client)
            .fetch_all(&AccessToken::new("tok"), start, end)
            .unwrap_err();
        drop(listener);

        assert!(err.error_code.is_none());
        let prefix = "Received error from Plaid: Connection timed out after 1 seconds: ";
        assert!(err.error_message.starts_with(prefix), "{}", err.error_message);
        assert!(err.error_message.len() > prefix.len());
    }

    #[test]
    fn test_exchange_and_remove() {
        let server = MockPlaidServer::start(MockConfig::default()).unwrap();
        let client = client(&server);

        let exchange = client.exchange_public_token("public-1").unwrap();
        assert_eq!(exchange.access_token.as_str(), "access-sandbox-public-1");
        assert_eq!(exchange.item_id, "mock-item");

        let removal = client.remove_item(&exchange.access_token).unwrap();
        assert!(removal.removed);

        let requests = server.requests();
        assert_eq!(requests[0].path, "/item/public_token/exchange");
        assert_eq!(requests[0].body["public_token"], "public-1");
        assert_eq!(requests[0].body["secret"], "secret");
        assert_eq!(requests[1].path, "/item/remove");
        assert_eq!(requests[1].body["access_token"], "access-sandbox-public-1");
    }
}
