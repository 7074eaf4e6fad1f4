//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use payout_signer::ledger::{Amount, Asset, EnvelopeCodec, Memo, Operation, ParsedTransaction, Payment, Transaction, TransactionCodec};

/// RFC 8032 test key 1.
#[allow(dead_code)]
pub const WALLET_SECRET: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";

/// Start a programmable mock ledger on an ephemeral port.
///
/// `f` receives the request body of each call and returns the status and
/// JSON body to answer with.
#[allow(dead_code)]
pub async fn start_mock_ledger<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let Some(body) = read_request_body(&mut socket).await else {
                            return;
                        };
                        let (status, body) = f(body).await;
                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            504 => "504 Gateway Timeout",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Read one HTTP/1.1 request and return its body.
async fn read_request_body(socket: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Some(String::from_utf8_lossy(&buf[header_end..]).into_owned())
}

/// Extract the `tx` field from a form-encoded submission body.
#[allow(dead_code)]
pub fn submitted_envelope(body: &str) -> Option<String> {
    url::form_urlencoded::parse(body.as_bytes())
        .find(|(key, _)| key == "tx")
        .map(|(_, value)| value.into_owned())
}

/// An address nothing is listening on.
#[allow(dead_code)]
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// A valid payout to `destination`.
#[allow(dead_code)]
pub fn payout(destination: &str, memo_byte: u8, sequence_number: i64) -> ParsedTransaction {
    ParsedTransaction::new(Transaction {
        source_account: "GPAYOUTSOURCE".into(),
        fee: 100,
        sequence_number,
        memo: Memo::Hash([memo_byte; 32]),
        operations: vec![Operation::Payment(Payment {
            destination: destination.into(),
            asset: Asset::Native,
            amount: Amount::from_stroops(10_000_000),
        })],
    })
}

#[allow(dead_code)]
pub fn envelope(tx: &ParsedTransaction) -> String {
    EnvelopeCodec.encode(tx).unwrap()
}
