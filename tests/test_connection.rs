use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

use trickle::config::Config;
use trickle::http::connection::{Connection, Outcome};
use trickle::http::parser::ParseError;

fn config(read_buffer_size: usize) -> Config {
    let mut cfg = Config::default();
    cfg.server.read_buffer_size = read_buffer_size;
    cfg
}

/// Sends `input`, runs the connection and returns what the client received.
async fn exchange(cfg: &Config, input: &[u8]) -> (Outcome, Vec<u8>) {
    let (mut client, server) = tokio::io::duplex(64 * 1024);
    client.write_all(input).await.unwrap();

    let mut conn = Connection::new(server, cfg);
    let outcome = conn.run().await.unwrap();
    drop(conn);

    (outcome, read_all(&mut client).await)
}

async fn read_all(client: &mut DuplexStream) -> Vec<u8> {
    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();
    out
}

#[tokio::test]
async fn test_echoes_headers_on_success() {
    let (outcome, out) = exchange(
        &config(1024),
        b"GET / HTTP/1.1\r\nHost: x\r\nAccept: */*\r\n\r\n",
    )
    .await;

    assert_eq!(outcome, Outcome::Echoed);
    assert_eq!(
        out,
        b"HTTP/1.1 200 OK\r\nContent-Length: 22\r\n\r\nHost: x\r\nAccept: */*\r\n".to_vec()
    );
}

#[tokio::test]
async fn test_byte_at_a_time_reads_give_same_response() {
    let input = b"POST /x HTTP/1.1\r\nContent-Length: 5\r\nX-A: 1\r\n\r\nhello";

    let (_, bulk) = exchange(&config(4096), input).await;
    let (outcome, trickled) = exchange(&config(1), input).await;

    assert_eq!(outcome, Outcome::Echoed);
    assert_eq!(bulk, trickled);
    assert!(trickled.ends_with(b"Content-Length: 5\r\nX-A: 1\r\n"));
}

#[tokio::test]
async fn test_malformed_request_gets_bare_400() {
    let (outcome, out) = exchange(&config(1024), b"GET / HTTP/1.1\r\nBadHeader\r\n\r\n").await;

    assert_eq!(outcome, Outcome::Rejected(ParseError::InvalidHeader));
    assert_eq!(out, b"HTTP/1.1 400 Bad Request\r\n\r\n".to_vec());
}

#[tokio::test]
async fn test_bad_content_length_gets_400() {
    let (outcome, out) = exchange(
        &config(3),
        b"GET / HTTP/1.1\r\nContent-Length: abc\r\n\r\n",
    )
    .await;

    assert_eq!(outcome, Outcome::Rejected(ParseError::InvalidContentLength));
    assert_eq!(out, b"HTTP/1.1 400 Bad Request\r\n\r\n".to_vec());
}

#[tokio::test]
async fn test_oversized_line_gets_400() {
    let mut cfg = config(1024);
    cfg.limits.max_line_length = 8;

    let (outcome, out) = exchange(&cfg, b"GET /too/long HTTP/1.1\r\n\r\n").await;

    assert_eq!(outcome, Outcome::Rejected(ParseError::LineTooLong));
    assert_eq!(out, b"HTTP/1.1 400 Bad Request\r\n\r\n".to_vec());
}

#[tokio::test]
async fn test_peer_close_mid_request_sends_nothing() {
    let (mut client, server) = tokio::io::duplex(1024);
    client.write_all(b"GET / HTTP/1.1\r\nHost").await.unwrap();
    client.shutdown().await.unwrap();

    let mut conn = Connection::new(server, &config(1024));
    let outcome = conn.run().await.unwrap();
    drop(conn);

    assert_eq!(outcome, Outcome::PeerClosed);
    assert!(read_all(&mut client).await.is_empty());
}

#[tokio::test]
async fn test_stalled_peer_times_out() {
    let mut cfg = config(1024);
    cfg.server.read_timeout_ms = Some(50);

    let (mut client, server) = tokio::io::duplex(1024);
    client.write_all(b"POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nhel").await.unwrap();

    let mut conn = Connection::new(server, &cfg);
    let outcome = conn.run().await.unwrap();

    assert_eq!(outcome, Outcome::TimedOut);
}

#[tokio::test]
async fn test_bytes_after_request_are_ignored() {
    let (outcome, out) = exchange(
        &config(1024),
        b"POST / HTTP/1.1\r\nContent-Length: 2\r\n\r\nokGET / HTTP/1.1\r\n\r\n",
    )
    .await;

    assert_eq!(outcome, Outcome::Echoed);
    assert_eq!(
        out,
        b"HTTP/1.1 200 OK\r\nContent-Length: 19\r\n\r\nContent-Length: 2\r\n".to_vec()
    );
}
