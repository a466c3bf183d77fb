//! HTTP protocol implementation.
//!
//! This module implements a minimal HTTP/1.1 echo server around an
//! incremental request parser.
//!
//! # Architecture
//!
//! - **`parser`**: Byte-at-a-time request parser (finite-state machine)
//! - **`request`**: The parsed request handed out by the parser
//! - **`response`**: HTTP response representation with builder pattern
//! - **`writer`**: Serializes and writes HTTP responses to the client
//! - **`connection`**: Feeds socket bytes to the parser and answers once
//!
//! # Parser State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │ RequestLine │ ← Accumulate bytes until CRLF
//!        └──────┬──────┘
//!               │ Request line decoded
//!               ▼
//!        ┌─────────────┐
//!        │   Headers   │ ← One `Name: value` per CRLF line
//!        └──────┬──────┘
//!               │ Blank line
//!               ├─ Content-Length > 0 → Body
//!               └─ otherwise → Done
//!               ▼
//!        ┌─────────────┐
//!        │    Body     │ ← Raw bytes until Content-Length reached
//!        └──────┬──────┘
//!               ▼
//!        ┌─────────────┐
//!        │    Done     │
//!        └─────────────┘
//! ```
//!
//! # Connection
//!
//! A connection reads, parses, writes one response (`200` echoing the
//! request headers, or a bare `400` on any parse error) and closes.
//!
//! # Example
//!
//! ```ignore
//! use trickle::config::Config;
//! use trickle::http::connection::Connection;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let cfg = Config::default();
//!     let listener = TcpListener::bind(&cfg.server.listen_addr).await?;
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let mut conn = Connection::new(socket, &cfg);
//!         if let Err(e) = conn.run().await {
//!             eprintln!("Connection error: {}", e);
//!         }
//!     }
//! }
//! ```

pub mod request;
pub mod response;
pub mod parser;
pub mod connection;
pub mod writer;
