//! Trickle - byte-at-a-time HTTP/1.1 echo server
//!
//! Core library: the incremental request parser, the connection glue that
//! feeds it from a socket, and the listener.

pub mod config;
pub mod http;
pub mod server;
