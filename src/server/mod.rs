//! TCP front end: accepts connections and hands each one to
//! [`Connection`](crate::http::connection::Connection).

pub mod listener;

pub use listener::Server;
