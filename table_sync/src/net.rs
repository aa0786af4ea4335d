//! Networking layer for the table connection.
//!
//! JSON frames over a single websocket. The connection bookkeeping is kept
//! separate from the socket itself so reconnect behaviour can be tested
//! without a server.

/// Async websocket driver built on `tokio-tungstenite`.
pub mod client;

/// Connection state machine and reconnect backoff policy.
pub mod connection;

/// Error types for frame encoding and decoding.
pub mod errors;

/// Inbound and outbound frame types.
pub mod messages;
