//! HTTP/1.1 protocol implementation for embedded systems.
//!
//! This module provides a lightweight HTTP client implementation designed specifically
//! for embedded systems and `no_std` environments. It focuses on simplicity,
//! predictable memory usage, and compatibility with resource-constrained devices.
//!
//! # Features
//!
//! - Synchronous request/response model
//! - Fixed-size buffers for predictable memory usage
//! - `Content-Length`, chunked and close-delimited response bodies
//! - Buffered line reads for long-lived `text/event-stream` responses
//! - Connection reuse (keep-alive) capability
//!
//! # Usage
//!
//! The main entry point is the [`client::Client`] which works with any connection
//! type implementing the [`crate::network::Connection`] trait.

/// HTTP client implementation and supporting types.
pub mod client;

pub use client::{
    Client, Header, Line, MAX_BODY_LEN, MAX_HEADERS, MAX_LINE_LEN, Method, Request, Response,
};
