//! # Application Layer Network Protocols
//!
//! Application layer (OSI Layer 7) protocols built on the core network traits.
//!
//! - **[`http`]**: HTTP/1.1 client used by the database transport, including
//!   the buffered line reads needed for `text/event-stream` responses.
//!
//! Protocol clients wrap any [`Connection`](crate::network::Connection):
//!
//! ```rust,no_run
//! use libfirebase::network::application::http::{Client, Header, Method, Request};
//! # use libfirebase::network::Connection;
//! # struct MockConnection;
//! # impl Connection for MockConnection {}
//! # impl libfirebase::network::Read for MockConnection {
//! #     type Error = ();
//! #     fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> { Ok(0) }
//! # }
//! # impl libfirebase::network::Write for MockConnection {
//! #     type Error = ();
//! #     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> { Ok(buf.len()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl libfirebase::network::Close for MockConnection {
//! #     type Error = ();
//! #     fn close(self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//!
//! let connection = MockConnection;
//! let mut client = Client::new(connection);
//!
//! let mut headers = heapless::Vec::new();
//! headers.push(Header::new("Host", "example.firebaseio.com").unwrap()).unwrap();
//! let request = Request {
//!     method: Method::Get,
//!     path: "/devices.json",
//!     headers,
//!     body: None,
//! };
//! // let response = client.request(&request)?;
//! ```

/// HTTP client implementation.
///
/// Provides a simple HTTP/1.1 client suitable for embedded systems.
pub mod http;
