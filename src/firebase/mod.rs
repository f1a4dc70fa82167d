//! Firebase Realtime Database client for embedded systems.
//!
//! This module talks to the database's REST interface: values are read and
//! written with plain HTTP requests against `https://<host>/<path>.json`, and
//! changes are followed through a `text/event-stream` response on the same
//! URL.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐    ┌──────────────────┐    ┌──────────────────┐
//! │   Firebase   │───▶│ FirebaseRequest  │───▶│    Transport     │
//! │   (client)   │    │ FirebaseStream   │    │  (HttpTransport) │
//! └──────────────┘    └──────────────────┘    └──────────────────┘
//!         │                    │                       │
//!         ▼                    ▼                       ▼
//! ┌──────────────┐    ┌──────────────────┐    ┌──────────────────┐
//! │ FirebaseError│    │ Event /          │    │ network::Connect │
//! │ (last result)│    │ FirebaseObject   │    │ (TCP / TLS)      │
//! └──────────────┘    └──────────────────┘    └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use libfirebase::firebase::{ErrorCode, Firebase, HttpTransport};
//! # use libfirebase::network::{Close, Connect, Connection, Read, Write};
//! # use libfirebase::network::error::Error;
//! # struct Offline;
//! # struct NoConnection;
//! # impl Read for NoConnection {
//! #     type Error = Error;
//! #     fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Error> { Ok(0) }
//! # }
//! # impl Write for NoConnection {
//! #     type Error = Error;
//! #     fn write(&mut self, buf: &[u8]) -> Result<usize, Error> { Ok(buf.len()) }
//! #     fn flush(&mut self) -> Result<(), Error> { Ok(()) }
//! # }
//! # impl Close for NoConnection {
//! #     type Error = Error;
//! #     fn close(self) -> Result<(), Error> { Ok(()) }
//! # }
//! # impl Connection for NoConnection {}
//! # impl Connect for Offline {
//! #     type Connection = NoConnection;
//! #     type Error = Error;
//! #     fn connect(&mut self, _remote: &str) -> Result<NoConnection, Error> {
//! #         Err(Error::ConnectionRefused)
//! #     }
//! # }
//!
//! let mut firebase = Firebase::new(|| HttpTransport::new(Offline));
//! firebase.configure("my-project.firebaseio.com", "");
//!
//! // Nothing is reachable, so the failure lands in the error state.
//! firebase.set_int("sensors/temperature", 21);
//! assert!(firebase.failed());
//! assert_eq!(firebase.error().code(), ErrorCode::ConnectionRefused);
//!
//! // Streams report through the same state.
//! assert!(!firebase.has_event());
//! assert_eq!(firebase.error().code(), ErrorCode::StreamNotInitialized);
//! ```

pub mod call;
pub mod client;
pub mod error;
pub mod event;
pub mod object;
pub mod transport;

pub use call::{FirebaseRequest, FirebaseStream};
pub use client::{Firebase, MAX_AUTH_LEN, MAX_NAME_LEN};
pub use error::{ErrorCode, FirebaseError};
pub use event::{Event, EventType};
pub use object::{FirebaseObject, ObjectError};
pub use transport::{HttpTransport, LineStream, Options, Transport, TransportFactory, firebase_url};
