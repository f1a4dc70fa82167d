//! # libfirebase - Firebase Realtime Database client for embedded devices
//!
//! A Rust SDK that lets microcontrollers and other small devices read and
//! write data in a Firebase Realtime Database and follow its changes as they
//! happen. The library is designed for embedded systems and supports
//! `no_std` environments: every buffer has a fixed size and nothing is
//! allocated on the heap.
//!
//! ## Features
//!
//! ### Database client
//! - **REST calls**: get, set, push, update and remove values by path
//! - **Typed helpers**: integers, numbers, booleans, strings and any
//!   `serde::Serialize` value
//! - **Event stream**: poll-and-read loop over the server's change stream
//! - **Error state**: every call records a code and message instead of
//!   returning an error, which keeps control loops simple
//!
//! ### Network layer
//! - Socket traits the application implements for its TCP/TLS stack
//! - HTTP/1.1 client with connection reuse, chunked bodies and line reads
//!
//! ## Usage
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! libfirebase = "0.1.0"
//! ```
//!
//! ### Reading, writing and streaming
//!
//! ```rust,ignore
//! use libfirebase::firebase::{EventType, Firebase, HttpTransport};
//!
//! let mut firebase = Firebase::new(|| HttpTransport::new(TlsConnector::new(&stack)));
//! firebase.configure("my-project.firebaseio.com", DATABASE_SECRET);
//!
//! firebase.set_float("sensors/porch/temperature", 21.5);
//! let name = firebase.push_string("logs", "booted");
//!
//! firebase.open_stream("commands");
//! loop {
//!     if firebase.has_event() {
//!         let event = firebase.read_event();
//!         if event.event_type() == EventType::Put {
//!             apply(event.path(), event.data());
//!         }
//!     } else if firebase.failed() {
//!         firebase.open_stream("commands");
//!     }
//! }
//! ```
//!
//! ## Platform Support
//!
//! This library is designed to work on:
//! - Embedded microcontrollers (ARM Cortex-M, RISC-V, Xtensa)
//! - Linux-based IoT devices (Raspberry Pi, etc.)
//! - Any platform supporting Rust's `core` library
//!
//! ## Optional Features
//!
//! - `std`: Enable standard library support (default: disabled)
//! - `defmt`: Enable defmt formatting and logging for embedded debugging
//! - `log`: Route internal logging through the `log` facade

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

#[macro_use]
mod fmt;

/// Network abstraction layer providing the socket traits and the HTTP client.
///
/// The application implements the traits for its transport; the database
/// client only ever talks to them.
pub mod network;

/// Firebase Realtime Database client.
///
/// Contains the [`Firebase`](firebase::Firebase) client, the transport
/// contract it is built on, and the document and event types it returns.
pub mod firebase;

pub use firebase::Firebase;
