//! A network abstraction layer for embedded systems
//!
//! The traits in this module describe the byte-stream sockets the HTTP client
//! and the database transport are built on. The application implements them
//! for its own TCP or TLS stack (smoltcp, esp-wifi, `std::net`, a modem AT
//! driver, ...), so the crate itself never touches a socket directly.
//!

#![deny(unsafe_code)]

/// Common error types for network operations
pub mod error;

/// Application layer protocols built on top of [`Connection`]
pub mod application;

/// Re-exports of common traits
pub mod prelude {
    pub use super::{Close, Connect, Connection, Read, Write};
}

/// Reading half of a connection.
pub trait Read {
    /// Associated error type
    type Error: core::fmt::Debug;

    /// Read data from the connection.
    ///
    /// Returns `Ok(0)` once the peer has closed the connection.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Reports whether a call to [`read`](Read::read) would return data
    /// without blocking.
    ///
    /// Stacks that cannot tell keep the default, which reports the
    /// connection as always ready and lets `read` block.
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

/// Writing half of a connection.
pub trait Write {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Write data to the connection
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error>;
    /// Flush the write buffer
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Shutdown of a connection.
pub trait Close {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Close the connection
    fn close(self) -> Result<(), Self::Error>;
}

/// A synchronous connection
pub trait Connection: Read + Write + Close {}

/// A synchronous connector (client)
pub trait Connect {
    /// Associated connection type
    type Connection: Connection;
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Open a connection to `remote`, usually a bare host name such as
    /// `my-project.firebaseio.com`. Port and TLS are the connector's choice.
    fn connect(&mut self, remote: &str) -> Result<Self::Connection, Self::Error>;
}
