//! Error state reported by the database client.

use super::object::ObjectError;
use crate::network::error::Error as NetworkError;
use core::fmt;
use heapless::String;

/// Maximum length of an error message.
pub const MAX_ERROR_LEN: usize = 96;

/// Result code of the last database operation.
///
/// Negative codes describe transport failures, positive codes are HTTP
/// status codes returned by the server, and zero means success.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum ErrorCode {
    /// The operation succeeded.
    #[default]
    None,
    /// The connection to the host could not be opened.
    ConnectionRefused,
    /// The request could not be written to the connection.
    SendFailed,
    /// The connection was not open when it was used.
    NotConnected,
    /// The connection dropped.
    ConnectionLost,
    /// An event stream operation ran before a stream was opened.
    StreamNotInitialized,
    /// The server sent something that is not a valid HTTP response.
    InvalidResponse,
    /// A value did not fit into one of the fixed-size buffers.
    OutOfMemory,
    /// The connection timed out while waiting for data.
    ReadTimeout,
    /// A payload did not hold a value of the requested type.
    Parse,
    /// The server answered with a non-success HTTP status.
    Status(u16),
}

impl ErrorCode {
    /// The numeric code; zero means no error.
    pub fn code(&self) -> i32 {
        match self {
            ErrorCode::None => 0,
            ErrorCode::ConnectionRefused => -1,
            ErrorCode::SendFailed => -2,
            ErrorCode::NotConnected => -4,
            ErrorCode::ConnectionLost => -5,
            ErrorCode::StreamNotInitialized => -6,
            ErrorCode::InvalidResponse => -7,
            ErrorCode::OutOfMemory => -8,
            ErrorCode::ReadTimeout => -11,
            ErrorCode::Parse => -100,
            ErrorCode::Status(status) => i32::from(*status),
        }
    }

    fn description(&self) -> &'static str {
        match self {
            ErrorCode::None => "",
            ErrorCode::ConnectionRefused => "connection refused",
            ErrorCode::SendFailed => "send failed",
            ErrorCode::NotConnected => "not connected",
            ErrorCode::ConnectionLost => "Connection Lost",
            ErrorCode::StreamNotInitialized => "HTTP stream is not initialized",
            ErrorCode::InvalidResponse => "invalid response",
            ErrorCode::OutOfMemory => "out of memory",
            ErrorCode::ReadTimeout => "read timeout",
            ErrorCode::Parse => "unexpected value type",
            ErrorCode::Status(_) => "HTTP request failed",
        }
    }
}

impl From<NetworkError> for ErrorCode {
    fn from(error: NetworkError) -> Self {
        match error {
            NetworkError::ConnectionRefused | NetworkError::InvalidAddress => {
                ErrorCode::ConnectionRefused
            }
            NetworkError::WriteError => ErrorCode::SendFailed,
            NetworkError::NotOpen => ErrorCode::NotConnected,
            NetworkError::ConnectionClosed => ErrorCode::ConnectionLost,
            NetworkError::ReadError | NetworkError::ProtocolError => ErrorCode::InvalidResponse,
            NetworkError::BufferOverflow => ErrorCode::OutOfMemory,
            NetworkError::Timeout => ErrorCode::ReadTimeout,
        }
    }
}

/// A `(code, message)` pair describing the outcome of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FirebaseError {
    code: ErrorCode,
    message: String<MAX_ERROR_LEN>,
}

impl FirebaseError {
    /// The success value: code zero and an empty message.
    pub fn none() -> Self {
        Self::default()
    }

    /// Creates an error with `message`, truncated to [`MAX_ERROR_LEN`] bytes.
    pub fn new(code: ErrorCode, message: &str) -> Self {
        let mut stored = String::new();
        for c in message.chars() {
            if stored.push(c).is_err() {
                break;
            }
        }
        Self {
            code,
            message: stored,
        }
    }

    /// Creates an error carrying the default message for `code`.
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.description())
    }

    /// The error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether this value describes a success.
    pub fn is_ok(&self) -> bool {
        self.code == ErrorCode::None
    }
}

impl From<NetworkError> for FirebaseError {
    fn from(error: NetworkError) -> Self {
        Self::from_code(ErrorCode::from(error))
    }
}

impl From<ObjectError> for FirebaseError {
    fn from(error: ObjectError) -> Self {
        let code = match error {
            ObjectError::TooLarge => ErrorCode::OutOfMemory,
            ObjectError::InvalidUtf8 => ErrorCode::InvalidResponse,
            ObjectError::NotAnObject => ErrorCode::Parse,
        };
        Self::from_code(code)
    }
}

impl fmt::Display for FirebaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.code.code())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FirebaseError {}

#[cfg(feature = "defmt")]
impl defmt::Format for FirebaseError {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=str} ({=i32})", self.message.as_str(), self.code.code())
    }
}
