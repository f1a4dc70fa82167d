//! Typed channels over a [`Transport`]: one for REST calls, one for the
//! event stream.

use super::error::{ErrorCode, FirebaseError, MAX_ERROR_LEN};
use super::event::Event;
use super::object::FirebaseObject;
use super::transport::{LineStream, Transport};
use crate::network::application::http::{Line, Method, Response};
use core::fmt::Write as _;
use heapless::String;

/// Turns a non-success response into an error carrying the status code and
/// the server's `error` message when the body has one.
fn status_error(response: &Response) -> FirebaseError {
    let code = ErrorCode::Status(response.status_code);
    let server_message = FirebaseObject::from_bytes(&response.body)
        .ok()
        .and_then(|body| body.get_string("error"));
    match server_message {
        Some(message) => FirebaseError::new(code, &message),
        None => {
            let mut message: String<MAX_ERROR_LEN> = String::new();
            let _ = write!(message, "HTTP request failed with status {}", response.status_code);
            FirebaseError::new(code, &message)
        }
    }
}

/// The channel used for one-shot REST calls.
#[derive(Debug)]
pub struct FirebaseRequest<T: Transport> {
    transport: T,
}

impl<T: Transport> FirebaseRequest<T> {
    /// Wraps `transport`.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Sends a request and returns the response document.
    ///
    /// Only status `200` counts as success.
    pub fn send(
        &mut self,
        host: &str,
        auth: &str,
        method: Method,
        path: &str,
        body: Option<&[u8]>,
    ) -> Result<FirebaseObject, FirebaseError> {
        let response = self.transport.send_request(host, auth, method, path, body)?;
        if response.status_code != 200 {
            return Err(status_error(&response));
        }
        Ok(FirebaseObject::from_bytes(&response.body)?)
    }

    /// The underlying transport.
    pub fn transport(&mut self) -> &mut T {
        &mut self.transport
    }
}

/// The channel holding the event stream.
#[derive(Debug)]
pub struct FirebaseStream<T: Transport> {
    transport: T,
}

impl<T: Transport> FirebaseStream<T> {
    /// Wraps `transport`.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Opens the event stream on `path`.
    pub fn start(&mut self, host: &str, auth: &str, path: &str) -> Result<(), FirebaseError> {
        let response = self.transport.start_streaming(host, auth, path)?;
        if response.status_code != 200 {
            return Err(status_error(&response));
        }
        Ok(())
    }

    /// Whether the stream connection is still open.
    pub fn connected(&mut self) -> bool {
        self.transport.connected()
    }

    /// Whether unread stream bytes are available. `false` when the transport
    /// has no stream.
    pub fn available(&mut self) -> Result<bool, FirebaseError> {
        match self.transport.stream() {
            Some(stream) => Ok(stream.available()?),
            None => Ok(false),
        }
    }

    /// Reads the next event: a type line, a body line and a separator line.
    ///
    /// All three lines are consumed even when one of them fails, and the
    /// first failure is reported. Returns the empty event when the transport
    /// has no stream.
    pub fn read_event(&mut self) -> Result<Event, FirebaseError> {
        let Some(stream) = self.transport.stream() else {
            return Ok(Event::empty());
        };
        let type_line = stream.read_line_until(b'\n');
        let data_line = stream.read_line_until(b'\n');
        let separator = stream.read_line_until(b'\n');
        let (type_line, data_line) = (type_line?, data_line?);
        separator?;

        let event = Event::from_lines(line_str(&type_line)?, line_str(&data_line)?);
        trace!("stream event {}", event.name());
        Ok(event)
    }

    /// Stops reusing the connection and closes it.
    pub fn close(&mut self) {
        self.transport.set_reuse_connection(false);
        self.transport.end();
    }

    /// The underlying transport.
    pub fn transport(&mut self) -> &mut T {
        &mut self.transport
    }
}

/// The line as text, without a trailing carriage return.
fn line_str(line: &Line) -> Result<&str, FirebaseError> {
    let text = core::str::from_utf8(line)
        .map_err(|_| FirebaseError::from_code(ErrorCode::InvalidResponse))?;
    Ok(text.strip_suffix('\r').unwrap_or(text))
}
