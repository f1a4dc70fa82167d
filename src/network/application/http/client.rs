use crate::network::Connection;
use crate::network::error::Error;
use heapless::{String, Vec};

/// Maximum number of headers in a request or a parsed response.
pub const MAX_HEADERS: usize = 16;
const MAX_HEADER_NAME_LEN: usize = 64;
const MAX_HEADER_VALUE_LEN: usize = 256;
const MAX_REQUEST_LEN: usize = 2048;
/// Maximum size of a response body.
pub const MAX_BODY_LEN: usize = 2048;
// Room for a full body on one stream line plus its `data: ` prefix.
const RX_BUFFER_LEN: usize = MAX_BODY_LEN + 256;
/// Maximum length of a single line returned by [`Client::read_line`].
pub const MAX_LINE_LEN: usize = RX_BUFFER_LEN;

const DEFAULT_USER_AGENT: &str = "libfirebase";

/// A single line read from a response, without its delimiter.
pub type Line = Vec<u8, MAX_LINE_LEN>;

/// HTTP request methods used by the database REST interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Read a value.
    Get,
    /// Append a child with a generated name.
    Post,
    /// Replace a value.
    Put,
    /// Merge members into a value.
    Patch,
    /// Remove a value.
    Delete,
}

impl Method {
    /// The method name as sent on the request line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

/// A single header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Header name, compared case-insensitively on lookup.
    pub name: String<MAX_HEADER_NAME_LEN>,
    /// Header value without surrounding whitespace.
    pub value: String<MAX_HEADER_VALUE_LEN>,
}

impl Header {
    /// Creates a header, failing with [`Error::BufferOverflow`] when the name
    /// or value does not fit.
    pub fn new(name: &str, value: &str) -> Result<Self, Error> {
        Ok(Self {
            name: String::try_from(name).map_err(|_| Error::BufferOverflow)?,
            value: String::try_from(value).map_err(|_| Error::BufferOverflow)?,
        })
    }
}

/// An outgoing request.
#[derive(Debug)]
pub struct Request<'a> {
    /// Request method.
    pub method: Method,
    /// Request target, e.g. `/devices.json?auth=...`.
    pub path: &'a str,
    /// Headers in the order they are sent. `User-Agent` is added when absent.
    pub headers: Vec<Header, MAX_HEADERS>,
    /// Body; a `Content-Length` header is added for it.
    pub body: Option<&'a [u8]>,
}

/// A received response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code from the status line.
    pub status_code: u16,
    /// Response headers; lines beyond [`MAX_HEADERS`] are dropped.
    pub headers: Vec<Header, MAX_HEADERS>,
    /// Decoded body. Empty until [`Client::read_body`] ran.
    pub body: Vec<u8, MAX_BODY_LEN>,
}

impl Response {
    /// Looks up a response header, ignoring the case of its name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|header| header.name.eq_ignore_ascii_case(name))
            .map(|header| header.value.as_str())
    }

    /// The body as text, if it is valid UTF-8.
    pub fn body_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.body).ok()
    }

    /// Whether the server asked to close the connection after this response.
    pub fn closes_connection(&self) -> bool {
        self.header("Connection")
            .is_some_and(|value| value.eq_ignore_ascii_case("close"))
    }
}

/// An HTTP/1.1 client bound to one connection.
///
/// Bytes received past the end of a response head stay in an internal buffer,
/// which is what allows an event stream to be consumed line by line after
/// [`send`](Client::send) and [`read_head`](Client::read_head).
pub struct Client<C: Connection> {
    connection: C,
    rx: Vec<u8, RX_BUFFER_LEN>,
    open: bool,
}

impl<C: Connection> core::fmt::Debug for Client<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Client")
            .field("buffered", &self.rx.len())
            .field("open", &self.open)
            .finish()
    }
}

impl<C: Connection> Client<C> {
    /// Wraps an open connection.
    pub fn new(connection: C) -> Self {
        Self {
            connection,
            rx: Vec::new(),
            open: true,
        }
    }

    /// Whether the connection is still usable. Turns false once the peer
    /// closed it or a read or write failed.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Closes the underlying connection.
    pub fn close(self) -> Result<(), Error> {
        self.connection.close().map_err(|_| Error::ConnectionClosed)
    }

    /// Sends `request` and reads the complete response.
    pub fn request(&mut self, request: &Request) -> Result<Response, Error> {
        self.send(request)?;
        let mut response = self.read_head()?;
        self.read_body(&mut response)?;
        Ok(response)
    }

    /// Serializes and writes `request` without waiting for an answer.
    pub fn send(&mut self, request: &Request) -> Result<(), Error> {
        let mut request_buf: Vec<u8, MAX_REQUEST_LEN> = Vec::new();

        // Request line
        push(&mut request_buf, request.method.as_str().as_bytes())?;
        push(&mut request_buf, b" ")?;
        push(&mut request_buf, request.path.as_bytes())?;
        push(&mut request_buf, b" HTTP/1.1\r\n")?;

        // Headers
        let mut has_user_agent = false;
        for header in &request.headers {
            if header.name.eq_ignore_ascii_case("User-Agent") {
                has_user_agent = true;
            }
            push(&mut request_buf, header.name.as_bytes())?;
            push(&mut request_buf, b": ")?;
            push(&mut request_buf, header.value.as_bytes())?;
            push(&mut request_buf, b"\r\n")?;
        }

        if !has_user_agent {
            push(&mut request_buf, b"User-Agent: ")?;
            push(&mut request_buf, DEFAULT_USER_AGENT.as_bytes())?;
            push(&mut request_buf, b"\r\n")?;
        }

        // Body
        if let Some(body) = request.body {
            let mut len_str: String<20> = String::new();
            core::fmt::Write::write_fmt(&mut len_str, format_args!("{}", body.len()))
                .map_err(|_| Error::BufferOverflow)?;

            push(&mut request_buf, b"Content-Length: ")?;
            push(&mut request_buf, len_str.as_bytes())?;
            push(&mut request_buf, b"\r\n\r\n")?;
            push(&mut request_buf, body)?;
        } else {
            push(&mut request_buf, b"\r\n")?;
        }

        self.write_all(&request_buf)?;
        self.connection.flush().map_err(|_| {
            self.open = false;
            Error::WriteError
        })
    }

    /// Reads a status line and headers. The body, if any, stays unread.
    pub fn read_head(&mut self) -> Result<Response, Error> {
        let status_line = self.read_text_line()?;
        let mut status_parts = status_line.splitn(3, ' ');
        let version = status_parts.next().ok_or(Error::ProtocolError)?;
        if !version.starts_with("HTTP/") {
            return Err(Error::ProtocolError);
        }
        let status_code = status_parts
            .next()
            .ok_or(Error::ProtocolError)?
            .parse::<u16>()
            .map_err(|_| Error::ProtocolError)?;

        let mut headers: Vec<Header, MAX_HEADERS> = Vec::new();
        loop {
            let line = self.read_text_line()?;
            if line.is_empty() {
                break;
            }
            let mut parts = line.splitn(2, ':');
            let name = parts.next().ok_or(Error::ProtocolError)?.trim();
            let value = parts.next().ok_or(Error::ProtocolError)?.trim();
            // Headers beyond capacity are dropped rather than failing the response.
            if let Ok(header) = Header::new(name, value) {
                let _ = headers.push(header);
            }
        }

        Ok(Response {
            status_code,
            headers,
            body: Vec::new(),
        })
    }

    /// Reads the body announced by `response`'s head into `response.body`.
    pub fn read_body(&mut self, response: &mut Response) -> Result<(), Error> {
        if response.status_code == 204 || response.status_code == 304 {
            return Ok(());
        }

        let chunked = response
            .header("Transfer-Encoding")
            .is_some_and(|value| value.eq_ignore_ascii_case("chunked"));
        if chunked {
            return self.read_chunked(&mut response.body);
        }

        match response.header("Content-Length") {
            Some(value) => {
                let len = value.parse::<usize>().map_err(|_| Error::ProtocolError)?;
                self.read_exact_into(&mut response.body, len)
            }
            None => self.read_to_close(&mut response.body),
        }
    }

    /// Whether unread bytes are buffered or waiting on the connection.
    pub fn available(&mut self) -> Result<bool, Error> {
        if !self.rx.is_empty() {
            return Ok(true);
        }
        if !self.open {
            return Ok(false);
        }
        self.connection.read_ready().map_err(|_| {
            self.open = false;
            Error::ReadError
        })
    }

    /// Reads up to and including `delimiter` and returns the line without it.
    ///
    /// If the peer closes the connection mid-line, the partial line is
    /// returned; a closed connection with nothing buffered is an error.
    ///
    /// A line longer than [`MAX_LINE_LEN`] is skipped up to and including its
    /// delimiter and reported as [`Error::BufferOverflow`], so the next call
    /// starts on the following line.
    pub fn read_line(&mut self, delimiter: u8) -> Result<Line, Error> {
        loop {
            if let Some(pos) = self.rx.iter().position(|&byte| byte == delimiter) {
                let line = Vec::from_slice(&self.rx[..pos]).map_err(|_| Error::BufferOverflow)?;
                self.consume(pos + 1);
                return Ok(line);
            }
            if self.rx.is_full() {
                self.discard_line(delimiter)?;
                return Err(Error::BufferOverflow);
            }
            if self.fill()? == 0 {
                if self.rx.is_empty() {
                    return Err(Error::ConnectionClosed);
                }
                let line = Vec::from_slice(&self.rx).map_err(|_| Error::BufferOverflow)?;
                self.rx.clear();
                return Ok(line);
            }
        }
    }

    /// Drops received bytes up to and including the next `delimiter`, or up
    /// to the end of the connection.
    fn discard_line(&mut self, delimiter: u8) -> Result<(), Error> {
        loop {
            if let Some(pos) = self.rx.iter().position(|&byte| byte == delimiter) {
                self.consume(pos + 1);
                return Ok(());
            }
            self.rx.clear();
            if self.fill()? == 0 {
                return Ok(());
            }
        }
    }

    /// Reads a CRLF (or bare LF) terminated header line as text.
    fn read_text_line(&mut self) -> Result<String<MAX_LINE_LEN>, Error> {
        let mut line = self.read_line(b'\n')?;
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        String::from_utf8(line).map_err(|_| Error::ProtocolError)
    }

    fn read_chunked(&mut self, body: &mut Vec<u8, MAX_BODY_LEN>) -> Result<(), Error> {
        loop {
            let size_line = self.read_text_line()?;
            let size_str = size_line.split(';').next().unwrap_or("").trim();
            let size = usize::from_str_radix(size_str, 16).map_err(|_| Error::ProtocolError)?;
            if size == 0 {
                // Skip optional trailers up to the terminating blank line.
                while !self.read_text_line()?.is_empty() {}
                return Ok(());
            }
            self.read_exact_into(body, size)?;
            if !self.read_text_line()?.is_empty() {
                return Err(Error::ProtocolError);
            }
        }
    }

    fn read_exact_into(&mut self, body: &mut Vec<u8, MAX_BODY_LEN>, len: usize) -> Result<(), Error> {
        let mut remaining = len;
        while remaining > 0 {
            if self.rx.is_empty() && self.fill()? == 0 {
                // Prematurely closed
                return Err(Error::ConnectionClosed);
            }
            let take = core::cmp::min(self.rx.len(), remaining);
            body.extend_from_slice(&self.rx[..take])
                .map_err(|_| Error::BufferOverflow)?;
            self.consume(take);
            remaining -= take;
        }
        Ok(())
    }

    fn read_to_close(&mut self, body: &mut Vec<u8, MAX_BODY_LEN>) -> Result<(), Error> {
        loop {
            if !self.rx.is_empty() {
                body.extend_from_slice(&self.rx)
                    .map_err(|_| Error::BufferOverflow)?;
                self.rx.clear();
            }
            if self.fill()? == 0 {
                return Ok(());
            }
        }
    }

    /// Reads whatever the connection delivers into the spare room of the
    /// receive buffer. Returns 0 when the peer closed the connection.
    fn fill(&mut self) -> Result<usize, Error> {
        if !self.open {
            return Ok(0);
        }
        let mut temp_buf = [0u8; 256];
        let room = core::cmp::min(self.rx.capacity() - self.rx.len(), temp_buf.len());
        if room == 0 {
            return Err(Error::BufferOverflow);
        }
        match self.connection.read(&mut temp_buf[..room]) {
            Ok(0) => {
                self.open = false;
                Ok(0)
            }
            Ok(n) => {
                self.rx
                    .extend_from_slice(&temp_buf[..n])
                    .map_err(|_| Error::BufferOverflow)?;
                Ok(n)
            }
            Err(_) => {
                self.open = false;
                Err(Error::ReadError)
            }
        }
    }

    fn consume(&mut self, count: usize) {
        let len = self.rx.len();
        self.rx.copy_within(count..len, 0);
        self.rx.truncate(len - count);
    }

    fn write_all(&mut self, mut buf: &[u8]) -> Result<(), Error> {
        while !buf.is_empty() {
            match self.connection.write(buf) {
                Ok(0) | Err(_) => {
                    self.open = false;
                    return Err(Error::WriteError);
                }
                Ok(n) => buf = &buf[n..],
            }
        }
        Ok(())
    }
}

fn push<const N: usize>(buf: &mut Vec<u8, N>, bytes: &[u8]) -> Result<(), Error> {
    buf.extend_from_slice(bytes).map_err(|_| Error::WriteError)
}
