//! The transport contract between the database client and the network.
//!
//! [`Transport`] is everything the client needs from an HTTP stack: one-shot
//! requests, a long-lived streaming request, and line access to the stream.
//! [`HttpTransport`] implements it with the crate's own HTTP client over any
//! [`Connect`]or; tests and unusual stacks can provide their own.

use crate::network::application::http::{
    Client, Header, Line, MAX_HEADERS, Method, Request, Response,
};
use crate::network::error::Error;
use crate::network::{Connect, Connection};
use core::fmt::Write as _;
use heapless::{String, Vec};

/// Maximum length of a host name.
pub const MAX_HOST_LEN: usize = 128;
/// Maximum length of a request target (path, `.json` suffix and auth query).
pub const MAX_URL_LEN: usize = 768;

const TEMPORARY_REDIRECT: u16 = 307;

/// Line-oriented access to the body of a streaming response.
pub trait LineStream {
    /// Whether unread bytes are available.
    fn available(&mut self) -> Result<bool, Error>;

    /// Reads up to `delimiter` and returns the line without it.
    fn read_line_until(&mut self, delimiter: u8) -> Result<Line, Error>;
}

impl<C: Connection> LineStream for Client<C> {
    fn available(&mut self) -> Result<bool, Error> {
        Client::available(self)
    }

    fn read_line_until(&mut self, delimiter: u8) -> Result<Line, Error> {
        self.read_line(delimiter)
    }
}

/// An HTTP stack able to talk to the database.
pub trait Transport {
    /// The stream handed out by [`stream`](Transport::stream).
    type Stream: LineStream;

    /// Whether connections are kept open between requests.
    fn set_reuse_connection(&mut self, reuse: bool);

    /// Whether the current connection is still open.
    fn connected(&mut self) -> bool;

    /// Closes the current connection, if any.
    fn end(&mut self);

    /// The body of the current streaming response, if a connection exists.
    fn stream(&mut self) -> Option<&mut Self::Stream>;

    /// Performs a REST call against `path` on `host` and returns the complete
    /// response, whatever its status.
    fn send_request(
        &mut self,
        host: &str,
        auth: &str,
        method: Method,
        path: &str,
        body: Option<&[u8]>,
    ) -> Result<Response, Error>;

    /// Starts an event stream on `path` and returns the response head. On a
    /// success status the connection stays open and its body is read through
    /// [`stream`](Transport::stream).
    fn start_streaming(&mut self, host: &str, auth: &str, path: &str) -> Result<Response, Error>;
}

/// Creates transports on demand.
///
/// Implemented for every closure returning a [`Transport`]:
///
/// ```rust,ignore
/// let firebase = Firebase::new(|| HttpTransport::new(MyTlsConnector::new()));
/// ```
pub trait TransportFactory {
    /// The transports this factory creates.
    type Transport: Transport;

    /// Creates a new transport.
    fn create(&mut self) -> Self::Transport;
}

impl<T: Transport, F: FnMut() -> T> TransportFactory for F {
    type Transport = T;

    fn create(&mut self) -> T {
        self()
    }
}

/// Configuration of an [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct Options {
    /// Value of the `User-Agent` header.
    pub user_agent: &'static str,
    /// How many `307 Temporary Redirect` answers a stream request follows.
    pub max_redirects: u8,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            user_agent: "libfirebase",
            max_redirects: 3,
        }
    }
}

/// Builds the REST request target for `path`: `/<path>.json?auth=<auth>`.
///
/// The auth query is omitted for an empty token and a leading `/` in `path`
/// is not doubled.
pub fn firebase_url(path: &str, auth: &str) -> Result<String<MAX_URL_LEN>, Error> {
    let mut url: String<MAX_URL_LEN> = String::new();
    if !path.starts_with('/') {
        url.push('/').map_err(|_| Error::BufferOverflow)?;
    }
    write!(url, "{}.json", path).map_err(|_| Error::BufferOverflow)?;
    if !auth.is_empty() {
        write!(url, "?auth={}", auth).map_err(|_| Error::BufferOverflow)?;
    }
    Ok(url)
}

/// Splits a `Location` header into host and request target. A relative
/// location keeps the current host.
fn split_location<'a>(location: &'a str, current_host: &'a str) -> Result<(&'a str, &'a str), Error> {
    if location.starts_with('/') {
        return Ok((current_host, location));
    }
    let (_, rest) = location.split_once("://").ok_or(Error::InvalidAddress)?;
    match rest.find('/') {
        Some(index) => Ok((&rest[..index], &rest[index..])),
        None => Ok((rest, "/")),
    }
}

/// [`Transport`] over the crate's HTTP client.
///
/// `network` opens a connection per host name; for `https` databases it is
/// expected to return TLS connections.
pub struct HttpTransport<N: Connect> {
    network: N,
    options: Options,
    client: Option<Client<N::Connection>>,
    remote: String<MAX_HOST_LEN>,
    reuse: bool,
}

impl<N: Connect> core::fmt::Debug for HttpTransport<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("options", &self.options)
            .field("client", &self.client)
            .field("remote", &self.remote)
            .field("reuse", &self.reuse)
            .finish()
    }
}

impl<N: Connect> HttpTransport<N> {
    /// Creates a transport with default [`Options`].
    pub fn new(network: N) -> Self {
        Self::with_options(network, Options::default())
    }

    /// Creates a transport with the given options.
    pub fn with_options(network: N, options: Options) -> Self {
        Self {
            network,
            options,
            client: None,
            remote: String::new(),
            reuse: false,
        }
    }

    /// The connector this transport opens connections with.
    pub fn network(&self) -> &N {
        &self.network
    }

    fn headers(&self, host: &str, streaming: bool, has_body: bool) -> Result<Vec<Header, MAX_HEADERS>, Error> {
        let mut headers: Vec<Header, MAX_HEADERS> = Vec::new();
        let connection = if self.reuse || streaming { "keep-alive" } else { "close" };
        let mut add = |name: &str, value: &str| -> Result<(), Error> {
            headers
                .push(Header::new(name, value)?)
                .map_err(|_| Error::BufferOverflow)
        };
        add("Host", host)?;
        add("User-Agent", self.options.user_agent)?;
        add("Connection", connection)?;
        if streaming {
            add("Accept", "text/event-stream")?;
        }
        if has_body {
            add("Content-Type", "application/json")?;
        }
        Ok(headers)
    }

    /// Returns a client connected to `host`, reusing the open connection when
    /// reuse is enabled and it points at the same host.
    fn connect(&mut self, host: &str) -> Result<&mut Client<N::Connection>, Error> {
        let reusable = self.reuse
            && self.remote.as_str() == host
            && self.client.as_ref().is_some_and(Client::is_open);
        if !reusable {
            self.end();
            let remote = String::try_from(host).map_err(|_| Error::InvalidAddress)?;
            debug!("connecting to {}", host);
            let connection = self
                .network
                .connect(host)
                .map_err(|_| Error::ConnectionRefused)?;
            self.remote = remote;
            self.client = Some(Client::new(connection));
        } else {
            trace!("reusing connection to {}", host);
        }
        self.client.as_mut().ok_or(Error::NotOpen)
    }

    fn open_stream(&mut self, host: &str, auth: &str, path: &str) -> Result<Response, Error> {
        let mut host: String<MAX_HOST_LEN> =
            String::try_from(host).map_err(|_| Error::InvalidAddress)?;
        let mut target = firebase_url(path, auth)?;
        let mut redirects = 0;

        loop {
            let mut response = {
                let headers = self.headers(&host, true, false)?;
                let request = Request {
                    method: Method::Get,
                    path: &target,
                    headers,
                    body: None,
                };

                // A stream never shares its connection with an earlier response.
                self.end();
                let client = self.connect(&host)?;
                client.send(&request)?;
                client.read_head()?
            };

            if response.status_code == TEMPORARY_REDIRECT && redirects < self.options.max_redirects {
                let location = response.header("Location").ok_or(Error::ProtocolError)?;
                let (next_host, next_target) = split_location(location, &host)?;
                debug!("stream redirected to {}", next_host);
                let next_host = String::try_from(next_host).map_err(|_| Error::InvalidAddress)?;
                target = String::try_from(next_target).map_err(|_| Error::BufferOverflow)?;
                host = next_host;
                redirects += 1;
                continue;
            }

            if response.status_code != 200 {
                // Keep the error body for the caller, then drop the connection.
                if let Some(client) = self.client.as_mut() {
                    let _ = client.read_body(&mut response);
                }
                self.end();
            }
            return Ok(response);
        }
    }
}

impl<N: Connect> Transport for HttpTransport<N> {
    type Stream = Client<N::Connection>;

    fn set_reuse_connection(&mut self, reuse: bool) {
        self.reuse = reuse;
    }

    fn connected(&mut self) -> bool {
        self.client.as_ref().is_some_and(Client::is_open)
    }

    fn end(&mut self) {
        if let Some(client) = self.client.take() {
            trace!("closing connection to {}", self.remote.as_str());
            if let Err(_error) = client.close() {
                warn!("closing connection failed: {}", _error);
            }
        }
        self.remote.clear();
    }

    fn stream(&mut self) -> Option<&mut Self::Stream> {
        self.client.as_mut()
    }

    fn send_request(
        &mut self,
        host: &str,
        auth: &str,
        method: Method,
        path: &str,
        body: Option<&[u8]>,
    ) -> Result<Response, Error> {
        let target = firebase_url(path, auth)?;
        let headers = self.headers(host, false, body.is_some())?;
        let request = Request {
            method,
            path: &target,
            headers,
            body,
        };

        let result = self.connect(host).and_then(|client| client.request(&request));
        match result {
            Ok(response) => {
                if !self.reuse || response.closes_connection() {
                    self.end();
                }
                Ok(response)
            }
            Err(error) => {
                self.end();
                Err(error)
            }
        }
    }

    fn start_streaming(&mut self, host: &str, auth: &str, path: &str) -> Result<Response, Error> {
        let result = self.open_stream(host, auth, path);
        if result.is_err() {
            self.end();
        }
        result
    }
}

impl<N: Connect> Drop for HttpTransport<N> {
    fn drop(&mut self) {
        self.end();
    }
}
