//! The database client.

use super::call::{FirebaseRequest, FirebaseStream};
use super::error::{ErrorCode, FirebaseError};
use super::event::Event;
use super::object::{FirebaseObject, MAX_OBJECT_LEN, MAX_STRING_LEN};
use super::transport::{MAX_HOST_LEN, Transport, TransportFactory};
use crate::network::application::http::Method;
use heapless::String;
use serde::{Deserialize, Serialize};

/// Maximum length of the auth token.
pub const MAX_AUTH_LEN: usize = 512;
/// Maximum length of a child name generated by [`Firebase::push`].
pub const MAX_NAME_LEN: usize = 64;

#[derive(Deserialize)]
struct PushResponse<'a> {
    #[serde(borrow)]
    name: &'a str,
}

/// Client for one Firebase Realtime Database.
///
/// The client owns two transports, both created from its factory the first
/// time they are needed: one for REST calls and one for the event stream.
/// No operation returns an error directly. Each network-facing call records
/// its outcome, which is read back with [`succeeded`](Self::succeeded),
/// [`failed`](Self::failed) and [`last_error`](Self::last_error).
///
/// ```rust,ignore
/// let mut firebase = Firebase::new(|| HttpTransport::new(TlsConnector::new()));
/// firebase.configure("my-project.firebaseio.com", "database-secret");
///
/// firebase.set_int("counter", 1);
/// if firebase.failed() {
///     defmt::error!("set failed: {}", firebase.last_error());
/// }
///
/// firebase.open_stream("commands");
/// loop {
///     if firebase.has_event() {
///         let event = firebase.read_event();
///         handle(event.event_type(), event.data());
///     }
/// }
/// ```
pub struct Firebase<F: TransportFactory> {
    factory: F,
    host: String<MAX_HOST_LEN>,
    auth: String<MAX_AUTH_LEN>,
    error: FirebaseError,
    request: Option<FirebaseRequest<F::Transport>>,
    stream: Option<FirebaseStream<F::Transport>>,
}

impl<F: TransportFactory> core::fmt::Debug for Firebase<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Firebase")
            .field("host", &self.host)
            .field("error", &self.error)
            .field("request", &self.request.is_some())
            .field("stream", &self.stream.is_some())
            .finish()
    }
}

impl<F: TransportFactory> Firebase<F> {
    /// Creates a client with empty credentials. No transport is created yet.
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            host: String::new(),
            auth: String::new(),
            error: FirebaseError::none(),
            request: None,
            stream: None,
        }
    }

    /// Sets the database host, e.g. `my-project.firebaseio.com`, and the auth
    /// token (a database secret or an ID token; may be empty).
    ///
    /// Values are stored as given. One that exceeds its capacity is not
    /// stored and records [`ErrorCode::OutOfMemory`].
    pub fn configure(&mut self, host: &str, auth: &str) {
        match String::try_from(host) {
            Ok(host) => self.host = host,
            Err(()) => self.error = FirebaseError::new(ErrorCode::OutOfMemory, "host too long"),
        }
        self.update_auth(auth);
    }

    /// Replaces the auth token used from the next request on.
    pub fn update_auth(&mut self, auth: &str) {
        match String::try_from(auth) {
            Ok(auth) => self.auth = auth,
            Err(()) => self.error = FirebaseError::new(ErrorCode::OutOfMemory, "auth too long"),
        }
    }

    /// The configured host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Reads the value at `path`. On failure the returned document is empty.
    pub fn get(&mut self, path: &str) -> FirebaseObject {
        let result = self.send(Method::Get, path, None);
        self.record(result)
    }

    /// Reads the integer at `path`.
    pub fn get_int(&mut self, path: &str) -> Option<i64> {
        let object = self.get(path);
        self.typed(object.get_int("/"))
    }

    /// Reads the number at `path`.
    pub fn get_float(&mut self, path: &str) -> Option<f32> {
        let object = self.get(path);
        self.typed(object.get_float("/"))
    }

    /// Reads the boolean at `path`.
    pub fn get_bool(&mut self, path: &str) -> Option<bool> {
        let object = self.get(path);
        self.typed(object.get_bool("/"))
    }

    /// Reads the string at `path`.
    pub fn get_string(&mut self, path: &str) -> Option<String<MAX_STRING_LEN>> {
        let object = self.get(path);
        self.typed(object.get_string("/"))
    }

    /// Replaces the value at `path` with the JSON text `json`.
    pub fn set(&mut self, path: &str, json: &str) {
        let result = self.send(Method::Put, path, Some(json.as_bytes()));
        self.record(result);
    }

    /// Replaces the value at `path` with `value` serialized as JSON.
    pub fn set_value<T: Serialize + ?Sized>(&mut self, path: &str, value: &T) {
        let result = serialize(value).and_then(|json| self.send(Method::Put, path, Some(json.as_bytes())));
        self.record(result);
    }

    /// Writes an integer to `path`.
    pub fn set_int(&mut self, path: &str, value: i64) {
        self.set_value(path, &value);
    }

    /// Writes a number to `path`.
    pub fn set_float(&mut self, path: &str, value: f32) {
        self.set_value(path, &value);
    }

    /// Writes a boolean to `path`.
    pub fn set_bool(&mut self, path: &str, value: bool) {
        self.set_value(path, &value);
    }

    /// Writes a string to `path`.
    pub fn set_string(&mut self, path: &str, value: &str) {
        self.set_value(path, value);
    }

    /// Appends the JSON text `json` as a new child of `path` and returns the
    /// generated child name (empty on failure).
    pub fn push(&mut self, path: &str, json: &str) -> String<MAX_NAME_LEN> {
        let result = self
            .send(Method::Post, path, Some(json.as_bytes()))
            .and_then(|object| push_name(&object));
        self.record(result)
    }

    /// Appends `value`, serialized as JSON, as a new child of `path`.
    pub fn push_value<T: Serialize + ?Sized>(&mut self, path: &str, value: &T) -> String<MAX_NAME_LEN> {
        let result = serialize(value)
            .and_then(|json| self.send(Method::Post, path, Some(json.as_bytes())))
            .and_then(|object| push_name(&object));
        self.record(result)
    }

    /// Appends an integer to `path`.
    pub fn push_int(&mut self, path: &str, value: i64) -> String<MAX_NAME_LEN> {
        self.push_value(path, &value)
    }

    /// Appends a number to `path`.
    pub fn push_float(&mut self, path: &str, value: f32) -> String<MAX_NAME_LEN> {
        self.push_value(path, &value)
    }

    /// Appends a boolean to `path`.
    pub fn push_bool(&mut self, path: &str, value: bool) -> String<MAX_NAME_LEN> {
        self.push_value(path, &value)
    }

    /// Appends a string to `path`.
    pub fn push_string(&mut self, path: &str, value: &str) -> String<MAX_NAME_LEN> {
        self.push_value(path, value)
    }

    /// Merges the members of the JSON object `json` into the value at `path`.
    pub fn update(&mut self, path: &str, json: &str) {
        let result = self.send(Method::Patch, path, Some(json.as_bytes()));
        self.record(result);
    }

    /// Deletes the value at `path`.
    pub fn remove(&mut self, path: &str) {
        let result = self.send(Method::Delete, path, None);
        self.record(result);
    }

    /// Starts streaming changes under `path`.
    ///
    /// The stream transport is created on first use and kept for later calls.
    pub fn open_stream(&mut self, path: &str) {
        let Self {
            factory,
            host,
            auth,
            stream,
            ..
        } = &mut *self;
        let channel = stream.get_or_insert_with(|| FirebaseStream::new(create_transport(factory)));
        debug!("opening stream on {}", path);
        let result = channel.start(host, auth, path);
        self.record(result);
    }

    /// Closes the stream connection. Does nothing when no stream exists.
    pub fn close_stream(&mut self) {
        if let Some(stream) = self.stream.as_mut() {
            debug!("closing stream");
            stream.close();
        }
    }

    /// Whether stream data is waiting to be read.
    ///
    /// Returns `false` and records [`ErrorCode::StreamNotInitialized`] when
    /// no stream was ever opened, or [`ErrorCode::ConnectionLost`] when the
    /// stream connection is gone.
    pub fn has_event(&mut self) -> bool {
        let Some(stream) = self.stream.as_mut() else {
            self.error = FirebaseError::from_code(ErrorCode::StreamNotInitialized);
            return false;
        };
        if !stream.connected() {
            self.error = FirebaseError::from_code(ErrorCode::ConnectionLost);
            return false;
        }
        match stream.available() {
            Ok(available) => available,
            Err(error) => {
                self.error = error;
                false
            }
        }
    }

    /// Reads the next event from the stream.
    ///
    /// Without a stream the empty event is returned and the error state is
    /// left untouched. A read failure records the error and also returns the
    /// empty event.
    pub fn read_event(&mut self) -> Event {
        let Some(stream) = self.stream.as_mut() else {
            return Event::empty();
        };
        match stream.read_event() {
            Ok(event) => event,
            Err(error) => {
                warn!("reading stream event failed: {}", error);
                self.error = error;
                Event::empty()
            }
        }
    }

    /// Whether the last operation succeeded.
    pub fn succeeded(&self) -> bool {
        self.error.is_ok()
    }

    /// Whether the last operation failed.
    pub fn failed(&self) -> bool {
        !self.error.is_ok()
    }

    /// The message of the last error, empty after a success.
    pub fn last_error(&self) -> &str {
        self.error.message()
    }

    /// The full outcome of the last operation.
    pub fn error(&self) -> &FirebaseError {
        &self.error
    }

    fn send(&mut self, method: Method, path: &str, body: Option<&[u8]>) -> Result<FirebaseObject, FirebaseError> {
        let Self {
            factory,
            host,
            auth,
            request,
            ..
        } = &mut *self;
        let channel = request.get_or_insert_with(|| FirebaseRequest::new(create_transport(factory)));
        debug!("{} {}", method.as_str(), path);
        channel.send(host, auth, method, path, body)
    }

    fn record<T: Default>(&mut self, result: Result<T, FirebaseError>) -> T {
        match result {
            Ok(value) => {
                self.error = FirebaseError::none();
                value
            }
            Err(error) => {
                warn!("request failed: {}", error);
                self.error = error;
                T::default()
            }
        }
    }

    /// Records a type mismatch when a successful read held no value of the
    /// requested type.
    fn typed<T>(&mut self, value: Option<T>) -> Option<T> {
        if value.is_none() && self.succeeded() {
            self.error = FirebaseError::from_code(ErrorCode::Parse);
        }
        value
    }
}

fn create_transport<F: TransportFactory>(factory: &mut F) -> F::Transport {
    let mut transport = factory.create();
    transport.set_reuse_connection(true);
    transport
}

fn serialize<T: Serialize + ?Sized>(value: &T) -> Result<String<MAX_OBJECT_LEN>, FirebaseError> {
    serde_json_core::to_string(value).map_err(|_| FirebaseError::from_code(ErrorCode::OutOfMemory))
}

fn push_name(object: &FirebaseObject) -> Result<String<MAX_NAME_LEN>, FirebaseError> {
    let (response, _) = serde_json_core::from_str::<PushResponse>(object.as_str())
        .map_err(|_| FirebaseError::from_code(ErrorCode::InvalidResponse))?;
    String::try_from(response.name).map_err(|()| FirebaseError::from_code(ErrorCode::OutOfMemory))
}
