//! Records of the database change stream.
//!
//! The server sends each change as three lines:
//!
//! ```text
//! event: put
//! data: {"path":"/","data":1}
//!
//! ```
//!
//! The type and body are taken by stripping a fixed number of characters
//! from the first two lines; the third line separates records.

use super::object::{FirebaseObject, MAX_STRING_LEN};
use heapless::String;

/// Characters stripped from the type line (`event: `).
pub const EVENT_PREFIX_LEN: usize = 7;
/// Characters stripped from the body line (`data: `).
pub const DATA_PREFIX_LEN: usize = 6;
/// Maximum length of an event type.
pub const MAX_EVENT_TYPE_LEN: usize = 32;

/// Kinds of events the database sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    /// Data at `path` was replaced by `data`.
    Put,
    /// Children of `path` were updated with the members of `data`.
    Patch,
    /// Sent periodically to keep the connection alive.
    KeepAlive,
    /// The server cancelled the stream, usually for lack of permission.
    Cancel,
    /// The auth credential expired or was revoked.
    AuthRevoked,
    /// Anything else, including the empty event.
    Unknown,
}

impl EventType {
    /// Classifies an event type as written on the wire.
    pub fn from_name(name: &str) -> Self {
        match name {
            "put" => EventType::Put,
            "patch" => EventType::Patch,
            "keep-alive" => EventType::KeepAlive,
            "cancel" => EventType::Cancel,
            "auth_revoked" => EventType::AuthRevoked,
            _ => EventType::Unknown,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for EventType {
    fn format(&self, f: defmt::Formatter) {
        match self {
            EventType::Put => defmt::write!(f, "Put"),
            EventType::Patch => defmt::write!(f, "Patch"),
            EventType::KeepAlive => defmt::write!(f, "KeepAlive"),
            EventType::Cancel => defmt::write!(f, "Cancel"),
            EventType::AuthRevoked => defmt::write!(f, "AuthRevoked"),
            EventType::Unknown => defmt::write!(f, "Unknown"),
        }
    }
}

/// One parsed stream record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Event {
    name: String<MAX_EVENT_TYPE_LEN>,
    body: FirebaseObject,
    object: FirebaseObject,
}

impl Event {
    /// The empty event, returned when there is no stream to read from.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds an event from the type line and the body line, both without
    /// their trailing newline.
    ///
    /// Prefixes are stripped by length without checking their content. A line
    /// shorter than its prefix yields an empty value. A type longer than
    /// [`MAX_EVENT_TYPE_LEN`] or a body longer than the object capacity is
    /// truncated to nothing rather than rejected.
    pub fn from_lines(type_line: &str, data_line: &str) -> Self {
        let name = String::try_from(strip_prefix(type_line, EVENT_PREFIX_LEN)).unwrap_or_default();
        let body = FirebaseObject::parse(strip_prefix(data_line, DATA_PREFIX_LEN)).unwrap_or_default();

        let mut object = body.clone();
        if object.insert("type", name.as_str()).is_err() {
            trace!("event body is not an object, left unannotated");
        }

        Self { name, body, object }
    }

    /// The event type as sent by the server.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The classified event type.
    pub fn event_type(&self) -> EventType {
        EventType::from_name(&self.name)
    }

    /// The body exactly as received.
    pub fn body(&self) -> &FirebaseObject {
        &self.body
    }

    /// The body with a `"type"` member holding the event type, so a single
    /// document carries `type`, `path` and `data`. A `type` member sent by
    /// the server is replaced. Bodies that are not JSON
    /// objects are kept unannotated.
    pub fn object(&self) -> &FirebaseObject {
        &self.object
    }

    /// The affected path, from the body's `path` member.
    pub fn path(&self) -> Option<String<MAX_STRING_LEN>> {
        self.body.get_string("path")
    }

    /// The raw JSON of the body's `data` member.
    pub fn data(&self) -> Option<&str> {
        self.body.get_raw("data")
    }

    /// Whether this is the empty event.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.body.is_empty()
    }
}

/// Drops the first `len` characters of `line`.
fn strip_prefix(line: &str, len: usize) -> &str {
    match line.char_indices().nth(len) {
        Some((index, _)) => &line[index..],
        None => "",
    }
}
