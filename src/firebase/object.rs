//! Bounded JSON documents returned by the database.
//!
//! A [`FirebaseObject`] keeps the JSON text exactly as the server sent it and
//! locates values on demand, so reading one member of a large payload costs
//! no more memory than the payload itself. Scalar values are decoded with
//! `serde-json-core`.

use core::fmt;
use core::fmt::Write as _;
use heapless::String;
use serde::Serialize;

/// Maximum size of a JSON document held by a [`FirebaseObject`].
pub const MAX_OBJECT_LEN: usize = 2048;
/// Maximum length of a string value returned by [`FirebaseObject::get_string`].
pub const MAX_STRING_LEN: usize = 256;
const MAX_KEY_LEN: usize = 64;

/// Reasons a document could not be built or modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectError {
    /// The document does not fit into [`MAX_OBJECT_LEN`] bytes.
    TooLarge,
    /// The bytes are not valid UTF-8.
    InvalidUtf8,
    /// A member was inserted into something that is not a JSON object.
    NotAnObject,
}

#[cfg(feature = "defmt")]
impl defmt::Format for ObjectError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ObjectError::TooLarge => defmt::write!(f, "TooLarge"),
            ObjectError::InvalidUtf8 => defmt::write!(f, "InvalidUtf8"),
            ObjectError::NotAnObject => defmt::write!(f, "NotAnObject"),
        }
    }
}

/// A JSON document with `/`-separated path lookup.
///
/// ```rust
/// use libfirebase::firebase::FirebaseObject;
///
/// let object = FirebaseObject::parse(r#"{"sensor":{"temp":21.5,"name":"porch"}}"#).unwrap();
/// assert_eq!(object.get_float("sensor/temp"), Some(21.5));
/// assert_eq!(object.get_string("/sensor/name").unwrap().as_str(), "porch");
/// assert_eq!(object.get_int("sensor/missing"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FirebaseObject {
    json: String<MAX_OBJECT_LEN>,
}

impl FirebaseObject {
    /// An empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps `json`, trimmed of surrounding whitespace.
    ///
    /// The text is not validated up front; lookups on malformed JSON simply
    /// find nothing.
    pub fn parse(json: &str) -> Result<Self, ObjectError> {
        let json = String::try_from(json.trim()).map_err(|_| ObjectError::TooLarge)?;
        Ok(Self { json })
    }

    /// Wraps a UTF-8 byte payload such as an HTTP response body.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ObjectError> {
        let text = core::str::from_utf8(bytes).map_err(|_| ObjectError::InvalidUtf8)?;
        Self::parse(text)
    }

    /// The JSON text.
    pub fn as_str(&self) -> &str {
        &self.json
    }

    /// Whether the document holds no text at all.
    pub fn is_empty(&self) -> bool {
        self.json.is_empty()
    }

    /// Whether the document is the JSON literal `null`, which the database
    /// returns for paths without data.
    pub fn is_null(&self) -> bool {
        self.json.as_str() == "null"
    }

    /// Whether the document is a JSON object.
    pub fn is_object(&self) -> bool {
        self.json.starts_with('{')
    }

    /// Returns the raw JSON text of the value at `path`.
    ///
    /// Path segments are separated by `/`; empty segments are ignored, so
    /// `""` and `"/"` address the whole document.
    pub fn get_raw(&self, path: &str) -> Option<&str> {
        let mut value = self.json.as_str();
        for segment in path.split('/').filter(|segment| !segment.is_empty()) {
            value = find_member(value, segment)?;
        }
        if value.is_empty() { None } else { Some(value) }
    }

    /// The integer at `path`.
    pub fn get_int(&self, path: &str) -> Option<i64> {
        let raw = self.get_raw(path)?;
        serde_json_core::from_str::<i64>(raw).ok().map(|(value, _)| value)
    }

    /// The number at `path`.
    pub fn get_float(&self, path: &str) -> Option<f32> {
        let raw = self.get_raw(path)?;
        serde_json_core::from_str::<f32>(raw).ok().map(|(value, _)| value)
    }

    /// The boolean at `path`.
    pub fn get_bool(&self, path: &str) -> Option<bool> {
        let raw = self.get_raw(path)?;
        serde_json_core::from_str::<bool>(raw).ok().map(|(value, _)| value)
    }

    /// The string at `path`, with JSON escapes resolved.
    pub fn get_string(&self, path: &str) -> Option<String<MAX_STRING_LEN>> {
        let raw = self.get_raw(path)?;
        if raw.len() < 2 || !raw.starts_with('"') || !raw.ends_with('"') {
            return None;
        }
        unescape(&raw[1..raw.len() - 1])
    }

    /// Sets `key` as the first member of the document, replacing any member
    /// already named `key`.
    pub fn insert<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), ObjectError> {
        if !self.is_object() {
            return Err(ObjectError::NotAnObject);
        }
        let key_json: String<MAX_KEY_LEN> =
            serde_json_core::to_string(key).map_err(|_| ObjectError::TooLarge)?;
        let value_json: String<MAX_OBJECT_LEN> =
            serde_json_core::to_string(value).map_err(|_| ObjectError::TooLarge)?;
        // Member names are compared in their escaped form.
        let key_raw = &key_json[1..key_json.len() - 1];

        let mut json: String<MAX_OBJECT_LEN> = String::new();
        write!(json, "{{{}:{}", key_json, value_json).map_err(|_| ObjectError::TooLarge)?;
        let mut overflow = false;
        visit_members(&self.json, |name, member, _| {
            if name != key_raw && write!(json, ",{}", member).is_err() {
                overflow = true;
            }
            !overflow
        })
        .ok_or(ObjectError::NotAnObject)?;
        if overflow {
            return Err(ObjectError::TooLarge);
        }
        json.push('}').map_err(|_| ObjectError::TooLarge)?;

        self.json = json;
        Ok(())
    }
}

impl fmt::Display for FirebaseObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.json)
    }
}

/// Finds the value of member `key` in the JSON object `object`.
fn find_member<'a>(object: &'a str, key: &str) -> Option<&'a str> {
    let mut found = None;
    visit_members(object, |name, _, value| {
        if name == key {
            found = Some(value);
        }
        found.is_none()
    })?;
    found
}

/// Calls `visit` with the raw name, the full `"name": value` text and the
/// value of each member of the JSON object `object`, until it returns
/// `false`. Returns `None` if `object` is not a well-formed object up to
/// that point.
fn visit_members<'a>(object: &'a str, mut visit: impl FnMut(&'a str, &'a str, &'a str) -> bool) -> Option<()> {
    let bytes = object.as_bytes();
    let mut i = skip_whitespace(bytes, 0);
    if bytes.get(i) != Some(&b'{') {
        return None;
    }
    i = skip_whitespace(bytes, i + 1);
    if bytes.get(i) == Some(&b'}') {
        return Some(());
    }

    loop {
        if bytes.get(i)? != &b'"' {
            return None;
        }
        let name_end = scan_string(bytes, i)?;
        let name = &object[i + 1..name_end - 1];

        let mut value_start = skip_whitespace(bytes, name_end);
        if bytes.get(value_start) != Some(&b':') {
            return None;
        }
        value_start = skip_whitespace(bytes, value_start + 1);
        let value_end = scan_value(bytes, value_start)?;
        if !visit(name, &object[i..value_end], &object[value_start..value_end]) {
            return Some(());
        }

        i = skip_whitespace(bytes, value_end);
        match bytes.get(i)? {
            b',' => i = skip_whitespace(bytes, i + 1),
            b'}' => return Some(()),
            _ => return None,
        }
    }
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while bytes.get(i).is_some_and(|byte| byte.is_ascii_whitespace()) {
        i += 1;
    }
    i
}

/// Returns the index just past the closing quote of the string starting at `start`.
fn scan_string(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start + 1;
    let mut escape_next = false;
    while let Some(&byte) = bytes.get(i) {
        i += 1;
        if escape_next {
            escape_next = false;
        } else if byte == b'\\' {
            escape_next = true;
        } else if byte == b'"' {
            return Some(i);
        }
    }
    None
}

/// Returns the index just past the value starting at `start`.
fn scan_value(bytes: &[u8], start: usize) -> Option<usize> {
    match bytes.get(start)? {
        b'"' => scan_string(bytes, start),
        b'{' | b'[' => {
            let mut depth = 0usize;
            let mut i = start;
            while let Some(&byte) = bytes.get(i) {
                match byte {
                    b'"' => {
                        i = scan_string(bytes, i)?;
                        continue;
                    }
                    b'{' | b'[' => depth += 1,
                    b'}' | b']' => {
                        depth -= 1;
                        if depth == 0 {
                            return Some(i + 1);
                        }
                    }
                    _ => {}
                }
                i += 1;
            }
            None
        }
        _ => {
            let mut i = start;
            while let Some(&byte) = bytes.get(i) {
                if matches!(byte, b',' | b'}' | b']') || byte.is_ascii_whitespace() {
                    break;
                }
                i += 1;
            }
            if i == start { None } else { Some(i) }
        }
    }
}

fn unescape(content: &str) -> Option<String<MAX_STRING_LEN>> {
    let mut out = String::new();
    let mut chars = content.chars();
    while let Some(c) = chars.next() {
        let c = if c == '\\' {
            match chars.next()? {
                'n' => '\n',
                't' => '\t',
                'r' => '\r',
                'b' => '\u{8}',
                'f' => '\u{c}',
                'u' => {
                    let mut hex: String<4> = String::new();
                    for _ in 0..4 {
                        hex.push(chars.next()?).ok()?;
                    }
                    let code = u32::from_str_radix(&hex, 16).ok()?;
                    char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)
                }
                other => other,
            }
        } else {
            c
        };
        out.push(c).ok()?;
    }
    Some(out)
}
