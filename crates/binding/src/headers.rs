//! Case-insensitive header storage for [`Message`](crate::Message).
//!
//! The bag keeps entries sorted by case-insensitive name, which is also the
//! order headers are written to the wire. Values stay plain strings; the wire
//! conversion happens at request build time.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

/// Replaces the base uri outright before any other override is applied.
pub const HTTP_URI: &str = "Ferry-Http-Uri";
/// Per-call method override, matched case-insensitively.
pub const HTTP_METHOD: &str = "Ferry-Http-Method";
/// Scheme override, only `http` or `https` is accepted.
pub const HTTP_SCHEME: &str = "Ferry-Http-Scheme";
/// Host override, replaces the host component verbatim.
pub const HTTP_HOST: &str = "Ferry-Http-Host";
/// Port override.
pub const HTTP_PORT: &str = "Ferry-Http-Port";
/// Path override, appended to the base path after percent-encoding.
pub const HTTP_PATH: &str = "Ferry-Http-Path";
/// Query override, replaces the query component after percent-encoding.
pub const HTTP_QUERY: &str = "Ferry-Http-Query";
/// Per-call protocol version hint, e.g. `HTTP/1.1` or `HTTP/2`.
pub const HTTP_PROTOCOL_VERSION: &str = "Ferry-Http-Protocol-Version";
/// Status code of the mapped response.
pub const HTTP_RESPONSE_CODE: &str = "Ferry-Http-Response-Code";
/// Canonical reason phrase of the mapped response status, when known.
pub const HTTP_RESPONSE_TEXT: &str = "Ferry-Http-Response-Text";

pub(crate) const CONTROL_PREFIX: &str = "Ferry-";

/// True for names in the crate's control namespace (`Ferry-*`).
pub fn is_control_header(name: &str) -> bool {
    name.get(..CONTROL_PREFIX.len()).is_some_and(|p| p.eq_ignore_ascii_case(CONTROL_PREFIX))
}

/// Header name comparing and ordering case-insensitively.
///
/// The original spelling is preserved for display and wire output.
#[derive(Debug, Clone, Default)]
pub struct FieldName(String);

impl FieldName {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for FieldName {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for FieldName {}

impl PartialOrd for FieldName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldName {
    fn cmp(&self, other: &Self) -> Ordering {
        let left = self.0.bytes().map(|b| b.to_ascii_lowercase());
        let right = other.0.bytes().map(|b| b.to_ascii_lowercase());
        left.cmp(right)
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for FieldName {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// One or many string values under a single header name.
///
/// A scalar stays observable as a scalar; appending a second value turns the
/// entry into an ordered sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Single(String),
    Multi(Vec<String>),
}

impl FieldValue {
    /// The value of a scalar entry, or the first value of a sequence.
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value),
            Self::Multi(values) => values.first().map(String::as_str),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let values: Vec<&str> = match self {
            Self::Single(value) => vec![value],
            Self::Multi(values) => values.iter().map(String::as_str).collect(),
        };
        values.into_iter()
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Multi(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Multi(values) if values.is_empty())
    }

    #[inline]
    pub fn is_single(&self) -> bool {
        matches!(self, Self::Single(_))
    }

    fn push(&mut self, value: String) {
        match self {
            Self::Single(first) => {
                let first = std::mem::take(first);
                *self = Self::Multi(vec![first, value]);
            }
            Self::Multi(values) => values.push(value),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multi(values)
    }
}

impl From<u16> for FieldValue {
    fn from(value: u16) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        Self::Single(value.to_string())
    }
}

/// Case-insensitive multimap from header name to values.
#[derive(Debug, Clone, Default)]
pub struct HeaderBag {
    entries: BTreeMap<FieldName, FieldValue>,
}

impl HeaderBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries.get(&FieldName::from(name))
    }

    /// Scalar value, or the first value of a sequence.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::first)
    }

    /// Sets the entry, replacing any previous values under the name.
    pub fn set<V: Into<FieldValue>>(&mut self, name: &str, value: V) {
        self.entries.insert(FieldName::from(name), value.into());
    }

    /// Appends one value, turning an existing scalar into a sequence.
    pub fn append<S: Into<String>>(&mut self, name: &str, value: S) {
        match self.entries.entry(FieldName::from(name)) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(FieldValue::Single(value.into()));
            }
            btree_map::Entry::Occupied(mut slot) => slot.get_mut().push(value.into()),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.entries.remove(&FieldName::from(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&FieldName::from(name))
    }

    /// Entries in case-insensitive name order.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, &FieldValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
