//! Nested fake-data tree bound into template placeholders.
//!
//! A [`DataRecord`] maps field names to [`Field`] values; a field is either a
//! scalar leaf, an explicit null, or another record. Templates address leaves
//! with dotted paths (`candidato.documentos.cpf`), resolved by
//! [`DataRecord::lookup`] into a tagged [`Lookup`] that never fails.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::Serialize;

/// A single value inside a [`DataRecord`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Field {
    /// Explicitly absent value (e.g. a person without a bar registration).
    Null,
    /// Boolean leaf.
    Bool(bool),
    /// Integer leaf.
    Int(i64),
    /// Decimal leaf (percentages, ratios).
    Decimal(f64),
    /// Text leaf.
    Text(String),
    /// Nested sub-record.
    Record(DataRecord),
}

impl Field {
    /// Render a scalar leaf as template text.
    ///
    /// Returns `None` for [`Field::Null`] and nested records, which cannot be
    /// substituted into a sentence.
    pub fn render(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Text(s) => Some(Cow::Borrowed(s.as_str())),
            Self::Int(n) => Some(Cow::Owned(n.to_string())),
            Self::Decimal(x) => Some(Cow::Owned(render_decimal(*x))),
            Self::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
            Self::Null | Self::Record(_) => None,
        }
    }

    /// Text content, if this is a text leaf.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Nested record, if this is a sub-record.
    pub fn as_record(&self) -> Option<&DataRecord> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Whether this field is a scalar leaf (not null, not a record).
    pub fn is_leaf(&self) -> bool {
        !matches!(self, Self::Null | Self::Record(_))
    }
}

/// One decimal place, without a sign on zero.
fn render_decimal(value: f64) -> String {
    let text = format!("{value:.1}");
    match text.strip_prefix('-') {
        Some(unsigned) if unsigned.bytes().all(|b| b == b'0' || b == b'.') => unsigned.to_owned(),
        _ => text,
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Field {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Field {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Field {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Field {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Field {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

impl From<bool> for Field {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<DataRecord> for Field {
    fn from(value: DataRecord) -> Self {
        Self::Record(value)
    }
}

impl<T: Into<Field>> From<Option<T>> for Field {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Why a dotted path did not resolve to a printable leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingReason {
    /// A segment names a field that does not exist.
    Absent,
    /// The path ends on an explicit null.
    Null,
    /// The path ends on a sub-record rather than a leaf.
    NotALeaf,
    /// A middle segment is a scalar, so the remaining segments cannot apply.
    ThroughScalar,
}

/// Result of resolving a dotted path against a record.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<'a> {
    /// The path names a printable scalar leaf.
    Found(&'a Field),
    /// The path did not resolve.
    Missing {
        /// The full dotted path that was requested.
        path: String,
        /// Classification of the failure.
        reason: MissingReason,
    },
}

impl Lookup<'_> {
    /// Whether the lookup found a leaf.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Tree of named fields produced by an entity source.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DataRecord {
    fields: BTreeMap<String, Field>,
}

impl DataRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Field>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a top-level field.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Field>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Merge every field of `other` into this record, replacing duplicates.
    pub fn extend(&mut self, other: DataRecord) {
        self.fields.extend(other.fields);
    }

    /// Top-level field by name.
    pub fn get(&self, key: &str) -> Option<&Field> {
        self.fields.get(key)
    }

    /// Number of top-level fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over top-level field names.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Resolve a dotted path (`a.b.c`) to a leaf.
    ///
    /// Never fails: anything that does not end on a printable leaf comes back
    /// as [`Lookup::Missing`] carrying the requested path.
    pub fn lookup(&self, path: &str) -> Lookup<'_> {
        let missing = |reason| Lookup::Missing {
            path: path.to_owned(),
            reason,
        };

        let mut segments = path.split('.').peekable();
        let mut current = self;
        while let Some(segment) = segments.next() {
            let Some(field) = current.fields.get(segment) else {
                return missing(MissingReason::Absent);
            };
            let is_last = segments.peek().is_none();
            match field {
                Field::Record(nested) if !is_last => current = nested,
                Field::Record(_) => return missing(MissingReason::NotALeaf),
                Field::Null if is_last => return missing(MissingReason::Null),
                _ if !is_last => return missing(MissingReason::ThroughScalar),
                leaf => return Lookup::Found(leaf),
            }
        }
        missing(MissingReason::Absent)
    }

    /// Replace an existing leaf addressed by a dotted path.
    ///
    /// Only succeeds when the path already resolves to a leaf, so callers can
    /// never remove a field or turn a record into a scalar. Returns whether the
    /// value was replaced.
    pub fn replace_leaf(&mut self, path: &str, value: impl Into<Field>) -> bool {
        let Some((parents, last)) = split_parent(path) else {
            return match self.fields.get_mut(path) {
                Some(slot) if slot.is_leaf() => {
                    *slot = value.into();
                    true
                }
                _ => false,
            };
        };

        let mut current = self;
        for segment in parents.split('.') {
            match current.fields.get_mut(segment) {
                Some(Field::Record(nested)) => current = nested,
                _ => return false,
            }
        }
        match current.fields.get_mut(last) {
            Some(slot) if slot.is_leaf() => {
                *slot = value.into();
                true
            }
            _ => false,
        }
    }
}

fn split_parent(path: &str) -> Option<(&str, &str)> {
    path.rsplit_once('.')
}
