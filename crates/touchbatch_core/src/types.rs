//! Core type definitions for TouchBatch.

use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Identity of a record within its class.
///
/// Persisted records usually derive their identity from the primary key
/// via [`RecordId::from_u64`]. Records that have no row yet get a random
/// identity from [`RecordId::new`], which stays stable once they are saved.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId([u8; 16]);

impl RecordId {
    /// Creates a record ID from raw bytes.
    #[inline]
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Creates a new random record ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().into_bytes())
    }

    /// Creates a record ID from an integer primary key.
    #[must_use]
    pub const fn from_u64(key: u64) -> Self {
        Self::from_bytes((key as u128).to_be_bytes())
    }

    /// Converts to a UUID.
    #[must_use]
    pub fn to_uuid(&self) -> Uuid {
        Uuid::from_bytes(self.0)
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.to_uuid())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uuid())
    }
}

/// Name of a record class (model type).
///
/// Batched writes operate on one class at a time.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassTag(Arc<str>);

impl ClassTag {
    /// Creates a class tag from a name.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    /// Returns the class name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ClassTag {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for ClassTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a record across classes.
///
/// This is what the pending and written sets store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordKey {
    class: ClassTag,
    id: RecordId,
}

impl RecordKey {
    /// Creates a record key.
    #[must_use]
    pub fn new(class: ClassTag, id: RecordId) -> Self {
        Self { class, id }
    }

    /// Returns the record's class.
    #[must_use]
    pub fn class(&self) -> &ClassTag {
        &self.class
    }

    /// Returns the record's identity within its class.
    #[must_use]
    pub fn id(&self) -> RecordId {
        self.id
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.class, self.id)
    }
}

/// A record as seen by the interception layer at registration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TouchRecord {
    key: RecordKey,
    persisted: bool,
}

impl TouchRecord {
    /// Creates a record that already has a row.
    #[must_use]
    pub fn persisted(class: impl Into<ClassTag>, id: RecordId) -> Self {
        Self {
            key: RecordKey::new(class.into(), id),
            persisted: true,
        }
    }

    /// Creates a record that has not been saved yet.
    #[must_use]
    pub fn unpersisted(class: impl Into<ClassTag>, id: RecordId) -> Self {
        Self {
            key: RecordKey::new(class.into(), id),
            persisted: false,
        }
    }

    /// Returns the record key.
    #[must_use]
    pub fn key(&self) -> &RecordKey {
        &self.key
    }

    /// Returns the record's class.
    #[must_use]
    pub fn class(&self) -> &ClassTag {
        self.key.class()
    }

    /// Returns whether the record has a row to update.
    #[must_use]
    pub fn is_persisted(&self) -> bool {
        self.persisted
    }
}

/// Name of a timestamp column.
///
/// The empty string is a valid column name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Column(String);

impl Column {
    /// Creates a column name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the column name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Column {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl From<String> for Column {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
