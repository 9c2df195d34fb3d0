//! Keyset cursors and their opaque token form.

use std::fmt;
use std::str::FromStr;

use base64::prelude::*;
use derive_more::{Deref, From};
use serde::{Deserialize, Serialize};

use super::Direction;
use crate::schema::RecordDescriptor;
use crate::{Error, Result, TRACING_TARGET_CURSOR, Value};

/// One component of a keyset position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CursorField {
    /// Storage identifier of the sort column.
    pub name: String,
    /// Boundary value, `Null` when the cursor is unbound.
    pub value: Value,
    /// Declared sort direction.
    pub direction: Direction,
}

impl CursorField {
    /// Creates a cursor field.
    pub fn new(name: impl Into<String>, value: impl Into<Value>, direction: Direction) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            direction,
        }
    }

    /// Returns the direction in effect for the given traversal.
    #[inline]
    pub fn effective_direction(&self, backward: bool) -> Direction {
        self.direction.backward(backward)
    }
}

/// A position in an ordered record collection.
///
/// The cursor records the ordered list of sort fields, the page size and the
/// traversal direction. Its token form (see [`Cursor::encode`]) is what
/// clients receive and send back.
///
/// ```
/// use nvisy_keyset::cursor::{Cursor, Direction};
///
/// let cursor = Cursor::new(2)
///     .with_field("comment", "A", Direction::Asc)
///     .with_field("id", 6, Direction::Desc);
///
/// let token = cursor.encode();
/// assert_eq!(Cursor::decode(&token)?, cursor);
/// # Ok::<(), nvisy_keyset::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cursor {
    /// Ordered sort fields; the last one is normally the identifier tie-break.
    pub fields: Vec<CursorField>,
    /// Page size.
    pub limit: i64,
    /// Whether the traversal runs against the declared directions.
    pub backward: bool,
}

impl Cursor {
    /// Creates an empty forward cursor with the given page size.
    pub fn new(limit: i64) -> Self {
        Self {
            fields: Vec::new(),
            limit,
            backward: false,
        }
    }

    /// Creates the default cursor: identifier ascending, unbound.
    pub fn identifier_default(descriptor: &RecordDescriptor, limit: i64) -> Self {
        Self::new(limit).with_field(descriptor.identifier_column(), Value::Null, Direction::Asc)
    }

    /// Adds a field, replacing an existing field of the same name in place.
    pub fn with_field(
        mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
        direction: Direction,
    ) -> Self {
        self.set_field(name, value, direction);
        self
    }

    /// Adds a field, replacing an existing field of the same name in place.
    pub fn set_field(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
        direction: Direction,
    ) {
        let name = name.into();
        let value = value.into();

        match self.fields.iter_mut().find(|field| field.name == name) {
            Some(field) => {
                field.value = value;
                field.direction = direction;
            }
            None => self.fields.push(CursorField {
                name,
                value,
                direction,
            }),
        }
    }

    /// Marks the cursor as backward.
    pub fn set_backward(mut self) -> Self {
        self.backward = true;
        self
    }

    /// Sets the traversal direction flag.
    pub fn with_backward(mut self, backward: bool) -> Self {
        self.backward = backward;
        self
    }

    /// Sets the page size.
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    /// Returns the field with the given storage identifier.
    pub fn field(&self, name: &str) -> Option<&CursorField> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Returns whether the cursor is not positioned on any row.
    ///
    /// A cursor is unbound when every value is `Null`; an unbound cursor
    /// selects from the start of the ordering. A bound cursor always carries
    /// its identifier value, so `Null`s in it are genuine `NULL` sort keys.
    pub fn is_unbound(&self) -> bool {
        self.fields.iter().all(|field| field.value.is_null())
    }

    /// Checks the structural invariants: at least one named field and a
    /// positive page size.
    pub fn validate(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(Error::InvalidCursor("cursor has no fields".into()));
        }

        if self.fields.iter().any(|field| field.name.is_empty()) {
            return Err(Error::InvalidCursor("cursor field has an empty name".into()));
        }

        if self.limit <= 0 {
            return Err(Error::InvalidCursor(
                format!("limit must be positive, got {}", self.limit).into(),
            ));
        }

        Ok(())
    }

    /// Encodes the cursor as an opaque token.
    ///
    /// The token is the standard base64 encoding of the cursor's JSON form.
    pub fn encode(&self) -> String {
        match serde_json::to_vec(self) {
            Ok(json) => BASE64_STANDARD.encode(json),
            Err(err) => {
                tracing::error!(target: TRACING_TARGET_CURSOR, error = %err, "Failed to serialize cursor");
                String::new()
            }
        }
    }

    /// Decodes and validates an opaque token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCursor`] if the token is not base64, not a
    /// cursor document, or violates the cursor invariants.
    pub fn decode(token: &str) -> Result<Self> {
        let json = BASE64_STANDARD.decode(token).map_err(|err| {
            tracing::debug!(target: TRACING_TARGET_CURSOR, error = %err, "Cursor token is not valid base64");
            Error::InvalidCursor("token is not valid base64".into())
        })?;

        let cursor: Self = serde_json::from_slice(&json).map_err(|err| {
            tracing::debug!(target: TRACING_TARGET_CURSOR, error = %err, "Cursor token is not a cursor document");
            Error::InvalidCursor(format!("malformed cursor: {err}").into())
        })?;

        cursor.validate()?;
        Ok(cursor)
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for Cursor {
    type Err = Error;

    fn from_str(token: &str) -> Result<Self> {
        Self::decode(token)
    }
}

/// A cursor that (de)serializes as its opaque token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deref, From, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CursorToken(Cursor);

impl CursorToken {
    /// Returns the wrapped cursor.
    #[inline]
    pub fn into_inner(self) -> Cursor {
        self.0
    }
}

impl From<CursorToken> for String {
    fn from(token: CursorToken) -> Self {
        token.0.encode()
    }
}

impl TryFrom<String> for CursorToken {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Cursor::decode(&value).map(Self)
    }
}

impl FromStr for CursorToken {
    type Err = Error;

    fn from_str(token: &str) -> Result<Self> {
        Cursor::decode(token).map(Self)
    }
}

impl fmt::Display for CursorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
