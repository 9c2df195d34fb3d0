//! Row access used to read boundary values from fetched records.

use std::sync::Arc;

use super::RecordDescriptor;
use crate::Value;

/// The result of looking up a field on a [`Record`].
#[derive(Clone)]
pub enum FieldRef<'a> {
    /// A scalar value.
    Value(Value),
    /// A nested record (an embedded structure or a joined entity).
    Record(&'a dyn Record),
}

impl FieldRef<'_> {
    /// Creates a scalar field reference from anything convertible into a [`Value`].
    #[inline]
    pub fn value(value: impl Into<Value>) -> Self {
        Self::Value(value.into())
    }
}

impl std::fmt::Debug for FieldRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Record(_) => f.debug_tuple("Record").finish_non_exhaustive(),
        }
    }
}

/// Field access by natural (declared) field name.
///
/// Implementations return `None` for names they do not know.
///
/// ```
/// use nvisy_keyset::schema::{FieldRef, Record};
///
/// struct Tag {
///     id: i64,
///     label: String,
/// }
///
/// impl Record for Tag {
///     fn field(&self, name: &str) -> Option<FieldRef<'_>> {
///         Some(match name {
///             "id" => FieldRef::value(self.id),
///             "label" => FieldRef::value(&self.label),
///             _ => return None,
///         })
///     }
/// }
/// ```
pub trait Record {
    /// Looks up a field by its natural name.
    fn field(&self, name: &str) -> Option<FieldRef<'_>>;
}

/// A record type that carries its own descriptor.
pub trait Entity: Record {
    /// Returns the shared descriptor of this record type.
    fn descriptor() -> Arc<RecordDescriptor>;
}

/// An absent joined entity reads as `Null` for every field.
impl<T: Record> Record for Option<T> {
    fn field(&self, name: &str) -> Option<FieldRef<'_>> {
        match self {
            Some(record) => record.field(name),
            None => Some(FieldRef::Value(Value::Null)),
        }
    }
}

impl<T: Record + ?Sized> Record for Box<T> {
    #[inline]
    fn field(&self, name: &str) -> Option<FieldRef<'_>> {
        (**self).field(name)
    }
}

impl<T: Record + ?Sized> Record for Arc<T> {
    #[inline]
    fn field(&self, name: &str) -> Option<FieldRef<'_>> {
        (**self).field(name)
    }
}
