//! Client sort specifications.
//!
//! A sort specification is a JSON array such as
//! `[{"field":"comment","direction":"asc"},{"field":"author.name"}]`.
//! Each entry is resolved against a [`RecordDescriptor`] and the result is an
//! unbound [`Cursor`] with the identifier appended as a final tie-break.

use std::str::FromStr;

use derive_more::Deref;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::cursor::{Cursor, Direction};
use crate::schema::RecordDescriptor;
use crate::{Error, Result, TRACING_TARGET_SORTING, Value};

/// A single client sort entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct SortEntry {
    /// Dot-separated sort path, e.g. `comment` or `author.name`.
    pub field: String,
    /// `asc` or `desc` (case-insensitive); anything else sorts ascending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
}

impl SortEntry {
    /// Creates a sort entry with an explicit direction.
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            direction: Some(direction.to_string()),
        }
    }

    /// Creates an ascending sort entry.
    #[inline]
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, Direction::Asc)
    }

    /// Creates a descending sort entry.
    #[inline]
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, Direction::Desc)
    }

    /// Returns the parsed direction.
    pub fn direction(&self) -> Direction {
        self.direction
            .as_deref()
            .map(Direction::parse_lenient)
            .unwrap_or_default()
    }
}

/// An ordered list of client sort entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(transparent)]
pub struct SortSpec(Vec<SortEntry>);

impl SortSpec {
    /// Creates a sort specification from entries.
    pub fn new(entries: impl IntoIterator<Item = SortEntry>) -> Self {
        Self(entries.into_iter().collect())
    }

    /// Parses the JSON form of a sort specification.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSorting`] if the input is not a JSON array of
    /// sort entries.
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| {
            tracing::debug!(target: TRACING_TARGET_SORTING, error = %err, "Malformed sort specification");
            Error::InvalidSorting(format!("malformed sort specification: {err}").into())
        })
    }

    /// Translates the sort entries into an unbound cursor.
    ///
    /// Every entry becomes a `Null`-valued cursor field named by its storage
    /// identifier. A repeated field keeps its first position and takes the
    /// last direction. The identifier is appended ascending unless already
    /// present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSorting`] if an entry does not resolve to a
    /// sortable field.
    pub fn to_cursor(&self, descriptor: &RecordDescriptor, limit: i64) -> Result<Cursor> {
        let mut cursor = Cursor::new(limit);

        for entry in &self.0 {
            let resolved = descriptor.resolve(&entry.field).map_err(|err| {
                tracing::debug!(
                    target: TRACING_TARGET_SORTING,
                    record = descriptor.name(),
                    field = %entry.field,
                    "Sort field does not resolve"
                );
                Error::InvalidSorting(err.to_string().into())
            })?;

            cursor.set_field(resolved.column, Value::Null, entry.direction());
        }

        let identifier = descriptor.identifier_column();
        if cursor.field(identifier).is_none() {
            cursor.set_field(identifier, Value::Null, Direction::Asc);
        }

        tracing::trace!(
            target: TRACING_TARGET_SORTING,
            record = descriptor.name(),
            fields = cursor.fields.len(),
            "Translated sort specification"
        );

        Ok(cursor)
    }
}

impl FromStr for SortSpec {
    type Err = Error;

    fn from_str(json: &str) -> Result<Self> {
        Self::parse(json)
    }
}

impl FromIterator<SortEntry> for SortSpec {
    fn from_iter<I: IntoIterator<Item = SortEntry>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValueKind;
    use crate::cursor::CursorField;
    use crate::schema::FieldNode;

    fn descriptor() -> RecordDescriptor {
        let user = RecordDescriptor::builder("User")
            .scalar("id", ValueKind::Int)
            .scalar("name", ValueKind::Text)
            .build()
            .unwrap();

        RecordDescriptor::builder("Material")
            .scalar("id", ValueKind::Int)
            .scalar("comment", ValueKind::Text)
            .field(FieldNode::scalar("item_id", ValueKind::Text).with_sort_alias("item_id_cursor"))
            .joined("author", "Author", user)
            .build()
            .unwrap()
    }

    fn unbound(name: &str, direction: Direction) -> CursorField {
        CursorField::new(name, Value::Null, direction)
    }

    #[test]
    fn appends_identifier_tie_break() {
        let spec = SortSpec::parse(r#"[{"field":"comment","direction":"desc"}]"#).unwrap();
        let cursor = spec.to_cursor(&descriptor(), 10).unwrap();

        assert_eq!(
            cursor.fields,
            vec![unbound("comment", Direction::Desc), unbound("id", Direction::Asc)]
        );
        assert_eq!(cursor.limit, 10);
        assert!(!cursor.backward);
    }

    #[test]
    fn keeps_explicit_identifier_direction() {
        let spec = SortSpec::parse(
            r#"[{"field":"comment","direction":"asc"},{"field":"id","direction":"DESC"}]"#,
        )
        .unwrap();
        let cursor = spec.to_cursor(&descriptor(), 2).unwrap();

        assert_eq!(
            cursor.fields,
            vec![unbound("comment", Direction::Asc), unbound("id", Direction::Desc)]
        );
    }

    #[test]
    fn resolves_aliases_and_joins() {
        let spec = SortSpec::new([SortEntry::asc("item_id_cursor"), SortEntry::desc("author.name")]);
        let cursor = spec.to_cursor(&descriptor(), 2).unwrap();

        assert_eq!(
            cursor.fields,
            vec![
                unbound("item_id", Direction::Asc),
                unbound("\"Author__name\"", Direction::Desc),
                unbound("id", Direction::Asc),
            ]
        );
    }

    #[test]
    fn missing_or_unknown_direction_is_ascending() {
        let spec = SortSpec::parse(r#"[{"field":"comment"},{"field":"id","direction":"up"}]"#)
            .unwrap();
        let cursor = spec.to_cursor(&descriptor(), 2).unwrap();

        assert!(cursor.fields.iter().all(|field| field.direction == Direction::Asc));
    }

    #[test]
    fn repeated_fields_are_merged() {
        let spec = SortSpec::new([
            SortEntry::asc("comment"),
            SortEntry::desc("id"),
            SortEntry::desc("comment"),
        ]);
        let cursor = spec.to_cursor(&descriptor(), 2).unwrap();

        assert_eq!(
            cursor.fields,
            vec![unbound("comment", Direction::Desc), unbound("id", Direction::Desc)]
        );
    }

    #[test]
    fn empty_specification_sorts_by_identifier() {
        let cursor = SortSpec::parse("[]").unwrap().to_cursor(&descriptor(), 5).unwrap();
        assert_eq!(cursor, Cursor::identifier_default(&descriptor(), 5));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let spec = SortSpec::new([SortEntry::asc("author.nonexistent")]);
        assert!(matches!(
            spec.to_cursor(&descriptor(), 2),
            Err(Error::InvalidSorting(_))
        ));
    }

    #[test]
    fn malformed_json_is_rejected() {
        for input in ["", "{", r#"{"field":"id"}"#, r#"[{"direction":"asc"}]"#] {
            assert!(matches!(SortSpec::parse(input), Err(Error::InvalidSorting(_))), "{input}");
        }
    }
}
