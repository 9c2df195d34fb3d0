//! Translation between client sort paths, storage identifiers and row values.

use derive_more::Deref;

use super::{FieldKind, FieldNode, FieldRef, JOIN_SEPARATOR, Record, RecordDescriptor};
use crate::{Value, ValueKind};

/// A sort path that does not name a sortable scalar field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// No field matches the path.
    #[error("sort field `{0}` not found")]
    NotFound(String),
}

/// Chain of natural field names leading from a record to a scalar value.
///
/// Embedding fields are part of the chain, so the path of a promoted `id`
/// declared inside an embedded `base` structure is `["base", "id"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deref)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Creates a path from natural field names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    /// Reads the scalar value at this path.
    ///
    /// A `Null` encountered on the way (e.g. an absent joined entity) reads
    /// as `Null`. Returns `None` if the record does not expose the path.
    pub fn read<'a>(&self, record: &'a dyn Record) -> Option<Value> {
        let (last, parents) = self.0.split_last()?;

        let mut current: &'a dyn Record = record;
        for name in parents {
            match current.field(name)? {
                FieldRef::Record(inner) => current = inner,
                FieldRef::Value(Value::Null) => return Some(Value::Null),
                FieldRef::Value(_) => return None,
            }
        }

        match current.field(last)? {
            FieldRef::Value(value) => Some(value),
            FieldRef::Record(_) => None,
        }
    }
}

/// A sort path resolved to its storage identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    /// Storage identifier: a plain column, or a quoted `"<alias>__<column>"`
    /// composite for joined entities.
    pub column: String,
    /// Natural-name chain used to read the value from fetched rows.
    pub path: FieldPath,
}

/// A storage identifier mapped back to the scalar field it names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifiedColumn {
    /// Natural-name chain used to read the value from fetched rows.
    pub path: FieldPath,
    /// Declared kind of the column's values.
    pub kind: ValueKind,
    /// Whether the column may hold `NULL`, either declared so or read
    /// through a joined entity.
    pub nullable: bool,
}

fn composite_identifier(alias: &str, column: &str) -> String {
    format!("\"{alias}{JOIN_SEPARATOR}{column}\"")
}

fn scalar_column(column: &str) -> impl Fn(&FieldNode) -> bool + '_ {
    move |node| node.is_scalar() && node.column() == column
}

fn owned(chain: Vec<&str>) -> Vec<String> {
    chain.into_iter().map(str::to_owned).collect()
}

impl RecordDescriptor {
    /// Resolves a dot-separated client sort path to a storage identifier.
    ///
    /// A single segment names a scalar field of the record (embedded fields
    /// included). Two segments name a joined entity followed by one of its
    /// scalar fields. Anything else is [`ResolveError::NotFound`].
    pub fn resolve(&self, path: &str) -> Result<ResolvedField, ResolveError> {
        let not_found = || ResolveError::NotFound(path.to_owned());

        let mut segments = path.split('.');
        let head = segments
            .next()
            .filter(|segment| !segment.is_empty())
            .ok_or_else(not_found)?;
        let (chain, node) = self.lookup(head).ok_or_else(not_found)?;

        match node.kind() {
            FieldKind::Scalar(_) => {
                if segments.next().is_some() {
                    return Err(not_found());
                }

                Ok(ResolvedField {
                    column: node.column().to_owned(),
                    path: FieldPath(owned(chain)),
                })
            }
            FieldKind::Joined { alias, entity } => {
                let tail = segments.next().ok_or_else(not_found)?;
                if segments.next().is_some() {
                    return Err(not_found());
                }

                let (inner_chain, inner) = entity.lookup(tail).ok_or_else(not_found)?;
                if !inner.is_scalar() {
                    return Err(not_found());
                }

                let mut names = owned(chain);
                names.extend(owned(inner_chain));

                Ok(ResolvedField {
                    column: composite_identifier(alias, inner.column()),
                    path: FieldPath(names),
                })
            }
            FieldKind::Embedded(_) => Err(not_found()),
        }
    }

    /// Maps a storage identifier back to the path that reads its value.
    ///
    /// Accepts plain columns (declared directly or through embedding) and
    /// composite `"<alias>__<column>"` identifiers, quoted or not.
    #[inline]
    pub fn identify(&self, identifier: &str) -> Option<FieldPath> {
        self.identify_column(identifier).map(|column| column.path)
    }

    /// Returns whether the identified column may hold `NULL`.
    ///
    /// Unknown identifiers are reported as not nullable.
    pub fn is_nullable(&self, identifier: &str) -> bool {
        self.identify_column(identifier)
            .is_some_and(|column| column.nullable)
    }

    /// Maps a storage identifier back to its read path, value kind and
    /// nullability.
    pub fn identify_column(&self, identifier: &str) -> Option<IdentifiedColumn> {
        let raw = identifier
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
            .unwrap_or(identifier);

        if let Some((chain, node)) = self.find(&scalar_column(raw)) {
            return Some(IdentifiedColumn {
                path: FieldPath(owned(chain)),
                kind: node.value_kind()?,
                nullable: node.is_nullable(),
            });
        }

        let (alias, column) = raw.split_once(JOIN_SEPARATOR)?;
        let (chain, node) = self.find(&|node: &FieldNode| {
            matches!(node.kind(), FieldKind::Joined { alias: candidate, .. } if candidate == alias)
        })?;
        let FieldKind::Joined { entity, .. } = node.kind() else {
            return None;
        };
        let (inner_chain, inner) = entity.find(&scalar_column(column))?;

        let mut names = owned(chain);
        names.extend(owned(inner_chain));
        Some(IdentifiedColumn {
            path: FieldPath(names),
            kind: inner.value_kind()?,
            nullable: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Base {
        id: i64,
    }

    impl Record for Base {
        fn field(&self, name: &str) -> Option<FieldRef<'_>> {
            match name {
                "id" => Some(FieldRef::value(self.id)),
                _ => None,
            }
        }
    }

    struct User {
        base: Base,
        name: String,
    }

    impl Record for User {
        fn field(&self, name: &str) -> Option<FieldRef<'_>> {
            Some(match name {
                "base" => FieldRef::Record(&self.base),
                "name" => FieldRef::value(&self.name),
                _ => return None,
            })
        }
    }

    struct Material {
        base: Base,
        comment: String,
        author: Option<User>,
    }

    impl Record for Material {
        fn field(&self, name: &str) -> Option<FieldRef<'_>> {
            Some(match name {
                "base" => FieldRef::Record(&self.base),
                "comment" => FieldRef::value(&self.comment),
                "author" => FieldRef::Record(&self.author),
                _ => return None,
            })
        }
    }

    fn base() -> RecordDescriptor {
        RecordDescriptor::builder("BaseModel")
            .scalar("id", ValueKind::Int)
            .field(FieldNode::scalar("created_at", ValueKind::Timestamp).with_sort_alias("createdAt"))
            .field(FieldNode::scalar("updated_at", ValueKind::Timestamp).with_serialized_name("updated_at"))
            .build()
            .unwrap()
    }

    fn user() -> RecordDescriptor {
        RecordDescriptor::builder("User")
            .embedded("base", base())
            .scalar("name", ValueKind::Text)
            .field(FieldNode::scalar("role", ValueKind::Int).with_sort_alias("roleID"))
            .build()
            .unwrap()
    }

    fn material() -> RecordDescriptor {
        RecordDescriptor::builder("Material")
            .embedded("base", base())
            .scalar("comment", ValueKind::Text)
            .field(FieldNode::scalar("item_type", ValueKind::Text).with_sort_alias("item_type_name"))
            .field(
                FieldNode::scalar("public_at", ValueKind::Timestamp)
                    .with_serialized_name("PublicTime")
                    .nullable(),
            )
            .joined("author", "Author", user())
            .build()
            .unwrap()
    }

    fn resolved(column: &str, path: &[&str]) -> ResolvedField {
        ResolvedField {
            column: column.to_owned(),
            path: FieldPath::new(path.iter().copied()),
        }
    }

    #[test]
    fn resolves_direct_and_embedded_fields() {
        let descriptor = material();

        assert_eq!(descriptor.resolve("comment"), Ok(resolved("comment", &["comment"])));
        assert_eq!(descriptor.resolve("id"), Ok(resolved("id", &["base", "id"])));
        assert_eq!(
            descriptor.resolve("createdAt"),
            Ok(resolved("created_at", &["base", "created_at"]))
        );
        assert_eq!(
            descriptor.resolve("updated_at"),
            Ok(resolved("updated_at", &["base", "updated_at"]))
        );
    }

    #[test]
    fn resolves_aliases_and_serialized_names() {
        let descriptor = material();

        assert_eq!(
            descriptor.resolve("item_type_name"),
            Ok(resolved("item_type", &["item_type"]))
        );
        assert_eq!(
            descriptor.resolve("publictime"),
            Ok(resolved("public_at", &["public_at"]))
        );
    }

    #[test]
    fn resolves_joined_fields_to_composite_identifiers() {
        let descriptor = material();

        assert_eq!(
            descriptor.resolve("author.name"),
            Ok(resolved("\"Author__name\"", &["author", "name"]))
        );
        assert_eq!(
            descriptor.resolve("author.id"),
            Ok(resolved("\"Author__id\"", &["author", "base", "id"]))
        );
        assert_eq!(
            descriptor.resolve("Author.roleID"),
            Ok(resolved("\"Author__role\"", &["author", "role"]))
        );
    }

    #[test]
    fn rejects_unknown_and_non_scalar_paths() {
        let descriptor = material();

        for path in [
            "",
            "unknown",
            "author",
            "base",
            "author.nonexistent",
            "comment.length",
            "author.name.first",
        ] {
            assert_eq!(
                descriptor.resolve(path),
                Err(ResolveError::NotFound(path.to_owned())),
                "{path}"
            );
        }
    }

    #[test]
    fn identifies_storage_identifiers() {
        let descriptor = material();

        assert_eq!(descriptor.identify("id"), Some(FieldPath::new(["base", "id"])));
        assert_eq!(
            descriptor.identify("\"Author__name\""),
            Some(FieldPath::new(["author", "name"]))
        );
        assert_eq!(
            descriptor.identify("Author__id"),
            Some(FieldPath::new(["author", "base", "id"]))
        );
        assert_eq!(descriptor.identify("item_type_name"), None);
        assert_eq!(descriptor.identify("\"Editor__name\""), None);
    }

    #[test]
    fn identified_columns_carry_kind_and_nullability() {
        let descriptor = material();

        let id = descriptor.identify_column("id").unwrap();
        assert_eq!(id.kind, ValueKind::Int);
        assert!(!id.nullable);

        let public_at = descriptor.identify_column("public_at").unwrap();
        assert_eq!(public_at.kind, ValueKind::Timestamp);
        assert!(public_at.nullable);

        let author_name = descriptor.identify_column("\"Author__name\"").unwrap();
        assert_eq!(author_name.kind, ValueKind::Text);
        assert!(author_name.nullable);

        assert!(descriptor.is_nullable("\"Author__role\""));
        assert!(!descriptor.is_nullable("comment"));
        assert!(!descriptor.is_nullable("missing"));
    }

    #[test]
    fn reads_values_through_embedding_and_joins() {
        let row = Material {
            base: Base { id: 4 },
            comment: "C".into(),
            author: Some(User {
                base: Base { id: 2 },
                name: "A".into(),
            }),
        };

        assert_eq!(FieldPath::new(["base", "id"]).read(&row), Some(Value::Int(4)));
        assert_eq!(
            FieldPath::new(["author", "name"]).read(&row),
            Some(Value::from("A"))
        );
        assert_eq!(
            FieldPath::new(["author", "base", "id"]).read(&row),
            Some(Value::Int(2))
        );
        assert_eq!(FieldPath::new(["comment", "x"]).read(&row), None);
        assert_eq!(FieldPath::new(["author"]).read(&row), None);
    }

    #[test]
    fn absent_join_reads_null() {
        let row = Material {
            base: Base { id: 1 },
            comment: "B".into(),
            author: None,
        };

        assert_eq!(
            FieldPath::new(["author", "name"]).read(&row),
            Some(Value::Null)
        );
    }
}
