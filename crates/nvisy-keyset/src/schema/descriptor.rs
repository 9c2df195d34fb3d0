//! Descriptors of sortable record shapes.

use std::sync::Arc;

use crate::{Error, Result, ValueKind};

/// Separator between a join alias and a column in composite storage identifiers.
pub const JOIN_SEPARATOR: &str = "__";

/// The structural role of a [`FieldNode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// A sortable scalar column holding values of the given kind.
    Scalar(ValueKind),
    /// An embedded sub-structure whose fields are promoted into the parent.
    Embedded(Arc<RecordDescriptor>),
    /// A joined entity whose columns are selected as `"<alias>__<column>"`.
    Joined {
        /// Join alias used in composite storage identifiers.
        alias: String,
        /// Descriptor of the joined entity.
        entity: Arc<RecordDescriptor>,
    },
}

/// A single declared field of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNode {
    name: String,
    column: String,
    sort_alias: Option<String>,
    serialized_name: Option<String>,
    nullable: bool,
    kind: FieldKind,
}

impl FieldNode {
    /// Creates a non-nullable scalar field whose column equals its natural
    /// name.
    pub fn scalar(name: impl Into<String>, kind: ValueKind) -> Self {
        let name = name.into();
        Self {
            column: name.clone(),
            name,
            sort_alias: None,
            serialized_name: None,
            nullable: false,
            kind: FieldKind::Scalar(kind),
        }
    }

    /// Creates an embedded sub-structure field.
    pub fn embedded(name: impl Into<String>, entity: impl Into<Arc<RecordDescriptor>>) -> Self {
        let name = name.into();
        Self {
            column: name.clone(),
            name,
            sort_alias: None,
            serialized_name: None,
            nullable: false,
            kind: FieldKind::Embedded(entity.into()),
        }
    }

    /// Creates a joined entity field exposed under the given join alias.
    pub fn joined(
        name: impl Into<String>,
        alias: impl Into<String>,
        entity: impl Into<Arc<RecordDescriptor>>,
    ) -> Self {
        let name = name.into();
        Self {
            column: name.clone(),
            name,
            sort_alias: None,
            serialized_name: None,
            nullable: true,
            kind: FieldKind::Joined {
                alias: alias.into(),
                entity: entity.into(),
            },
        }
    }

    /// Sets the storage column name.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    /// Sets the explicit sort alias.
    pub fn with_sort_alias(mut self, alias: impl Into<String>) -> Self {
        self.sort_alias = Some(alias.into());
        self
    }

    /// Sets the name the field carries in serialized payloads.
    pub fn with_serialized_name(mut self, name: impl Into<String>) -> Self {
        self.serialized_name = Some(name.into());
        self
    }

    /// Marks the column as possibly holding `NULL`.
    ///
    /// Boundary predicates over nullable columns also reach the `NULL` rows,
    /// which sort after every value.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Returns the natural (declared) field name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the storage column name.
    #[inline]
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Returns the explicit sort alias, if any.
    #[inline]
    pub fn sort_alias(&self) -> Option<&str> {
        self.sort_alias.as_deref()
    }

    /// Returns the serialized name, if any.
    #[inline]
    pub fn serialized_name(&self) -> Option<&str> {
        self.serialized_name.as_deref()
    }

    /// Returns the structural role of the field.
    #[inline]
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Returns whether the field is a scalar column.
    #[inline]
    pub fn is_scalar(&self) -> bool {
        matches!(self.kind, FieldKind::Scalar(_))
    }

    /// Returns the value kind of a scalar column.
    #[inline]
    pub fn value_kind(&self) -> Option<ValueKind> {
        match self.kind {
            FieldKind::Scalar(kind) => Some(kind),
            _ => None,
        }
    }

    /// Returns whether the column may hold `NULL`.
    ///
    /// Joined entities are always nullable: the join may find no row.
    #[inline]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    fn matches(&self, segment: &str, by: MatchBy) -> bool {
        let candidate = match by {
            MatchBy::SortAlias => self.sort_alias.as_deref(),
            MatchBy::SerializedName => self.serialized_name.as_deref(),
            MatchBy::NaturalName => Some(self.name.as_str()),
        };

        candidate.is_some_and(|candidate| candidate.eq_ignore_ascii_case(segment))
    }
}

/// Name matching priority for a sort path segment.
#[derive(Debug, Clone, Copy)]
enum MatchBy {
    SortAlias,
    SerializedName,
    NaturalName,
}

impl MatchBy {
    const PRIORITY: [Self; 3] = [Self::SortAlias, Self::SerializedName, Self::NaturalName];
}

/// Describes the sortable shape of a record type.
///
/// ```
/// use nvisy_keyset::ValueKind;
/// use nvisy_keyset::schema::{FieldNode, RecordDescriptor};
///
/// let author = RecordDescriptor::builder("User")
///     .scalar("id", ValueKind::Int)
///     .scalar("name", ValueKind::Text)
///     .build()?;
///
/// let material = RecordDescriptor::builder("Material")
///     .scalar("id", ValueKind::Int)
///     .field(FieldNode::scalar("item_id", ValueKind::Text).with_sort_alias("item_id_cursor"))
///     .joined("author", "Author", author)
///     .build()?;
///
/// assert_eq!(material.resolve("author.name")?.column, "\"Author__name\"");
/// assert_eq!(material.resolve("item_id_cursor")?.column, "item_id");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDescriptor {
    name: String,
    fields: Vec<FieldNode>,
    identifier: String,
    identifier_column: String,
}

impl RecordDescriptor {
    /// Creates a builder for a descriptor with the given record name.
    pub fn builder(name: impl Into<String>) -> RecordDescriptorBuilder {
        RecordDescriptorBuilder::new(name)
    }

    /// Returns the record name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared fields in declaration order.
    #[inline]
    pub fn fields(&self) -> &[FieldNode] {
        &self.fields
    }

    /// Returns the natural name of the identifier field.
    #[inline]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns the storage column of the identifier field.
    #[inline]
    pub fn identifier_column(&self) -> &str {
        &self.identifier_column
    }

    /// Finds the first field satisfying `predicate`, searching embedded
    /// sub-structures in place.
    ///
    /// Returns the chain of natural names leading to the field together with
    /// the field itself. Embedded nodes are never returned.
    pub(super) fn find<'a>(
        &'a self,
        predicate: &impl Fn(&FieldNode) -> bool,
    ) -> Option<(Vec<&'a str>, &'a FieldNode)> {
        for node in &self.fields {
            match &node.kind {
                FieldKind::Embedded(inner) => {
                    if let Some((mut chain, found)) = inner.find(predicate) {
                        chain.insert(0, node.name.as_str());
                        return Some((chain, found));
                    }
                }
                _ if predicate(node) => return Some((vec![node.name.as_str()], node)),
                _ => {}
            }
        }

        None
    }

    /// Finds the field a sort path segment refers to.
    ///
    /// Sort aliases win over serialized names, which win over natural names.
    pub(super) fn lookup<'a>(&'a self, segment: &str) -> Option<(Vec<&'a str>, &'a FieldNode)> {
        MatchBy::PRIORITY
            .into_iter()
            .find_map(|by| self.find(&|node: &FieldNode| node.matches(segment, by)))
    }
}

/// Builder for [`RecordDescriptor`].
#[derive(Debug, Clone)]
#[must_use = "builders do nothing unless built"]
pub struct RecordDescriptorBuilder {
    name: String,
    fields: Vec<FieldNode>,
    identifier: String,
}

impl RecordDescriptorBuilder {
    /// Creates a builder; the identifier field defaults to `id`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            identifier: "id".to_owned(),
        }
    }

    /// Appends a field.
    pub fn field(mut self, node: FieldNode) -> Self {
        self.fields.push(node);
        self
    }

    /// Appends a non-nullable scalar field whose column equals its name.
    pub fn scalar(self, name: impl Into<String>, kind: ValueKind) -> Self {
        self.field(FieldNode::scalar(name, kind))
    }

    /// Appends an embedded sub-structure.
    pub fn embedded(
        self,
        name: impl Into<String>,
        entity: impl Into<Arc<RecordDescriptor>>,
    ) -> Self {
        self.field(FieldNode::embedded(name, entity))
    }

    /// Appends a joined entity exposed under `alias`.
    pub fn joined(
        self,
        name: impl Into<String>,
        alias: impl Into<String>,
        entity: impl Into<Arc<RecordDescriptor>>,
    ) -> Self {
        self.field(FieldNode::joined(name, alias, entity))
    }

    /// Sets the natural name of the identifier field.
    pub fn identifier(mut self, name: impl Into<String>) -> Self {
        self.identifier = name.into();
        self
    }

    /// Builds the descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the identifier is not a scalar field of
    /// the record (declared directly or through an embedded sub-structure).
    pub fn build(self) -> Result<RecordDescriptor> {
        let mut descriptor = RecordDescriptor {
            name: self.name,
            fields: self.fields,
            identifier: self.identifier,
            identifier_column: String::new(),
        };

        let identifier = descriptor.identifier.clone();
        let column = descriptor
            .find(&|node: &FieldNode| node.is_scalar() && node.name == identifier)
            .map(|(_, node)| node.column.clone())
            .ok_or_else(|| {
                Error::Config(format!(
                    "record `{}` has no scalar identifier field `{}`",
                    descriptor.name, identifier
                ))
            })?;

        descriptor.identifier_column = column;
        Ok(descriptor)
    }
}
