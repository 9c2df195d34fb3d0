//! Record descriptors and field resolution.
//!
//! A [`RecordDescriptor`] describes the sortable shape of a record type: its
//! scalar columns, embedded sub-structures whose fields are promoted into the
//! parent, and joined entities whose columns are exposed under a join alias.
//! Descriptors are used to translate client sort paths into storage
//! identifiers and to read boundary values back from fetched rows.

mod descriptor;
mod record;
mod resolve;

pub use descriptor::{FieldKind, FieldNode, JOIN_SEPARATOR, RecordDescriptor, RecordDescriptorBuilder};
pub use record::{Entity, FieldRef, Record};
pub use resolve::{FieldPath, IdentifiedColumn, ResolveError, ResolvedField};
