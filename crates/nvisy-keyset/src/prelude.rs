//! Prelude module for nvisy-keyset.
//!
//! Re-exports the types needed to describe records and paginate over them,
//! so a single `use nvisy_keyset::prelude::*;` is enough for most callers.

pub use crate::cursor::{Cursor, CursorToken, Direction};
pub use crate::paginator::{Destination, Page, PageInfo, Paginator, PaginatorConfig};
pub use crate::request::{PageRequest, QueryParams};
pub use crate::schema::{Entity, FieldNode, FieldRef, Record, RecordDescriptor};
pub use crate::sorting::{SortEntry, SortSpec};
pub use crate::source::{MemorySource, QuerySource};
pub use crate::{Error, Result, Value, ValueKind};
