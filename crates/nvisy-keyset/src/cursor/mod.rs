//! Keyset cursors for stable, index-friendly pagination.
//!
//! Unlike offset pagination, a cursor records the sort-field values of a
//! boundary row, so the cost of fetching a page does not depend on its depth
//! and concurrent inserts never shift already-served rows.

mod direction;
mod keyset;

pub use direction::Direction;
pub use keyset::{Cursor, CursorField, CursorToken};
