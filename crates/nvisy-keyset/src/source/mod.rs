//! Storage sources queried by the paginator.
//!
//! A [`QuerySource`] stands for the caller's "query so far": a base row set
//! with whatever filters, joins and eager loading the caller configured. The
//! paginator never mutates it; it only asks for ordered, filtered, limited
//! rows and for counts.

mod memory;

use std::future::Future;

pub use memory::{MemorySource, MemorySourceError};

use crate::constraint::{PageQuery, Predicate};
use crate::schema::Record;

/// Storage collaborator of the paginator.
pub trait QuerySource: Send + Sync {
    /// Row type produced by this source.
    type Row: Record + Send;

    /// Error type reported by this source.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetches the rows matching `query.filter`, ordered by `query.order`,
    /// at most `query.limit` of them.
    fn fetch(
        &self,
        query: &PageQuery,
    ) -> impl Future<Output = Result<Vec<Self::Row>, Self::Error>> + Send;

    /// Counts the rows of the base set matching `filter`.
    fn count(&self, filter: &Predicate) -> impl Future<Output = Result<i64, Self::Error>> + Send;

    /// Returns whether any row of the base set matches `filter`.
    ///
    /// The default implementation counts; sources should override it with a
    /// short-circuiting query when they have one.
    fn exists(&self, filter: &Predicate) -> impl Future<Output = Result<bool, Self::Error>> + Send {
        async move { Ok(self.count(filter).await? > 0) }
    }
}
