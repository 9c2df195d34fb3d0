//! In-memory storage source.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use super::QuerySource;
use crate::constraint::{PageQuery, Predicate};
use crate::cursor::Direction;
use crate::schema::{Entity, FieldPath, Record, RecordDescriptor};
use crate::{TRACING_TARGET_SOURCE, Value};

/// Errors reported by [`MemorySource`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemorySourceError {
    /// A filter or ordering references a column the descriptor cannot identify.
    #[error("unknown column `{0}`")]
    UnknownColumn(String),
}

type RowFilter<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// A [`QuerySource`] over rows held in memory.
///
/// Predicates and orderings are evaluated with SQL semantics: comparisons
/// with `Null` are false, and `Null` sorts last ascending and first
/// descending. An optional base filter plays the role of the caller's own
/// `WHERE` clause.
pub struct MemorySource<T> {
    rows: Arc<[T]>,
    descriptor: Arc<RecordDescriptor>,
    filter: Option<RowFilter<T>>,
}

impl<T> MemorySource<T> {
    /// Creates a source over `rows` described by `descriptor`.
    pub fn new(rows: impl Into<Arc<[T]>>, descriptor: impl Into<Arc<RecordDescriptor>>) -> Self {
        Self {
            rows: rows.into(),
            descriptor: descriptor.into(),
            filter: None,
        }
    }

    /// Restricts the base row set.
    pub fn with_filter(mut self, filter: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Returns the descriptor of the rows.
    #[inline]
    pub fn descriptor(&self) -> &Arc<RecordDescriptor> {
        &self.descriptor
    }

    /// Returns the number of rows held, ignoring the base filter.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns whether no rows are held.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<T: Entity> MemorySource<T> {
    /// Creates a source over entities using their own descriptor.
    pub fn for_entity(rows: impl Into<Arc<[T]>>) -> Self {
        Self::new(rows, T::descriptor())
    }
}

impl<T: Record> MemorySource<T> {
    fn path(&self, column: &str) -> Result<FieldPath, MemorySourceError> {
        self.descriptor.identify(column).ok_or_else(|| {
            tracing::warn!(target: TRACING_TARGET_SOURCE, column, "Column is not part of the record descriptor");
            MemorySourceError::UnknownColumn(column.to_owned())
        })
    }

    fn select(&self, filter: &Predicate) -> Result<Vec<&T>, MemorySourceError> {
        for column in filter.columns() {
            self.path(column)?;
        }

        Ok(self
            .rows
            .iter()
            .filter(|row| self.filter.as_ref().is_none_or(|base| base(*row)))
            .filter(|row| filter.matches(*row, &self.descriptor))
            .collect())
    }
}

fn compare_keys(a: &[Value], b: &[Value], directions: &[Direction]) -> Ordering {
    a.iter()
        .zip(b)
        .zip(directions)
        .map(|((a, b), direction)| match direction {
            Direction::Asc => a.sort_cmp(b),
            Direction::Desc => b.sort_cmp(a),
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

impl<T> QuerySource for MemorySource<T>
where
    T: Record + Clone + Send + Sync + 'static,
{
    type Error = MemorySourceError;
    type Row = T;

    async fn fetch(&self, query: &PageQuery) -> Result<Vec<T>, MemorySourceError> {
        let (paths, directions): (Vec<FieldPath>, Vec<Direction>) = query
            .order
            .iter()
            .map(|term| self.path(&term.column).map(|path| (path, term.direction)))
            .collect::<Result<Vec<_>, MemorySourceError>>()?
            .into_iter()
            .unzip();

        let mut keyed: Vec<(Vec<Value>, &T)> = self
            .select(&query.filter)?
            .into_iter()
            .map(|row| {
                let key = paths
                    .iter()
                    .map(|path| path.read(row).unwrap_or_default())
                    .collect();
                (key, row)
            })
            .collect();

        keyed.sort_by(|(a, _), (b, _)| compare_keys(a, b, &directions));

        let limit = usize::try_from(query.limit)
            .ok()
            .filter(|limit| *limit > 0)
            .unwrap_or(usize::MAX);

        let rows: Vec<T> = keyed
            .into_iter()
            .take(limit)
            .map(|(_, row)| row.clone())
            .collect();

        tracing::trace!(
            target: TRACING_TARGET_SOURCE,
            record = self.descriptor.name(),
            filter = %query.filter,
            returned = rows.len(),
            "Fetched rows from memory"
        );

        Ok(rows)
    }

    async fn count(&self, filter: &Predicate) -> Result<i64, MemorySourceError> {
        let count = self.select(filter)?.len();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn exists(&self, filter: &Predicate) -> Result<bool, MemorySourceError> {
        Ok(!self.select(filter)?.is_empty())
    }
}

impl<T> Clone for MemorySource<T> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
            descriptor: Arc::clone(&self.descriptor),
            filter: self.filter.clone(),
        }
    }
}

impl<T> fmt::Debug for MemorySource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySource")
            .field("record", &self.descriptor.name())
            .field("rows", &self.rows.len())
            .field("filtered", &self.filter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::{Comparison, Condition, OrderTerm};
    use crate::ValueKind;
    use crate::schema::{FieldNode, FieldRef};

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: i64,
        rank: Option<i64>,
    }

    impl Record for Row {
        fn field(&self, name: &str) -> Option<FieldRef<'_>> {
            Some(match name {
                "id" => FieldRef::value(self.id),
                "rank" => FieldRef::value(self.rank),
                _ => return None,
            })
        }
    }

    fn source() -> MemorySource<Row> {
        let descriptor = RecordDescriptor::builder("Row")
            .scalar("id", ValueKind::Int)
            .field(FieldNode::scalar("rank", ValueKind::Int).nullable())
            .build()
            .unwrap();

        let rows = vec![
            Row { id: 1, rank: Some(2) },
            Row { id: 2, rank: None },
            Row { id: 3, rank: Some(1) },
            Row { id: 4, rank: Some(2) },
        ];

        MemorySource::new(rows, descriptor)
    }

    fn order(column: &str, direction: Direction) -> OrderTerm {
        OrderTerm {
            column: column.into(),
            direction,
        }
    }

    fn ids(rows: &[Row]) -> Vec<i64> {
        rows.iter().map(|row| row.id).collect()
    }

    #[tokio::test]
    async fn orders_with_nulls_last_ascending() {
        let query = PageQuery {
            filter: Predicate::Always,
            order: vec![order("rank", Direction::Asc), order("id", Direction::Asc)],
            limit: 10,
        };

        let rows = source().fetch(&query).await.unwrap();
        assert_eq!(ids(&rows), vec![3, 1, 4, 2]);
    }

    #[tokio::test]
    async fn orders_with_nulls_first_descending() {
        let query = PageQuery {
            filter: Predicate::Always,
            order: vec![order("rank", Direction::Desc), order("id", Direction::Desc)],
            limit: 2,
        };

        let rows = source().fetch(&query).await.unwrap();
        assert_eq!(ids(&rows), vec![2, 4]);
    }

    #[tokio::test]
    async fn filters_and_counts() {
        let source = source().with_filter(|row| row.id != 4);
        let filter = Predicate::Compare(Condition::new("rank", Comparison::Eq, 2));

        assert_eq!(source.count(&Predicate::Always).await.unwrap(), 3);
        assert_eq!(source.count(&filter).await.unwrap(), 1);
        assert!(source.exists(&filter).await.unwrap());

        let none = Predicate::Compare(Condition::new("id", Comparison::Gt, 10));
        assert!(!source.exists(&none).await.unwrap());
    }

    #[test]
    fn predicates_read_rows_through_the_descriptor() {
        let source = source();
        let row = Row { id: 2, rank: None };

        let is_null = Predicate::Compare(Condition::equal("rank", Value::Null));
        assert!(is_null.matches(&row, source.descriptor()));

        let ranked = Predicate::Compare(Condition::new("rank", Comparison::IsNotNull, Value::Null));
        assert!(!ranked.matches(&row, source.descriptor()));

        let unknown = Predicate::Compare(Condition::new("missing", Comparison::Eq, 1));
        assert!(!unknown.matches(&row, source.descriptor()));
    }

    #[tokio::test]
    async fn unknown_columns_are_errors() {
        let filter = Predicate::Compare(Condition::new("missing", Comparison::Eq, 1));
        assert_eq!(
            source().count(&filter).await,
            Err(MemorySourceError::UnknownColumn("missing".into()))
        );

        let query = PageQuery {
            filter: Predicate::Always,
            order: vec![order("missing", Direction::Asc)],
            limit: 1,
        };
        assert!(source().fetch(&query).await.is_err());
    }
}
