//! [`QuerySource`] over a PostgreSQL base query.

use std::fmt;
use std::marker::PhantomData;

use diesel::QueryableByName;
use diesel::pg::Pg;
use diesel::sql_types::{BigInt, Bool};
use diesel_async::RunQueryDsl;
use nvisy_keyset::constraint::{PageQuery, Predicate};
use nvisy_keyset::schema::Record;
use nvisy_keyset::source::QuerySource;

use super::{BaseQuery, Statement};
use crate::{PgClient, PgError, PgResult, TRACING_TARGET_QUERY};

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

#[derive(QueryableByName)]
struct ExistsRow {
    #[diesel(sql_type = Bool)]
    present: bool,
}

/// A [`QuerySource`] that runs page, count and existence statements
/// against a [`BaseQuery`].
///
/// Each call acquires its own pooled connection. Rows are loaded by name,
/// so `T` must map the columns the base query projects.
///
/// ```rust,no_run
/// use diesel::QueryableByName;
/// use diesel::sql_types::{BigInt, Text};
/// use nvisy_keyset::prelude::*;
/// use nvisy_keyset_postgres::prelude::*;
///
/// #[derive(Clone, QueryableByName)]
/// struct Tag {
///     #[diesel(sql_type = BigInt)]
///     id: i64,
///     #[diesel(sql_type = Text)]
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
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let client = PgConfig::new("postgresql://localhost/app").build()?;
/// let descriptor = RecordDescriptor::builder("Tag")
///     .scalar("id", ValueKind::Int)
///     .scalar("label", ValueKind::Text)
///     .build()?;
///
/// let paginator = Paginator::builder()
///     .with_source(PgSource::<Tag>::new(client, BaseQuery::table("tags")))
///     .with_descriptor(descriptor)
///     .build()?;
///
/// let page = paginator.page(&PageRequest::new().with_sorting(r#"[{"field":"label"}]"#)).await?;
/// # let _ = page;
/// # Ok(())
/// # }
/// ```
pub struct PgSource<T> {
    client: PgClient,
    base: BaseQuery,
    row: PhantomData<fn() -> T>,
}

impl<T> PgSource<T> {
    /// Creates a source over `base` using connections from `client`.
    pub fn new(client: PgClient, base: impl Into<BaseQuery>) -> Self {
        Self {
            client,
            base: base.into(),
            row: PhantomData,
        }
    }

    /// Returns the client.
    #[inline]
    pub fn client(&self) -> &PgClient {
        &self.client
    }

    /// Returns the base query.
    #[inline]
    pub fn base(&self) -> &BaseQuery {
        &self.base
    }

    fn log(&self, operation: &'static str, statement: &Statement) {
        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            operation,
            sql = %statement.sql,
            binds = statement.binds.len(),
            "Running keyset statement"
        );
    }
}

fn query_error(operation: &'static str) -> impl FnOnce(diesel::result::Error) -> PgError {
    move |err| {
        tracing::error!(target: TRACING_TARGET_QUERY, operation, error = %err, "Keyset statement failed");
        PgError::Query(err)
    }
}

impl<T> QuerySource for PgSource<T>
where
    T: QueryableByName<Pg> + Record + Send + 'static,
{
    type Error = PgError;
    type Row = T;

    async fn fetch(&self, query: &PageQuery) -> PgResult<Vec<T>> {
        let statement = self.base.page_statement(query);
        self.log("fetch", &statement);

        let mut conn = self.client.get_connection().await?;
        let rows: Vec<T> = statement
            .into_query()
            .load(&mut *conn)
            .await
            .map_err(query_error("fetch"))?;

        tracing::trace!(target: TRACING_TARGET_QUERY, returned = rows.len(), "Fetched page rows");
        Ok(rows)
    }

    async fn count(&self, filter: &Predicate) -> PgResult<i64> {
        let statement = self.base.count_statement(filter);
        self.log("count", &statement);

        let mut conn = self.client.get_connection().await?;
        let row: CountRow = statement
            .into_query()
            .get_result(&mut *conn)
            .await
            .map_err(query_error("count"))?;

        Ok(row.count)
    }

    async fn exists(&self, filter: &Predicate) -> PgResult<bool> {
        let statement = self.base.exists_statement(filter);
        self.log("exists", &statement);

        let mut conn = self.client.get_connection().await?;
        let row: ExistsRow = statement
            .into_query()
            .get_result(&mut *conn)
            .await
            .map_err(query_error("exists"))?;

        Ok(row.present)
    }
}

impl<T> Clone for PgSource<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            base: self.base.clone(),
            row: PhantomData,
        }
    }
}

impl<T> fmt::Debug for PgSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgSource")
            .field("base", &self.base.sql())
            .field("client", &self.client)
            .finish()
    }
}
