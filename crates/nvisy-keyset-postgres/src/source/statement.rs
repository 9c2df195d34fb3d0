//! Rendering of page, count and existence statements.

use diesel::pg::Pg;
use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::sql_types::{BigInt, Bool, Nullable, Text, Timestamptz};
use nvisy_keyset::Value;
use nvisy_keyset::constraint::{OrderTerm, PageQuery, Placeholder, Predicate, SqlWriter};

/// Alias of the sub-select wrapping the base query.
const PAGE_ALIAS: &str = "keyset_page";

/// The caller's base query: SQL text with `$n` placeholders and their values.
///
/// The base query is wrapped as a sub-select, so its own filters, joins and
/// computed columns are kept. Joined columns must be projected under their
/// composite identifiers (e.g. `author.name AS "Author__name"`) to be
/// sortable.
///
/// ```
/// use nvisy_keyset_postgres::BaseQuery;
///
/// let base = BaseQuery::new("SELECT * FROM materials WHERE user_id = $1;").with_bind(7);
/// assert_eq!(base.sql(), "SELECT * FROM materials WHERE user_id = $1");
/// assert_eq!(base.binds().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseQuery {
    sql: String,
    binds: Vec<Value>,
}

impl BaseQuery {
    /// Creates a base query from SQL text; a trailing `;` is dropped.
    pub fn new(sql: impl Into<String>) -> Self {
        let sql: String = sql.into();
        Self {
            sql: sql.trim().trim_end_matches(';').trim_end().to_owned(),
            binds: Vec::new(),
        }
    }

    /// Creates a base query selecting every row of a table.
    pub fn table(name: &str) -> Self {
        Self::new(format!("SELECT * FROM {name}"))
    }

    /// Binds the value of the next `$n` placeholder of the base query.
    pub fn with_bind(mut self, value: impl Into<Value>) -> Self {
        self.binds.push(value.into());
        self
    }

    /// Returns the SQL text.
    #[inline]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the bound values.
    #[inline]
    pub fn binds(&self) -> &[Value] {
        &self.binds
    }

    /// Renders `SELECT * ... WHERE <filter> ORDER BY <order> LIMIT <limit>`.
    pub fn page_statement(&self, query: &PageQuery) -> Statement {
        let mut writer = self.writer();
        writer.push_sql("SELECT * FROM ");
        self.push_filtered(&query.filter, &mut writer);

        if !query.order.is_empty() {
            writer.push_sql(" ORDER BY ");
            OrderTerm::render_list(&query.order, &mut writer);
        }

        if query.limit > 0 {
            writer.push_sql(" LIMIT ");
            writer.push_bind(Value::Int(query.limit));
        }

        self.finish(writer)
    }

    /// Renders `SELECT count(*) AS count ... WHERE <filter>`.
    pub fn count_statement(&self, filter: &Predicate) -> Statement {
        let mut writer = self.writer();
        writer.push_sql("SELECT count(*) AS count FROM ");
        self.push_filtered(filter, &mut writer);
        self.finish(writer)
    }

    /// Renders `SELECT EXISTS (SELECT 1 ... WHERE <filter>) AS present`.
    pub fn exists_statement(&self, filter: &Predicate) -> Statement {
        let mut writer = self.writer();
        writer.push_sql("SELECT EXISTS (SELECT 1 FROM ");
        self.push_filtered(filter, &mut writer);
        writer.push_sql(") AS present");
        self.finish(writer)
    }

    fn writer(&self) -> SqlWriter {
        SqlWriter::new(Placeholder::Numbered).with_offset(self.binds.len())
    }

    fn push_filtered(&self, filter: &Predicate, writer: &mut SqlWriter) {
        writer.push_sql("(");
        writer.push_sql(&self.sql);
        writer.push_sql(") AS ");
        writer.push_sql(PAGE_ALIAS);

        if !filter.is_always() {
            writer.push_sql(" WHERE ");
            filter.render(writer);
        }
    }

    fn finish(&self, writer: SqlWriter) -> Statement {
        let (sql, binds) = writer.finish();
        Statement {
            sql,
            binds: self.binds.iter().cloned().chain(binds).collect(),
        }
    }
}

impl From<&str> for BaseQuery {
    fn from(sql: &str) -> Self {
        Self::new(sql)
    }
}

impl From<String> for BaseQuery {
    fn from(sql: String) -> Self {
        Self::new(sql)
    }
}

/// A rendered statement: SQL text and the values of its placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// SQL text with `$n` placeholders.
    pub sql: String,
    /// Values of the placeholders, in order.
    pub binds: Vec<Value>,
}

impl Statement {
    /// Converts the statement into a diesel query with every value bound.
    pub fn into_query(self) -> BoxedSqlQuery<'static, Pg, SqlQuery> {
        self.binds
            .into_iter()
            .fold(diesel::sql_query(self.sql).into_boxed(), bind_value)
    }
}

fn bind_value(
    query: BoxedSqlQuery<'static, Pg, SqlQuery>,
    value: Value,
) -> BoxedSqlQuery<'static, Pg, SqlQuery> {
    match value {
        Value::Null => query.bind::<Nullable<Text>, _>(None::<String>),
        Value::Bool(value) => query.bind::<Bool, _>(value),
        Value::Int(value) => query.bind::<BigInt, _>(value),
        Value::Text(value) => query.bind::<Text, _>(value),
        Value::Timestamp(value) => query.bind::<Timestamptz, _>(jiff_diesel::Timestamp::from(value)),
    }
}
