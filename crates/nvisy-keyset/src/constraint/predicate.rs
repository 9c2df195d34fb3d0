//! Boundary predicates and orderings.

use std::fmt;

use strum::{AsRefStr, Display};

use super::SqlWriter;
use crate::Value;
use crate::cursor::Direction;
use crate::schema::{Record, RecordDescriptor};

/// Comparison operator of a [`Condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
pub enum Comparison {
    /// `column = value`
    #[strum(serialize = "=")]
    Eq,
    /// `column > value`
    #[strum(serialize = ">")]
    Gt,
    /// `column < value`
    #[strum(serialize = "<")]
    Lt,
    /// `column IS NULL` (the value is ignored)
    #[strum(serialize = "IS NULL")]
    IsNull,
    /// `column IS NOT NULL` (the value is ignored)
    #[strum(serialize = "IS NOT NULL")]
    IsNotNull,
}

impl Comparison {
    /// Returns whether the operator takes no bound value.
    #[inline]
    pub fn is_unary(self) -> bool {
        matches!(self, Self::IsNull | Self::IsNotNull)
    }

    /// Evaluates the comparison with SQL semantics.
    pub fn evaluate(self, left: &Value, right: &Value) -> bool {
        use std::cmp::Ordering;

        match self {
            Self::IsNull => left.is_null(),
            Self::IsNotNull => !left.is_null(),
            Self::Eq => left.compare(right) == Some(Ordering::Equal),
            Self::Gt => left.compare(right) == Some(Ordering::Greater),
            Self::Lt => left.compare(right) == Some(Ordering::Less),
        }
    }
}

/// A single column comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    /// Storage identifier of the column.
    pub column: String,
    /// Comparison operator.
    pub op: Comparison,
    /// Bound value (unused by unary comparisons).
    pub value: Value,
}

impl Condition {
    /// Creates a condition.
    pub fn new(column: impl Into<String>, op: Comparison, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    /// Creates an equality condition, or `IS NULL` for a `Null` value.
    pub fn equal(column: impl Into<String>, value: Value) -> Self {
        if value.is_null() {
            Self::new(column, Comparison::IsNull, Value::Null)
        } else {
            Self::new(column, Comparison::Eq, value)
        }
    }

    /// Renders the condition, binding its value.
    pub fn render(&self, writer: &mut SqlWriter) {
        writer.push_sql(&self.column);
        writer.push_sql(" ");
        writer.push_sql(self.op.as_ref());

        if !self.op.is_unary() {
            writer.push_sql(" ");
            writer.push_bind(self.value.clone());
        }
    }
}

/// A boolean filter over rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Predicate {
    /// Matches every row.
    #[default]
    Always,
    /// A single comparison.
    Compare(Condition),
    /// Conjunction.
    All(Vec<Predicate>),
    /// Disjunction.
    Any(Vec<Predicate>),
}

impl Predicate {
    /// Conjoins two predicates, absorbing [`Predicate::Always`].
    pub fn and(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Self::Always, other) | (other, Self::Always) => other,
            (this, other) => Self::All(vec![this, other]),
        }
    }

    /// Returns whether the predicate matches every row.
    #[inline]
    pub fn is_always(&self) -> bool {
        matches!(self, Self::Always)
    }

    /// Returns the storage identifiers referenced by the predicate.
    pub fn columns(&self) -> Vec<&str> {
        let mut columns = Vec::new();
        self.collect_columns(&mut columns);
        columns
    }

    fn collect_columns<'a>(&'a self, columns: &mut Vec<&'a str>) {
        match self {
            Self::Always => {}
            Self::Compare(condition) => {
                if !columns.contains(&condition.column.as_str()) {
                    columns.push(&condition.column);
                }
            }
            Self::All(children) | Self::Any(children) => {
                children.iter().for_each(|child| child.collect_columns(columns));
            }
        }
    }

    /// Renders the predicate, binding every value through the writer.
    ///
    /// A lone condition renders bare (`id > ?`); conjunctions and
    /// disjunctions parenthesize each condition and the whole group, e.g.
    /// `(((comment > ?)) OR ((comment = ?) AND (id < ?)))`.
    pub fn render(&self, writer: &mut SqlWriter) {
        match self {
            Self::Always => writer.push_sql("TRUE"),
            Self::Compare(condition) => condition.render(writer),
            Self::All(children) => Self::render_group(children, " AND ", "TRUE", writer),
            Self::Any(children) => Self::render_group(children, " OR ", "FALSE", writer),
        }
    }

    fn render_group(children: &[Predicate], separator: &str, empty: &str, writer: &mut SqlWriter) {
        if children.is_empty() {
            writer.push_sql(empty);
            return;
        }

        writer.push_sql("(");
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                writer.push_sql(separator);
            }

            match child {
                Self::Compare(condition) => {
                    writer.push_sql("(");
                    condition.render(writer);
                    writer.push_sql(")");
                }
                other => other.render(writer),
            }
        }
        writer.push_sql(")");
    }

    /// Evaluates the predicate against a row in memory.
    ///
    /// Columns are mapped back to row values through the descriptor; a
    /// column the descriptor cannot identify makes its condition false.
    pub fn matches(&self, record: &dyn Record, descriptor: &RecordDescriptor) -> bool {
        self.matches_with(&|column: &str| {
            descriptor
                .identify(column)
                .and_then(|path| path.read(record))
        })
    }

    /// Evaluates the predicate with a custom column lookup.
    pub fn matches_with(&self, lookup: &dyn Fn(&str) -> Option<Value>) -> bool {
        match self {
            Self::Always => true,
            Self::Compare(condition) => lookup(&condition.column)
                .is_some_and(|value| condition.op.evaluate(&value, &condition.value)),
            Self::All(children) => children.iter().all(|child| child.matches_with(lookup)),
            Self::Any(children) => children.iter().any(|child| child.matches_with(lookup)),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut writer = SqlWriter::default();
        self.render(&mut writer);
        f.write_str(writer.sql())
    }
}

/// One ORDER BY term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTerm {
    /// Storage identifier of the column.
    pub column: String,
    /// Effective direction.
    pub direction: Direction,
}

impl OrderTerm {
    /// Renders `column ASC` or `column DESC`.
    pub fn render(&self, writer: &mut SqlWriter) {
        writer.push_sql(&self.column);
        writer.push_sql(" ");
        writer.push_sql(self.direction.as_sql());
    }

    /// Renders a comma-separated ORDER BY list.
    pub fn render_list(terms: &[OrderTerm], writer: &mut SqlWriter) {
        for (i, term) in terms.iter().enumerate() {
            if i > 0 {
                writer.push_sql(", ");
            }
            term.render(writer);
        }
    }
}

/// A complete page query: filter, ordering and row limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    /// Rows to consider.
    pub filter: Predicate,
    /// Ordering of the rows.
    pub order: Vec<OrderTerm>,
    /// Maximum number of rows to return.
    pub limit: i64,
}

impl PageQuery {
    /// Conjoins an additional filter.
    pub fn and_filter(mut self, filter: Predicate) -> Self {
        self.filter = std::mem::take(&mut self.filter).and(filter);
        self
    }
}
