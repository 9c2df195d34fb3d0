//! Parameterised SQL text accumulation.

use crate::Value;

/// Placeholder style used for bound values.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `?` for every value.
    #[default]
    Question,
    /// `$1`, `$2`, ... as used by PostgreSQL.
    Numbered,
}

/// Accumulates SQL text and the values bound to its placeholders.
///
/// Column identifiers are written verbatim; every value goes through
/// [`SqlWriter::push_bind`].
#[derive(Debug, Default, Clone)]
pub struct SqlWriter {
    sql: String,
    binds: Vec<Value>,
    placeholder: Placeholder,
    offset: usize,
}

impl SqlWriter {
    /// Creates an empty writer with the given placeholder style.
    pub fn new(placeholder: Placeholder) -> Self {
        Self {
            placeholder,
            ..Self::default()
        }
    }

    /// Starts numbered placeholders after `offset` already bound values.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Appends raw SQL text.
    #[inline]
    pub fn push_sql(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    /// Appends a placeholder and records its value.
    pub fn push_bind(&mut self, value: Value) {
        self.binds.push(value);

        match self.placeholder {
            Placeholder::Question => self.sql.push('?'),
            Placeholder::Numbered => {
                let position = self.offset + self.binds.len();
                self.sql.push('$');
                self.sql.push_str(&position.to_string());
            }
        }
    }

    /// Returns the SQL text written so far.
    #[inline]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the values bound so far, in placeholder order.
    #[inline]
    pub fn binds(&self) -> &[Value] {
        &self.binds
    }

    /// Consumes the writer, returning the SQL text and its bound values.
    pub fn finish(self) -> (String, Vec<Value>) {
        (self.sql, self.binds)
    }
}
