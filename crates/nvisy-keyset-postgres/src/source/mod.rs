//! PostgreSQL storage source for the paginator.

mod pg_source;
mod statement;

pub use pg_source::PgSource;
pub use statement::{BaseQuery, Statement};
