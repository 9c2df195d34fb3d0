//! Prelude module for nvisy-keyset-postgres.
//!
//! ```rust,no_run
//! use nvisy_keyset_postgres::prelude::*;
//!
//! # fn example() -> PgResult<()> {
//! let client = PgConfig::new("postgresql://localhost/app").build()?;
//! let base = BaseQuery::new("SELECT * FROM materials WHERE deleted_at IS NULL");
//! # let _ = (client, base);
//! # Ok(())
//! # }
//! ```

pub use crate::{BaseQuery, PgClient, PgConfig, PgError, PgResult, PgSource, Statement};
