//! Paginator configuration.

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::cursor::{Cursor, CursorToken};
use crate::request::QueryParams;
use crate::{Error, Result, TRACING_TARGET_PAGINATOR};

/// Default number of rows per page.
pub const DEFAULT_LIMIT: i64 = 10;

/// Default upper bound on the number of rows per page.
pub const MAX_LIMIT: i64 = 100;

/// Configuration of a [`Paginator`].
///
/// [`Paginator`]: crate::paginator::Paginator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[serde(default)]
pub struct PaginatorConfig {
    /// Page size used when neither the cursor nor the request sets one.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "keyset-default-limit",
            env = "KEYSET_DEFAULT_LIMIT",
            default_value = "10"
        )
    )]
    pub default_limit: i64,

    /// Largest page size a client may request.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "keyset-max-limit",
            env = "KEYSET_MAX_LIMIT",
            default_value = "100"
        )
    )]
    pub max_limit: i64,

    /// Cursor token used when a request carries neither cursor nor sorting.
    #[cfg_attr(
        feature = "config",
        arg(long = "keyset-default-cursor", env = "KEYSET_DEFAULT_CURSOR")
    )]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_cursor: Option<CursorToken>,

    /// Names of the query parameters carrying the request inputs.
    #[cfg_attr(feature = "config", arg(skip))]
    pub params: QueryParams,
}

impl Default for PaginatorConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
            default_cursor: None,
            params: QueryParams::default(),
        }
    }
}

impl PaginatorConfig {
    /// Creates a configuration with default limits and no default cursor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default page size.
    pub fn with_default_limit(mut self, limit: i64) -> Self {
        self.default_limit = limit;
        self
    }

    /// Sets the largest page size.
    pub fn with_max_limit(mut self, limit: i64) -> Self {
        self.max_limit = limit;
        self
    }

    /// Sets the default cursor.
    pub fn with_default_cursor(mut self, cursor: Cursor) -> Self {
        self.default_cursor = Some(cursor.into());
        self
    }

    /// Sets the query parameter names.
    pub fn with_params(mut self, params: QueryParams) -> Self {
        self.params = params;
        self
    }

    /// Returns the default cursor, if configured.
    #[inline]
    pub fn default_cursor(&self) -> Option<&Cursor> {
        self.default_cursor.as_deref()
    }

    /// Clamps a page size into `1..=max_limit`.
    #[inline]
    pub fn clamp_limit(&self, limit: i64) -> i64 {
        limit.clamp(1, self.max_limit.max(1))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_limit <= 0 {
            return Err(Error::Config(format!(
                "max_limit must be positive, got {}",
                self.max_limit
            )));
        }

        if !(1..=self.max_limit).contains(&self.default_limit) {
            return Err(Error::Config(format!(
                "default_limit must be between 1 and {}, got {}",
                self.max_limit, self.default_limit
            )));
        }

        if let Some(cursor) = self.default_cursor()
            && cursor.validate().is_err()
        {
            tracing::warn!(target: TRACING_TARGET_PAGINATOR, "Configured default cursor is not usable");
            return Err(Error::InvalidDefaultCursor);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;
    use crate::cursor::Direction;

    #[test]
    fn defaults() {
        let config = PaginatorConfig::default();
        assert_eq!(config.default_limit, 10);
        assert_eq!(config.max_limit, 100);
        assert!(config.default_cursor().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn clamps_limits() {
        let config = PaginatorConfig::new().with_max_limit(50);
        assert_eq!(config.clamp_limit(0), 1);
        assert_eq!(config.clamp_limit(-4), 1);
        assert_eq!(config.clamp_limit(20), 20);
        assert_eq!(config.clamp_limit(500), 50);
    }

    #[test]
    fn validation() {
        assert!(PaginatorConfig::new().with_max_limit(0).validate().is_err());
        assert!(PaginatorConfig::new().with_default_limit(0).validate().is_err());
        assert!(
            PaginatorConfig::new()
                .with_default_limit(20)
                .with_max_limit(10)
                .validate()
                .is_err()
        );

        let unusable = PaginatorConfig::new().with_default_cursor(Cursor::new(10));
        assert!(matches!(unusable.validate(), Err(Error::InvalidDefaultCursor)));
    }

    #[test]
    fn deserializes_partial_documents() {
        let cursor = Cursor::new(2).with_field("id", Value::Null, Direction::Asc);
        let json = format!(r#"{{"max_limit":25,"default_cursor":"{}"}}"#, cursor.encode());

        let config: PaginatorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.default_limit, 10);
        assert_eq!(config.max_limit, 25);
        assert_eq!(config.default_cursor(), Some(&cursor));
        assert_eq!(config.params, QueryParams::default());
    }
}
