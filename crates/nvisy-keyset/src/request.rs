//! Page requests: the logical inputs a client supplies.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Names of the query parameters carrying the page request inputs.
///
/// Override these to read the inputs from differently named parameters,
/// e.g. `customCursor` instead of `cursor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryParams {
    /// Parameter carrying the opaque cursor token.
    pub cursor: String,
    /// Parameter carrying the JSON sort specification.
    pub sorting: String,
    /// Parameter carrying the lower window bound token.
    pub after: String,
    /// Parameter carrying the upper window bound token.
    pub before: String,
    /// Parameter carrying the page size override.
    pub limit: String,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            cursor: "cursor".to_owned(),
            sorting: "sorting".to_owned(),
            after: "after".to_owned(),
            before: "before".to_owned(),
            limit: "limit".to_owned(),
        }
    }
}

impl QueryParams {
    /// Sets the cursor parameter name.
    pub fn with_cursor(mut self, name: impl Into<String>) -> Self {
        self.cursor = name.into();
        self
    }

    /// Sets the sorting parameter name.
    pub fn with_sorting(mut self, name: impl Into<String>) -> Self {
        self.sorting = name.into();
        self
    }

    /// Sets the after parameter name.
    pub fn with_after(mut self, name: impl Into<String>) -> Self {
        self.after = name.into();
        self
    }

    /// Sets the before parameter name.
    pub fn with_before(mut self, name: impl Into<String>) -> Self {
        self.before = name.into();
        self
    }

    /// Sets the limit parameter name.
    pub fn with_limit(mut self, name: impl Into<String>) -> Self {
        self.limit = name.into();
        self
    }
}

/// The inputs of a single page request.
///
/// Every input is optional; empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct PageRequest {
    /// Opaque cursor token of the page to fetch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    /// JSON sort specification starting a new traversal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sorting: Option<String>,
    /// Token of the row the page starts after.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    /// Token of the row the page ends before.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    /// Page size override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

impl PageRequest {
    /// Creates an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a request from name/value pairs using the given parameter names.
    ///
    /// Unknown parameters are ignored; a limit that is not a positive integer
    /// is ignored as well.
    pub fn from_pairs<I, K, V>(pairs: I, params: &QueryParams) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut request = Self::default();

        for (key, value) in pairs {
            let key = key.as_ref();
            if key == params.cursor {
                request.cursor = Some(value.into());
            } else if key == params.sorting {
                request.sorting = Some(value.into());
            } else if key == params.after {
                request.after = Some(value.into());
            } else if key == params.before {
                request.before = Some(value.into());
            } else if key == params.limit {
                let value: String = value.into();
                request.limit = value.trim().parse().ok();
            }
        }

        request
    }

    /// Reads a request from a URL query string (without the leading `?`).
    pub fn from_uri_query(query: &str, params: &QueryParams) -> Self {
        Self::from_pairs(url::form_urlencoded::parse(query.as_bytes()), params)
    }

    /// Sets the cursor token.
    pub fn with_cursor(mut self, token: impl Into<String>) -> Self {
        self.cursor = Some(token.into());
        self
    }

    /// Sets the sort specification.
    pub fn with_sorting(mut self, sorting: impl Into<String>) -> Self {
        self.sorting = Some(sorting.into());
        self
    }

    /// Sets the lower window bound token.
    pub fn with_after(mut self, token: impl Into<String>) -> Self {
        self.after = Some(token.into());
        self
    }

    /// Sets the upper window bound token.
    pub fn with_before(mut self, token: impl Into<String>) -> Self {
        self.before = Some(token.into());
        self
    }

    /// Sets the page size override.
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns the cursor token, if present and non-empty.
    #[inline]
    pub fn cursor(&self) -> Option<&str> {
        present(&self.cursor)
    }

    /// Returns the sort specification, if present and non-empty.
    #[inline]
    pub fn sorting(&self) -> Option<&str> {
        present(&self.sorting)
    }

    /// Returns the lower window bound token, if present and non-empty.
    #[inline]
    pub fn after(&self) -> Option<&str> {
        present(&self.after)
    }

    /// Returns the upper window bound token, if present and non-empty.
    #[inline]
    pub fn before(&self) -> Option<&str> {
        present(&self.before)
    }

    /// Returns the page size override, if positive.
    #[inline]
    pub fn limit(&self) -> Option<i64> {
        self.limit.filter(|limit| *limit > 0)
    }
}

#[cfg(feature = "axum")]
mod extract {
    use std::convert::Infallible;

    use axum::extract::FromRequestParts;
    use axum::http::request::Parts;

    use super::{PageRequest, QueryParams};

    /// Reads the request inputs from the URI query using the default
    /// parameter names.
    impl<S: Send + Sync> FromRequestParts<S> for PageRequest {
        type Rejection = Infallible;

        async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
            let query = parts.uri.query().unwrap_or_default();
            Ok(Self::from_uri_query(query, &QueryParams::default()))
        }
    }
}
