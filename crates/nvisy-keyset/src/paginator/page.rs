//! Page results and page metadata.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::cursor::Cursor;

/// Navigation metadata of a non-empty page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Token of the page following this one.
    pub next: String,
    /// Token of the page preceding this one.
    pub prev: String,
    /// Whether any row follows the last row of this page.
    pub has_next: bool,
    /// Whether any row precedes the first row of this page.
    pub has_prev: bool,
    /// Number of rows in the unfiltered base set.
    pub total_rows: i64,
    /// Whether an `after`/`before` window held more rows than were returned.
    pub range_truncated: bool,
}

impl PageInfo {
    /// Decodes the next-page token.
    pub fn next_cursor(&self) -> Result<Cursor> {
        Cursor::decode(&self.next)
    }

    /// Decodes the previous-page token.
    pub fn prev_cursor(&self) -> Result<Cursor> {
        Cursor::decode(&self.prev)
    }
}

/// Rows of a page together with their navigation metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Page<T> {
    /// Rows in the order of the requested sort.
    pub items: Vec<T>,
    /// Metadata, absent when the page is empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<PageInfo>,
}

impl<T> Page<T> {
    /// Creates a page from rows and metadata.
    pub fn new(items: Vec<T>, info: Option<PageInfo>) -> Self {
        Self { items, info }
    }

    /// Creates an empty page.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            info: None,
        }
    }

    /// Returns whether the page holds no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns whether more rows follow this page.
    #[inline]
    pub fn has_next(&self) -> bool {
        self.info.as_ref().is_some_and(|info| info.has_next)
    }

    /// Returns whether rows precede this page.
    #[inline]
    pub fn has_prev(&self) -> bool {
        self.info.as_ref().is_some_and(|info| info.has_prev)
    }

    /// Maps the rows to a different type.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            info: self.info,
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_info_wire_format() {
        let info = PageInfo {
            next: "n".into(),
            prev: "p".into(),
            has_next: true,
            has_prev: false,
            total_rows: 7,
            range_truncated: false,
        };

        assert_eq!(
            serde_json::to_string(&info).unwrap(),
            r#"{"next":"n","prev":"p","hasNext":true,"hasPrev":false,"totalRows":7,"rangeTruncated":false}"#
        );
    }

    #[test]
    fn map_keeps_metadata() {
        let page = Page::new(vec![1, 2], Some(PageInfo::default()));
        let mapped = page.map(|id| format!("#{id}"));

        assert_eq!(mapped.items, vec!["#1", "#2"]);
        assert!(mapped.info.is_some());
        assert!(!mapped.has_next());
    }

    #[test]
    fn empty_page_has_no_metadata() {
        let page = Page::<i64>::empty();
        assert!(page.is_empty());
        assert!(page.info.is_none());
        assert!(!page.has_prev());
    }
}
