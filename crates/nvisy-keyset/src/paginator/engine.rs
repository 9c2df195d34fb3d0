//! The pagination orchestrator.

use std::sync::Arc;

use derive_builder::Builder;

use super::{Destination, Page, PageInfo, PaginatorConfig};
use crate::constraint::{Predicate, page_query_with, seek_predicate_with};
use crate::cursor::{Cursor, CursorField};
use crate::request::PageRequest;
use crate::schema::{Record, RecordDescriptor};
use crate::sorting::SortSpec;
use crate::source::QuerySource;
use crate::{Error, Result, TRACING_TARGET_PAGINATOR, Value};

/// Cursors decoded from a page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRequest {
    /// Cursor driving the ordering, boundary and page size.
    pub primary: Cursor,
    /// Additional boundary of a two-sided `after`/`before` window.
    pub window: Option<Cursor>,
}

/// Keyset paginator over a [`QuerySource`].
///
/// A paginator decodes the request inputs into cursors, fetches one page of
/// rows from the source, and derives the tokens and flags of the adjacent
/// pages from the first and last fetched row.
///
/// ```
/// use nvisy_keyset::prelude::*;
///
/// # #[derive(Clone)]
/// # struct Row { id: i64 }
/// # impl Record for Row {
/// #     fn field(&self, name: &str) -> Option<FieldRef<'_>> {
/// #         (name == "id").then(|| FieldRef::value(self.id))
/// #     }
/// # }
/// # async fn run() -> nvisy_keyset::Result<()> {
/// let descriptor = RecordDescriptor::builder("Row").scalar("id", ValueKind::Int).build()?;
/// let rows: Vec<Row> = (1..=5).map(|id| Row { id }).collect();
///
/// let paginator = Paginator::builder()
///     .with_source(MemorySource::new(rows, descriptor.clone()))
///     .with_descriptor(descriptor)
///     .build()?;
///
/// let request = PageRequest::new().with_sorting(r#"[{"field":"id","direction":"desc"}]"#);
/// let page = paginator.page(&request).await?;
/// assert_eq!(page.items.first().map(|row| row.id), Some(5));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(
    name = "PaginatorBuilder",
    pattern = "owned",
    setter(prefix = "with"),
    build_fn(private, name = "build_inner", error = "Error")
)]
pub struct Paginator<S> {
    /// The caller's base query.
    source: S,
    /// Schema of the paginated rows.
    #[builder(setter(into))]
    descriptor: Arc<RecordDescriptor>,
    /// Limits, default cursor and request parameter names.
    #[builder(default)]
    config: PaginatorConfig,
}

impl<S> PaginatorBuilder<S> {
    /// Builds the paginator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingConfiguration`] if the source or the
    /// descriptor was not provided, or [`Error::Config`] /
    /// [`Error::InvalidDefaultCursor`] if the configuration is invalid.
    pub fn build(self) -> Result<Paginator<S>> {
        let paginator = self.build_inner()?;
        paginator.config.validate()?;
        Ok(paginator)
    }
}

impl<S> Paginator<S> {
    /// Creates a builder for a paginator.
    pub fn builder() -> PaginatorBuilder<S> {
        PaginatorBuilder::default()
    }

    /// Creates a paginator from its parts.
    pub fn new(
        source: S,
        descriptor: impl Into<Arc<RecordDescriptor>>,
        config: PaginatorConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            descriptor: descriptor.into(),
            config,
        })
    }

    /// Returns the storage source.
    #[inline]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns the descriptor of the paginated rows.
    #[inline]
    pub fn descriptor(&self) -> &RecordDescriptor {
        &self.descriptor
    }

    /// Returns the configuration.
    #[inline]
    pub fn config(&self) -> &PaginatorConfig {
        &self.config
    }

    /// Reads a request from a URL query string using the configured
    /// parameter names.
    pub fn parse_request(&self, query: &str) -> PageRequest {
        PageRequest::from_uri_query(query, &self.config.params)
    }

    /// Decodes the request inputs into the primary cursor and the optional
    /// window boundary.
    ///
    /// Precedence: `cursor`, then `sorting`, then `after`/`before`, then the
    /// configured default cursor. The page size override replaces the
    /// primary cursor's limit; every limit is clamped to the configured
    /// maximum.
    ///
    /// # Errors
    ///
    /// - [`Error::CursorAndSortingTogether`] if both are supplied.
    /// - [`Error::InvalidCursor`] if a token is malformed, names a field
    ///   the descriptor does not know, or holds a value of another kind than
    ///   the field's column.
    /// - [`Error::InvalidSorting`] if the sort specification is malformed or
    ///   names an unknown field.
    /// - [`Error::InvalidDefaultCursor`] if no input is supplied and no
    ///   usable default cursor is configured.
    pub fn decode(&self, request: &PageRequest) -> Result<DecodedRequest> {
        let (mut primary, window) = match (request.cursor(), request.sorting()) {
            (Some(_), Some(_)) => {
                tracing::debug!(target: TRACING_TARGET_PAGINATOR, "Cursor and sorting supplied together");
                return Err(Error::CursorAndSortingTogether);
            }
            (Some(token), None) => {
                if request.after().is_some() || request.before().is_some() {
                    tracing::debug!(
                        target: TRACING_TARGET_PAGINATOR,
                        "Ignoring after/before alongside an explicit cursor"
                    );
                }
                (self.decode_token(token)?, None)
            }
            (None, Some(sorting)) => {
                if request.after().is_some() || request.before().is_some() {
                    tracing::debug!(
                        target: TRACING_TARGET_PAGINATOR,
                        "Ignoring after/before alongside an explicit sorting"
                    );
                }
                let spec = SortSpec::parse(sorting)?;
                (spec.to_cursor(&self.descriptor, self.config.default_limit)?, None)
            }
            (None, None) => match (request.after(), request.before()) {
                (Some(after), Some(before)) => {
                    let primary = self.decode_token(after)?.with_backward(false);
                    let window = self.decode_token(before)?.with_backward(true);
                    (primary, Some(window))
                }
                (Some(after), None) => (self.decode_token(after)?.with_backward(false), None),
                (None, Some(before)) => (self.decode_token(before)?.with_backward(true), None),
                (None, None) => (self.default_cursor()?, None),
            },
        };

        primary.limit = self
            .config
            .clamp_limit(request.limit().unwrap_or(primary.limit));

        tracing::debug!(
            target: TRACING_TARGET_PAGINATOR,
            fields = primary.fields.len(),
            limit = primary.limit,
            backward = primary.backward,
            windowed = window.is_some(),
            "Decoded page request"
        );

        Ok(DecodedRequest { primary, window })
    }

    fn decode_token(&self, token: &str) -> Result<Cursor> {
        let cursor = Cursor::decode(token)?;

        if let Some(mismatch) = self.field_mismatch(&cursor) {
            tracing::debug!(
                target: TRACING_TARGET_PAGINATOR,
                record = self.descriptor.name(),
                %mismatch,
                "Cursor does not fit the record descriptor"
            );
            return Err(Error::InvalidCursor(mismatch.into()));
        }

        Ok(cursor)
    }

    fn default_cursor(&self) -> Result<Cursor> {
        let Some(cursor) = self.config.default_cursor() else {
            tracing::debug!(target: TRACING_TARGET_PAGINATOR, "No default cursor configured");
            return Err(Error::InvalidDefaultCursor);
        };

        if cursor.validate().is_err() || self.field_mismatch(cursor).is_some() {
            tracing::warn!(
                target: TRACING_TARGET_PAGINATOR,
                record = self.descriptor.name(),
                "Default cursor does not match the record descriptor"
            );
            return Err(Error::InvalidDefaultCursor);
        }

        Ok(cursor.clone())
    }

    /// Describes the first field naming an unknown column or holding a
    /// value of another kind than its column.
    fn field_mismatch(&self, cursor: &Cursor) -> Option<String> {
        cursor.fields.iter().find_map(|field| {
            let Some(column) = self.descriptor.identify_column(&field.name) else {
                return Some(format!("unknown cursor field `{}`", field.name));
            };

            (!field.value.conforms_to(column.kind)).then(|| {
                format!(
                    "cursor field `{}` holds {}, expected a {} value",
                    field.name, field.value, column.kind
                )
            })
        })
    }

    fn seek(&self, cursor: &Cursor) -> Predicate {
        seek_predicate_with(cursor, |column| self.descriptor.is_nullable(column))
    }

    /// Builds a cursor positioned on `row`, keeping the fields and limit of
    /// `primary`.
    fn edge_cursor(&self, primary: &Cursor, row: &dyn Record, backward: bool) -> Cursor {
        let fields = primary
            .fields
            .iter()
            .map(|field| {
                let value = self
                    .descriptor
                    .identify(&field.name)
                    .and_then(|path| path.read(row))
                    .unwrap_or_else(|| {
                        tracing::warn!(
                            target: TRACING_TARGET_PAGINATOR,
                            record = self.descriptor.name(),
                            field = %field.name,
                            "Row does not expose a cursor field"
                        );
                        Value::Null
                    });

                CursorField::new(field.name.clone(), value, field.direction)
            })
            .collect();

        Cursor {
            fields,
            limit: primary.limit,
            backward,
        }
    }
}

impl<S: QuerySource> Paginator<S> {
    /// Fetches the page described by `request` into `destination`.
    ///
    /// Returns `None` when the page is empty; the destination is then
    /// emptied as well.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFindDestination`] if the destination cannot
    /// hold a list of rows, any decoding error of [`Paginator::decode`], and
    /// [`Error::Storage`] if the source fails.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_PAGINATOR, fields(record = %self.descriptor.name()))]
    pub async fn find<D>(&self, request: &PageRequest, destination: &mut D) -> Result<Option<PageInfo>>
    where
        D: Destination<S::Row>,
    {
        destination.ensure_list()?;
        let decoded = self.decode(request)?;
        self.find_decoded(decoded, destination).await
    }

    /// Fetches the page described by already decoded cursors.
    pub async fn find_decoded<D>(
        &self,
        decoded: DecodedRequest,
        destination: &mut D,
    ) -> Result<Option<PageInfo>>
    where
        D: Destination<S::Row>,
    {
        let DecodedRequest { primary, window } = decoded;
        let mut query = page_query_with(&primary, |column| self.descriptor.is_nullable(column));

        let window_count = match &window {
            Some(window) => {
                query = query.and_filter(self.seek(window));
                let count = self
                    .source
                    .count(&query.filter)
                    .await
                    .map_err(Error::storage)?;
                Some(count)
            }
            None => None,
        };

        let mut rows = self.source.fetch(&query).await.map_err(Error::storage)?;
        if primary.backward {
            rows.reverse();
        }

        let edges = match (rows.first(), rows.last()) {
            (Some(first), Some(last)) => Some((
                self.edge_cursor(&primary, last, false),
                self.edge_cursor(&primary, first, true),
            )),
            _ => None,
        };

        let Some((next, prev)) = edges else {
            tracing::debug!(target: TRACING_TARGET_PAGINATOR, "Page is empty");
            destination.fill(rows)?;
            return Ok(None);
        };

        let total_rows = self
            .source
            .count(&Predicate::Always)
            .await
            .map_err(Error::storage)?;
        let has_next = self
            .source
            .exists(&self.seek(&next))
            .await
            .map_err(Error::storage)?;
        let has_prev = self
            .source
            .exists(&self.seek(&prev))
            .await
            .map_err(Error::storage)?;

        let returned = rows.len();
        let range_truncated =
            window_count.is_some_and(|count| i64::try_from(returned).ok() != Some(count));

        tracing::debug!(
            target: TRACING_TARGET_PAGINATOR,
            returned,
            total_rows,
            has_next,
            has_prev,
            range_truncated,
            "Assembled page"
        );

        destination.fill(rows)?;

        Ok(Some(PageInfo {
            next: next.encode(),
            prev: prev.encode(),
            has_next,
            has_prev,
            total_rows,
            range_truncated,
        }))
    }

    /// Fetches the page described by `request` into a [`Page`].
    pub async fn page(&self, request: &PageRequest) -> Result<Page<S::Row>> {
        let mut items = Vec::new();
        let info = self.find(request, &mut items).await?;
        Ok(Page::new(items, info))
    }
}
