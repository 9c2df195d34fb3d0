#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging.

/// Tracing target for cursor token encoding and decoding.
///
/// Use this target for logging malformed or rejected continuation tokens.
pub const TRACING_TARGET_CURSOR: &str = "nvisy_keyset::cursor";

/// Tracing target for sort specification translation and field resolution.
pub const TRACING_TARGET_SORTING: &str = "nvisy_keyset::sorting";

/// Tracing target for the pagination orchestrator.
///
/// Use this target for logging request decoding, page assembly and page metadata.
pub const TRACING_TARGET_PAGINATOR: &str = "nvisy_keyset::paginator";

/// Tracing target for storage sources.
pub const TRACING_TARGET_SOURCE: &str = "nvisy_keyset::source";

mod error;
mod value;

pub mod constraint;
pub mod cursor;
pub mod paginator;
pub mod prelude;
pub mod request;
pub mod schema;
pub mod sorting;
pub mod source;

pub use error::{BoxedError, Error, Result};
pub use value::{Value, ValueKind};
