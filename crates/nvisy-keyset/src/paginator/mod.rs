//! The pagination orchestrator and its configuration.
//!
//! A [`Paginator`] turns a [`PageRequest`] into one page of rows plus the
//! [`PageInfo`] needed to navigate to the adjacent pages.
//!
//! [`PageRequest`]: crate::request::PageRequest

mod config;
mod destination;
mod engine;
mod page;

pub use config::{DEFAULT_LIMIT, MAX_LIMIT, PaginatorConfig};
pub use destination::Destination;
pub use engine::{DecodedRequest, Paginator, PaginatorBuilder};
pub use page::{Page, PageInfo};
