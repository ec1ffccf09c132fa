// src/sources/mod.rs

//! Source iterators: lazy, deduplicated sequences of raw work units.
//!
//! Three strategies, one per acquisition shape:
//! - `ListingSource`: DOM card listing with re-query-on-staleness
//! - `PagedApiSource`: paginated JSON API
//! - `RscStreamSource`: embedded data stream in a server-rendered document

pub mod listing;
pub mod page;
pub mod paged;
pub mod rsc;

use async_trait::async_trait;

pub use listing::ListingSource;
pub use page::PageSource;
pub use paged::{PageSpec, PagedApiSource, Pagination};
pub use rsc::RscStreamSource;

use crate::error::Result;
use crate::models::RawUnit;

/// One step of iteration.
#[derive(Debug, Default)]
pub struct Batch {
    /// Units yielded by this step, possibly empty
    pub units: Vec<RawUnit>,
    /// Whether the source has nothing further to yield
    pub exhausted: bool,
}

impl Batch {
    /// A terminal, empty batch.
    pub fn exhausted() -> Self {
        Self {
            units: Vec::new(),
            exhausted: true,
        }
    }
}

/// A deduplicated sequence of raw work units from one source.
///
/// Iterators own their dedup ledger; no unit is yielded twice within one
/// run, and the total yielded is capped at the caller's target.
#[async_trait]
pub trait SourceIterator: Send {
    async fn next_batch(&mut self) -> Result<Batch>;
}
