// src/sources/listing.rs

//! Listing-with-staleness source.
//!
//! Re-queries the full visible card list before each unit, picks the first
//! index not yet in the ledger, opens it, snapshots the detail view, and
//! closes the overlay. Zero-result listings and a fully consumed ledger
//! both end iteration.

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::RawUnit;
use crate::sources::{Batch, PageSource, SourceIterator};

/// Scroll passes applied once before the first unit.
const SCROLL_ROUNDS: usize = 5;

/// DOM card listing iterator.
pub struct ListingSource<'a> {
    page: &'a dyn PageSource,
    listing_url: String,
    target: usize,
    emitted: usize,
    prepared: bool,
    seen: HashSet<usize>,
}

impl<'a> ListingSource<'a> {
    pub fn new(page: &'a dyn PageSource, listing_url: impl Into<String>, target: usize) -> Self {
        Self {
            page,
            listing_url: listing_url.into(),
            target,
            emitted: 0,
            prepared: false,
            seen: HashSet::new(),
        }
    }

    /// First index in `0..count` absent from the ledger.
    fn next_unseen(&self, count: usize) -> Option<usize> {
        (0..count).find(|idx| !self.seen.contains(idx))
    }
}

#[async_trait]
impl SourceIterator for ListingSource<'_> {
    async fn next_batch(&mut self) -> Result<Batch> {
        if self.emitted >= self.target {
            return Ok(Batch::exhausted());
        }

        if !self.prepared {
            self.page.navigate(&self.listing_url).await?;
            self.page.scroll_to_bottom(SCROLL_ROUNDS).await?;
            self.prepared = true;
        }

        loop {
            // Handles from a previous pass may be stale; always re-query.
            let count = self.page.card_count().await?;
            if count == 0 {
                debug!("listing yielded no cards, treating as exhaustion");
                return Ok(Batch::exhausted());
            }

            let Some(index) = self.next_unseen(count) else {
                debug!(count, "all visible cards processed");
                return Ok(Batch::exhausted());
            };
            self.seen.insert(index);

            if !self.page.open_card(index).await? {
                warn!(index, "card could not be opened, skipping");
                continue;
            }

            let view = match self.page.capture_view().await {
                Ok(view) => view,
                Err(error) => {
                    warn!(index, %error, "detail capture failed, skipping card");
                    let _ = self.page.close_overlay().await;
                    continue;
                }
            };
            self.page.close_overlay().await?;

            self.emitted += 1;
            return Ok(Batch {
                units: vec![RawUnit::Dom(view)],
                exhausted: false,
            });
        }
    }
}
