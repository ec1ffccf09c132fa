// src/sources/page.rs

//! Page session capability consumed by listing sources.
//!
//! Browser driving (navigation, scrolling, element interaction) lives
//! outside this crate; this trait is the seam it plugs into. Tests use a
//! scripted fake.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::DomView;

/// A live page session over a showcase site listing.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Navigate to a URL and wait for the page to settle.
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Scroll to the bottom of the listing the given number of times to
    /// trigger lazy loading.
    async fn scroll_to_bottom(&self, rounds: usize) -> Result<()>;

    /// Number of work cards currently visible in the listing.
    ///
    /// Re-queried before every interaction: opening a detail view may
    /// invalidate previously seen handles.
    async fn card_count(&self) -> Result<usize>;

    /// Open the detail view for the card at `index`.
    ///
    /// Returns `false` when the card could not be opened (obscured,
    /// detached, or gone after a listing refresh).
    async fn open_card(&self, index: usize) -> Result<bool>;

    /// Capture a detached snapshot of the current detail view.
    async fn capture_view(&self) -> Result<DomView>;

    /// Close the detail view/overlay and return to the listing.
    async fn close_overlay(&self) -> Result<()>;
}
