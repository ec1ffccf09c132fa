// src/pipeline/process.rs

//! Per-unit processing: extraction, acquisition, relocation, emission.
//!
//! The partial-failure policy lives here. Secondary artifacts (source
//! image, cover) degrade to absence; only the primary media is fatal to a
//! unit, and a row is only appended once that artifact has been durably
//! relocated.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::Result;
use crate::extract::{ExtractionFailure, WorkExtractor};
use crate::fetch::MediaFetcher;
use crate::models::{OutputRow, RawUnit, WorkKind};
use crate::sink::RecordSink;
use crate::storage::ArtifactRelocator;
use crate::utils::slugify;

/// Outcome of processing one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Row emitted, with the number of relocated artifacts (1..=3)
    Success { artifacts: usize },
    /// Unit skipped, no row emitted
    Skipped(SkipReason),
}

/// Why a unit produced no row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    ExtractionFailed(ExtractionFailure),
    PrimaryMediaFailed,
}

/// Orchestrates one work item end to end.
pub struct WorkProcessor<'a> {
    fetcher: &'a MediaFetcher,
    relocator: &'a ArtifactRelocator,
    sink: &'a RecordSink,
    work_dir: PathBuf,
}

impl<'a> WorkProcessor<'a> {
    pub fn new(
        fetcher: &'a MediaFetcher,
        relocator: &'a ArtifactRelocator,
        sink: &'a RecordSink,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fetcher,
            relocator,
            sink,
            work_dir: work_dir.into(),
        }
    }

    /// Process one raw unit; returns how it went. Only sink write errors
    /// propagate; every per-unit failure becomes a skip.
    pub async fn process(
        &self,
        unit: &RawUnit,
        extractor: &dyn WorkExtractor,
        source_name: &str,
    ) -> Result<Outcome> {
        let record = match extractor.extract(unit) {
            Ok(record) => record,
            Err(failure) => {
                info!(source = source_name, %failure, "extraction failed, skipping unit");
                return Ok(Outcome::Skipped(SkipReason::ExtractionFailed(failure)));
            }
        };

        let referer = referer_for(unit);
        let category_slug = slugify(&record.category);
        let kind_dir = match record.kind {
            WorkKind::TextToMedia => "text2video",
            WorkKind::ImageToMedia => "image2video",
        };
        let dest_dir = self.work_dir.join(kind_dir).join(&category_slug);

        let mut artifacts = 0;

        let mut source_location = None;
        if let Some(source_ref) = &record.source_image_ref {
            source_location = self
                .acquire(
                    source_ref,
                    &dest_dir,
                    &format!("{}_source", record.id),
                    referer.as_deref(),
                    &category_slug,
                )
                .await;
            if source_location.is_some() {
                artifacts += 1;
            }
        }

        let Some(work_location) = self
            .acquire(
                &record.media_ref,
                &dest_dir,
                &format!("{}_video", record.id),
                referer.as_deref(),
                &category_slug,
            )
            .await
        else {
            warn!(
                source = source_name,
                id = %record.id,
                "primary media unavailable, skipping unit"
            );
            return Ok(Outcome::Skipped(SkipReason::PrimaryMediaFailed));
        };
        artifacts += 1;

        let mut cover_location = None;
        if let Some(cover_ref) = &record.cover_ref {
            cover_location = self
                .acquire(
                    cover_ref,
                    &dest_dir,
                    &format!("{}_cover", record.id),
                    referer.as_deref(),
                    &category_slug,
                )
                .await;
            if cover_location.is_some() {
                artifacts += 1;
            }
        }

        let row = OutputRow::new(work_location, source_location, record.prompt, cover_location);
        self.sink.append(&row, source_name)?;

        Ok(Outcome::Success { artifacts })
    }

    /// Fetch + relocate one artifact. Failures degrade to `None` here;
    /// the caller decides whether that is fatal for the unit.
    async fn acquire(
        &self,
        url: &str,
        dest_dir: &Path,
        base_name: &str,
        referer: Option<&str>,
        category: &str,
    ) -> Option<String> {
        let local = match self.fetcher.fetch(url, dest_dir, base_name, referer).await {
            Ok(path) => path,
            Err(error) => {
                warn!(%url, %error, "artifact fetch failed");
                return None;
            }
        };

        let filename = local.file_name()?.to_string_lossy().to_string();
        match self.relocator.relocate(&local, category, &filename).await {
            Ok(location) => location,
            Err(error) => {
                warn!(%url, %error, "artifact relocation failed");
                None
            }
        }
    }
}

/// Referer hint for a unit's artifact fetches: the page the unit came
/// from, when known.
fn referer_for(unit: &RawUnit) -> Option<String> {
    match unit {
        RawUnit::Dom(view) if !view.page_url.is_empty() => Some(view.page_url.clone()),
        _ => None,
    }
}
