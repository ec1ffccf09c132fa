// src/pipeline/run.rs

//! Per-site run drivers.
//!
//! One site runs sequentially, one unit at a time: iterator → extractor →
//! processor, with a randomized politeness delay between units. A site
//! failing never stops the others; a unit failing never stops its site.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{info, warn};

use crate::error::Result;
use crate::extract::{
    heuristics::FieldHeuristics, higgsfield::HiggsfieldExtractor, imagineart,
    imagineart::ImagineArtExtractor, invideo, invideo::InvideoExtractor, pixverse,
    pixverse::PixverseExtractor, wanvideo, wanvideo::WanVideoExtractor, WorkExtractor,
};
use crate::fetch::MediaFetcher;
use crate::models::{Config, CrawlerConfig, SiteConfig, SourceKind};
use crate::pipeline::{Outcome, SkipReason, WorkProcessor};
use crate::sink::RecordSink;
use crate::sources::{
    ListingSource, PageSource, PagedApiSource, RscStreamSource, SourceIterator,
};
use crate::storage::ArtifactRelocator;
use crate::utils::http::HttpSource;
use crate::utils::slugify;

/// Everything a run needs, owned by the caller and borrowed per site.
pub struct RunContext<'a> {
    pub config: &'a Config,
    pub http: &'a dyn HttpSource,
    /// Attached page session for listing-kind sites; `None` skips them
    pub page: Option<&'a dyn PageSource>,
    pub fetcher: &'a MediaFetcher,
    pub relocator: &'a ArtifactRelocator,
    pub sink: &'a RecordSink,
}

/// Result of one site's run.
#[derive(Debug)]
pub struct SiteSummary {
    pub site: String,
    pub produced: usize,
    pub target: usize,
}

/// Result of a whole run.
#[derive(Debug)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub sites: Vec<SiteSummary>,
    pub total_rows: usize,
}

/// Run the selected sites in order. `names` empty or containing "all"
/// selects every configured site.
pub async fn run_sites(ctx: &RunContext<'_>, names: &[String]) -> Result<RunSummary> {
    let started_at = Utc::now();
    let run_all = names.is_empty() || names.iter().any(|n| n.eq_ignore_ascii_case("all"));

    let mut summaries = Vec::new();
    for site in &ctx.config.sites {
        let selected = run_all
            || names
                .iter()
                .any(|n| n.eq_ignore_ascii_case(&site.name) || slugify(n) == slugify(&site.name));
        if !selected {
            continue;
        }
        match run_site(ctx, site).await {
            Ok(summary) => {
                info!(
                    "{} complete: {}/{} units",
                    summary.site, summary.produced, summary.target
                );
                summaries.push(summary);
            }
            Err(error) => {
                warn!(site = %site.name, %error, "site run failed");
            }
        }
    }

    let summary = RunSummary {
        started_at,
        finished_at: Utc::now(),
        total_rows: ctx.sink.total_rows(),
        sites: summaries,
    };
    info!(
        "Run complete: {} rows across {} sites",
        summary.total_rows,
        summary.sites.len()
    );
    Ok(summary)
}

/// Run one site across all of its categories.
pub async fn run_site(ctx: &RunContext<'_>, site: &SiteConfig) -> Result<SiteSummary> {
    info!(
        "Crawling {} (target {} per category)",
        site.name, site.target_count
    );

    let work_dir = PathBuf::from(&ctx.config.output.dir).join("media");
    let processor = WorkProcessor::new(ctx.fetcher, ctx.relocator, ctx.sink, work_dir);

    let categories: Vec<String> = if site.categories.is_empty() {
        vec![site.name.clone()]
    } else {
        site.categories.clone()
    };

    let mut produced = 0;
    for category in &categories {
        produced += run_category(ctx, &processor, site, category).await?;
    }

    Ok(SiteSummary {
        site: site.name.clone(),
        produced,
        target: site.target_count * categories.len(),
    })
}

/// Run one category of one site: build the iterator/extractor pair for
/// its acquisition shape and drive it to exhaustion or target.
async fn run_category(
    ctx: &RunContext<'_>,
    processor: &WorkProcessor<'_>,
    site: &SiteConfig,
    category: &str,
) -> Result<usize> {
    let site_slug = slugify(&site.name);

    match site.kind {
        SourceKind::Listing => {
            let Some(page) = ctx.page else {
                warn!(
                    site = %site.name,
                    "listing site needs an attached page session, skipping"
                );
                return Ok(0);
            };
            let mut source = ListingSource::new(page, &site.url, site.target_count);
            let extractor =
                HiggsfieldExtractor::new(FieldHeuristics::new(&ctx.config.extraction), category);
            drive(ctx, processor, &mut source, &extractor, site).await
        }
        SourceKind::EmbeddedStream => {
            let Some(slug) = invideo::section_slug(category) else {
                warn!(site = %site.name, category, "no section mapping, skipping category");
                return Ok(0);
            };
            let mut source = RscStreamSource::new(
                ctx.http,
                invideo::section_url(&site.url, slug),
                slug,
                invideo::doc_headers(),
                site.target_count,
            );
            drive(ctx, processor, &mut source, &InvideoExtractor, site).await
        }
        SourceKind::PagedApi => match site_slug.as_str() {
            "pixverse" => {
                let Some(id) = pixverse::category_id(category) else {
                    warn!(site = %site.name, category, "unknown category id, skipping");
                    return Ok(0);
                };
                let mut source =
                    PagedApiSource::new(ctx.http, pixverse::page_spec(site, id), site.target_count);
                let extractor = PixverseExtractor::new(category);
                drive(ctx, processor, &mut source, &extractor, site).await
            }
            "imagine_art" => {
                let mut source =
                    PagedApiSource::new(ctx.http, imagineart::page_spec(site), site.target_count);
                let extractor = ImagineArtExtractor::new(category);
                drive(ctx, processor, &mut source, &extractor, site).await
            }
            // Endpoints with unstable schemas go through the
            // field-name-fallback extractor.
            _ => {
                let mut source =
                    PagedApiSource::new(ctx.http, wanvideo::page_spec(site), site.target_count);
                let extractor = WanVideoExtractor::new(category);
                drive(ctx, processor, &mut source, &extractor, site).await
            }
        },
    }
}

/// Drain one iterator through the processor, politely.
async fn drive(
    ctx: &RunContext<'_>,
    processor: &WorkProcessor<'_>,
    source: &mut dyn SourceIterator,
    extractor: &dyn WorkExtractor,
    site: &SiteConfig,
) -> Result<usize> {
    let mut produced = 0;
    loop {
        let batch = match source.next_batch().await {
            Ok(batch) => batch,
            Err(error) => {
                // A dead listing or endpoint ends this source's run with
                // whatever was already completed, not the whole crawl.
                warn!(site = %site.name, %error, "source iteration failed, ending source run");
                break;
            }
        };

        for unit in &batch.units {
            match processor.process(unit, extractor, &site.name).await? {
                Outcome::Success { artifacts } => {
                    produced += 1;
                    info!(
                        "[{}] unit complete ({} artifacts, {} so far)",
                        site.name, artifacts, produced
                    );
                }
                Outcome::Skipped(reason) => {
                    info!("[{}] unit skipped: {}", site.name, describe_skip(reason));
                }
            }
            politeness_delay(&ctx.config.crawler).await;
        }

        if batch.exhausted {
            break;
        }
    }
    Ok(produced)
}

fn describe_skip(reason: SkipReason) -> String {
    match reason {
        SkipReason::ExtractionFailed(failure) => format!("extraction failed ({failure})"),
        SkipReason::PrimaryMediaFailed => "primary media failed".to_string(),
    }
}

/// Sleep a random interval inside the configured politeness window.
async fn politeness_delay(config: &CrawlerConfig) {
    let (min, max) = (config.delay_min_ms, config.delay_max_ms);
    if max == 0 {
        return;
    }
    let ms = if min >= max {
        min
    } else {
        rand::rng().random_range(min..=max)
    };
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
