//! End-to-end pipeline tests: scripted page session, scripted media
//! server, local storage backend, real sink.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use showcase_crawler::error::Result;
use showcase_crawler::extract::{ExtractionFailure, FieldHeuristics, HiggsfieldExtractor};
use showcase_crawler::fetch::MediaFetcher;
use showcase_crawler::models::{
    Config, DomView, ImageNode, OutputRow, RawUnit, SiteConfig, SourceKind, TextBlock, VideoNode,
};
use showcase_crawler::pipeline::{run_site, Outcome, RunContext, SkipReason, WorkProcessor};
use showcase_crawler::sink::RecordSink;
use showcase_crawler::sources::PageSource;
use showcase_crawler::storage::{ArtifactRelocator, LocalBackend};
use showcase_crawler::utils::http::ReqwestHttpSource;

/// Page session scripted to show three cards:
/// 0. complete work (video + source image + cover + prompt)
/// 1. no video at all (extraction must fail)
/// 2. video whose media URL always 500s (primary fetch must fail)
struct ScriptedPage {
    asset_base: String,
    opened: Mutex<Vec<usize>>,
}

impl ScriptedPage {
    fn new(asset_base: impl Into<String>) -> Self {
        Self {
            asset_base: asset_base.into(),
            opened: Mutex::new(Vec::new()),
        }
    }

    fn view_for(&self, index: usize) -> DomView {
        let base = &self.asset_base;
        match index {
            0 => DomView {
                page_url: format!("{base}/work/0"),
                text_blocks: vec![TextBlock {
                    text: "A   cat\njumping\tover a fence".to_string(),
                    container_class: "prompt-text".to_string(),
                }],
                images: vec![ImageNode {
                    src: format!("{base}/img/source.jpg"),
                    width: 800,
                    height: 800,
                    context: "input".to_string(),
                }],
                videos: vec![VideoNode {
                    src: Some(format!("{base}/media/ok.mp4")),
                    poster: Some(format!("{base}/media/cover.jpg")),
                }],
                input_values: Vec::new(),
            },
            1 => DomView {
                page_url: format!("{base}/work/1"),
                ..DomView::default()
            },
            _ => DomView {
                page_url: format!("{base}/work/2"),
                images: vec![ImageNode {
                    src: format!("{base}/img/source.jpg"),
                    width: 800,
                    height: 800,
                    context: "input".to_string(),
                }],
                videos: vec![VideoNode {
                    src: Some(format!("{base}/media/broken.mp4")),
                    poster: None,
                }],
                ..DomView::default()
            },
        }
    }
}

#[async_trait]
impl PageSource for ScriptedPage {
    async fn navigate(&self, _url: &str) -> Result<()> {
        Ok(())
    }

    async fn scroll_to_bottom(&self, _rounds: usize) -> Result<()> {
        Ok(())
    }

    async fn card_count(&self) -> Result<usize> {
        Ok(3)
    }

    async fn open_card(&self, index: usize) -> Result<bool> {
        self.opened.lock().unwrap().push(index);
        Ok(true)
    }

    async fn capture_view(&self) -> Result<DomView> {
        let index = *self.opened.lock().unwrap().last().unwrap();
        Ok(self.view_for(index))
    }

    async fn close_overlay(&self) -> Result<()> {
        Ok(())
    }
}

async fn mount_assets(server: &MockServer) {
    let media = vec![0u8; 2048];
    Mock::given(method("GET"))
        .and(path("/media/ok.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(media.clone(), "video/mp4"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/media/cover.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(media.clone(), "image/jpeg"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/img/source.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(media.clone(), "image/jpeg"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/media/broken.mp4"))
        .respond_with(ResponseTemplate::new(500))
        .mount(server)
        .await;
}

/// Config tuned for tests: no politeness delay, single fetch attempt.
fn test_config(output_dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.crawler.delay_min_ms = 0;
    config.crawler.delay_max_ms = 0;
    config.crawler.max_retries = 1;
    config.output.dir = output_dir.to_string_lossy().into_owned();
    config
}

#[tokio::test]
async fn listing_site_emits_rows_only_for_fully_relocated_units() {
    let server = MockServer::start().await;
    mount_assets(&server).await;

    let out = TempDir::new().unwrap();
    let store = TempDir::new().unwrap();
    let config = test_config(out.path());

    let page = ScriptedPage::new(server.uri());
    let http = ReqwestHttpSource::from_config(&config.crawler).unwrap();
    let fetcher = MediaFetcher::new(&config.crawler).unwrap();
    let relocator = ArtifactRelocator::new(
        Arc::new(LocalBackend::new(store.path())),
        &config.storage,
    );
    let sink = RecordSink::new(out.path()).unwrap();

    let site = SiteConfig {
        name: "Higgsfield".to_string(),
        kind: SourceKind::Listing,
        url: server.uri(),
        target_count: 10,
        categories: Vec::new(),
    };

    let ctx = RunContext {
        config: &config,
        http: &http,
        page: Some(&page),
        fetcher: &fetcher,
        relocator: &relocator,
        sink: &sink,
    };

    let summary = run_site(&ctx, &site).await.unwrap();

    // Card 0 succeeds; card 1 fails extraction; card 2 loses its primary
    // media. One row total, even though card 2's source image relocated.
    assert_eq!(summary.produced, 1);
    assert_eq!(sink.total_rows(), 1);

    let log = std::fs::read_to_string(out.path().join("higgsfield.txt")).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 1);

    let fields = OutputRow::parse_line(lines[0]).unwrap();
    assert!(fields[0].contains("video-materials/higgsfield/"));
    assert!(fields[0].ends_with("_video.mp4"));
    assert!(fields[1].ends_with("_source.jpg"));
    assert_eq!(fields[2], "A cat jumping over a fence");
    assert!(fields[3].ends_with("_cover.jpg"));

    // The relocated primary asset really landed in the store.
    let key = fields[0]
        .split_once("video-materials/")
        .map(|(_, rest)| format!("video-materials/{rest}"))
        .unwrap();
    assert!(store.path().join(&key).exists());

    // card0: source + video + cover; card2: source + one failed media
    // attempt; card1 never touched the network.
    assert_eq!(server.received_requests().await.unwrap().len(), 5);

    let aggregate = std::fs::read_to_string(out.path().join("all_materials.txt")).unwrap();
    assert_eq!(aggregate.lines().count(), 1);
}

#[tokio::test]
async fn processor_reports_typed_skip_reasons() {
    let server = MockServer::start().await;
    mount_assets(&server).await;

    let out = TempDir::new().unwrap();
    let store = TempDir::new().unwrap();
    let config = test_config(out.path());

    let fetcher = MediaFetcher::new(&config.crawler).unwrap();
    let relocator = ArtifactRelocator::new(
        Arc::new(LocalBackend::new(store.path())),
        &config.storage,
    );
    let sink = RecordSink::new(out.path()).unwrap();
    let processor = WorkProcessor::new(&fetcher, &relocator, &sink, out.path().join("media"));
    let extractor = HiggsfieldExtractor::new(
        FieldHeuristics::new(&config.extraction),
        "Higgsfield",
    );

    let page = ScriptedPage::new(server.uri());

    // No primary media: skip before any fetch.
    let outcome = processor
        .process(&RawUnit::Dom(page.view_for(1)), &extractor, "Higgsfield")
        .await
        .unwrap();
    assert_eq!(
        outcome,
        Outcome::Skipped(SkipReason::ExtractionFailed(
            ExtractionFailure::NoPrimaryMedia
        ))
    );
    assert_eq!(server.received_requests().await.unwrap().len(), 0);

    // Dead primary media: skip after the fetch budget, no row.
    let outcome = processor
        .process(&RawUnit::Dom(page.view_for(2)), &extractor, "Higgsfield")
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Skipped(SkipReason::PrimaryMediaFailed));
    assert_eq!(sink.total_rows(), 0);

    // Fully healthy unit: success with all three artifacts.
    let outcome = processor
        .process(&RawUnit::Dom(page.view_for(0)), &extractor, "Higgsfield")
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Success { artifacts: 3 });
    assert_eq!(sink.total_rows(), 1);
}
