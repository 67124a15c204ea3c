use std::path::Path;

use async_trait::async_trait;
use playcounter::{
    aggregator::FailurePolicy,
    clients::{
        Catalog, StreamCountSource,
        entities::{CatalogPage, TrackRecord},
        errors::{Error, Result},
    },
    pipeline::{ConfigBuilder, Pipeline, Settings},
};

struct FakeCatalog {
    name: String,
    pages: Vec<CatalogPage>,
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn fetch_playlist_name(&self, _playlist_id: &str) -> Result<String> {
        Ok(self.name.clone())
    }

    async fn fetch_page(&self, _playlist_id: &str, limit: u32, offset: u32) -> Result<CatalogPage> {
        // pages are laid out by offset, one page per `limit` items
        let index = (offset / limit) as usize;
        Ok(self.pages.get(index).cloned().unwrap_or_default())
    }
}

// Scrapes a fixed text per track id; ids listed in `failing` time out
struct FakeScraper {
    counts: Vec<(&'static str, &'static str)>,
    failing: Vec<&'static str>,
}

impl FakeScraper {
    fn new(counts: Vec<(&'static str, &'static str)>, failing: Vec<&'static str>) -> Self {
        FakeScraper { counts, failing }
    }
}

impl StreamCountSource for FakeScraper {
    fn fetch_stream_count(&self, url: &str) -> Result<String> {
        let id = url.rsplit('/').next().unwrap_or_default();
        if self.failing.contains(&id) {
            return Err(Error::ScrapeError {
                url: url.to_string(),
                reason: "timed out waiting for element".into(),
            });
        }
        Ok(self
            .counts
            .iter()
            .find(|(track_id, _)| *track_id == id)
            .map_or("N/A", |(_, text)| *text)
            .to_string())
    }
}

fn track(id: &str, name: &str) -> Option<TrackRecord> {
    Some(TrackRecord::new(id, name, ["Artist One", "Artist Two"], 55))
}

fn single_page(items: Vec<Option<TrackRecord>>) -> Vec<CatalogPage> {
    vec![CatalogPage {
        items,
        has_next: false,
    }]
}

fn settings(output_dir: &Path, policy: FailurePolicy) -> Settings {
    Settings {
        output_dir: output_dir.to_path_buf(),
        failure_policy: policy,
        ..Settings::default()
    }
}

fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    assert_eq!(
        reader.headers().unwrap().iter().collect::<Vec<_>>(),
        ["Track Name", "Artist", "Track URL", "Popularity", "Stream Count"]
    );
    reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_owned).collect())
        .collect()
}

async fn run(
    pages: Vec<CatalogPage>,
    scraper: FakeScraper,
    policy: FailurePolicy,
    output_dir: &Path,
) -> Result<playcounter::pipeline::RunSummary> {
    let config = ConfigBuilder::new()
        .settings(settings(output_dir, policy))
        .catalog(FakeCatalog {
            name: "Road Trip: 2024!".into(),
            pages,
        })
        .scraper(scraper)
        .build()
        .await?;
    Pipeline::new(config)
        .run("https://open.spotify.com/playlist/road?si=xyz")
        .await
}

#[tokio::test]
async fn removed_track_produces_no_row() {
    let dir = tempfile::tempdir().unwrap();
    let scraper = FakeScraper::new(vec![("t1", "1,000"), ("t3", "2,500")], vec![]);

    let summary = run(
        single_page(vec![track("t1", "First"), None, track("t3", "Third")]),
        scraper,
        FailurePolicy::Zero,
        dir.path(),
    )
    .await
    .unwrap();

    assert_eq!(
        summary.output_path,
        dir.path().join("Road_Trip__2024__stream_counts.csv")
    );
    assert_eq!(summary.rows_written, 2);
    assert_eq!(summary.total_streams, 3500);

    let rows = read_rows(&summary.output_path);
    assert_eq!(
        rows,
        vec![
            vec![
                "First",
                "Artist One, Artist Two",
                "https://open.spotify.com/track/t1",
                "55",
                "1000"
            ],
            vec![
                "Third",
                "Artist One, Artist Two",
                "https://open.spotify.com/track/t3",
                "55",
                "2500"
            ],
        ]
    );
}

#[tokio::test]
async fn failed_scrape_writes_zero_and_continues() {
    let dir = tempfile::tempdir().unwrap();
    let scraper = FakeScraper::new(vec![("a", "10"), ("c", "30")], vec!["b"]);

    let summary = run(
        single_page(vec![track("a", "A"), track("b", "B"), track("c", "C")]),
        scraper,
        FailurePolicy::Zero,
        dir.path(),
    )
    .await
    .unwrap();

    assert_eq!(summary.rows_written, 3);
    assert_eq!(summary.failed_scrapes, 1);
    assert_eq!(summary.total_streams, 40);

    let counts: Vec<_> = read_rows(&summary.output_path)
        .into_iter()
        .map(|row| (row[0].clone(), row[4].clone()))
        .collect();
    assert_eq!(
        counts,
        [
            ("A".to_string(), "10".to_string()),
            ("B".to_string(), "0".to_string()),
            ("C".to_string(), "30".to_string()),
        ]
    );
}

#[tokio::test]
async fn unparsable_text_counts_as_zero() {
    let dir = tempfile::tempdir().unwrap();
    let scraper = FakeScraper::new(vec![("a", "N/A"), ("b", "lots")], vec![]);

    let summary = run(
        single_page(vec![track("a", "A"), track("b", "B")]),
        scraper,
        FailurePolicy::Zero,
        dir.path(),
    )
    .await
    .unwrap();

    assert_eq!(summary.rows_written, 2);
    assert_eq!(summary.failed_scrapes, 0);
    assert_eq!(summary.total_streams, 0);
}

#[tokio::test]
async fn skip_policy_drops_failed_track() {
    let dir = tempfile::tempdir().unwrap();
    let scraper = FakeScraper::new(vec![("a", "5"), ("c", "7")], vec!["b"]);

    let summary = run(
        single_page(vec![track("a", "A"), track("b", "B"), track("c", "C")]),
        scraper,
        FailurePolicy::Skip,
        dir.path(),
    )
    .await
    .unwrap();

    assert_eq!(summary.rows_written, 2);
    assert_eq!(summary.skipped, 1);
    let names: Vec<_> = read_rows(&summary.output_path)
        .into_iter()
        .map(|row| row[0].clone())
        .collect();
    assert_eq!(names, ["A", "C"]);
}

#[tokio::test]
async fn abort_policy_stops_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let scraper = FakeScraper::new(vec![("a", "5"), ("c", "7")], vec!["b"]);

    let err = run(
        single_page(vec![track("a", "A"), track("b", "B"), track("c", "C")]),
        scraper,
        FailurePolicy::Abort,
        dir.path(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::ScrapeError { ref url, .. } if url.ends_with("/b")));
}

#[tokio::test]
async fn tracks_across_pages_keep_order() {
    let dir = tempfile::tempdir().unwrap();
    let pages: Vec<_> = (0..3)
        .map(|p| CatalogPage {
            items: (0..100)
                .map(|i| {
                    let id = format!("p{p}i{i}");
                    // every tenth entry is a removed track
                    if i % 10 == 9 { None } else { track(&id, &id) }
                })
                .collect(),
            has_next: p < 2,
        })
        .collect();
    let scraper = FakeScraper::new(vec![], vec![]);

    let summary = run(pages, scraper, FailurePolicy::Zero, dir.path())
        .await
        .unwrap();

    assert_eq!(summary.rows_written, 270);
    let names: Vec<_> = read_rows(&summary.output_path)
        .into_iter()
        .map(|row| row[0].clone())
        .collect();
    assert_eq!(names.first().map(String::as_str), Some("p0i0"));
    assert_eq!(names.get(9).map(String::as_str), Some("p0i10"));
    assert_eq!(names.last().map(String::as_str), Some("p2i98"));
}

#[tokio::test]
async fn empty_playlist_still_writes_header() {
    let dir = tempfile::tempdir().unwrap();
    let summary = run(
        single_page(vec![]),
        FakeScraper::new(vec![], vec![]),
        FailurePolicy::Zero,
        dir.path(),
    )
    .await
    .unwrap();

    assert_eq!(summary.rows_written, 0);
    assert!(read_rows(&summary.output_path).is_empty());
}

#[tokio::test]
async fn invalid_page_size_is_rejected() {
    let config = ConfigBuilder::new()
        .settings(Settings {
            page_size: 0,
            ..Settings::default()
        })
        .catalog(FakeCatalog {
            name: "x".into(),
            pages: vec![],
        })
        .scraper(FakeScraper::new(vec![], vec![]))
        .build()
        .await;

    assert!(matches!(config, Err(Error::ConfigurationError(_))));
}
