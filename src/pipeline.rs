use std::{io::Write, path::PathBuf, time::Duration};

use log::{debug, info};

use crate::aggregator::{Aggregator, FailurePolicy};
use crate::clients::{
    Catalog, CsvOutput, HeadlessScraper, SpotifyClient, StreamCountSource,
    credentials::load_credentials,
    entities::TrackRecord,
    errors::{Error, Result},
    output::output_path,
    scraper::{DEFAULT_PLAYCOUNT_SELECTOR, ScraperSettings},
    spotify::playlist_id_from_arg,
};

/// Largest page the playlist items endpoint accepts
pub const MAX_PAGE_SIZE: u32 = 100;

/// Tunables of a run. `Settings::default()` reproduces the stock behaviour.
#[derive(Debug, Clone)]
pub struct Settings {
    /// CSV file with `client_id` and `client_secret` columns
    pub credentials_path: PathBuf,
    /// Directory the export is written to, created if missing
    pub output_dir: PathBuf,
    /// Playlist items requested per API call
    pub page_size: u32,
    /// How long to wait for the play count element on each page
    pub scrape_timeout: Duration,
    /// CSS selector of the play count element
    pub playcount_selector: String,
    /// What to do with tracks whose scrape failed
    pub failure_policy: FailurePolicy,
    /// Run the browser without a window
    pub headless: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            credentials_path: PathBuf::from("creds.csv"),
            output_dir: PathBuf::from("out"),
            page_size: MAX_PAGE_SIZE,
            scrape_timeout: Duration::from_secs(10),
            playcount_selector: DEFAULT_PLAYCOUNT_SELECTOR.to_string(),
            failure_policy: FailurePolicy::Zero,
            headless: true,
        }
    }
}

impl Settings {
    pub fn scraper_settings(&self) -> ScraperSettings {
        ScraperSettings {
            selector: self.playcount_selector.clone(),
            timeout: self.scrape_timeout,
            headless: self.headless,
        }
    }
}

/// Collaborators and settings for a [`Pipeline`]
pub struct Config {
    pub catalog: Box<dyn Catalog>,
    pub scraper: Box<dyn StreamCountSource>,
    pub settings: Settings,
}

/// Builds a [`Config`], filling in the real clients for anything not injected
pub struct ConfigBuilder {
    catalog: Option<Box<dyn Catalog>>,
    scraper: Option<Box<dyn StreamCountSource>>,
    settings: Settings,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            catalog: None,
            scraper: None,
            settings: Settings::default(),
        }
    }

    #[must_use]
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn catalog(mut self, catalog: impl Catalog + 'static) -> Self {
        self.catalog = Some(Box::new(catalog));
        self
    }

    #[must_use]
    pub fn scraper(mut self, scraper: impl StreamCountSource + 'static) -> Self {
        self.scraper = Some(Box::new(scraper));
        self
    }

    // Missing collaborators are built from the settings: the Spotify client
    // from the credentials file, the scraper by launching a browser.
    pub async fn build(self) -> Result<Config> {
        let settings = self.settings;
        if settings.page_size == 0 || settings.page_size > MAX_PAGE_SIZE {
            return Err(Error::ConfigurationError(format!(
                "Page size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                settings.page_size
            )));
        }

        let catalog = match self.catalog {
            Some(c) => c,
            None => {
                let creds = load_credentials(&settings.credentials_path)?;
                Box::new(SpotifyClient::try_from_credentials(&creds).await?)
            }
        };
        let scraper = match self.scraper {
            Some(s) => s,
            None => Box::new(HeadlessScraper::launch(settings.scraper_settings())?),
        };
        Ok(Config {
            catalog,
            scraper,
            settings,
        })
    }
}

/// Outcome of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// The CSV file that was written
    pub output_path: PathBuf,
    /// Data rows in the CSV, header excluded
    pub rows_written: usize,
    /// Running total of parsed stream counts
    pub total_streams: u64,
    /// Tracks whose scrape failed. Their stream count is unknown rather than zero.
    pub failed_scrapes: usize,
    /// Tracks left out by the skip policy
    pub skipped: usize,
}

/// Fetches a playlist, scrapes every track and writes the export
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Pipeline { config }
    }

    pub async fn run(&self, playlist_arg: &str) -> Result<RunSummary> {
        let settings = &self.config.settings;
        let playlist_id = playlist_id_from_arg(playlist_arg)?;

        let playlist_name = self.config.catalog.fetch_playlist_name(playlist_id).await?;
        info!("Playlist: {playlist_name}");
        let path = output_path(&settings.output_dir, &playlist_name);
        std::fs::create_dir_all(&settings.output_dir)?;

        println!("Fetching playlist tracks via Spotify API...");
        let tracks = self
            .config
            .catalog
            .fetch_tracks(playlist_id, settings.page_size)
            .await?;
        println!("Found {} tracks.", tracks.len());

        let output = CsvOutput::create(&path)?;
        let mut aggregator = Aggregator::new(output, settings.failure_policy);
        self.process_tracks(&tracks, &mut aggregator)?;

        let summary = RunSummary {
            output_path: path,
            rows_written: aggregator.rows_written(),
            total_streams: aggregator.total(),
            failed_scrapes: aggregator.failed_scrapes(),
            skipped: aggregator.skipped(),
        };
        aggregator.finish()?;
        info!(
            "Run completed. Rows written: {}, failed scrapes: {}",
            summary.rows_written, summary.failed_scrapes
        );
        Ok(summary)
    }

    // One track at a time, in playlist order, with the same browser tab
    fn process_tracks<W: Write>(
        &self,
        tracks: &[TrackRecord],
        aggregator: &mut Aggregator<W>,
    ) -> Result<()> {
        let scraper = self.config.scraper.as_ref();
        for track in tracks {
            print!("Processing: {} by {}...\r", track.name, track.artist);
            std::io::stdout().flush().ok();

            debug!("Scraping {}", track.url);
            let line = match aggregator.record(track, scraper)? {
                Some(streams) => format!(
                    "✔ Done: {} by {} | Popularity: {} | Streams: {streams}",
                    track.name, track.artist, track.popularity
                ),
                None => format!("✘ Skipped: {} by {}", track.name, track.artist),
            };
            println!("{line:<100}");
        }
        Ok(())
    }
}
