use std::{path::PathBuf, time::Duration};

use clap::Parser;
use log::{info, warn};
use playcounter::{
    aggregator::{FailurePolicy, format_thousands},
    clients::{errors::Result, scraper::DEFAULT_PLAYCOUNT_SELECTOR},
    pipeline::{ConfigBuilder, Pipeline, Settings},
};

#[derive(Parser)]
#[command(name = "playcounter")]
#[command(version, about = "Fetch Spotify playlist stream counts.", long_about = None)]
struct Cli {
    /// Spotify playlist ID or full URL
    #[arg(long, alias = "playlist_id")]
    playlist_id: String,

    /// CSV file with client_id and client_secret columns
    #[arg(long, env = "PLAYCOUNTER_CREDENTIALS", default_value = "creds.csv")]
    credentials: PathBuf,

    /// Directory the CSV export is written to
    #[arg(long, env = "PLAYCOUNTER_OUTPUT_DIR", default_value = "out")]
    output_dir: PathBuf,

    /// What to do with a track whose stream count cannot be scraped
    #[arg(long, value_enum, default_value_t = FailurePolicy::Zero)]
    on_failure: FailurePolicy,

    /// Seconds to wait for the play count on each track page
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Playlist items fetched per API request (1-100)
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(1..=100))]
    page_size: u32,

    /// CSS selector of the play count element
    #[arg(long, default_value = DEFAULT_PLAYCOUNT_SELECTOR)]
    selector: String,

    /// Run the browser with a visible window
    #[arg(long)]
    show_browser: bool,
}

impl Cli {
    fn settings(&self) -> Settings {
        Settings {
            credentials_path: self.credentials.clone(),
            output_dir: self.output_dir.clone(),
            page_size: self.page_size,
            scrape_timeout: Duration::from_secs(self.timeout),
            playcount_selector: self.selector.clone(),
            failure_policy: self.on_failure,
            headless: !self.show_browser,
        }
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    info!("Building config ...");
    let config = ConfigBuilder::new().settings(cli.settings()).build().await?;
    let pipeline = Pipeline::new(config);
    let summary = pipeline.run(&cli.playlist_id).await?;

    println!(
        "\n✅ Done! Stream counts saved to: {}",
        summary.output_path.display()
    );
    println!("\n🎧 Total Streams: {}", format_thousands(summary.total_streams));

    if summary.failed_scrapes > 0 {
        warn!(
            "{} track(s) could not be scraped; their stream counts are unknown, not zero",
            summary.failed_scrapes
        );
    }
    Ok(())
}
