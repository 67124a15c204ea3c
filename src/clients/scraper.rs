use std::{sync::Arc, time::Duration};

use headless_chrome::{Browser, LaunchOptions, Tab};
use log::{debug, warn};

use crate::clients::errors::{Error, Result};

/// Placeholder used when a stream count cannot be obtained
pub const NOT_AVAILABLE: &str = "N/A";

/// Element holding the play count on a track page
pub const DEFAULT_PLAYCOUNT_SELECTOR: &str = r#"span[data-testid="playcount"]"#;

// The browser must outlive the catalog fetch that runs before the first scrape
const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(600);

/// Source of the human-facing stream count text for a track page.
///
/// This is the only place that knows how the count is located on the page.
#[cfg_attr(test, mockall::automock)]
pub trait StreamCountSource {
    /// Rendered text of the stream count element, e.g. `"1,234,567"`
    fn fetch_stream_count(&self, url: &str) -> Result<String>;
}

/// Stream count text for `url`, or [`NOT_AVAILABLE`] when the lookup fails
pub fn get_stream_count(source: &dyn StreamCountSource, url: &str) -> String {
    match source.fetch_stream_count(url) {
        Ok(text) => text,
        Err(e) => {
            warn!("Error getting play count for {url}: {e}");
            NOT_AVAILABLE.to_string()
        }
    }
}

/// Browser-side knobs of [`HeadlessScraper`]
#[derive(Debug, Clone)]
pub struct ScraperSettings {
    /// CSS selector of the play count element
    pub selector: String,
    /// How long to wait for the element after the page has loaded
    pub timeout: Duration,
    /// Run Chrome without a window
    pub headless: bool,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        ScraperSettings {
            selector: DEFAULT_PLAYCOUNT_SELECTOR.to_string(),
            timeout: Duration::from_secs(10),
            headless: true,
        }
    }
}

/// Scrapes track pages with one Chrome instance and one tab for the whole run.
/// Dropping the scraper shuts the browser down.
pub struct HeadlessScraper {
    // kept alive for the tab, the process is killed on drop
    _browser: Browser,
    tab: Arc<Tab>,
    settings: ScraperSettings,
}

fn browser_error(e: impl std::fmt::Display) -> Error {
    Error::BrowserError(e.to_string())
}

impl HeadlessScraper {
    /// Start Chrome and open the tab used for every track
    pub fn launch(settings: ScraperSettings) -> Result<Self> {
        debug!("Launching browser (headless: {}) ...", settings.headless);
        let options = LaunchOptions::default_builder()
            .headless(settings.headless)
            .idle_browser_timeout(IDLE_BROWSER_TIMEOUT)
            .build()
            .map_err(browser_error)?;
        let browser = Browser::new(options).map_err(browser_error)?;
        let tab = browser.new_tab().map_err(browser_error)?;
        Ok(HeadlessScraper {
            _browser: browser,
            tab,
            settings,
        })
    }
}

fn scrape_error(url: &str, e: impl std::fmt::Display) -> Error {
    Error::ScrapeError {
        url: url.to_string(),
        reason: e.to_string(),
    }
}

impl StreamCountSource for HeadlessScraper {
    fn fetch_stream_count(&self, url: &str) -> Result<String> {
        // The tab is reused, so the previous track's element stays in the DOM
        // until the new document has loaded
        self.tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| scrape_error(url, e))?;
        let element = self
            .tab
            .wait_for_element_with_custom_timeout(&self.settings.selector, self.settings.timeout)
            .map_err(|e| scrape_error(url, e))?;
        let text = element.get_inner_text().map_err(|e| scrape_error(url, e))?;
        debug!("Scraped {text:?} from {url}");
        Ok(text.trim().to_string())
    }
}
