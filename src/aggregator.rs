//! Turns scrape results into CSV rows and a running stream total.

use std::{cell::Cell, io::Write};

use log::{debug, warn};

use crate::clients::{
    CsvOutput, StreamCountSource,
    entities::TrackRecord,
    errors::Result,
    scraper::get_stream_count,
};

/// What to do with a track whose stream count could not be scraped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum FailurePolicy {
    /// Write the row with a stream count of 0
    #[default]
    Zero,
    /// Leave the track out of the output
    Skip,
    /// Stop the run with the scrape error
    Abort,
}

/// Parse scraped text such as `"1,234,567"`. Anything unparsable counts as 0.
pub fn parse_count(text: &str) -> u64 {
    let digits = text.replace(',', "");
    match digits.trim().parse::<u64>() {
        Ok(count) => count,
        Err(e) => {
            debug!("Unparsable stream count {text:?}: {e}");
            0
        }
    }
}

/// `1234567` -> `"1,234,567"`
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// Remembers whether the wrapped source failed, so the sentinel path can
// still be counted as a failed scrape
struct FailureTracking<'a> {
    inner: &'a dyn StreamCountSource,
    failed: Cell<bool>,
}

impl StreamCountSource for FailureTracking<'_> {
    fn fetch_stream_count(&self, url: &str) -> Result<String> {
        let scraped = self.inner.fetch_stream_count(url);
        self.failed.set(scraped.is_err());
        scraped
    }
}

/// Writes one row per scraped track and keeps the running total
pub struct Aggregator<W: Write> {
    output: CsvOutput<W>,
    policy: FailurePolicy,
    total: u64,
    rows_written: usize,
    failed_scrapes: usize,
    skipped: usize,
}

impl<W: Write> Aggregator<W> {
    /// Start with an empty total; the header is already in `output`
    pub fn new(output: CsvOutput<W>, policy: FailurePolicy) -> Self {
        Aggregator {
            output,
            policy,
            total: 0,
            rows_written: 0,
            failed_scrapes: 0,
            skipped: 0,
        }
    }

    /// Scrape one track, apply the failure policy and write its row.
    ///
    /// Returns the parsed count, or `None` when the track was skipped.
    pub fn record(
        &mut self,
        track: &TrackRecord,
        source: &dyn StreamCountSource,
    ) -> Result<Option<u64>> {
        let text = match self.policy {
            FailurePolicy::Zero => {
                let tracked = FailureTracking {
                    inner: source,
                    failed: Cell::new(false),
                };
                let text = get_stream_count(&tracked, &track.url);
                if tracked.failed.get() {
                    self.failed_scrapes += 1;
                }
                text
            }
            FailurePolicy::Skip | FailurePolicy::Abort => {
                match source.fetch_stream_count(&track.url) {
                    Ok(text) => text,
                    Err(e) => {
                        self.failed_scrapes += 1;
                        if self.policy == FailurePolicy::Abort {
                            return Err(e);
                        }
                        warn!("Skipping {} after scrape error: {e}", track.url);
                        self.skipped += 1;
                        return Ok(None);
                    }
                }
            }
        };

        let count = parse_count(&text);
        self.output.append_row(track, count)?;
        self.total = self.total.saturating_add(count);
        self.rows_written += 1;
        Ok(Some(count))
    }

    /// Sum of every parsed count written so far
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Scrapes that errored, whatever the policy did with them
    pub fn failed_scrapes(&self) -> usize {
        self.failed_scrapes
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Flush the output and return the underlying writer
    pub fn finish(self) -> Result<W> {
        self.output.finish()
    }
}
