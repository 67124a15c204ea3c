//! Playcounter - export a Spotify playlist with per-track stream counts
//!
//! Track metadata comes from the Spotify Web API. Stream counts are scraped
//! from each track's public page with a headless browser, and the combined
//! rows are written to a CSV file.

/// Stream count parsing, failure policy and running total
pub mod aggregator;
/// Client modules for external services and the CSV export
pub mod clients;
/// Run configuration and the fetch, scrape, write flow
pub mod pipeline;
