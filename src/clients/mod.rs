/// Playlist catalog abstraction with paging
pub mod catalog;
/// Credentials CSV loading
pub mod credentials;
/// Data entities for tracks and output rows
pub mod entities;
/// Error types and result aliases
pub mod errors;
/// CSV export of tracks and stream counts
pub mod output;
/// Stream count scraping through a headless browser
pub mod scraper;
/// Spotify API client
pub mod spotify;

pub use catalog::Catalog;
pub use output::CsvOutput;
pub use scraper::{HeadlessScraper, StreamCountSource};
pub use spotify::SpotifyClient;
