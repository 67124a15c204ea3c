use async_trait::async_trait;
use log::debug;

use crate::clients::{
    entities::{CatalogPage, TrackRecord},
    errors::Result,
};

/// Read access to a music catalog's playlists.
///
/// Implementors only provide single lookups; paging and filtering of
/// unavailable entries happen in [`Catalog::fetch_tracks`].
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Display name of the playlist
    async fn fetch_playlist_name(&self, playlist_id: &str) -> Result<String>;

    /// One page of playlist items starting at `offset`
    async fn fetch_page(&self, playlist_id: &str, limit: u32, offset: u32)
    -> Result<CatalogPage>;

    /// All available tracks of the playlist, in playlist order.
    ///
    /// Removed or unavailable entries are dropped, so the result can be
    /// shorter than the playlist's nominal track count.
    async fn fetch_tracks(&self, playlist_id: &str, page_size: u32) -> Result<Vec<TrackRecord>> {
        let mut tracks = Vec::new();
        let mut offset = 0u32;
        let mut unavailable = 0usize;

        loop {
            let page = self.fetch_page(playlist_id, page_size, offset).await?;
            let fetched = page.items.len();
            debug!("Fetched {fetched} playlist items at offset {offset}");

            for item in page.items {
                match item {
                    Some(track) => tracks.push(track),
                    None => unavailable += 1,
                }
            }

            if !page.has_next || fetched == 0 {
                break;
            }
            offset += u32::try_from(fetched).unwrap_or(u32::MAX);
        }

        if unavailable > 0 {
            debug!("Skipped {unavailable} removed or unavailable playlist items");
        }
        Ok(tracks)
    }
}
