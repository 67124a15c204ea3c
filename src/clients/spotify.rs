use async_trait::async_trait;
use log::debug;

use crate::clients::{
    catalog::Catalog,
    credentials::ApiCredentials,
    entities::{CatalogPage, TrackRecord},
    errors::{Error, Result},
};
use rspotify::{
    ClientCredsSpotify, Credentials,
    model::{FullTrack, PlayableItem, PlaylistId, PlaylistItem},
    prelude::*,
};

const PLAYLIST_URI_PREFIX: &str = "spotify:playlist:";

// Tracks without an id are local files, which have no public page
impl TryFrom<FullTrack> for TrackRecord {
    type Error = FullTrack;

    fn try_from(track: FullTrack) -> std::result::Result<Self, Self::Error> {
        let Some(id) = track.id.as_ref().map(|id| id.id().to_owned()) else {
            return Err(track);
        };
        Ok(TrackRecord::new(
            id,
            track.name,
            track.artists.iter().map(|a| a.name.as_str()),
            track.popularity,
        ))
    }
}

fn record_from_item(item: PlaylistItem) -> Option<TrackRecord> {
    match item.track {
        Some(PlayableItem::Track(track)) => match TrackRecord::try_from(track) {
            Ok(record) => Some(record),
            Err(track) => {
                debug!("Skipping local track without id: {}", track.name);
                None
            }
        },
        Some(_) => {
            debug!("Skipping non-track playlist item");
            None
        }
        None => None,
    }
}

/// Reduce a playlist id, URI or URL to the bare id.
///
/// `https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M?si=abc` and
/// `spotify:playlist:37i9dQZF1DXcBWIGoYBM5M` both give `37i9dQZF1DXcBWIGoYBM5M`.
pub fn playlist_id_from_arg(arg: &str) -> Result<&str> {
    let arg = arg.trim();
    let last_segment = arg.rsplit('/').next().unwrap_or(arg);
    let without_query = last_segment.split('?').next().unwrap_or(last_segment);
    let id = without_query
        .strip_prefix(PLAYLIST_URI_PREFIX)
        .unwrap_or(without_query);

    if id.is_empty() {
        return Err(Error::ConfigurationError(format!(
            "No playlist id found in {arg:?}"
        )));
    }
    Ok(id)
}

/// [`Catalog`] backed by the Spotify Web API with an app-only token
pub struct SpotifyClient {
    pub spotify: ClientCredsSpotify,
}

impl SpotifyClient {
    pub fn new(spotify: ClientCredsSpotify) -> Self {
        SpotifyClient { spotify }
    }

    // Create a client from the credentials file pair and request an app token.
    // Only public playlists are reachable with the client credentials flow.
    pub async fn try_from_credentials(creds: &ApiCredentials) -> Result<Self> {
        debug!("Requesting Spotify client credentials token ...");
        let spotify =
            ClientCredsSpotify::new(Credentials::new(&creds.client_id, &creds.client_secret));
        spotify.request_token().await?;
        Ok(Self::new(spotify))
    }
}

#[async_trait]
impl Catalog for SpotifyClient {
    async fn fetch_playlist_name(&self, playlist_id: &str) -> Result<String> {
        let playlist_id = PlaylistId::from_id(playlist_id)?;
        let playlist = self.spotify.playlist(playlist_id, None, None).await?;
        Ok(playlist.name)
    }

    async fn fetch_page(
        &self,
        playlist_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<CatalogPage> {
        let playlist_id = PlaylistId::from_id(playlist_id)?;
        let page = self
            .spotify
            .playlist_items_manual(playlist_id, None, None, Some(limit), Some(offset))
            .await?;
        Ok(CatalogPage {
            has_next: page.next.is_some(),
            items: page.items.into_iter().map(record_from_item).collect(),
        })
    }
}
