use serde::Serialize;

/// Public web page prefix for a track id
pub const TRACK_URL_BASE: &str = "https://open.spotify.com/track/";

/// A playlist track flattened to the fields the export needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRecord {
    pub id: String,
    pub name: String,
    pub artist: String, // all artists, joined with ", "
    pub url: String,
    pub popularity: u32,
}

impl TrackRecord {
    pub fn new<I, S>(
        id: impl Into<String>,
        name: impl Into<String>,
        artists: I,
        popularity: u32,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let id = id.into();
        let artist = artists
            .into_iter()
            .map(|a| a.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join(", ");
        TrackRecord {
            url: format!("{TRACK_URL_BASE}{id}"),
            id,
            name: name.into(),
            artist,
            popularity,
        }
    }
}

/// One page of playlist items. `None` marks a removed or unavailable entry.
#[derive(Debug, Clone, Default)]
pub struct CatalogPage {
    pub items: Vec<Option<TrackRecord>>,
    pub has_next: bool,
}

/// A CSV row: a track plus its parsed stream count
#[derive(Debug, Serialize)]
pub struct OutputRow<'a> {
    pub name: &'a str,
    pub artist: &'a str,
    pub url: &'a str,
    pub popularity: u32,
    pub stream_count: u64,
}

impl<'a> OutputRow<'a> {
    pub fn new(track: &'a TrackRecord, stream_count: u64) -> Self {
        OutputRow {
            name: &track.name,
            artist: &track.artist,
            url: &track.url,
            popularity: track.popularity,
            stream_count,
        }
    }
}
