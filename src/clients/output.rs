use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use log::debug;

use crate::clients::{
    entities::{OutputRow, TrackRecord},
    errors::{Error, Result},
};

/// Column names of the exported file, in write order
pub const HEADER: [&str; 5] = [
    "Track Name",
    "Artist",
    "Track URL",
    "Popularity",
    "Stream Count",
];

/// Replace every char outside `[A-Za-z0-9_-]` with `_`
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `{output_dir}/{sanitized playlist name}_stream_counts.csv`
pub fn output_path(output_dir: &Path, playlist_name: &str) -> PathBuf {
    output_dir.join(format!(
        "{}_stream_counts.csv",
        sanitize_filename(playlist_name)
    ))
}

/// CSV sink for output rows. The header is written on creation.
pub struct CsvOutput<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvOutput<File> {
    pub fn create(path: &Path) -> Result<Self> {
        debug!("Creating output file {path:?}");
        let file = File::create(path)?;
        Self::from_writer(file)
    }
}

impl<W: Write> CsvOutput<W> {
    pub fn from_writer(inner: W) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        writer.write_record(HEADER)?;
        Ok(CsvOutput { writer })
    }

    pub fn append_row(&mut self, track: &TrackRecord, stream_count: u64) -> Result<()> {
        self.writer
            .serialize(OutputRow::new(track, stream_count))?;
        Ok(())
    }

    /// Flush buffered rows and hand back the underlying writer
    pub fn finish(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| Error::from(e.into_error()))
    }
}
