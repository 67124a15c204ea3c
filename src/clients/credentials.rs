use std::{io::Read, path::Path};

use log::debug;
use serde::Deserialize;

use crate::clients::errors::{Error, Result};

/// API key pair read from the credentials CSV
#[derive(Debug, Clone, Deserialize)]
pub struct ApiCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl ApiCredentials {
    // Only the first data row is used, extra columns are ignored
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(reader);
        match reader.deserialize::<ApiCredentials>().next() {
            Some(row) => Ok(row?),
            None => Err(Error::ConfigurationError(
                "Credentials file has no data rows".into(),
            )),
        }
    }
}

/// Load the Spotify client id and secret from a CSV file with a header row
pub fn load_credentials(path: &Path) -> Result<ApiCredentials> {
    debug!("Loading API credentials from {path:?}");
    let file = std::fs::File::open(path).map_err(|e| {
        Error::ConfigurationError(format!("Cannot open credentials file {path:?}: {e}"))
    })?;
    ApiCredentials::from_reader(file)
}
