use crate::{CoreError, CoreResult, ImageFetcher};

use std::{panic::Location, path::Path, time::Duration};

use async_trait::async_trait;
use error_location::ErrorLocation;
use tracing::{debug, instrument};

const FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Downloads cover art over HTTP.
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    http: reqwest::Client,
}

impl HttpImageFetcher {
    /// Create a fetcher with its own HTTP client.
    #[track_caller]
    pub fn new() -> CoreResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| CoreError::ImageFetchFailed {
                url: String::new(),
                reason: format!("Failed to build HTTP client: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(Self { http })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str, destination: &Path) -> CoreResult<()> {
        let fetch_error = |reason: String| CoreError::ImageFetchFailed {
            url: url.to_string(),
            reason,
            location: ErrorLocation::from(Location::caller()),
        };

        let bytes = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| fetch_error(format!("Request failed: {}", e)))?
            .bytes()
            .await
            .map_err(|e| fetch_error(format!("Failed to read body: {}", e)))?;

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| fetch_error(format!("Failed to create {:?}: {}", parent, e)))?;
        }

        tokio::fs::write(destination, &bytes)
            .await
            .map_err(|e| fetch_error(format!("Failed to write {:?}: {}", destination, e)))?;

        debug!(byte_len = bytes.len(), destination = ?destination, "Cover image saved");

        Ok(())
    }
}
