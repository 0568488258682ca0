use std::time::Duration;

use tracing::debug;
use url::Url;

use super::{LoadError, Result};
use crate::utils::is_remote_url;

/// Reads raw document text from the network or the local filesystem
#[derive(Debug, Clone)]
pub struct DocumentSource {
    client: reqwest::Client,
}

impl DocumentSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(LoadError::Client)?;

        Ok(DocumentSource { client })
    }

    pub async fn fetch(&self, url: &Url) -> Result<String> {
        if is_remote_url(url) {
            self.fetch_remote(url).await
        } else {
            self.read_file(url).await
        }
    }

    async fn fetch_remote(&self, url: &Url) -> Result<String> {
        debug!(%url, "fetching remote document");

        let http_error = |source| LoadError::Http {
            location: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(http_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                location: url.to_string(),
                status,
            });
        }

        response.text().await.map_err(http_error)
    }

    async fn read_file(&self, url: &Url) -> Result<String> {
        let path = url
            .to_file_path()
            .map_err(|()| LoadError::InvalidPath(url.to_string()))?;
        debug!(path = %path.display(), "reading local document");

        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| LoadError::Io {
                location: path.display().to_string(),
                source,
            })
    }
}
