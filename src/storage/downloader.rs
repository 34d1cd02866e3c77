use crate::tmdb::{ImageKind, ImageUrls};
use crate::{Error, Result, fs_utils};
use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Outcome of one image download
#[derive(Debug)]
pub struct ImageOutcome {
    pub kind: ImageKind,
    pub path: PathBuf,
    pub result: Result<u64>,
}

impl ImageOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Downloader for film images
#[derive(Clone)]
pub struct Downloader {
    client: reqwest::Client,
}

impl Downloader {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build a downloader with its own client
    pub fn standalone() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("filmstash/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self::new(client))
    }

    /// Download an image from a URL straight into `output_path`.
    ///
    /// Single attempt. A file created by this attempt is removed when the
    /// body fails to arrive; a rejected request leaves any existing file alone.
    pub async fn download_image(&self, url: &str, output_path: &Path) -> Result<u64> {
        let response = self.request(url).await?;

        let file = tokio::fs::File::create(output_path)
            .await
            .map_err(|e| Error::fs(output_path, "create", e))?;

        let result = write_body(response, file, output_path).await;
        match result {
            Ok(written) => debug!("Downloaded {} ({} bytes) to {:?}", url, written, output_path),
            Err(_) => {
                if let Err(e) = fs_utils::remove_file(output_path).await {
                    warn!("Failed to clean up {:?}: {}", output_path, e);
                }
            }
        }
        result
    }

    async fn request(&self, url: &str) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::api(
                status.as_u16(),
                url,
                format!("Failed to download image: {status}"),
            ));
        }
        Ok(response)
    }

    /// Download every present image into `directory` concurrently.
    ///
    /// Downloads are independent: one failing never cancels the other, and
    /// failures are reported per image rather than as an overall error.
    pub async fn download_all(&self, urls: &ImageUrls, directory: &Path) -> Vec<ImageOutcome> {
        let downloads = urls.iter().map(|(kind, url)| async move {
            let path = directory.join(kind.file_name());
            let result = self.download_image(url, &path).await;
            if let Err(ref e) = result {
                warn!("Failed to download {} from {}: {}", kind, url, e);
            }
            ImageOutcome { kind, path, result }
        });

        join_all(downloads).await
    }
}

async fn write_body(
    mut response: reqwest::Response,
    mut file: tokio::fs::File,
    output_path: &Path,
) -> Result<u64> {
    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk)
            .await
            .map_err(|e| Error::fs(output_path, "write", e))?;
        written += chunk.len() as u64;
    }
    file.flush()
        .await
        .map_err(|e| Error::fs(output_path, "write", e))?;
    Ok(written)
}
