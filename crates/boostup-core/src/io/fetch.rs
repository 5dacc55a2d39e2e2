//! HTTP access to the Boost release index and archive mirrors.
//!
//! [`Fetch`] is the seam the catalog and source pipeline talk to; tests swap
//! in an in-memory implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Url};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::error::Result;

/// Download progress callback: bytes received so far and the expected total.
pub type Progress<'a> = &'a (dyn Fn(u64, Option<u64>) + Send + Sync);

/// Retrieval of remote documents and files.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetch a document as text.
    async fn fetch_text(&self, url: &Url) -> Result<String>;

    /// Stream `url` to `dest`, returning the number of bytes written.
    ///
    /// `dest` only appears once the transfer completed; an interrupted
    /// download never leaves a partial file under the final name.
    async fn download(&self, url: &Url, dest: &Path, progress: Progress<'_>) -> Result<u64>;
}

/// [`Fetch`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher with the boostup user agent.
    pub fn new() -> Result<Self> {
        let client = Client::builder().user_agent(crate::USER_AGENT).build()?;
        Ok(Self { client })
    }

    async fn stream_to(&self, url: &Url, path: &Path, progress: Progress<'_>) -> Result<u64> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?;

        let total = response.content_length();
        progress(0, total);

        let mut file = File::create(path).await?;
        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;
            progress(downloaded, total);
        }

        file.flush().await?;
        Ok(downloaded)
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch_text(&self, url: &Url) -> Result<String> {
        tracing::debug!(%url, "fetching");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }

    async fn download(&self, url: &Url, dest: &Path, progress: Progress<'_>) -> Result<u64> {
        tracing::debug!(%url, dest = %dest.display(), "downloading");
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let part = part_path(dest);
        match self.stream_to(url, &part, progress).await {
            Ok(bytes) => {
                tokio::fs::rename(&part, dest).await?;
                Ok(bytes)
            }
            Err(e) => {
                tokio::fs::remove_file(&part).await.ok();
                Err(e)
            }
        }
    }
}

/// Temporary name used while `dest` is being written.
pub fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
