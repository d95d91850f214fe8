//! Per-URL task pipeline
//!
//! A task fetches one URL, decides from the Content-Type what to do with the
//! body, writes text bodies to disk and, for HTML, extracts links from the
//! same bytes while they are being written.

use crate::crawler::fetcher::{fetch_url, ContentKind, FetchResult};
use crate::crawler::parser::extract_links_from_channel;
use crate::output::{output_path, save_stream, SavedBody};
use crate::state::TaskOutcome;
use crate::CrawlError;
use bytes::Bytes;
use reqwest::{Client, Response};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use url::Url;

/// Chunks buffered between the file writer and the link extractor
const TEE_CAPACITY: usize = 16;

/// One unit of crawl work
#[derive(Debug)]
pub struct Task {
    url: Url,
    out_dir: Arc<PathBuf>,
    links: Vec<Url>,
    outcome: TaskOutcome,
}

impl Task {
    /// Creates a pending task for `url` saving under `out_dir`
    pub fn new(url: Url, out_dir: Arc<PathBuf>) -> Self {
        Self {
            url,
            out_dir,
            links: Vec::new(),
            outcome: TaskOutcome::Pending,
        }
    }

    /// The URL this task fetches
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Links discovered on the page (empty unless the page was HTML)
    pub fn links(&self) -> &[Url] {
        &self.links
    }

    /// What happened when the task ran
    pub fn outcome(&self) -> &TaskOutcome {
        &self.outcome
    }

    /// File the body is written to
    pub fn output_path(&self) -> PathBuf {
        output_path(&self.out_dir, &self.url)
    }

    /// Runs the pipeline: fetch, classify, save, extract
    ///
    /// Fetch failures and non-text content are recorded in the outcome and
    /// return `Ok`. Only a failure to write the output file is returned as
    /// an error, and the caller is expected to stop the crawl on it.
    pub async fn execute(&mut self, client: &Client) -> Result<(), CrawlError> {
        tracing::debug!("Fetching {}", self.url);

        let (response, content_type) = match fetch_url(client, self.url.as_str()).await {
            FetchResult::Success {
                response,
                content_type,
            } => (response, content_type),
            FetchResult::HttpError { status_code } => {
                tracing::warn!("Skipping {}: HTTP {}", self.url, status_code);
                self.outcome = TaskOutcome::Failed {
                    reason: format!("HTTP {}", status_code),
                };
                return Ok(());
            }
            FetchResult::NetworkError { error } => {
                tracing::warn!("Skipping {}: {}", self.url, error);
                self.outcome = TaskOutcome::Failed { reason: error };
                return Ok(());
            }
        };

        let kind = ContentKind::from_content_type(&content_type);
        if !kind.is_saved() {
            // Dropping the response discards the unread body.
            tracing::debug!("Not saving {} ({:?})", self.url, content_type);
            self.outcome = TaskOutcome::Skipped { content_type };
            return Ok(());
        }

        let path = self.output_path();
        let saved = match kind {
            ContentKind::Html => self.save_and_extract(response, &path).await?,
            _ => save_stream(response.bytes_stream(), &path, None).await?,
        };

        self.outcome = match saved.read_error {
            Some(error) => {
                tracing::warn!(
                    "Body of {} interrupted after {} bytes: {}",
                    self.url,
                    saved.bytes,
                    error
                );
                TaskOutcome::Failed {
                    reason: format!("Body read failed: {}", error),
                }
            }
            None => {
                tracing::debug!(
                    "Saved {} to {} ({} bytes, {} links)",
                    self.url,
                    path.display(),
                    saved.bytes,
                    self.links.len()
                );
                TaskOutcome::Saved {
                    path,
                    bytes: saved.bytes,
                }
            }
        };

        Ok(())
    }

    /// Saves an HTML body while a dedicated thread tokenizes the same chunks
    ///
    /// The tokenizer runs on its own OS thread, outside tokio's blocking
    /// pool, since the file writes that feed it need that pool. The
    /// extractor is always joined before returning, including when the save
    /// fails.
    async fn save_and_extract(
        &mut self,
        response: Response,
        path: &Path,
    ) -> Result<SavedBody, CrawlError> {
        let (chunk_tx, chunk_rx) = mpsc::channel::<Bytes>(TEE_CAPACITY);
        let (links_tx, links_rx) = oneshot::channel();
        let base = self.url.clone();

        let spawned = std::thread::Builder::new()
            .name("link-extractor".to_string())
            .spawn(move || {
                let _ = links_tx.send(extract_links_from_channel(chunk_rx, base));
            });
        if let Err(e) = spawned {
            // The closure, and with it the receiver, is already dropped, so
            // the writer below saves the body without a tee.
            tracing::warn!("No link extractor for {}: {}", self.url, e);
        }

        // The sender moves into the writer and is dropped when it returns,
        // which ends the extractor's input.
        let saved = save_stream(response.bytes_stream(), path, Some(chunk_tx)).await;

        match links_rx.await {
            Ok(links) => self.links = links,
            Err(_) => tracing::warn!("Link extraction for {} did not complete", self.url),
        }

        saved
    }
}

#[cfg(test)]
impl Task {
    /// Fills in what `execute` would have produced
    pub(crate) fn set_result(&mut self, links: Vec<Url>, outcome: TaskOutcome) {
        self.links = links;
        self.outcome = outcome;
    }
}
