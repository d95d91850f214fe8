//! Streaming body writer
//!
//! Copies a response body to its output file chunk by chunk. When a tee
//! sender is supplied, every chunk that reaches the file is also forwarded,
//! unchanged, to a second consumer (the link extractor). The writer never
//! stops early because of the second consumer: if it hangs up, the
//! remaining chunks still go to disk.

use crate::CrawlError;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::fmt::Display;
use std::path::Path;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

/// Result of copying a body to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedBody {
    /// Bytes written to the file
    pub bytes: u64,
    /// Set when the body stream failed before its end
    pub read_error: Option<String>,
}

/// Writes a body stream to `path`, creating parent directories as needed
///
/// Any failure to create directories, create the file or write to it is
/// returned as [`CrawlError::Save`]. A failure of the body stream itself is
/// not an error here: copying stops and the reason is reported in
/// [`SavedBody::read_error`].
pub async fn save_stream<S, E>(
    body: S,
    path: &Path,
    tee: Option<mpsc::Sender<Bytes>>,
) -> Result<SavedBody, CrawlError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Display,
{
    let mut body = std::pin::pin!(body);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| CrawlError::Save {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let save_error = |source| CrawlError::Save {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::create(path).await.map_err(save_error)?;
    let mut tee = tee;
    let mut written = 0u64;
    let mut read_error = None;

    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                read_error = Some(e.to_string());
                break;
            }
        };

        file.write_all(&chunk).await.map_err(save_error)?;
        written += chunk.len() as u64;

        let forwarded = match &tee {
            Some(sender) => sender.send(chunk).await.is_ok(),
            None => true,
        };
        if !forwarded {
            tracing::trace!("Link extractor hung up, continuing to save {}", path.display());
            tee = None;
        }
    }

    file.flush().await.map_err(save_error)?;

    Ok(SavedBody {
        bytes: written,
        read_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use std::io;
    use tempfile::TempDir;

    fn chunks(parts: &[&'static str]) -> Vec<Result<Bytes, io::Error>> {
        parts
            .iter()
            .map(|part| Ok(Bytes::from_static(part.as_bytes())))
            .collect()
    }

    #[tokio::test]
    async fn test_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("example.com/pkg/strings/index.html");

        let saved = save_stream(stream::iter(chunks(&["<html>", "</html>"])), &path, None)
            .await
            .unwrap();

        assert_eq!(saved.bytes, 13);
        assert_eq!(saved.read_error, None);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<html></html>");
    }

    #[tokio::test]
    async fn test_tee_sees_identical_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("page.html");
        let parts: Vec<String> = (0..64).map(|i| format!("<p>chunk {}</p>\n", i)).collect();
        let expected: String = parts.concat();

        // Capacity smaller than the chunk count forces both sides to interleave.
        let (tx, mut rx) = mpsc::channel::<Bytes>(2);
        let consumer = tokio::spawn(async move {
            let mut seen = Vec::new();
            while let Some(chunk) = rx.recv().await {
                seen.extend_from_slice(&chunk);
            }
            seen
        });

        let body = stream::iter(
            parts
                .into_iter()
                .map(|p| Ok::<_, io::Error>(Bytes::from(p)))
                .collect::<Vec<_>>(),
        );
        let saved = save_stream(body, &path, Some(tx)).await.unwrap();
        let teed = consumer.await.unwrap();

        assert_eq!(saved.bytes, expected.len() as u64);
        assert_eq!(std::fs::read(&path).unwrap(), expected.as_bytes());
        assert_eq!(teed, expected.as_bytes());
    }

    #[tokio::test]
    async fn test_saving_continues_after_consumer_hangs_up() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("page.html");

        let (tx, rx) = mpsc::channel::<Bytes>(1);
        drop(rx);

        let saved = save_stream(stream::iter(chunks(&["a", "b", "c"])), &path, Some(tx))
            .await
            .unwrap();

        assert_eq!(saved.bytes, 3);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_read_error_stops_copy_without_failing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partial.html");
        let body = stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
            Ok(Bytes::from_static(b"never")),
        ]);

        let saved = save_stream(body, &path, None).await.unwrap();

        assert_eq!(saved.bytes, 7);
        assert!(saved.read_error.unwrap().contains("reset"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "partial");
    }

    #[tokio::test]
    async fn test_unwritable_path_is_save_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let path = blocker.join("page.html");

        let result = save_stream(stream::iter(chunks(&["x"])), &path, None).await;

        assert!(matches!(result, Err(CrawlError::Save { .. })));
    }
}
