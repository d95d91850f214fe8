//! Fetch workers
//!
//! Each worker takes tasks from the shared fetch channel, runs them and
//! hands them back to the coordinator on the report channel. Workers share
//! nothing but the two channels.

use crate::crawler::task::Task;
use crate::CrawlError;
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// Fetch channel receiver shared by all workers
pub type SharedTaskReceiver = Arc<Mutex<mpsc::Receiver<Task>>>;

/// Runs one worker until the fetch channel is closed and empty
///
/// Returns an error only when a task could not write its output file; the
/// task is not reported in that case.
pub async fn run_worker(
    id: usize,
    client: Client,
    tasks: SharedTaskReceiver,
    reports: mpsc::Sender<Task>,
) -> Result<(), CrawlError> {
    tracing::debug!("Worker {} started", id);

    loop {
        let task = {
            let mut rx = tasks.lock().await;
            rx.recv().await
        };

        let mut task = match task {
            Some(task) => task,
            None => break,
        };

        if let Err(e) = task.execute(&client).await {
            tracing::error!("Worker {} stopping: {}", id, e);
            return Err(e);
        }

        if reports.send(task).await.is_err() {
            tracing::debug!("Worker {}: report channel closed", id);
            break;
        }
    }

    tracing::debug!("Worker {} exiting", id);
    Ok(())
}
