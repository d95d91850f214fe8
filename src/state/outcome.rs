/// Outcome definitions for executed crawl tasks
///
/// Every dispatched task ends in exactly one of these states. None of them
/// stops the crawl: only a failed write to the output directory does, and
/// that surfaces as an error rather than an outcome.
use std::fmt;
use std::path::PathBuf;

/// What happened when a task was executed
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TaskOutcome {
    /// Task has not been executed yet
    #[default]
    Pending,

    /// The body was written to disk
    Saved {
        /// File the body was written to
        path: PathBuf,
        /// Number of body bytes written
        bytes: u64,
    },

    /// The resource is not text and was not saved
    Skipped {
        /// The Content-Type that caused the skip (empty when absent)
        content_type: String,
    },

    /// The fetch failed; the task contributes no links
    Failed {
        /// Human readable reason
        reason: String,
    },
}

impl TaskOutcome {
    /// Returns true if the body was saved
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }

    /// Returns true if the fetch failed
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Saved { path, bytes } => write!(f, "saved {} ({} bytes)", path.display(), bytes),
            Self::Skipped { content_type } if content_type.is_empty() => {
                write!(f, "skipped (no content type)")
            }
            Self::Skipped { content_type } => write!(f, "skipped ({})", content_type),
            Self::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}
