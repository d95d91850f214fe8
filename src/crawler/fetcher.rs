//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client
//! - GET requests returning the still-unread response
//! - Classifying responses by Content-Type
//!
//! There is no retry: a network error or a non-200 status is reported once
//! and the URL is dropped.

use crate::config::HttpConfig;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// 200 response whose body has not been read yet
    Success {
        /// The response, ready to stream
        response: Response,
        /// Content-Type header value (empty when absent)
        content_type: String,
    },

    /// Any status other than 200
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Connection refused, DNS failure, TLS error, timeout, ...
    NetworkError {
        /// Error description
        error: String,
    },
}

/// How a response body is handled, decided by its Content-Type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// HTML: saved and scanned for links
    Html,
    /// Other text: saved only
    Text,
    /// Anything else: discarded
    Other,
}

impl ContentKind {
    /// Classifies a Content-Type header value
    ///
    /// `text/html` is HTML; any other `text/*` type and
    /// `application/x-javascript` are text. Matching is a case-insensitive
    /// prefix test, so parameters such as `; charset=utf-8` are ignored.
    pub fn from_content_type(content_type: &str) -> Self {
        let content_type = content_type.trim().to_ascii_lowercase();
        if content_type.starts_with("text/html") {
            Self::Html
        } else if content_type.starts_with("text/")
            || content_type.starts_with("application/x-javascript")
        {
            Self::Text
        } else {
            Self::Other
        }
    }

    /// Returns true if the body should be written to disk
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Html | Self::Text)
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects follow reqwest's default policy. No timeout is set unless the
/// configuration asks for one.
///
/// # Example
///
/// ```no_run
/// use site_mirror::config::HttpConfig;
/// use site_mirror::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(config.user_agent.clone())
        .gzip(true)
        .brotli(true);

    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    builder.build()
}

/// Sends a GET request and sorts the response into a [`FetchResult`]
///
/// The body is left unread so the caller can stream it.
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                format!("Connection failed: {}", e)
            } else {
                e.to_string()
            };
            return FetchResult::NetworkError { error };
        }
    };

    let status = response.status();
    if status != StatusCode::OK {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    FetchResult::Success {
        response,
        content_type,
    }
}
