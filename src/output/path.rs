use std::path::{Path, PathBuf};
use url::Url;

/// File name used for URLs that end in a slash
const INDEX_FILE: &str = "index.html";

/// Extension appended to file names that have none
const HTML_EXTENSION: &str = ".html";

/// Maps a URL to the file its body is saved to
///
/// The layout is `<out_dir>/<host[:port]>/<request-uri>` where the request
/// URI is the path followed by `?query` when the URL has one. A request URI
/// ending in `/` gets `index.html` appended, and a final segment without any
/// `.` gets `.html` appended. The function only computes the path; parent
/// directories are created when the file is written.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use url::Url;
/// use site_mirror::output::output_path;
///
/// let out = Path::new("/tmp/crawl");
///
/// let url = Url::parse("https://example.com/pkg/strings/").unwrap();
/// assert_eq!(
///     output_path(out, &url),
///     Path::new("/tmp/crawl/example.com/pkg/strings/index.html")
/// );
///
/// let url = Url::parse("https://example.com/pkg/strings").unwrap();
/// assert_eq!(
///     output_path(out, &url),
///     Path::new("/tmp/crawl/example.com/pkg/strings.html")
/// );
/// ```
pub fn output_path(out_dir: &Path, url: &Url) -> PathBuf {
    let mut request_uri = url.path().to_string();
    if let Some(query) = url.query() {
        request_uri.push('?');
        request_uri.push_str(query);
    }
    if request_uri.ends_with('/') {
        request_uri.push_str(INDEX_FILE);
    }

    let mut path = out_dir.join(host_dir(url));
    for segment in request_uri
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
    {
        path.push(segment);
    }

    if let Some(name) = path.file_name() {
        if !name.to_string_lossy().contains('.') {
            let mut name = name.to_os_string();
            name.push(HTML_EXTENSION);
            path.set_file_name(name);
        }
    }

    path
}

/// Directory name for a URL's host, including an explicit non-default port
fn host_dir(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}
