use url::Url;

/// Decides whether a discovered URL belongs to the crawl
///
/// A candidate is in scope when it has the same host and port as the root
/// and its path starts with the root path. The prefix test is a plain string
/// comparison, so a root of `/pkg` also admits `/pkgs/`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_mirror::url::should_fetch;
///
/// let root = Url::parse("https://example.com/pkg/").unwrap();
///
/// assert!(should_fetch(&Url::parse("https://example.com/pkg/strings/").unwrap(), &root));
/// assert!(!should_fetch(&Url::parse("https://example.com/other/").unwrap(), &root));
/// assert!(!should_fetch(&Url::parse("https://other.com/pkg/x").unwrap(), &root));
/// ```
pub fn should_fetch(candidate: &Url, root: &Url) -> bool {
    let same_host = candidate.host_str() == root.host_str() && candidate.port() == root.port();
    same_host && candidate.path().starts_with(root.path())
}
