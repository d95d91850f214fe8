use url::Url;

/// Resolves a link reference found on a page into an absolute URL
///
/// The reference is joined against the URL of the page it was found on and
/// the fragment is removed, so `#section` anchors collapse onto the page
/// itself. Empty and malformed references yield `None`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_mirror::url::resolve_link;
///
/// let base = Url::parse("https://example.com/pkg/strings/").unwrap();
/// let link = resolve_link("../io/#pkg-index", &base).unwrap();
/// assert_eq!(link.as_str(), "https://example.com/pkg/io/");
/// ```
pub fn resolve_link(reference: &str, base: &Url) -> Option<Url> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }

    let mut resolved = base.join(reference).ok()?;
    resolved.set_fragment(None);
    Some(resolved)
}
