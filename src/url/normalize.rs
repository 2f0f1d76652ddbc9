use crate::UrlError;
use url::Url;

/// Normalizes a profile link into its cache key
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject anything that is not http or https
/// 3. Drop the query string and the fragment
/// 4. Drop a trailing slash (except for root /)
///
/// The host is lowercased by the URL parser itself. The scheme is kept as-is
/// so that mock servers over plain HTTP normalize to themselves.
///
/// # Examples
///
/// ```
/// use luma_harvest::url::normalize_profile_link;
///
/// let key = normalize_profile_link("https://lu.ma/user/usr-abc?tk=1").unwrap();
/// assert_eq!(key, "https://lu.ma/user/usr-abc");
/// ```
pub fn normalize_profile_link(link: &str) -> Result<String, UrlError> {
    let mut url = Url::parse(link.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    url.set_query(None);
    url.set_fragment(None);

    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/').to_string();
        url.set_path(if trimmed.is_empty() { "/" } else { &trimmed });
    }

    Ok(url.to_string())
}

/// Derives the canonical event id from an event URL
///
/// The id is the URL path with surrounding slashes removed, so
/// `https://lu.ma/18tw2f7h?tk=x` becomes `18tw2f7h`. Unparseable input
/// yields an empty id.
pub fn canonical_id(event_url: &str) -> String {
    match Url::parse(event_url.trim()) {
        Ok(url) => url.path().trim_matches('/').to_string(),
        Err(_) => String::new(),
    }
}

/// Extracts the site user id (`usr-...`) from a profile link, if present
pub fn extract_user_id(link: &str) -> Option<String> {
    let url = Url::parse(link.trim()).ok()?;
    let mut segments = url.path_segments()?;

    while let Some(segment) = segments.next() {
        if segment == "user" {
            let rest = segments.next()?.strip_prefix("usr-")?;
            let id_len = rest
                .find(|c: char| !c.is_ascii_alphanumeric())
                .unwrap_or(rest.len());
            return (id_len > 0).then(|| format!("usr-{}", &rest[..id_len]));
        }
    }

    None
}

/// Resolves a link href to an absolute URL against the base origin
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
        Some(absolute_url.to_string())
    } else {
        None
    }
}
