//! Canonical page and contributor URL construction.

use url::Url;

/// Derive canonical wiki URLs from an event's source URL.
///
/// The source host's leading label is the language/site code; the canonical
/// links reuse the full host: `https://{host}/wiki/{page}` and
/// `https://{host}/wiki/Special:Contributions/{editor}`.
///
/// An unparseable source URL yields `(None, None)` — callers omit the link,
/// never treat it as fatal.
pub fn canonical_urls(
    source_url: &str,
    page: &str,
    editor: &str,
) -> (Option<String>, Option<String>) {
    let host = match Url::parse(source_url) {
        Ok(url) => match url.host_str() {
            Some(host) if host.contains('.') => host.to_string(),
            _ => return (None, None),
        },
        Err(_) => return (None, None),
    };

    let page_url = format!("https://{}/wiki/{}", host, urlencoding::encode(page));
    let user_url = format!(
        "https://{}/wiki/Special:Contributions/{}",
        host,
        urlencoding::encode(editor)
    );

    (Some(page_url), Some(user_url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_canonical_urls_from_diff_link() {
        let (page_url, user_url) = canonical_urls(
            "https://en.site.org/w/index.php?diff=123&oldid=456",
            "San Francisco",
            "203.0.113.9",
        );

        assert_eq!(
            page_url.as_deref(),
            Some("https://en.site.org/wiki/San%20Francisco")
        );
        assert_eq!(
            user_url.as_deref(),
            Some("https://en.site.org/wiki/Special:Contributions/203.0.113.9")
        );
    }

    #[test]
    fn unparseable_source_url_yields_none() {
        let (page_url, user_url) = canonical_urls("not a url", "Foo", "Bar");
        assert_eq!(page_url, None);
        assert_eq!(user_url, None);
    }

    #[test]
    fn host_without_labels_yields_none() {
        let (page_url, user_url) = canonical_urls("https://localhost/w/x", "Foo", "Bar");
        assert_eq!(page_url, None);
        assert_eq!(user_url, None);
    }

    #[test]
    fn editor_names_are_percent_encoded() {
        let (_, user_url) =
            canonical_urls("https://de.site.org/w/index.php?diff=1", "Foo", "Jörg M");
        assert_eq!(
            user_url.as_deref(),
            Some("https://de.site.org/wiki/Special:Contributions/J%C3%B6rg%20M")
        );
    }
}
