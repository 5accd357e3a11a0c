//! Plain-text platform adapter: media id embed plus inline link rewriting.
//!
//! This platform has no structured-annotation mechanism, so page and
//! editor names are rewritten in the text as `"name (url)"`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use mastodon::MastodonClient;
use regex::{NoExpand, Regex};

use super::{PostReceipt, PostRequest, Publisher};

pub const PLATFORM: &str = "mastodon";

pub struct MastodonPublisher {
    client: MastodonClient,
}

impl MastodonPublisher {
    pub fn new(base_url: String, access_token: String) -> Self {
        Self {
            client: MastodonClient::new(base_url, access_token),
        }
    }
}

#[async_trait]
impl Publisher for MastodonPublisher {
    fn name(&self) -> &'static str {
        PLATFORM
    }

    /// upload media -> rewrite text -> create status.
    async fn post(&self, req: &PostRequest) -> Result<PostReceipt> {
        let bytes = tokio::fs::read(&req.screenshot_path)
            .await
            .with_context(|| format!("failed to read {}", req.screenshot_path.display()))?;

        let meta = &req.metadata;
        let filename = req
            .screenshot_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("screenshot.png");
        let media = self
            .client
            .upload_media(
                bytes,
                filename,
                &format!("Screenshot of the edit to {}", meta.page),
            )
            .await
            .context("media upload failed")?;

        let text = annotate_links(
            &req.text,
            &meta.page,
            meta.page_url.as_deref(),
            &meta.editor,
            meta.user_url.as_deref(),
        );

        let status = self
            .client
            .create_status(&text, vec![media.id])
            .await
            .context("status creation failed")?;
        tracing::info!(status_id = %status.id, "published to mastodon");

        Ok(PostReceipt {
            platform: PLATFORM,
            url: status.url,
        })
    }
}

/// Rewrite page and editor names as `"name (url)"`.
///
/// Each substitution targets the first word-boundary occurrence of the
/// name; a name with no such occurrence leaves the text unchanged.
pub fn annotate_links(
    text: &str,
    page: &str,
    page_url: Option<&str>,
    editor: &str,
    user_url: Option<&str>,
) -> String {
    let mut out = text.to_string();
    if let Some(url) = page_url {
        out = substitute(&out, page, url);
    }
    if let Some(url) = user_url {
        out = substitute(&out, editor, url);
    }
    out
}

/// Replace the first word-boundary occurrence of `name` with
/// `"name (url)"`. Regex metacharacters in `name` are escaped, and the
/// replacement is inserted verbatim.
fn substitute(text: &str, name: &str, url: &str) -> String {
    if name.is_empty() {
        return text.to_string();
    }

    let pattern = format!(r"\b{}\b", regex::escape(name));
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(e) => {
            tracing::warn!(name, error = %e, "link substitution pattern failed");
            return text.to_string();
        }
    };

    let replacement = format!("{name} ({url})");
    re.replace(text, NoExpand(&replacement)).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rewrites_page_and_editor() {
        let out = annotate_links(
            "San Francisco edited by Alice",
            "San Francisco",
            Some("https://en.site.org/wiki/San%20Francisco"),
            "Alice",
            Some("https://en.site.org/wiki/Special:Contributions/Alice"),
        );
        assert_eq!(
            out,
            "San Francisco (https://en.site.org/wiki/San%20Francisco) edited by \
             Alice (https://en.site.org/wiki/Special:Contributions/Alice)"
        );
    }

    #[test]
    fn missing_urls_skip_their_substitution() {
        let out = annotate_links("Foo edited by Bar", "Foo", None, "Bar", None);
        assert_eq!(out, "Foo edited by Bar");
    }

    #[test]
    fn only_first_occurrence_is_rewritten() {
        let out = substitute("Foo and Foo again", "Foo", "https://x");
        assert_eq!(out, "Foo (https://x) and Foo again");
    }

    #[test]
    fn names_with_metacharacters_substitute_literally() {
        let out = substitute(
            "C.J. Cregg edited the page",
            "C.J. Cregg",
            "https://x.org/u",
        );
        assert_eq!(out, "C.J. Cregg (https://x.org/u) edited the page");

        // The dot must not match arbitrary characters.
        let out = substitute("CXJX Cregg edited", "C.J. Cregg", "https://x.org/u");
        assert_eq!(out, "CXJX Cregg edited");
    }

    #[test]
    fn dollar_signs_in_replacement_are_verbatim() {
        let out = substitute("page1 edited", "page1", "https://x.org/$1");
        assert_eq!(out, "page1 (https://x.org/$1) edited");
    }

    #[test]
    fn partial_word_matches_are_not_rewritten() {
        let out = substitute("Food edited", "Foo", "https://x");
        assert_eq!(out, "Food edited");
    }

    proptest! {
        // Names with regex metacharacters inside (word-character edges)
        // substitute exactly once, verbatim.
        #[test]
        fn substitution_is_escaping_safe(
            first in "[a-zA-Z0-9]",
            inner in r"[a-zA-Z0-9 .+*?()\[\]{}|^$\\-]{0,10}",
            last in "[a-zA-Z0-9]",
        ) {
            let name = format!("{first}{inner}{last}");
            let text = format!("* {name} edited");
            let out = substitute(&text, &name, "https://x.org/u");
            prop_assert_eq!(out, format!("* {name} (https://x.org/u) edited"));
        }

        #[test]
        fn substitution_never_panics(
            name in r"[a-zA-Z0-9 .+*?()\[\]{}|^$\\-]{1,16}",
            text in r"[a-zA-Z0-9 .]{0,32}",
        ) {
            let _ = substitute(&text, &name, "https://x.org/u");
        }
    }
}
