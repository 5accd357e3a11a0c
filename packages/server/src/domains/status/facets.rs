//! Byte-exact link facet construction.

use lazy_static::lazy_static;
use regex::Regex;

use crate::common::LinkFacet;

lazy_static! {
    // An http(s) token is the scheme plus the following non-whitespace run.
    static ref URL_REGEX: Regex = Regex::new(r"https?://\S+").unwrap();
}

/// Build link facets over the final status text.
///
/// Deterministic, order-preserving, never fails:
/// 1. page facet — first occurrence of `page` from position 0 (only when a
///    page URL exists); the match end becomes the search floor
/// 2. editor facet — first occurrence of `name` at/after the floor
/// 3. one facet per literal URL, left-to-right over the whole text
///
/// Offsets are UTF-8 byte positions into `text`. Call this only after all
/// text mutation is done.
pub fn build_facets(
    text: &str,
    page: &str,
    name: &str,
    page_url: Option<&str>,
    user_url: Option<&str>,
) -> Vec<LinkFacet> {
    let mut facets = Vec::new();
    let mut floor = 0;

    if let Some(uri) = page_url {
        if !page.is_empty() {
            if let Some(start) = text.find(page) {
                facets.push(LinkFacet {
                    byte_start: start,
                    byte_end: start + page.len(),
                    uri: uri.to_string(),
                });
                floor = start + page.len();
            }
        }
    }

    if let Some(uri) = user_url {
        if !name.is_empty() {
            if let Some(rel) = text[floor..].find(name) {
                let start = floor + rel;
                facets.push(LinkFacet {
                    byte_start: start,
                    byte_end: start + name.len(),
                    uri: uri.to_string(),
                });
            }
        }
    }

    for mat in URL_REGEX.find_iter(text) {
        facets.push(LinkFacet {
            byte_start: mat.start(),
            byte_end: mat.end(),
            uri: mat.as_str().to_string(),
        });
    }

    facets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slice(text: &str, facet: &LinkFacet) -> String {
        String::from_utf8(text.as_bytes()[facet.byte_start..facet.byte_end].to_vec()).unwrap()
    }

    #[test]
    fn slicing_reproduces_page_name_then_urls() {
        let text = "San Francisco edited by Alice https://en.site.org/w/diff";
        let facets = build_facets(
            text,
            "San Francisco",
            "Alice",
            Some("https://en.site.org/wiki/San%20Francisco"),
            Some("https://en.site.org/wiki/Special:Contributions/Alice"),
        );

        assert_eq!(facets.len(), 3);
        assert_eq!(slice(text, &facets[0]), "San Francisco");
        assert_eq!(slice(text, &facets[1]), "Alice");
        assert_eq!(slice(text, &facets[2]), "https://en.site.org/w/diff");
        assert_eq!(facets[2].uri, "https://en.site.org/w/diff");
    }

    #[test]
    fn multibyte_page_name_uses_byte_offsets() {
        let text = "日本 edited";
        let facets = build_facets(text, "日本", "x", Some("https://ja.site.org/wiki/x"), None);

        assert_eq!(facets[0].byte_start, 0);
        assert_eq!(facets[0].byte_end, 6);
    }

    #[test]
    fn editor_search_starts_after_page_match() {
        // The editor name is a substring of the page name; the floor keeps
        // the editor facet off the page text.
        let text = "Alice Land edited by Alice https://x.org/d";
        let facets = build_facets(
            text,
            "Alice Land",
            "Alice",
            Some("https://x.org/wiki/Alice%20Land"),
            Some("https://x.org/wiki/Special:Contributions/Alice"),
        );

        assert_eq!(facets[0].byte_start, 0);
        assert_eq!(facets[1].byte_start, 21);
        assert_eq!(slice(text, &facets[1]), "Alice");
    }

    #[test]
    fn flag_annotation_shifts_following_offsets() {
        let base = "Foo edited by 1.2.3.4 https://x.org/d";
        let enriched = "Foo edited by 1.2.3.4 \u{1F1EF}\u{1F1F5} https://x.org/d";
        // " " + flag = 9 bytes inserted
        assert_eq!(enriched.len(), base.len() + 9);

        let facets = build_facets(enriched, "Foo", "1.2.3.4", Some("https://p"), Some("https://u"));
        let url_facet = facets.last().unwrap();
        assert_eq!(slice(enriched, url_facet), "https://x.org/d");
        assert_eq!(url_facet.byte_start, base.find("https").unwrap() + 9);
    }

    #[test]
    fn missing_urls_omit_their_facets() {
        let text = "Foo edited by Bar";
        let facets = build_facets(text, "Foo", "Bar", None, None);
        assert!(facets.is_empty());
    }

    #[test]
    fn page_absent_from_text_omits_facet_but_keeps_urls() {
        let text = "something else https://x.org/d";
        let facets = build_facets(text, "Foo", "Bar", Some("https://p"), None);
        assert_eq!(facets.len(), 1);
        assert_eq!(facets[0].uri, "https://x.org/d");
    }

    #[test]
    fn urls_found_left_to_right() {
        let text = "a http://one.example b https://two.example";
        let facets = build_facets(text, "", "", None, None);
        assert_eq!(facets.len(), 2);
        assert_eq!(facets[0].uri, "http://one.example");
        assert_eq!(facets[1].uri, "https://two.example");
    }
}
