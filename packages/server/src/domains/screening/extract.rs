//! Plain-text extraction from tagged diff fragments.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Inserted/removed fragments in the diff markup
    static ref FRAGMENT_REGEX: Regex =
        Regex::new(r"(?s)<(?:ins|del)\b[^>]*>(.*?)</(?:ins|del)>").unwrap();
    static ref TAG_REGEX: Regex = Regex::new(r"<[^>]+>").unwrap();
}

/// Extract the reviewable text of a diff: fragment contents with tags
/// stripped, a minimal entity set decoded, and whitespace collapsed.
///
/// An empty result means the content could not be reviewed; the gate
/// treats that as a block, not as "nothing changed".
pub fn extract_diff_text(markup: &str) -> String {
    let mut parts: Vec<String> = Vec::new();

    for cap in FRAGMENT_REGEX.captures_iter(markup) {
        let stripped = TAG_REGEX.replace_all(&cap[1], " ");
        let decoded = decode_entities(&stripped);
        if !decoded.trim().is_empty() {
            parts.push(decoded);
        }
    }

    collapse_whitespace(&parts.join(" "))
}

/// Decode the minimal entity set seen in diff markup.
fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
