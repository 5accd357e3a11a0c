//! Geolocation flag enrichment for IP-literal editors.

use lazy_static::lazy_static;
use regex::Regex;

use crate::kernel::geo::GeoLookup;

lazy_static! {
    // IPv4 literals at word boundaries
    static ref IPV4_REGEX: Regex = Regex::new(
        r"\b(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\b"
    ).unwrap();
}

/// Insert a regional-indicator flag after each IPv4 literal that resolves.
///
/// Returns a new text value; occurrences whose lookup misses are left
/// untouched. Must run before facet building — the insertion shifts byte
/// positions of everything that follows.
pub fn enrich_with_location(text: &str, geo: &dyn GeoLookup) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut last = 0;

    for mat in IPV4_REGEX.find_iter(text) {
        out.push_str(&text[last..mat.end()]);
        if let Some(flag) = geo.lookup(mat.as_str()).as_deref().and_then(country_flag) {
            out.push(' ');
            out.push_str(&flag);
        }
        last = mat.end();
    }
    out.push_str(&text[last..]);
    out
}

/// Map an ISO-3166-1 alpha-2 code to its two-codepoint regional-indicator
/// flag (each letter's codepoint shifted by 127397).
fn country_flag(code: &str) -> Option<String> {
    if code.len() != 2 || !code.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    code.chars()
        .map(|c| char::from_u32(c.to_ascii_uppercase() as u32 + 127397))
        .collect()
}
