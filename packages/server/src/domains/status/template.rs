//! Status template rendering with a shortened-link length guard.

/// Rendered length of any URL under the shortened-link convention.
const SHORT_URL_LEN: usize = 23;

/// Character budget for a rendered status.
const MAX_STATUS_CHARS: usize = 280;

/// Expand `{{page}}`, `{{name}}` (entity-escaped) and `{{&url}}` (raw).
///
/// Length guard: the rendered length is first computed with a fixed
/// 23-character placeholder standing in for the URL; if the total exceeds
/// the 280-character budget, the page name is trimmed from its end by the
/// overflow before the final render. A missing placeholder never aborts
/// rendering.
pub fn render_text(template: &str, page: &str, name: &str, url: &str) -> String {
    let placeholder: String = "x".repeat(SHORT_URL_LEN);
    let probe = expand(template, page, name, &placeholder);

    let probe_len = probe.chars().count();
    if probe_len <= MAX_STATUS_CHARS {
        return expand(template, page, name, url);
    }

    let overflow = probe_len - MAX_STATUS_CHARS;
    let keep = page.chars().count().saturating_sub(overflow);
    let trimmed: String = page.chars().take(keep).collect();

    expand(template, &trimmed, name, url)
}

fn expand(template: &str, page: &str, name: &str, url: &str) -> String {
    template
        .replace("{{page}}", &escape(page))
        .replace("{{name}}", &escape(name))
        .replace("{{&url}}", url)
}

/// Minimal HTML-entity escape, mustache semantics.
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
