//! Event normalization: raw edit event + template -> status draft.

use crate::common::{EditEvent, StatusDraft};

use super::{canonical_urls, render_text};

/// Build a status draft from a raw event and the configured template.
///
/// The template's `{{&url}}` placeholder receives the event's source URL;
/// canonical page/contributor links are derived from the same URL and may
/// each be absent without failing the event.
pub fn build_status(event: &EditEvent, template: &str) -> StatusDraft {
    let (page_url, user_url) = canonical_urls(&event.source_url, &event.page, &event.editor);
    let text = render_text(template, &event.page, &event.editor, &event.source_url);

    StatusDraft {
        text,
        page_url,
        user_url,
        page: event.page.clone(),
        editor: event.editor.clone(),
    }
}
