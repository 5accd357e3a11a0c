//! Repeat suppression: drop back-to-back duplicate (page, editor) pairs.
//!
//! A non-atomic check-then-set keyed by site. This is a noise reducer,
//! not a correctness guarantee; two in-flight duplicates can still both
//! pass under true concurrency.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::common::EditEvent;

#[derive(Debug, Default)]
pub struct RepeatSuppressor {
    last_seen: Mutex<HashMap<String, (String, String)>>,
}

impl RepeatSuppressor {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when this event repeats the last (page, editor) pair seen for
    /// its site; records the pair either way.
    pub fn check_and_set(&self, event: &EditEvent) -> bool {
        let mut last_seen = self.last_seen.lock().expect("suppressor lock poisoned");
        let pair = (event.page.clone(), event.editor.clone());
        match last_seen.insert(event.site.clone(), pair.clone()) {
            Some(previous) => previous == pair,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(site: &str, page: &str, editor: &str) -> EditEvent {
        EditEvent {
            page: page.into(),
            editor: editor.into(),
            source_url: "https://en.site.org/w/d".into(),
            site: site.into(),
        }
    }

    #[test]
    fn repeats_are_suppressed_per_site() {
        let suppressor = RepeatSuppressor::new();

        assert!(!suppressor.check_and_set(&event("en", "Foo", "Bar")));
        assert!(suppressor.check_and_set(&event("en", "Foo", "Bar")));
        // Other sites track independently.
        assert!(!suppressor.check_and_set(&event("de", "Foo", "Bar")));
        // A different pair resets the site.
        assert!(!suppressor.check_and_set(&event("en", "Foo", "Other")));
        assert!(!suppressor.check_and_set(&event("en", "Foo", "Bar")));
    }
}
