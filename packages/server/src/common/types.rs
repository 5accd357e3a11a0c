use serde::{Deserialize, Serialize};

/// A single observed edit to a watched page.
///
/// Delivered by the external change-event source, one at a time. The editor
/// identity is either a registered account name or an IP literal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditEvent {
    pub page: String,
    pub editor: String,
    pub source_url: String,
    pub site: String,
}

/// A rendered status candidate, built once per event.
///
/// Enrichment produces a new `text` value; the struct is never mutated in
/// place after facet construction begins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusDraft {
    pub text: String,
    pub page_url: Option<String>,
    pub user_url: Option<String>,
    pub page: String,
    pub editor: String,
}

/// A structured link annotation over a UTF-8 byte range of post text.
///
/// Offsets are byte positions, not character indices: the consuming protocol
/// addresses text by UTF-8 byte position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkFacet {
    pub byte_start: usize,
    pub byte_end: usize,
    pub uri: String,
}

/// A single PII entity reported by the analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PiiFinding {
    pub entity_type: String,
    pub matched_text: String,
    pub score: f64,
}

/// The analyzer's verdict over one extracted diff text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PiiResult {
    pub has_pii: bool,
    pub findings: Vec<PiiFinding>,
}

impl PiiResult {
    /// Distinct entity types, preserving first-seen order.
    pub fn entity_types(&self) -> Vec<String> {
        let mut types = Vec::new();
        for finding in &self.findings {
            if !types.contains(&finding.entity_type) {
                types.push(finding.entity_type.clone());
            }
        }
        types
    }

    /// Highest confidence across findings, 0.0 when empty.
    pub fn max_score(&self) -> f64 {
        self.findings.iter().fold(0.0, |acc, f| acc.max(f.score))
    }
}
