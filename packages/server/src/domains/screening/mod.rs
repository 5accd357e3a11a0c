//! PII screening gate: extraction, analysis, allow/block decision.
//!
//! Policy asymmetry is deliberate: a content problem (nothing extractable)
//! fails closed, an availability problem (analyzer unreachable) fails open
//! with a logged warning — blocking every post on infra failure would
//! defeat the screen's purpose.

pub mod analyzer;
pub mod audit;
pub mod extract;
pub mod gate;

pub use analyzer::{AnalyzerClient, PiiAnalyzer};
pub use audit::AuditLog;
pub use extract::extract_diff_text;
pub use gate::{BlockReason, Screen, ScreenOutcome, ScreeningGate};
