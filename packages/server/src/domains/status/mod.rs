//! Status construction: template rendering, canonical URLs, geolocation
//! enrichment, and byte-exact link facets.
//!
//! Facets must be built strictly after all text mutation; recomputing on
//! stale text desyncs byte offsets.

pub mod enrich;
pub mod facets;
pub mod links;
pub mod normalize;
pub mod template;

pub use enrich::enrich_with_location;
pub use facets::build_facets;
pub use links::canonical_urls;
pub use normalize::build_status;
pub use template::render_text;
