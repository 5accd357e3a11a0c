// Kernel: collaborator seams and the event dispatch machinery.
//
// External collaborators (geolocation, screenshot capture, DM alerts, the
// change-event source) are modeled as injected trait objects so domain
// logic stays free of hidden shared state and independently testable.

pub mod alerts;
pub mod dispatch;
pub mod geo;
pub mod pipeline;
pub mod screenshot;
pub mod source;
pub mod suppress;

pub use alerts::{AlertSender, BlueskyAlerts};
pub use dispatch::{DispatcherConfig, EventDispatcher};
pub use geo::{GeoLookup, StaticGeoLookup};
pub use pipeline::Pipeline;
pub use screenshot::{HttpScreenshotter, Screenshotter};
pub use source::{EventSource, JsonlEventSource};
pub use suppress::RepeatSuppressor;
