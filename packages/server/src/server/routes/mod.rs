// HTTP routes
pub mod auth;
pub mod drafts;
pub mod health;
pub mod screenshots;

pub use auth::*;
pub use drafts::*;
pub use health::*;
pub use screenshots::*;
