// Common types shared across the application

pub mod types;

pub use types::*;
