// Editherald - edit-mirror service core
//
// Mirrors observed page-edit events as annotated posts on multiple social
// platforms, gated by an automated PII screen with a human review workflow
// for blocked content.
//
// Domains hold the pipeline logic; kernel holds collaborator seams and the
// bounded dispatcher; server holds the admin HTTP surface.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
