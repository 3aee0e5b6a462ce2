//! HTTP surface for the care-plan tagger.

pub mod app;
pub mod error;
pub mod handlers;
pub mod state;
