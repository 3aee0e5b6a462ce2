//! API request handlers.

mod health;
mod tag;

pub use health::*;
pub use tag::*;
