//! carelog: care-record preprocessing and ICF annotation.
//!
//! carelog turns facility care-log exports into structured, ICF-annotated
//! records. It has three independent entry points:
//!
//! - [`split::Splitter`] drops administrative record categories and writes
//!   one CSV per floor
//! - [`tagger::Tagger`] abstracts care-plan clauses and labels them with ICF
//!   codes
//! - [`evaluate::Evaluator`] annotates every care-log entry through five
//!   prompt passes and writes the merged rows as JSON
//!
//! # Example
//!
//! ```no_run
//! use carelog::split::Splitter;
//!
//! let paths = Splitter::new().run("records.csv").unwrap();
//! println!("{} floor files", paths.len());
//! ```

pub mod anonymize;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod input;
pub mod llm;
pub mod retrieval;
pub mod split;
pub mod tagger;

pub use config::ServiceConfig;
pub use error::{CarelogError, Result};
pub use evaluate::{EvaluateConfig, Evaluator};
pub use input::{DataTable, SourceMetadata};
pub use split::{SplitConfig, Splitter};
pub use tagger::{TaggedPlan, Tagger};
