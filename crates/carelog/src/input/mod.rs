//! Input parsing and data source handling.
//!
//! Facility exports arrive in UTF-8, Shift_JIS or EUC-JP with no marker of
//! which; the parser tries each in turn.

mod encoding;
mod parser;
mod source;

pub use encoding::{TextEncoding, UTF8_BOM};
pub use parser::{Parser, ParserConfig, read_table_with_fallback};
pub use source::{DataTable, SourceMetadata};
