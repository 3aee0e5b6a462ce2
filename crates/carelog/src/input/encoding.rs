//! Text encodings accepted for source tables.

use encoding_rs::{EUC_JP, Encoding, SHIFT_JIS, UTF_8};

/// UTF-8 byte-order marker.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// An encoding the parser can try when reading a table.
///
/// CP932 and Shift_JIS share one decoder: the WHATWG Shift_JIS decoder
/// already covers the Windows-31J extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    /// UTF-8, with or without a leading BOM.
    Utf8,
    /// Shift_JIS / CP932 (Windows-31J).
    ShiftJis,
    /// EUC-JP.
    EucJp,
}

impl TextEncoding {
    /// Order in which encodings are tried when none is specified.
    pub const FALLBACK_ORDER: [TextEncoding; 3] =
        [TextEncoding::Utf8, TextEncoding::ShiftJis, TextEncoding::EucJp];

    /// Label used in logs and source metadata.
    pub fn label(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::ShiftJis => "cp932",
            TextEncoding::EucJp => "euc-jp",
        }
    }

    fn encoding(&self) -> &'static Encoding {
        match self {
            TextEncoding::Utf8 => UTF_8,
            TextEncoding::ShiftJis => SHIFT_JIS,
            TextEncoding::EucJp => EUC_JP,
        }
    }

    /// Decode `bytes` strictly. Returns `None` on the first malformed sequence.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        let bytes = match self {
            TextEncoding::Utf8 => bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes),
            _ => bytes,
        };

        self.encoding()
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(|text| text.into_owned())
    }
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
