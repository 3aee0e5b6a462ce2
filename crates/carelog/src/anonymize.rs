//! Masking of personal names and places before text leaves the process.
//!
//! Care-log entries mention residents, relatives and staff by name. Every
//! entry is passed through an [`Anonymizer`] before any prompt is built, so
//! only placeholders such as `<PERSON>` or `<LOCATION_2>` reach the LLM.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;

/// A name or surname run followed by a Japanese honorific.
static HONORIFIC_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([\p{Han}\p{Katakana}ー]{1,8})(さん|さま|様|氏|くん|君|ちゃん)").unwrap()
});

/// Prefectures and `…市` / `…区` place names.
static PLACE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(北海道|東京都|京都府|大阪府|\p{Han}{2,3}県|\p{Han}{2,4}[市区])").unwrap()
});

/// Words that take an honorific but are roles, not names.
const ROLE_WORDS: &[&str] = &[
    "利用者", "職員", "家族", "看護師", "先生", "娘", "息子", "奥", "皆", "他利用者", "御家族",
];

/// Kind of entity a placeholder stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Person,
    Location,
}

impl EntityKind {
    fn label(&self) -> &'static str {
        match self {
            EntityKind::Person => "PERSON",
            EntityKind::Location => "LOCATION",
        }
    }
}

/// Anonymized text plus the mapping needed to reverse it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Anonymized {
    /// Text with entities replaced by placeholders.
    pub text: String,
    /// Placeholder → original entity, in order of first appearance.
    pub mapping: IndexMap<String, String>,
}

impl Anonymized {
    /// Put the original entities back into `text`.
    pub fn deanonymize(&self, text: &str) -> String {
        self.mapping
            .iter()
            .fold(text.to_string(), |acc, (placeholder, original)| {
                acc.replace(placeholder, original)
            })
    }
}

/// Replaces personal identifiers in free text.
pub trait Anonymizer: Send + Sync {
    /// Mask every detected entity in `text`.
    fn anonymize(&self, text: &str) -> Anonymized;
}

/// Regex-based anonymizer for Japanese care records.
///
/// Masks configured names, name runs followed by an honorific (the
/// honorific itself is kept), and place names.
#[derive(Debug, Clone, Default)]
pub struct PatternAnonymizer {
    known_names: Option<Regex>,
}

impl PatternAnonymizer {
    /// Create an anonymizer using only the built-in patterns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also mask every occurrence of `names`, wherever they appear.
    pub fn with_known_names<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let mut names: Vec<&str> = names
            .iter()
            .map(|n| n.as_ref().trim())
            .filter(|n| !n.is_empty())
            .collect();
        if names.is_empty() {
            return Ok(Self::new());
        }
        // Longest first so "山田太郎" wins over "山田".
        names.sort_by_key(|n| std::cmp::Reverse(n.chars().count()));
        let pattern = names
            .iter()
            .map(|n| regex::escape(n))
            .collect::<Vec<_>>()
            .join("|");

        Ok(Self {
            known_names: Some(Regex::new(&pattern)?),
        })
    }

    fn spans(&self, text: &str) -> Vec<Span> {
        let mut spans: Vec<Span> = Vec::new();

        if let Some(known) = &self.known_names {
            for m in known.find_iter(text) {
                push_if_free(&mut spans, m.start(), m.end(), EntityKind::Person);
            }
        }

        for caps in HONORIFIC_NAME.captures_iter(text) {
            let Some(name) = caps.get(1) else { continue };
            if ROLE_WORDS.contains(&name.as_str()) {
                continue;
            }
            push_if_free(&mut spans, name.start(), name.end(), EntityKind::Person);
        }

        for m in PLACE_NAME.find_iter(text) {
            push_if_free(&mut spans, m.start(), m.end(), EntityKind::Location);
        }

        spans.sort_by_key(|s| s.start);
        spans
    }
}

impl Anonymizer for PatternAnonymizer {
    fn anonymize(&self, text: &str) -> Anonymized {
        let mut result = Anonymized::default();
        let mut counts: IndexMap<EntityKind, usize> = IndexMap::new();
        let mut cursor = 0;
        let mut out = String::with_capacity(text.len());

        for span in self.spans(text) {
            let entity = &text[span.start..span.end];
            out.push_str(&text[cursor..span.start]);

            let existing = result
                .mapping
                .iter()
                .find(|(placeholder, original)| {
                    original.as_str() == entity && placeholder_kind(placeholder) == Some(span.kind)
                })
                .map(|(placeholder, _)| placeholder.clone());

            let placeholder = match existing {
                Some(p) => p,
                None => {
                    let n = counts.entry(span.kind).or_insert(0);
                    *n += 1;
                    let p = if *n == 1 {
                        format!("<{}>", span.kind.label())
                    } else {
                        format!("<{}_{}>", span.kind.label(), n)
                    };
                    result.mapping.insert(p.clone(), entity.to_string());
                    p
                }
            };

            out.push_str(&placeholder);
            cursor = span.end;
        }

        out.push_str(&text[cursor..]);
        result.text = out;
        result
    }
}

#[derive(Debug, Clone, Copy)]
struct Span {
    start: usize,
    end: usize,
    kind: EntityKind,
}

fn push_if_free(spans: &mut Vec<Span>, start: usize, end: usize, kind: EntityKind) {
    if spans.iter().any(|s| start < s.end && s.start < end) {
        return;
    }
    spans.push(Span { start, end, kind });
}

fn placeholder_kind(placeholder: &str) -> Option<EntityKind> {
    let inner = placeholder.trim_start_matches('<');
    if inner.starts_with(EntityKind::Person.label()) {
        Some(EntityKind::Person)
    } else if inner.starts_with(EntityKind::Location.label()) {
        Some(EntityKind::Location)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_honorific_names_are_masked() {
        let a = PatternAnonymizer::new().anonymize("隣の席の石川さんと談笑していた");
        assert_eq!(a.text, "隣の席の<PERSON>さんと談笑していた");
        assert_eq!(a.mapping.get("<PERSON>").map(String::as_str), Some("石川"));
    }

    #[test]
    fn test_same_entity_same_placeholder() {
        let a = PatternAnonymizer::new().anonymize("田中さんが鈴木様を呼び、田中さんが笑う");
        assert_eq!(a.text, "<PERSON>さんが<PERSON_2>様を呼び、<PERSON>さんが笑う");
        assert_eq!(a.mapping.len(), 2);
    }

    #[test]
    fn test_role_words_are_kept() {
        let a = PatternAnonymizer::new().anonymize("利用者様が職員さんに声をかける");
        assert!(a.mapping.is_empty());
        assert_eq!(a.text, "利用者様が職員さんに声をかける");
    }

    #[test]
    fn test_places_are_masked() {
        let a = PatternAnonymizer::new().anonymize("以前は大阪府豊中市に住んでいた");
        assert_eq!(a.text, "以前は<LOCATION><LOCATION_2>に住んでいた");
    }

    #[test]
    fn test_known_names_without_honorific() {
        let a = PatternAnonymizer::with_known_names(&["ハナコ", "山田太郎"])
            .unwrap()
            .anonymize("山田太郎とハナコが面会");
        assert_eq!(a.text, "<PERSON>と<PERSON_2>が面会");
    }

    #[test]
    fn test_deanonymize_round_trip() {
        let text = "佐藤さんは神奈川県出身";
        let a = PatternAnonymizer::new().anonymize(text);
        assert_ne!(a.text, text);
        assert_eq!(a.deanonymize(&a.text), text);
    }
}
