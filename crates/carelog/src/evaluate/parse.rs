//! Response parsing for each evaluation stage.
//!
//! Every parser reports how well the response followed the requested format
//! through [`ParseOutcome`]. Callers turn the outcome into a column value and
//! count malformed answers for the logs; no parse failure is ever fatal.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static SPEECH_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^output:\s*").unwrap());

static OUTPUT_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)output:").unwrap());

static PERSONALITY_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)output:\s*\((.*?)\)\s*(.*)").unwrap());

static ABSTRACTION_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)abstraction:\s*(.*)").unwrap());

static CAREPLAN_ABSTRACTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"abstraction:\s*(.*)").unwrap());

static TAGGED_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*\((.*?)\)\s*(.*)$").unwrap());

static SUMMATIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)summative:\s*(positive|negative|neutral)").unwrap());

static ICF_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)([a-z][0-9]{3})").unwrap());

/// Marker the prompts use for "nothing applies".
pub const NOT_APPLICABLE: &str = "該当なし";

/// How a response matched its expected format.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome<T> {
    /// The response followed the format.
    Matched(T),
    /// The format was ignored; the value came from a fallback pattern.
    Recovered(T),
    /// The format was followed but carried nothing usable.
    Empty,
    /// Nothing recognizable.
    Malformed,
}

impl<T> ParseOutcome<T> {
    /// The parsed value, if any.
    pub fn value(self) -> Option<T> {
        match self {
            ParseOutcome::Matched(v) | ParseOutcome::Recovered(v) => Some(v),
            ParseOutcome::Empty | ParseOutcome::Malformed => None,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, ParseOutcome::Malformed)
    }
}

/// Summative emotion label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Emotion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Positive => "positive",
            Emotion::Negative => "negative",
            Emotion::Neutral => "neutral",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "positive" => Some(Emotion::Positive),
            "negative" => Some(Emotion::Negative),
            "neutral" => Some(Emotion::Neutral),
            _ => None,
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ICF classification code: one letter and three digits, lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IcfCode(String);

impl IcfCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IcfCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stage 1: resident speech, with a leading `output:` label removed.
pub fn parse_speech(response: &str) -> ParseOutcome<String> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return ParseOutcome::Empty;
    }
    let labelled = SPEECH_PREFIX.is_match(trimmed);
    let text = SPEECH_PREFIX.replace(trimmed, "").trim().to_string();

    match (labelled, text.is_empty()) {
        (_, true) => ParseOutcome::Empty,
        (true, false) => ParseOutcome::Matched(text),
        (false, false) => ParseOutcome::Recovered(text),
    }
}

/// Stage 2: every `output: (tag) text` item as `"(tag)text"`.
pub fn parse_personality(response: &str) -> ParseOutcome<Vec<String>> {
    let items: Vec<String> = PERSONALITY_ITEM
        .captures_iter(response)
        .map(|caps| format!("({}){}", caps[1].trim(), caps[2].trim()))
        .collect();

    if !items.is_empty() {
        ParseOutcome::Matched(items)
    } else if response.trim().is_empty() || OUTPUT_LABEL.is_match(response) {
        ParseOutcome::Empty
    } else {
        ParseOutcome::Malformed
    }
}

/// Stage 3: every `abstraction:` line, falling back to bare `(tag) text`
/// lines. Items saying nothing applies are dropped.
pub fn parse_icf_abstraction(response: &str) -> ParseOutcome<Vec<String>> {
    let labelled: Vec<String> = ABSTRACTION_LINE
        .captures_iter(response)
        .map(|caps| caps[1].to_string())
        .collect();

    if !labelled.is_empty() {
        let items = keep_applicable(labelled);
        return if items.is_empty() {
            ParseOutcome::Empty
        } else {
            ParseOutcome::Matched(items)
        };
    }

    let tagged = keep_applicable(
        TAGGED_LINE
            .captures_iter(response)
            .map(|caps| format!("({}) {}", caps[1].trim(), caps[2].trim()))
            .collect(),
    );

    if !tagged.is_empty() {
        ParseOutcome::Recovered(tagged)
    } else if response.trim().is_empty() || response.contains(NOT_APPLICABLE) {
        ParseOutcome::Empty
    } else {
        ParseOutcome::Malformed
    }
}

/// The first `abstraction:` item of a care-plan answer, case-sensitive.
///
/// The label may stand on its own line with the text on the next one.
pub fn parse_careplan_abstraction(response: &str) -> ParseOutcome<String> {
    let Some(caps) = CAREPLAN_ABSTRACTION.captures(response) else {
        return if response.trim().is_empty() {
            ParseOutcome::Empty
        } else {
            ParseOutcome::Malformed
        };
    };
    let text = caps[1].trim();

    if text.is_empty() {
        ParseOutcome::Empty
    } else {
        ParseOutcome::Matched(text.to_string())
    }
}

/// Stage 4: the `summative:` label.
pub fn parse_emotion(response: &str) -> ParseOutcome<Emotion> {
    if let Some(emotion) = SUMMATIVE
        .captures(response)
        .and_then(|caps| Emotion::from_label(&caps[1]))
    {
        return ParseOutcome::Matched(emotion);
    }
    if response.trim().is_empty() {
        ParseOutcome::Empty
    } else {
        ParseOutcome::Malformed
    }
}

/// Stage 5: the first letter-plus-three-digits token, lowercased.
pub fn parse_icf_code(response: &str) -> ParseOutcome<IcfCode> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return ParseOutcome::Empty;
    }
    match ICF_CODE.captures(trimmed) {
        Some(caps) => {
            let code = IcfCode(caps[1].to_lowercase());
            if caps[1].len() == trimmed.len() {
                ParseOutcome::Matched(code)
            } else {
                ParseOutcome::Recovered(code)
            }
        }
        None => ParseOutcome::Malformed,
    }
}

/// Comma-separated code list as returned for a care-plan clause.
pub fn split_code_list(response: &str) -> Vec<String> {
    response
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn keep_applicable(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty() && !item.contains(NOT_APPLICABLE))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speech_strips_label() {
        assert_eq!(
            parse_speech("Output:  「おはよう」 "),
            ParseOutcome::Matched("「おはよう」".to_string())
        );
        assert_eq!(
            parse_speech("「おはよう」"),
            ParseOutcome::Recovered("「おはよう」".to_string())
        );
        assert_eq!(parse_speech("output:   "), ParseOutcome::Empty);
        assert_eq!(parse_speech(""), ParseOutcome::Empty);
    }

    #[test]
    fn test_personality_items() {
        let response = "output: (趣味)「野菜を作っていた」とのこと\nOUTPUT:(得意なこと) 棚の修理";
        assert_eq!(
            parse_personality(response).value(),
            Some(vec![
                "(趣味)「野菜を作っていた」とのこと".to_string(),
                "(得意なこと)棚の修理".to_string(),
            ])
        );
        assert_eq!(parse_personality("output: 該当なし"), ParseOutcome::Empty);
        assert!(parse_personality("特になし").is_malformed());
    }

    #[test]
    fn test_abstraction_lines() {
        let response = "abstraction: (歩行) 歩行器で移動できる\nabstraction: 該当なし\nAbstraction: (食事) 自力で摂取";
        assert_eq!(
            parse_icf_abstraction(response),
            ParseOutcome::Matched(vec![
                "(歩行) 歩行器で移動できる".to_string(),
                "(食事) 自力で摂取".to_string(),
            ])
        );
    }

    #[test]
    fn test_abstraction_not_applicable_is_empty() {
        assert_eq!(parse_icf_abstraction("abstraction: 該当なし"), ParseOutcome::Empty);
        assert_eq!(parse_icf_abstraction("該当なし"), ParseOutcome::Empty);
    }

    #[test]
    fn test_abstraction_fallback_to_tagged_lines() {
        let response = "(歩行)歩行器で移動できる\n  (入浴) 週2回入浴";
        assert_eq!(
            parse_icf_abstraction(response),
            ParseOutcome::Recovered(vec![
                "(歩行) 歩行器で移動できる".to_string(),
                "(入浴) 週2回入浴".to_string(),
            ])
        );
        assert!(parse_icf_abstraction("わかりません").is_malformed());
    }

    #[test]
    fn test_careplan_abstraction_first_line_only() {
        assert_eq!(
            parse_careplan_abstraction("abstraction:（入浴）清潔を保てる\nabstraction: 2"),
            ParseOutcome::Matched("（入浴）清潔を保てる".to_string())
        );
        assert_eq!(parse_careplan_abstraction("abstraction:   "), ParseOutcome::Empty);
        assert!(parse_careplan_abstraction("Abstraction: x").is_malformed());
    }

    #[test]
    fn test_careplan_abstraction_on_next_line() {
        assert_eq!(
            parse_careplan_abstraction("abstraction:\n（入浴）清潔を保てる"),
            ParseOutcome::Matched("（入浴）清潔を保てる".to_string())
        );
    }

    #[test]
    fn test_tags_and_text_trimmed_separately() {
        assert_eq!(
            parse_personality("output: ( 趣味 ) 野菜作り ").value(),
            Some(vec!["(趣味)野菜作り".to_string()])
        );
        assert_eq!(
            parse_icf_abstraction("( 入浴 )  週2回入浴").value(),
            Some(vec!["(入浴) 週2回入浴".to_string()])
        );
    }

    #[test]
    fn test_emotion_defaults_to_neutral() {
        assert_eq!(
            parse_emotion("joy：0.8, summative: Positive").value(),
            Some(Emotion::Positive)
        );
        assert!(parse_emotion("no label here").is_malformed());
        assert_eq!(
            parse_emotion("no label here").value().unwrap_or_default(),
            Emotion::Neutral
        );
    }

    #[test]
    fn test_icf_code_parsing() {
        assert_eq!(
            parse_icf_code("d570").value().map(|c| c.to_string()),
            Some("d570".to_string())
        );
        assert_eq!(
            parse_icf_code("コード: B134").value().map(|c| c.to_string()),
            Some("b134".to_string())
        );
        assert_eq!(parse_icf_code("ICF code: E-310").value(), None);
    }

    #[test]
    fn test_code_list() {
        assert_eq!(split_code_list(" d450, d460 ,,"), vec!["d450", "d460"]);
        assert!(split_code_list("").is_empty());
    }
}
