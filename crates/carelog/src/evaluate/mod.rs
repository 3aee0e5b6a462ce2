//! Batch evaluation of care-log entries.
//!
//! Each entry of the content column is anonymized and then annotated by five
//! prompt passes:
//!
//! 1. resident speech (`speech`)
//! 2. personal traits (`person1..`)
//! 3. ICF-oriented abstractions (`icf_abst1..`)
//! 4. summative emotion (`emotion1`)
//! 5. ICF codes for each abstraction (`icf1..`, sparse)
//!
//! Passes 1-4 are sent as batches and fail as a whole. Pass 5 goes one
//! abstraction at a time; a backend failure there stops labeling and keeps
//! the codes gathered so far. Results are merged into the source rows and
//! written as a JSON array.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use carelog::evaluate::Evaluator;
//! use carelog::llm::MockProvider;
//! use carelog::retrieval::StaticRetriever;
//!
//! # async fn demo() -> carelog::Result<()> {
//! let evaluator = Evaluator::new(
//!     Arc::new(MockProvider::new()),
//!     Arc::new(StaticRetriever::icf_sample()),
//! );
//! let path = evaluator.run("records_1F.csv", "out/records_1F.json").await?;
//! println!("{}", path.display());
//! # Ok(())
//! # }
//! ```

mod output;
pub mod parse;
mod reshape;

pub use output::{ROOM_COLUMN, ResultTable, SMALL_MULTIFUNCTION, drop_room_for_small_multifunction};
pub use parse::{Emotion, IcfCode, ParseOutcome};
pub use reshape::AnnotationSet;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::anonymize::{Anonymizer, PatternAnonymizer};
use crate::error::{CarelogError, Result};
use crate::input::{DataTable, Parser, ParserConfig};
use crate::llm::{LlmProvider, Prompt, prompts};
use crate::retrieval::{Retriever, format_context};

/// Column holding the free-text care-log entry.
pub const CONTENT_COLUMN: &str = "内容";

/// Configuration for an evaluation run.
#[derive(Debug, Clone)]
pub struct EvaluateConfig {
    /// Parser configuration (encodings, delimiter, row limit).
    pub parser: ParserConfig,
    /// Column whose text is annotated.
    pub content_column: String,
}

impl Default for EvaluateConfig {
    fn default() -> Self {
        Self {
            parser: ParserConfig::default(),
            content_column: CONTENT_COLUMN.to_string(),
        }
    }
}

/// All stage outputs for one batch, before merging.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Annotations {
    pub speech: Vec<Option<String>>,
    pub personality: AnnotationSet,
    pub icf_abstractions: AnnotationSet,
    pub emotions: Vec<Emotion>,
    pub icf_codes: AnnotationSet,
}

/// Runs the five annotation passes over a table.
pub struct Evaluator {
    config: EvaluateConfig,
    parser: Parser,
    llm: Arc<dyn LlmProvider>,
    retriever: Arc<dyn Retriever>,
    anonymizer: Box<dyn Anonymizer>,
}

impl Evaluator {
    /// Create an evaluator with default configuration and the pattern
    /// anonymizer.
    pub fn new(llm: Arc<dyn LlmProvider>, retriever: Arc<dyn Retriever>) -> Self {
        Self::with_config(llm, retriever, EvaluateConfig::default())
    }

    /// Create an evaluator with custom configuration.
    pub fn with_config(
        llm: Arc<dyn LlmProvider>,
        retriever: Arc<dyn Retriever>,
        config: EvaluateConfig,
    ) -> Self {
        let parser = Parser::with_config(config.parser.clone());
        Self {
            config,
            parser,
            llm,
            retriever,
            anonymizer: Box::new(PatternAnonymizer::new()),
        }
    }

    /// Replace the anonymizer applied before any prompt is built.
    pub fn with_anonymizer(mut self, anonymizer: impl Anonymizer + 'static) -> Self {
        self.anonymizer = Box::new(anonymizer);
        self
    }

    /// Read `input`, annotate it and write the merged rows to `output`.
    ///
    /// Returns the absolute path of the JSON file.
    pub async fn run(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<PathBuf> {
        let input = input.as_ref();
        if !input.exists() {
            return Err(CarelogError::Io {
                path: input.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
            });
        }

        let (table, source) = self
            .parser
            .parse_file(input, Some(&self.config.content_column))?;
        info!(file = %source.file, encoding = %source.encoding, "evaluating source");
        let result = self.evaluate_table(&table).await?;
        result.write_json(output.as_ref())
    }

    /// Annotate `table` and merge the annotations into its rows.
    pub async fn evaluate_table(&self, table: &DataTable) -> Result<ResultTable> {
        let annotations = self.annotate(table).await?;
        let mut result = ResultTable::from_data_table(table);
        merge(&mut result, &annotations)?;
        if drop_room_for_small_multifunction(&mut result) {
            info!(column = ROOM_COLUMN, "dropped room column for small multi-function site");
        }
        Ok(result)
    }

    /// Run all passes over the content column of `table`.
    pub async fn annotate(&self, table: &DataTable) -> Result<Annotations> {
        let content = table
            .column_index(&self.config.content_column)
            .ok_or_else(|| CarelogError::MissingColumn(self.config.content_column.clone()))?;

        let texts: Vec<String> = table
            .rows
            .iter()
            .map(|row| {
                let raw = row.get(content).map(String::as_str).unwrap_or("");
                if DataTable::is_null_value(raw) {
                    String::new()
                } else {
                    self.anonymizer.anonymize(raw).text
                }
            })
            .collect();
        info!(rows = texts.len(), provider = self.llm.name(), "starting evaluation");

        let speech = self
            .batch("speech", &texts, prompts::speech_prompt, parse::parse_speech)
            .await?;
        let personality = self
            .batch("personality", &texts, prompts::personality_prompt, parse::parse_personality)
            .await?;
        let abstractions = self
            .batch(
                "icf_abstraction",
                &texts,
                prompts::icf_abstraction_prompt,
                parse::parse_icf_abstraction,
            )
            .await?;
        let emotions = self
            .batch("emotion", &texts, prompts::emotion_prompt, parse::parse_emotion)
            .await?;

        let icf_abstractions =
            AnnotationSet::from_lists(abstractions.into_iter().map(Option::unwrap_or_default).collect());
        let icf_codes = self.label(&icf_abstractions).await;

        Ok(Annotations {
            speech,
            personality: AnnotationSet::from_lists(
                personality.into_iter().map(Option::unwrap_or_default).collect(),
            ),
            icf_abstractions,
            emotions: emotions.into_iter().map(Option::unwrap_or_default).collect(),
            icf_codes,
        })
    }

    /// One batched pass: build a prompt per text, send them together and
    /// parse each answer.
    async fn batch<T>(
        &self,
        stage: &str,
        texts: &[String],
        build: fn(&str) -> Prompt,
        parse: fn(&str) -> ParseOutcome<T>,
    ) -> Result<Vec<Option<T>>> {
        let batch: Vec<Prompt> = texts.iter().map(|t| build(t)).collect();
        let responses = self.llm.complete_batch(&batch).await?;

        let outcomes: Vec<ParseOutcome<T>> = responses.iter().map(|r| parse(r)).collect();
        let malformed = outcomes.iter().filter(|o| o.is_malformed()).count();
        if malformed > 0 {
            warn!(stage, malformed, total = outcomes.len(), "responses did not follow the expected format");
        } else {
            debug!(stage, total = outcomes.len(), "stage complete");
        }

        Ok(outcomes.into_iter().map(ParseOutcome::value).collect())
    }

    /// Label every abstraction with an ICF code, one call at a time.
    ///
    /// Each code sits at the row and position of its abstraction. The first
    /// backend failure ends labeling; codes gathered before it are kept.
    async fn label(&self, abstractions: &AnnotationSet) -> AnnotationSet {
        let mut codes = AnnotationSet::empty(abstractions.row_count());
        let total = abstractions.iter().count();
        let mut unparsed = 0;

        for (i, (row, position, sentence)) in abstractions.iter().enumerate() {
            match self.label_one(sentence).await {
                Ok(ParseOutcome::Matched(code)) | Ok(ParseOutcome::Recovered(code)) => {
                    codes.set(row, position, code.to_string());
                }
                Ok(_) => unparsed += 1,
                Err(e) => {
                    warn!(error = %e, labeled = i, total, "ICF labeling stopped");
                    break;
                }
            }
        }

        if unparsed > 0 {
            warn!(unparsed, total, "some abstractions got no ICF code");
        }
        codes
    }

    async fn label_one(&self, sentence: &str) -> Result<ParseOutcome<IcfCode>> {
        let snippets = self.retriever.retrieve(sentence).await?;
        let prompt = prompts::icf_labeling_prompt(&format_context(&snippets), sentence);
        let response = self.llm.complete(&prompt).await?;
        Ok(parse::parse_icf_code(&response))
    }
}

/// Append the stage columns to `result`, in pass order.
fn merge(result: &mut ResultTable, annotations: &Annotations) -> Result<()> {
    result.set_column(
        "speech",
        annotations
            .speech
            .iter()
            .map(|s| s.clone().map(Value::String).unwrap_or(Value::Null))
            .collect(),
    )?;
    for (name, cells) in annotations.personality.columns("person") {
        result.set_column(&name, cells)?;
    }
    for (name, cells) in annotations.icf_abstractions.columns("icf_abst") {
        result.set_column(&name, cells)?;
    }
    result.set_column(
        "emotion1",
        annotations
            .emotions
            .iter()
            .map(|e| Value::from(e.as_str()))
            .collect(),
    )?;
    for (name, cells) in annotations.icf_codes.columns("icf") {
        result.set_column(&name, cells)?;
    }
    Ok(())
}
