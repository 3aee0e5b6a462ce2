//! Evaluate command - annotate care-log entries and write JSON.

use std::path::PathBuf;

use carelog::anonymize::PatternAnonymizer;
use carelog::input::ParserConfig;
use carelog::llm::LlmConfig;
use carelog::{EvaluateConfig, Evaluator};

use super::backends;

pub fn run(
    input: PathBuf,
    output: PathBuf,
    mock_llm: bool,
    concurrency: usize,
    limit: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    if !input.exists() {
        return Err(format!("File not found: {}", input.display()).into());
    }

    let llm_config = LlmConfig {
        temperature: Some(1.0),
        batch_concurrency: concurrency.max(1),
        ..Default::default()
    };
    let backends = backends(mock_llm, llm_config)?;

    let known_names = backends
        .service
        .as_ref()
        .map(|s| s.known_names.clone())
        .unwrap_or_default();
    let anonymizer = PatternAnonymizer::with_known_names(known_names.as_slice())?;

    let config = EvaluateConfig {
        parser: ParserConfig {
            max_rows: limit,
            ..Default::default()
        },
        ..Default::default()
    };
    let evaluator = Evaluator::with_config(backends.llm, backends.retriever, config)
        .with_anonymizer(anonymizer);

    let runtime = tokio::runtime::Runtime::new()?;
    let path = runtime.block_on(evaluator.run(&input, &output))?;

    println!("{}", path.display());
    Ok(())
}
