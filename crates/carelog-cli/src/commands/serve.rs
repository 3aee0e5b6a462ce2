//! Serve command - run the care-plan tagging API.

use carelog::Tagger;
use carelog::llm::LlmConfig;
use tracing::info;

use super::backends;
use crate::server::{app, state::AppState};

pub fn run(host: String, port: u16, mock_llm: bool) -> Result<(), Box<dyn std::error::Error>> {
    let llm_config = LlmConfig {
        temperature: Some(0.0),
        ..Default::default()
    };
    let backends = backends(mock_llm, llm_config)?;
    let tagger = Tagger::new(backends.llm, backends.retriever);

    info!(
        llm = tagger.provider_name(),
        retriever = tagger.retriever_name(),
        "tagging service configured"
    );
    let state = AppState::new(tagger);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(app::run_server(state, &host, port))
}
