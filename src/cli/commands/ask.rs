//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Credentials, Settings};
use crate::error::Result;
use crate::knowledge_base::KnowledgeBase;
use crate::llm::{ChatModel, OpenAIChatModel};
use std::sync::Arc;

/// Run the ask command.
pub async fn run_ask(
    question: &str,
    model: Option<String>,
    settings: Settings,
    credentials: &Credentials,
) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Ask, &settings, credentials) {
        Output::error(&e.to_string());
        Output::info("Run 'candlelight build' first, or 'candlelight doctor' for diagnostics.");
        return Err(e.into());
    }

    let chat_model = chat_model(&settings, credentials, model)?;
    let kb = KnowledgeBase::new(settings, credentials)?;
    let chain = kb.answer_chain(chat_model).await?;

    let spinner = Output::spinner("Searching the FAQ...");
    let result = chain.answer(question, &[]).await;
    spinner.finish_and_clear();

    match result {
        Ok(response) => {
            println!("\n{}\n", response.answer);

            if response.sources.is_empty() {
                Output::warning("No FAQ entry was similar enough to the question.");
            } else {
                Output::header("Sources");
                for source in &response.sources {
                    Output::search_result(
                        &source.document.source,
                        source.document.row,
                        source.score,
                        &source.document.content,
                    );
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}

/// Create the configured chat model, optionally overriding its name.
pub(super) fn chat_model(
    settings: &Settings,
    credentials: &Credentials,
    model: Option<String>,
) -> Result<Arc<dyn ChatModel>> {
    let mut llm = settings.llm.clone();
    if let Some(model) = model {
        llm.model = model;
    }
    Ok(Arc::new(OpenAIChatModel::new(&llm, credentials.llm()?)?))
}
