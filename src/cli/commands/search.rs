//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Credentials, Settings, ThresholdPolicy};
use crate::knowledge_base::KnowledgeBase;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(
    query: &str,
    limit: usize,
    min_score: Option<f32>,
    settings: Settings,
    credentials: &Credentials,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Search, &settings, credentials) {
        Output::error(&e.to_string());
        Output::info("Run 'candlelight build' first, or 'candlelight doctor' for diagnostics.");
        return Err(e.into());
    }

    let kb = KnowledgeBase::new(settings, credentials)?;
    let mut retriever = kb.retriever().await?.with_top_k(limit.max(1));
    if let Some(min_score) = min_score {
        retriever = retriever
            .with_score_threshold(min_score)
            .with_policy(ThresholdPolicy::Cutoff);
    }

    let spinner = Output::spinner("Searching...");
    let results = retriever.retrieve(query).await;
    spinner.finish_and_clear();

    match results {
        Ok(results) => {
            if results.is_empty() {
                Output::warning(&format!(
                    "No FAQ entries scored at least {:.2}.",
                    retriever.score_threshold()
                ));
            } else {
                Output::success(&format!("Found {} results", results.len()));

                for result in &results {
                    Output::search_result(
                        &result.document.source,
                        result.document.row,
                        result.score,
                        &result.document.content,
                    );
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
