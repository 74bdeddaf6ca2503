//! Status command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::knowledge_base::IndexStatus;
use anyhow::Result;

/// Run the status command.
///
/// Reads the index directly so it works without credentials.
pub async fn run_status(settings: Settings) -> Result<()> {
    let status = IndexStatus::load(settings.index_path()).await?;

    if !status.exists() {
        Output::info(&format!(
            "No knowledge base at {}. Use 'candlelight build' to create it.",
            status.path.display()
        ));
        return Ok(());
    }

    Output::header("Knowledge Base");
    println!();
    for (key, value) in describe(&status) {
        Output::kv(key, &value);
    }

    match &status.manifest {
        Some(manifest) if manifest.embedding_model != settings.embedding.model => {
            println!();
            Output::warning(&format!(
                "Configured embedding model is '{}'; rebuild before asking questions.",
                settings.embedding.model
            ));
        }
        Some(_) => {}
        None => Output::warning("Index has no build manifest."),
    }

    Ok(())
}

fn describe(status: &IndexStatus) -> Vec<(&'static str, String)> {
    let mut lines = vec![("Index", status.path.display().to_string())];
    if let Some(count) = status.document_count {
        lines.push(("Documents", count.to_string()));
    }

    if let Some(manifest) = &status.manifest {
        lines.push(("Dataset", manifest.dataset_path.clone()));
        lines.push(("Source column", manifest.source_column.clone()));
        lines.push(("Embedding model", manifest.embedding_model.clone()));
        lines.push(("Dimensions", manifest.dimensions.to_string()));
        lines.push((
            "Built",
            manifest.built_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        ));
    }

    lines
}
