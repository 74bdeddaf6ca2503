//! Build command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Credentials, Settings};
use crate::dataset::{DatasetFormat, DatasetSpec};
use crate::error::Result;
use crate::knowledge_base::{BuildReport, KnowledgeBase};

/// Run the build command.
pub async fn run_build(
    dataset: Option<String>,
    source_column: Option<String>,
    format: Option<DatasetFormat>,
    settings: Settings,
    credentials: &Credentials,
) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Build, &settings, credentials) {
        Output::error(&e.to_string());
        Output::info("Run 'candlelight doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let kb = KnowledgeBase::new(settings, credentials)?;

    let mut spec = kb.configured_dataset();
    if let Some(path) = dataset {
        spec.path = Settings::expand_path(&path);
    }
    if let Some(column) = source_column {
        spec.source_column = column;
    }
    if format.is_some() {
        spec.format = format;
    }

    build_index(&kb, &spec).await?;
    Ok(())
}

/// Build the index with progress output.
pub(super) async fn build_index(kb: &KnowledgeBase, dataset: &DatasetSpec) -> Result<BuildReport> {
    let spinner = Output::spinner(&format!(
        "Indexing {} (source column '{}')...",
        dataset.path.display(),
        dataset.source_column
    ));

    let result = kb.build(dataset).await;
    spinner.finish_and_clear();

    match result {
        Ok(report) => {
            Output::success(&format!(
                "Indexed {} FAQ entries in {:.1}s",
                report.documents,
                report.elapsed.as_secs_f64()
            ));
            Output::kv("Index", &report.index_path.display().to_string());
            Output::kv("Dimensions", &report.dimensions.to_string());
            Ok(report)
        }
        Err(e) => {
            Output::error(&format!("Build failed: {}", e));
            if kb.index_exists() {
                Output::info("The previous index was left in place.");
            }
            Err(e)
        }
    }
}
