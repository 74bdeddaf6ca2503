//! Doctor command - verify credentials, dataset, index and configuration.

use crate::cli::Output;
use crate::config::Settings;
use crate::dataset::{load_dataset, DatasetSpec};
use crate::knowledge_base::IndexStatus;
use console::style;
use std::path::{Path, PathBuf};

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
///
/// `config_path` is the `--config` file, if one was given.
pub async fn run_doctor(settings: &Settings, config_path: Option<PathBuf>) -> anyhow::Result<()> {
    Output::header("Candlelight Doctor");
    println!();
    println!("Checking credentials, dataset and knowledge base...\n");

    let mut checks = Vec::new();

    let mut section = |title: &str, results: Vec<CheckResult>| {
        println!("{}", style(title).bold());
        for check in &results {
            check.print();
        }
        println!();
        checks.extend(results);
    };

    section("API Configuration", check_api_keys(settings, |name| std::env::var(name).ok()));
    section("Dataset", vec![check_dataset(settings)]);
    section("Knowledge Base", vec![check_index(settings).await]);
    let config_path = config_path.unwrap_or_else(Settings::default_config_path);
    section("Configuration", vec![check_config_file(settings, &config_path)]);

    // Summary
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Candlelight.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Candlelight is ready to use.");
    }

    Ok(())
}

/// Check the API key variables for both services.
fn check_api_keys(settings: &Settings, lookup: impl Fn(&str) -> Option<String>) -> Vec<CheckResult> {
    let mut names = vec![settings.embedding.api_key_env.as_str()];
    if settings.llm.api_key_env != settings.embedding.api_key_env {
        names.push(settings.llm.api_key_env.as_str());
    }

    names
        .into_iter()
        .map(|name| match lookup(name) {
            Some(key) if key.trim().is_empty() => CheckResult::error(
                name,
                "empty",
                &format!("Set with: export {}='...' or add it to .env", name),
            ),
            Some(key) => CheckResult::ok(name, &format!("configured ({})", mask_key(&key))),
            None => CheckResult::error(
                name,
                "not set",
                &format!("Set with: export {}='...' or add it to .env", name),
            ),
        })
        .collect()
}

/// Check that the configured dataset loads.
fn check_dataset(settings: &Settings) -> CheckResult {
    let spec = DatasetSpec {
        path: settings.dataset_path(),
        source_column: settings.dataset.source_column.clone(),
        format: settings.dataset.format,
    };

    match load_dataset(&spec) {
        Ok(rows) if rows.is_empty() => CheckResult::warning(
            "Dataset",
            &format!("{} has no rows", spec.path.display()),
            "Add FAQ rows before building",
        ),
        Ok(rows) => CheckResult::ok(
            "Dataset",
            &format!(
                "{} ({} rows, source column '{}')",
                spec.path.display(),
                rows.len(),
                spec.source_column
            ),
        ),
        Err(e) => CheckResult::error(
            "Dataset",
            &e.to_string(),
            "Set dataset.path in the config or pass --dataset to 'candlelight build'",
        ),
    }
}

/// Check the persisted index and that it matches the configured model.
async fn check_index(settings: &Settings) -> CheckResult {
    let status = match IndexStatus::load(settings.index_path()).await {
        Ok(status) => status,
        Err(e) => {
            return CheckResult::error("Index", &e.to_string(), "Rebuild with: candlelight build")
        }
    };
    let path = status.path.display();

    let Some(count) = status.document_count else {
        return CheckResult::warning(
            "Index",
            &format!("{} (not built yet)", path),
            "Create it with: candlelight build",
        );
    };

    let size = std::fs::metadata(&status.path)
        .map(|m| format_size(m.len()))
        .unwrap_or_else(|_| "unknown size".to_string());

    match &status.manifest {
        Some(manifest) if manifest.embedding_model != settings.embedding.model => {
            CheckResult::error(
                "Index",
                &format!(
                    "built with '{}' but '{}' is configured",
                    manifest.embedding_model, settings.embedding.model
                ),
                "Rebuild with: candlelight build",
            )
        }
        Some(_) => CheckResult::ok(
            "Index",
            &format!("{} ({}, {} documents)", path, size, count),
        ),
        None => CheckResult::warning(
            "Index",
            &format!("{} has no build manifest", path),
            "Rebuild with: candlelight build",
        ),
    }
}

/// Check that the settings are valid and the config file in use exists.
fn check_config_file(settings: &Settings, config_path: &Path) -> CheckResult {
    if let Err(e) = settings.validate() {
        return CheckResult::error("Config", &e.to_string(), "Fix with: candlelight config edit");
    }

    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: candlelight config edit",
        )
    }
}

/// Show only the ends of a secret.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_api_key_checks() {
        let settings = Settings::default();

        let missing = check_api_keys(&settings, |_| None);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].status, CheckStatus::Error);

        let present = check_api_keys(&settings, |_| Some("sk-abcdefghijklmnop".to_string()));
        assert_eq!(present[0].status, CheckStatus::Ok);
        assert!(present[0].message.contains("sk-a...mnop"));
        assert!(!present[0].message.contains("efgh"));
    }

    #[test]
    fn test_distinct_key_variables_are_checked_separately() {
        let mut settings = Settings::default();
        settings.llm.api_key_env = "GEMINI_API_KEY".to_string();

        let checks = check_api_keys(&settings, |name| {
            (name == "GEMINI_API_KEY").then(|| "gm-0123456789abcdef".to_string())
        });
        assert_eq!(checks.len(), 2);
        assert_eq!(checks[0].status, CheckStatus::Error);
        assert_eq!(checks[1].status, CheckStatus::Ok);
    }

    #[tokio::test]
    async fn test_index_check_without_index() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.index.dir = dir.path().display().to_string();

        let check = check_index(&settings).await;
        assert_eq!(check.status, CheckStatus::Warning);
    }

    #[test]
    fn test_config_check_uses_given_path() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::default();

        let explicit = dir.path().join("candlelight.toml");
        std::fs::write(&explicit, "").unwrap();
        let check = check_config_file(&settings, &explicit);
        assert_eq!(check.status, CheckStatus::Ok);
        assert!(check.message.contains("candlelight.toml"));

        let missing = dir.path().join("missing.toml");
        let check = check_config_file(&settings, &missing);
        assert_eq!(check.status, CheckStatus::Warning);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
    }
}
