//! Pre-flight checks before operations that call remote services.
//!
//! Validates that credentials and the index are available before starting
//! work that would otherwise fail midway.

use crate::config::{Credentials, Settings};
use crate::error::{CandlelightError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Building requires the embedding credential.
    Build,
    /// Chatting requires both credentials; the index can be built from the session.
    Chat,
    /// Asking requires both credentials and a built index.
    Ask,
    /// Search requires the embedding credential and a built index.
    Search,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings, credentials: &Credentials) -> Result<()> {
    credentials.embedding()?;

    match operation {
        Operation::Build | Operation::Search => {}
        Operation::Chat | Operation::Ask => {
            credentials.llm()?;
        }
    }

    match operation {
        Operation::Build | Operation::Chat => {}
        Operation::Ask | Operation::Search => {
            let index_path = settings.index_path();
            if !index_path.is_file() {
                return Err(CandlelightError::IndexNotFound(index_path));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_in(dir: &std::path::Path) -> Settings {
        let mut settings = Settings::default();
        settings.index.dir = dir.display().to_string();
        settings.llm.api_key_env = "GOOGLE_API_KEY".to_string();
        settings
    }

    #[test]
    fn test_missing_embedding_key_fails_every_operation() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        let credentials = Credentials::resolve(&settings, |_| None);
        for op in [Operation::Build, Operation::Chat, Operation::Ask, Operation::Search] {
            assert!(matches!(
                check(op, &settings, &credentials),
                Err(CandlelightError::MissingCredential(ref name)) if name == "OPENAI_API_KEY"
            ));
        }
    }

    #[test]
    fn test_build_and_search_need_only_the_embedding_key() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        std::fs::write(settings.index_path(), b"").unwrap();
        let credentials = Credentials::resolve(&settings, |name| {
            (name == "OPENAI_API_KEY").then(|| "sk-test".to_string())
        });

        assert!(check(Operation::Build, &settings, &credentials).is_ok());
        assert!(check(Operation::Search, &settings, &credentials).is_ok());
        for op in [Operation::Chat, Operation::Ask] {
            assert!(matches!(
                check(op, &settings, &credentials),
                Err(CandlelightError::MissingCredential(ref name)) if name == "GOOGLE_API_KEY"
            ));
        }
    }

    #[test]
    fn test_ask_requires_index() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        let credentials = Credentials::resolve(&settings, |_| Some("key".to_string()));

        assert!(check(Operation::Chat, &settings, &credentials).is_ok());
        assert!(matches!(
            check(Operation::Ask, &settings, &credentials),
            Err(CandlelightError::IndexNotFound(_))
        ));

        std::fs::write(settings.index_path(), b"").unwrap();
        assert!(check(Operation::Ask, &settings, &credentials).is_ok());
    }
}
