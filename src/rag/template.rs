//! Prompt templates with `{name}` placeholders.

use crate::error::{CandlelightError, Result};
use regex::{Captures, Regex};
use std::sync::OnceLock;

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
    })
}

/// A text template whose variables are the `{name}` placeholders it contains.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    template: String,
    variables: Vec<String>,
}

impl PromptTemplate {
    /// Parse a template, collecting its placeholders in order of first use.
    pub fn from_template(template: impl Into<String>) -> Self {
        let template = template.into();
        let mut variables: Vec<String> = Vec::new();
        for caps in placeholder_regex().captures_iter(&template) {
            let name = &caps[1];
            if !variables.iter().any(|v| v == name) {
                variables.push(name.to_string());
            }
        }
        Self {
            template,
            variables,
        }
    }

    /// Parse a template that must contain every one of `required`.
    pub fn with_required(template: impl Into<String>, required: &[&str]) -> Result<Self> {
        let parsed = Self::from_template(template);
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|name| !parsed.variables.iter().any(|v| v == name))
            .collect();

        if !missing.is_empty() {
            return Err(CandlelightError::Prompt(format!(
                "template is missing placeholder(s): {}",
                missing
                    .iter()
                    .map(|m| format!("{{{}}}", m))
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }
        Ok(parsed)
    }

    /// Placeholder names in order of first use.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Substitute every placeholder in a single pass.
    ///
    /// Braces inside substituted values are left alone.
    pub fn render(&self, values: &[(&str, &str)]) -> Result<String> {
        if let Some(missing) = self
            .variables
            .iter()
            .find(|v| !values.iter().any(|(name, _)| name == v))
        {
            return Err(CandlelightError::Prompt(format!(
                "no value supplied for {{{}}}",
                missing
            )));
        }

        let rendered = placeholder_regex().replace_all(&self.template, |caps: &Captures| {
            values
                .iter()
                .find(|(name, _)| *name == &caps[1])
                .map(|(_, value)| (*value).to_string())
                .unwrap_or_default()
        });
        Ok(rendered.into_owned())
    }
}
