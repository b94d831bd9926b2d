//! Helpful error types for CLI commands
//!
//! Every error includes:
//! - What went wrong
//! - Context about the situation
//! - Suggestions for how to fix it

use std::fmt;
use std::path::Path;

/// An error with helpful context and suggestions
#[derive(Debug)]
pub struct HelpfulError {
    /// The main error message
    pub message: String,
    /// Additional context about what was happening
    pub context: Option<String>,
    /// Suggestions for how to fix the error
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    /// Create a new helpful error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a suggestion for fixing the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add multiple suggestions
    pub fn with_suggestions(mut self, suggestions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.suggestions.extend(suggestions.into_iter().map(|s| s.into()));
        self
    }

    // === Common error constructors ===

    /// Configuration file does not exist
    pub fn config_not_found(path: &Path) -> Self {
        Self::new(format!("Configuration not found: {}", path.display()))
            .with_context("The specified configuration file does not exist")
            .with_suggestions([
                format!("TRY: Check the path: ls -la {}", path.display()),
                "TRY: Create one with: lineup infer <FILES>... --group-token <VALUE> --config <PATH> --write"
                    .to_string(),
            ])
    }

    /// Configuration has no group pattern yet
    pub fn missing_group_pattern(path: &Path) -> Self {
        Self::new("No group pattern configured")
            .with_context(format!("Configuration: {}", path.display()))
            .with_suggestions([
                format!(
                    "TRY: Infer one: lineup infer <FILES>... --group-token <VALUE> --config {} --write",
                    path.display()
                ),
                "TRY: Set group_pattern in the file, e.g. group_pattern = '^car_([A-Za-z0-9]+)_\\w+\\.jpg$'"
                    .to_string(),
            ])
    }

    /// The chosen group token is not a segment of any sample
    pub fn group_token_not_found(token: &str, candidates: &[String]) -> Self {
        let mut err = Self::new(format!("Group token not found: '{}'", token))
            .with_context("The group token must be one of the segments of the sample filenames");
        if !candidates.is_empty() {
            err = err.with_suggestion(format!("TRY: One of: {}", candidates.join(", ")));
        }
        err.with_suggestion("TRY: Segments are split on '_', '-', '.' and spaces")
    }

    /// The pattern generator rejected its input
    pub fn pattern_generation_failed(details: &str) -> Self {
        Self::new(format!("Could not generate a group pattern: {}", details))
            .with_suggestion("TRY: Run 'lineup segments <FILES>...' to inspect how the filenames split")
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;

        if let Some(ctx) = &self.context {
            writeln!(f, "CONTEXT: {}", ctx)?;
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            for suggestion in &self.suggestions {
                writeln!(f, "  {}", suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for HelpfulError {}

/// Emit a failure as a JSON object on stdout
pub fn print_json_error(err: &anyhow::Error) {
    let payload = match err.downcast_ref::<HelpfulError>() {
        Some(helpful) => serde_json::json!({
            "error": helpful.message,
            "context": helpful.context,
            "suggestions": helpful.suggestions,
        }),
        None => serde_json::json!({ "error": format!("{:#}", err) }),
    };
    println!("{}", payload);
}
