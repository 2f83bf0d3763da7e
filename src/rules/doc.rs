//! Human-readable rules document shown next to deterministic decisions.

use std::path::PathBuf;

use crate::error::GateError;

/// Shown in place of the rules document when it cannot be read.
pub const RULES_PLACEHOLDER: &str = "(Rules file not found)";

#[derive(Debug, Clone)]
pub struct RuleDoc {
    path: Option<PathBuf>,
}

impl RuleDoc {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// A document that always renders as the placeholder.
    pub fn none() -> Self {
        Self { path: None }
    }

    pub fn read(&self) -> Result<String, GateError> {
        let Some(path) = &self.path else {
            return Err(GateError::RuleSourceMissing {
                path: PathBuf::new(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        };
        std::fs::read_to_string(path).map_err(|source| GateError::RuleSourceMissing {
            path: path.clone(),
            source,
        })
    }

    /// Document text, or [`RULES_PLACEHOLDER`] if it cannot be read.
    pub fn load(&self) -> String {
        self.read().unwrap_or_else(|e| {
            log::debug!("{e}");
            RULES_PLACEHOLDER.to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_placeholder() {
        let doc = RuleDoc::new("/nonexistent/rules/shell.md");
        assert!(matches!(doc.read(), Err(GateError::RuleSourceMissing { .. })));
        assert_eq!(doc.load(), RULES_PLACEHOLDER);
    }

    #[test]
    fn none_yields_placeholder() {
        assert_eq!(RuleDoc::none().load(), RULES_PLACEHOLDER);
        assert!(RuleDoc::none().path.is_none());
    }

    #[test]
    fn existing_file_is_read() {
        let path = std::env::temp_dir().join(format!(
            "cc-shellguard-doc-test-{}.md",
            std::process::id()
        ));
        std::fs::write(&path, "- never use rm\n").unwrap();
        let doc = RuleDoc::new(path.clone());
        assert_eq!(doc.load(), "- never use rm\n");
        std::fs::remove_file(&path).unwrap();
    }
}
