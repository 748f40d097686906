//! Binder diagnostic channel
//!
//! Delegation hints are attached to nodes as severity-tagged, localized
//! messages. A given resource key is reported at most once per node.

use std::fmt;
use std::sync::Mutex;

use serde::Serialize;

use crate::syntax::NodeId;

/// Severity of a document error
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentErrorSeverity {
    Suggestion,
    Verbose,
    Warning,
    Moderate,
    Severe,
    Critical,
}

impl DocumentErrorSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentErrorSeverity::Suggestion => "SUGGESTION",
            DocumentErrorSeverity::Verbose => "VERBOSE",
            DocumentErrorSeverity::Warning => "WARNING",
            DocumentErrorSeverity::Moderate => "MODERATE",
            DocumentErrorSeverity::Severe => "SEVERE",
            DocumentErrorSeverity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for DocumentErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key of a localized message resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ErrorResourceKey(pub &'static str);

impl fmt::Display for ErrorResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A message attached to a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentError {
    pub severity: DocumentErrorSeverity,
    pub node: NodeId,
    pub key: ErrorResourceKey,
    pub message: String,
}

/// Append-only collection of document errors
#[derive(Debug, Default)]
pub struct DiagnosticContainer {
    errors: Mutex<Vec<DocumentError>>,
}

impl DiagnosticContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an error unless one with the same key is already on the node.
    ///
    /// Returns true if the error was added.
    pub fn ensure_error(
        &self,
        severity: DocumentErrorSeverity,
        node: NodeId,
        key: ErrorResourceKey,
        message: impl Into<String>,
    ) -> bool {
        let Ok(mut errors) = self.errors.lock() else {
            return false;
        };
        if errors.iter().any(|e| e.node == node && e.key == key) {
            return false;
        }
        errors.push(DocumentError {
            severity,
            node,
            key,
            message: message.into(),
        });
        true
    }

    pub fn errors(&self) -> Vec<DocumentError> {
        self.errors.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn errors_for(&self, node: NodeId) -> Vec<DocumentError> {
        self.errors
            .lock()
            .map(|e| e.iter().filter(|d| d.node == node).cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.errors.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: ErrorResourceKey = ErrorResourceKey("SuggestRemoteExecutionHint");
    const OTHER_KEY: ErrorResourceKey = ErrorResourceKey("OpNotSupportedByColumn");

    #[test]
    fn test_ensure_error_deduplicates_per_node_and_key() {
        let container = DiagnosticContainer::new();

        assert!(container.ensure_error(DocumentErrorSeverity::Warning, NodeId(1), KEY, "a"));
        assert!(!container.ensure_error(DocumentErrorSeverity::Warning, NodeId(1), KEY, "b"));
        assert!(container.ensure_error(DocumentErrorSeverity::Warning, NodeId(1), OTHER_KEY, "c"));
        assert!(container.ensure_error(DocumentErrorSeverity::Warning, NodeId(2), KEY, "d"));

        assert_eq!(container.len(), 3);
        assert_eq!(container.errors_for(NodeId(1)).len(), 2);
        assert_eq!(container.errors()[0].message, "a");
    }

    #[test]
    fn test_severity_ordering() {
        assert!(DocumentErrorSeverity::Suggestion < DocumentErrorSeverity::Warning);
        assert!(DocumentErrorSeverity::Warning < DocumentErrorSeverity::Critical);
        assert_eq!(DocumentErrorSeverity::Warning.as_str(), "WARNING");
    }
}
