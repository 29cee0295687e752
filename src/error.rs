//! Error types for the classification library.
//!
//! Only configuration and I/O problems surface as [`Error`]. A hypothesis that
//! turns out to be wrong is recorded on its candidate instead (see
//! [`crate::classification::CandidateFailure`]), and a page that cannot be
//! classified is reported as a skipped page by the engine.

use crate::classification::Label;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or driving classification.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Classifier dependencies form a cycle
    #[error("Classifier dependency cycle: {}", format_chain(.chain))]
    DependencyCycle {
        /// Labels along the cycle, first label repeated at the end
        chain: Vec<Label>,
    },

    /// Two classifiers declare the same output label
    #[error("Duplicate classifier for label '{0}'")]
    DuplicateClassifier(Label),

    /// A classifier requires a label nobody produces
    #[error("Classifier '{classifier}' requires '{label}' but no classifier produces it")]
    MissingDependency {
        /// Label of the classifier with the unmet requirement
        classifier: Label,
        /// The label nobody produces
        label: Label,
    },

    /// Page input cannot be classified
    #[error("Page {page_index} cannot be classified: {reason}")]
    InvalidPage {
        /// Index of the offending page
        page_index: usize,
        /// Why the page was rejected
        reason: String,
    },

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_chain(chain: &[Label]) -> String {
    chain
        .iter()
        .map(|l| l.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_error_lists_chain() {
        let err = Error::DependencyCycle {
            chain: vec![Label::Step, Label::Diagram, Label::Step],
        };
        let msg = format!("{}", err);
        assert!(msg.contains("step -> diagram -> step"));
    }

    #[test]
    fn test_missing_dependency_error() {
        let err = Error::MissingDependency {
            classifier: Label::Part,
            label: Label::PartCount,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("'part'"));
        assert!(msg.contains("'part_count'"));
    }

    #[test]
    fn test_invalid_page_error() {
        let err = Error::InvalidPage {
            page_index: 3,
            reason: "missing page rectangle".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Page 3"));
        assert!(msg.contains("missing page rectangle"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
