use std::path::PathBuf;

use thiserror::Error;

/// Main library error type that encompasses all possible failure modes
///
/// A non-equal comparison is never an error: it is reported through
/// [`crate::AggregateDiff`]. Only the `assert_*` verification helpers turn
/// inequality into [`VerificationFailure`].
#[derive(Error, Debug)]
pub enum CompareError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Verification(#[from] VerificationFailure),
}

/// Raised while building [`crate::ComparisonSettings`], never mid-comparison
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Invalid tolerance path '{path}': {reason}")]
    InvalidPathPattern { path: String, reason: String },

    #[error("Invalid key expression for element '{element}': {expression} - {reason}")]
    InvalidKeyExpression {
        element: String,
        expression: String,
        reason: String,
    },

    #[error("Invalid element name for key expression: '{0}'")]
    InvalidElementName(String),

    #[error("Invalid depth limit: {0} (must be greater than 0)")]
    InvalidDepthLimit(usize),
}

/// Raised when a path or key expression cannot be evaluated
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    #[error("Malformed expression '{expression}' at offset {offset}: {reason}")]
    Syntax {
        expression: String,
        offset: usize,
        reason: String,
    },

    #[error("Expression '{expression}' matched {count} nodes where a single node was requested")]
    Cardinality { expression: String, count: usize },

    #[error("Expression '{expression}' yields a {found} where a {requested} was requested")]
    TypeMismatch {
        expression: String,
        requested: &'static str,
        found: &'static str,
    },

    #[error("Expression '{expression}' selected nothing")]
    NoMatch { expression: String },

    #[error("Document nesting exceeds the limit of {limit} levels at {locator}")]
    DepthLimitExceeded { limit: usize, locator: String },
}

/// Document provider errors
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("XML syntax error: {0}")]
    Syntax(#[from] roxmltree::Error),

    #[error("XML syntax error in {path}: {source}")]
    FileSyntax {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("XML document nests elements deeper than {limit} levels")]
    NestingTooDeep { limit: usize },
}

/// A verification assertion did not hold
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct VerificationFailure {
    pub message: String,
}

impl VerificationFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, CompareError>;

/// Settings-build result type alias
pub type ConfigurationResult<T> = std::result::Result<T, ConfigurationError>;

/// Expression evaluation result type alias
pub type EvaluationResult<T> = std::result::Result<T, EvaluationError>;
