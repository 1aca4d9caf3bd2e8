//! # xml-compare Library
//!
//! Tolerant structural comparison of XML documents. An actual document is
//! compared against an expected one and every discrepancy is reported as a
//! [`DiffDetail`] with locators on both sides, unless a tolerance rule of the
//! [`ComparisonSettings`] suppresses it. Repeated elements can be paired by an
//! identity key expression instead of by position.
//!
//! ```
//! use xml_compare::{ComparisonSettings, compare, document};
//!
//! let expected = document::parse_str(r#"<doc a="1"><p>x</p></doc>"#)?;
//! let actual = document::parse_str(r#"<doc a="2"><p>x</p></doc>"#)?;
//! let settings = ComparisonSettings::builder()
//!     .tolerate_different_at("/doc/@a")
//!     .build()?;
//! assert!(compare(&expected, &actual, &settings)?.is_equal());
//! # Ok::<(), xml_compare::CompareError>(())
//! ```

pub mod aggregator;
pub mod aligner;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod expression;
pub mod locator;
pub mod logging;
pub mod node;
pub mod output;
pub mod service;
pub mod settings;

pub use aggregator::{AggregateDiff, compare, is_equal};
pub use aligner::{Alignment, Side, TreeAligner};
pub use classifier::{DiffClassifier, DiffDetail, DiffKind, DiffSink, DiffValue, ObjectClassifier};
pub use cli::{Cli, OutputFormat, VerbosityLevel};
pub use config::{Config, ConfigError, ConfigManager};
pub use error::{
    CompareError, ConfigurationError, DocumentError, EvaluationError, Result, VerificationFailure,
};
pub use expression::{DocumentScope, Expression, QueryResult, QueryShape};
pub use locator::{Locator, PathPattern, Step};
pub use node::{Attribute, Element, Node, NodeRef};
pub use output::Output;
pub use service::{
    DocumentVerifier, StartsWith, Validator, are_documents_equal, assert_documents_equal,
    assert_node_exists, assert_node_matches, assert_node_not_exists, diff, node_exists,
    node_matches, query_path,
};
pub use settings::{
    ComparisonSettings, ComparisonSettingsBuilder, DEFAULT_MAX_DEPTH, KeyExpressionIndex,
    ToleranceRule,
};
