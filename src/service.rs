//! Verification surface for test code
//!
//! Thin wrappers over the comparison engine and the expression evaluator,
//! plus `assert_*` helpers that turn a negative answer into a
//! [`VerificationFailure`].

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::aggregator::{self, AggregateDiff};
use crate::classifier::DiffKind;
use crate::document;
use crate::error::{EvaluationResult, Result, VerificationFailure};
use crate::expression::{Expression, QueryResult, QueryShape};
use crate::node::Element;
use crate::settings::{ComparisonSettings, ComparisonSettingsBuilder};

/// A caller-defined check applied to a string extracted from a document
pub trait Validator {
    fn valid(&self, value: &str) -> bool;
}

impl<F> Validator for F
where
    F: Fn(&str) -> bool,
{
    fn valid(&self, value: &str) -> bool {
        self(value)
    }
}

/// Accepts values that start with a fixed prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartsWith {
    prefix: String,
}

impl StartsWith {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Validator for StartsWith {
    fn valid(&self, value: &str) -> bool {
        value.starts_with(&self.prefix)
    }
}

pub fn are_documents_equal(
    expected: &Element,
    actual: &Element,
    settings: &ComparisonSettings,
) -> EvaluationResult<bool> {
    aggregator::is_equal(expected, actual, settings)
}

pub fn diff(
    expected: &Element,
    actual: &Element,
    settings: &ComparisonSettings,
) -> EvaluationResult<AggregateDiff> {
    aggregator::compare(expected, actual, settings)
}

/// Evaluates `expression` against `document` in the requested result shape
pub fn query_path<'a>(
    document: &'a Element,
    expression: &str,
    shape: QueryShape,
) -> EvaluationResult<QueryResult<'a>> {
    Expression::parse(expression)?.evaluate(document, shape)
}

/// Whether `path` selects at least one node
pub fn node_exists(document: &Element, path: &str) -> EvaluationResult<bool> {
    match query_path(document, path, QueryShape::NodeSet)? {
        QueryResult::NodeSet(nodes) => Ok(!nodes.is_empty()),
        _ => Ok(false),
    }
}

/// Applies `validator` to the string result of `path`
///
/// A path selecting nothing yields the empty string, which is still
/// handed to the validator.
pub fn node_matches(document: &Element, path: &str, validator: &dyn Validator) -> EvaluationResult<bool> {
    let value = query_path(document, path, QueryShape::String)?;
    Ok(validator.valid(value.as_str().unwrap_or_default()))
}

pub fn assert_documents_equal(
    expected: &Element,
    actual: &Element,
    settings: &ComparisonSettings,
) -> Result<()> {
    let result = aggregator::compare(expected, actual, settings)?;
    match result.details().first() {
        None => Ok(()),
        Some(first) => Err(VerificationFailure::new(format!(
            "The two XML documents do not match: {} ({} difference{} in total)",
            first,
            result.len(),
            if result.len() == 1 { "" } else { "s" }
        ))
        .into()),
    }
}

pub fn assert_node_exists(document: &Element, path: &str) -> Result<()> {
    if node_exists(document, path)? {
        Ok(())
    } else {
        Err(VerificationFailure::new(format!(
            "Node {} does not exist in document although expected",
            path
        ))
        .into())
    }
}

pub fn assert_node_not_exists(document: &Element, path: &str) -> Result<()> {
    if node_exists(document, path)? {
        Err(VerificationFailure::new(format!(
            "Node {} exists in document although not expected",
            path
        ))
        .into())
    } else {
        Ok(())
    }
}

pub fn assert_node_matches(document: &Element, path: &str, validator: &dyn Validator) -> Result<()> {
    if node_matches(document, path, validator)? {
        Ok(())
    } else {
        Err(VerificationFailure::new(format!("Node {} does not match validator", path)).into())
    }
}

/// Verifies an XML file on disk against a reference file
///
/// Tolerances and key expressions are collected fluently and compiled when
/// a verification runs.
#[derive(Debug, Clone)]
pub struct DocumentVerifier {
    actual_path: PathBuf,
    settings: ComparisonSettingsBuilder,
}

impl DocumentVerifier {
    pub fn new(actual_path: impl Into<PathBuf>) -> Self {
        Self::with_settings(actual_path, ComparisonSettings::builder())
    }

    pub fn with_settings(actual_path: impl Into<PathBuf>, settings: ComparisonSettingsBuilder) -> Self {
        Self {
            actual_path: actual_path.into(),
            settings,
        }
    }

    pub fn actual_path(&self) -> &Path {
        &self.actual_path
    }

    /// Ignores every difference inside the subtree at `path`
    pub fn add_exclusion_path(mut self, path: impl Into<String>) -> Self {
        self.settings = self.settings.tolerate_any_diff_at(path);
        self
    }

    pub fn add_tolerated_diff(mut self, kind: DiffKind, path: impl Into<String>) -> Self {
        self.settings = self.settings.tolerate_generic_diff(kind, path);
        self
    }

    pub fn add_key_expression(
        mut self,
        element_name: impl Into<String>,
        key_expression: impl Into<String>,
    ) -> Self {
        self.settings = self.settings.add_key_expression(element_name, key_expression);
        self
    }

    pub fn whitespace_relevant(mut self, relevant: bool) -> Self {
        self.settings = self.settings.whitespace_relevant(relevant);
        self
    }

    /// Fails unless the actual file matches `reference` within the tolerances
    pub async fn verify_with(&self, reference: impl AsRef<Path>) -> Result<()> {
        let reference = reference.as_ref();
        let settings = self.settings.clone().build()?;
        let (expected, actual) = tokio::try_join!(document::load(reference), document::load(&self.actual_path))?;

        debug!(
            reference = %reference.display(),
            actual = %self.actual_path.display(),
            "Verifying document"
        );
        assert_documents_equal(&expected, &actual, &settings)?;
        info!(actual = %self.actual_path.display(), "Document verified");
        Ok(())
    }
}
