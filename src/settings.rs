//! Comparison policy: whitespace handling, tolerance rules and key expressions
//!
//! Settings are assembled with [`ComparisonSettingsBuilder`] and frozen by
//! [`ComparisonSettingsBuilder::build`], which compiles every path pattern
//! and key expression up front. A built [`ComparisonSettings`] is immutable
//! and may be shared by any number of concurrent comparisons.

use std::collections::HashMap;

use crate::classifier::{DiffDetail, DiffKind};
use crate::error::{ConfigurationError, ConfigurationResult};
use crate::expression::Expression;
use crate::locator::{Locator, PathPattern, is_qualified_name};

/// Nesting depth at which a comparison gives up
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// A policy entry suppressing matching diffs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToleranceRule {
    pattern: PathPattern,
    kind: Option<DiffKind>,
}

impl ToleranceRule {
    /// Suppresses every diff at or below the subtree `pattern` addresses
    pub fn any(pattern: PathPattern) -> Self {
        Self {
            pattern,
            kind: None,
        }
    }

    /// Suppresses diffs of `kind` located exactly at `pattern`
    pub fn of_kind(kind: DiffKind, pattern: PathPattern) -> Self {
        Self {
            pattern,
            kind: Some(kind),
        }
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// `None` for rules tolerating any kind
    pub fn kind(&self) -> Option<DiffKind> {
        self.kind
    }

    pub fn tolerates(&self, diff: &DiffDetail) -> bool {
        if self.kind.is_some_and(|kind| kind != diff.kind) {
            return false;
        }
        let matches = |locator: &Locator| match self.kind {
            None => self.pattern.matches_subtree(locator),
            Some(_) => self.pattern.matches_exact(locator),
        };
        [&diff.locator_of_expected, &diff.locator_of_actual]
            .into_iter()
            .flatten()
            .any(matches)
    }
}

/// Element name to identity key expression lookup
#[derive(Debug, Clone, Default)]
pub struct KeyExpressionIndex {
    expressions: HashMap<String, Expression>,
}

impl KeyExpressionIndex {
    pub fn key_expression_for(&self, element_name: &str) -> Option<&Expression> {
        self.expressions.get(element_name)
    }

    pub fn len(&self) -> usize {
        self.expressions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }
}

/// Immutable comparison policy
#[derive(Debug, Clone)]
pub struct ComparisonSettings {
    whitespace_relevant: bool,
    tolerance_rules: Vec<ToleranceRule>,
    key_expressions: KeyExpressionIndex,
    max_depth: usize,
}

impl Default for ComparisonSettings {
    fn default() -> Self {
        Self {
            whitespace_relevant: true,
            tolerance_rules: Vec::new(),
            key_expressions: KeyExpressionIndex::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ComparisonSettings {
    pub fn builder() -> ComparisonSettingsBuilder {
        ComparisonSettingsBuilder::default()
    }

    pub fn whitespace_relevant(&self) -> bool {
        self.whitespace_relevant
    }

    pub fn tolerance_rules(&self) -> &[ToleranceRule] {
        &self.tolerance_rules
    }

    pub fn key_expressions(&self) -> &KeyExpressionIndex {
        &self.key_expressions
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Whether any rule, in registration order, suppresses `diff`
    pub fn is_tolerated(&self, diff: &DiffDetail) -> bool {
        self.tolerance_rules.iter().any(|rule| rule.tolerates(diff))
    }
}

/// Collects raw rule and key strings; nothing is validated until `build`
#[derive(Debug, Clone)]
pub struct ComparisonSettingsBuilder {
    whitespace_relevant: bool,
    rules: Vec<(String, Option<DiffKind>)>,
    keys: Vec<(String, String)>,
    max_depth: usize,
}

impl Default for ComparisonSettingsBuilder {
    fn default() -> Self {
        Self {
            whitespace_relevant: true,
            rules: Vec::new(),
            keys: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ComparisonSettingsBuilder {
    /// When false, element text is trimmed and whitespace runs collapsed
    /// before comparison
    pub fn whitespace_relevant(mut self, relevant: bool) -> Self {
        self.whitespace_relevant = relevant;
        self
    }

    pub fn tolerate_any_diff_at(mut self, path: impl Into<String>) -> Self {
        self.rules.push((path.into(), None));
        self
    }

    pub fn tolerate_generic_diff(mut self, kind: DiffKind, path: impl Into<String>) -> Self {
        self.rules.push((path.into(), Some(kind)));
        self
    }

    pub fn tolerate_different_at(self, path: impl Into<String>) -> Self {
        self.tolerate_generic_diff(DiffKind::Different, path)
    }

    pub fn tolerate_missing_at(self, path: impl Into<String>) -> Self {
        self.tolerate_generic_diff(DiffKind::Missing, path)
    }

    pub fn tolerate_unexpected_at(self, path: impl Into<String>) -> Self {
        self.tolerate_generic_diff(DiffKind::Unexpected, path)
    }

    /// Registers the identity key of `element_name`; a later registration
    /// for the same name replaces an earlier one
    pub fn add_key_expression(
        mut self,
        element_name: impl Into<String>,
        key_expression: impl Into<String>,
    ) -> Self {
        self.keys.push((element_name.into(), key_expression.into()));
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn build(self) -> ConfigurationResult<ComparisonSettings> {
        if self.max_depth == 0 {
            return Err(ConfigurationError::InvalidDepthLimit(self.max_depth));
        }

        let tolerance_rules = self
            .rules
            .into_iter()
            .map(|(path, kind)| {
                let pattern = PathPattern::parse(&path)?;
                Ok(match kind {
                    None => ToleranceRule::any(pattern),
                    Some(kind) => ToleranceRule::of_kind(kind, pattern),
                })
            })
            .collect::<ConfigurationResult<Vec<_>>>()?;

        let mut expressions = HashMap::new();
        for (element, expression) in self.keys {
            if !is_qualified_name(&element) {
                return Err(ConfigurationError::InvalidElementName(element));
            }
            let compiled = Expression::parse(&expression).map_err(|error| {
                ConfigurationError::InvalidKeyExpression {
                    element: element.clone(),
                    expression: expression.clone(),
                    reason: error.to_string(),
                }
            })?;
            expressions.insert(element, compiled);
        }

        Ok(ComparisonSettings {
            whitespace_relevant: self.whitespace_relevant,
            tolerance_rules,
            key_expressions: KeyExpressionIndex { expressions },
            max_depth: self.max_depth,
        })
    }
}
