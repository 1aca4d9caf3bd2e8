//! Canonical node locators and tolerance path patterns
//!
//! A [`Locator`] addresses exactly one node from the document root:
//! `/doc/sect1/body/p[2]/@style`, `/doc/header/text()`. Sibling indices are
//! 1-based and only written when more than one sibling shares the name.
//!
//! A [`PathPattern`] is what tolerance rules are written in. It uses the same
//! syntax plus `//` (any depth), `*` and `@*` wildcards, and matches locators
//! either as a subtree prefix or exactly.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::ConfigurationError;
use crate::node::{Element, Node, NodeRef};

/// One step of a locator
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    Element { name: String, index: Option<usize> },
    Attribute(String),
    Text { index: Option<usize> },
}

impl Step {
    /// Position among same-named siblings, 1 when the index is omitted
    fn position(&self) -> usize {
        match self {
            Step::Element { index, .. } | Step::Text { index } => index.unwrap_or(1),
            Step::Attribute(_) => 1,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Element { name, index: None } => f.write_str(name),
            Step::Element {
                name,
                index: Some(index),
            } => write!(f, "{}[{}]", name, index),
            Step::Attribute(name) => write!(f, "@{}", name),
            Step::Text { index: None } => f.write_str("text()"),
            Step::Text { index: Some(index) } => write!(f, "text()[{}]", index),
        }
    }
}

/// Canonical path of a node from its document root
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    steps: Vec<Step>,
}

impl Locator {
    /// Locator of a document root element
    pub fn root(name: &str) -> Self {
        Self {
            steps: vec![Step::Element {
                name: name.to_string(),
                index: None,
            }],
        }
    }

    /// Locator of a child element; `index` is `None` for a sole same-named sibling
    pub fn child(&self, name: &str, index: Option<usize>) -> Self {
        self.with_step(Step::Element {
            name: name.to_string(),
            index,
        })
    }

    pub fn attribute(&self, name: &str) -> Self {
        self.with_step(Step::Attribute(name.to_string()))
    }

    /// Locator of the direct text content of the addressed element
    pub fn text(&self) -> Self {
        self.with_step(Step::Text { index: None })
    }

    fn with_step(&self, step: Step) -> Self {
        let mut steps = Vec::with_capacity(self.steps.len() + 1);
        steps.extend(self.steps.iter().cloned());
        steps.push(step);
        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Nesting depth, the root element being depth 1
    pub fn depth(&self) -> usize {
        self.steps.len()
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            write!(f, "/{}", step)?;
        }
        Ok(())
    }
}

impl Serialize for Locator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromStr for Locator {
    type Err = ConfigurationError;

    /// Parses a concrete locator; wildcards and `//` are rejected
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let pattern = PathPattern::parse(s)?;
        let mut steps = Vec::with_capacity(pattern.steps.len());
        for step in pattern.steps {
            let concrete = match (step.axis, step.test) {
                (Axis::Child, StepTest::Element { name: NameTest::Name(name), index }) => {
                    Step::Element { name, index }
                }
                (Axis::Child, StepTest::Attribute(NameTest::Name(name))) => Step::Attribute(name),
                (Axis::Child, StepTest::Text { index }) => Step::Text { index },
                _ => {
                    return Err(invalid(s, "a locator may not contain '//' or wildcards"));
                }
            };
            steps.push(concrete);
        }
        Ok(Self { steps })
    }
}

/// Index to write for the `position`-th (1-based) of `count` same-named siblings
pub fn sibling_index(position: usize, count: usize) -> Option<usize> {
    if count > 1 { Some(position) } else { None }
}

/// Builds the locator of `target` inside the tree rooted at `root`
///
/// Identity is by address: `target` must borrow from `root` itself, a
/// structurally equal copy is not found.
pub fn locator_of(target: NodeRef<'_>, root: &Element) -> Option<Locator> {
    let root_locator = Locator::root(&root.name);
    if target.same_node(&NodeRef::Element(root)) {
        return Some(root_locator);
    }

    let mut stack = vec![(root, root_locator)];
    while let Some((element, locator)) = stack.pop() {
        for attribute in &element.attributes {
            if target.same_node(&NodeRef::Attribute(attribute)) {
                return Some(locator.attribute(&attribute.name));
            }
        }

        let text_count = element
            .children
            .iter()
            .filter(|child| child.as_text().is_some())
            .count();
        let mut text_position = 0;
        for (child, position, count) in element_positions(element) {
            let child_locator = locator.child(&child.name, sibling_index(position, count));
            if target.same_node(&NodeRef::Element(child)) {
                return Some(child_locator);
            }
            stack.push((child, child_locator));
        }
        for child in &element.children {
            if let Node::Text(text) | Node::CData(text) = child {
                text_position += 1;
                if target.same_node(&NodeRef::Text(text)) {
                    return Some(locator.with_step(Step::Text {
                        index: sibling_index(text_position, text_count),
                    }));
                }
            }
        }
    }
    None
}

/// Child elements with their 1-based position among same-named siblings and
/// the size of that name group
pub fn element_positions(parent: &Element) -> Vec<(&Element, usize, usize)> {
    let mut totals: HashMap<&str, usize> = HashMap::new();
    for child in parent.child_elements() {
        *totals.entry(child.name.as_str()).or_default() += 1;
    }

    let mut seen: HashMap<&str, usize> = HashMap::new();
    parent
        .child_elements()
        .map(|child| {
            let position = seen.entry(child.name.as_str()).or_default();
            *position += 1;
            (child, *position, totals[child.name.as_str()])
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    /// `//`: zero or more element steps are skipped before the test applies
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NameTest {
    Any,
    Name(String),
}

impl NameTest {
    fn matches(&self, name: &str) -> bool {
        match self {
            NameTest::Any => true,
            NameTest::Name(expected) => expected == name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum StepTest {
    Element {
        name: NameTest,
        index: Option<usize>,
    },
    Attribute(NameTest),
    Text {
        index: Option<usize>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PatternStep {
    axis: Axis,
    test: StepTest,
}

impl PatternStep {
    fn matches(&self, step: &Step) -> bool {
        match (&self.test, step) {
            (StepTest::Element { name, index }, Step::Element { name: actual, .. }) => {
                name.matches(actual) && index.is_none_or(|index| index == step.position())
            }
            (StepTest::Attribute(name), Step::Attribute(actual)) => name.matches(actual),
            (StepTest::Text { index }, Step::Text { .. }) => {
                index.is_none_or(|index| index == step.position())
            }
            _ => false,
        }
    }
}

/// Path pattern used by tolerance rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    source: String,
    steps: Vec<PatternStep>,
}

impl PathPattern {
    pub fn parse(source: &str) -> Result<Self, ConfigurationError> {
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return Err(invalid(source, "path is empty"));
        }
        if !trimmed.starts_with('/') {
            return Err(invalid(source, "path must start with '/'"));
        }

        let mut steps = Vec::new();
        let mut rest = trimmed;
        while !rest.is_empty() {
            let axis = if let Some(tail) = rest.strip_prefix("//") {
                rest = tail;
                Axis::Descendant
            } else if let Some(tail) = rest.strip_prefix('/') {
                rest = tail;
                Axis::Child
            } else {
                return Err(invalid(source, "expected '/' between steps"));
            };

            let end = rest.find('/').unwrap_or(rest.len());
            let raw = &rest[..end];
            rest = &rest[end..];
            if raw.is_empty() {
                return Err(invalid(source, "empty step"));
            }
            if let Some(last) = steps.last()
                && matches!(
                    last,
                    PatternStep {
                        test: StepTest::Attribute(_) | StepTest::Text { .. },
                        ..
                    }
                )
            {
                return Err(invalid(source, "attribute and text() steps must come last"));
            }
            steps.push(PatternStep {
                axis,
                test: parse_step(source, raw)?,
            });
        }

        Ok(Self {
            source: trimmed.to_string(),
            steps,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// True if the pattern addresses `locator` or one of its ancestors
    pub fn matches_subtree(&self, locator: &Locator) -> bool {
        match_steps(&self.steps, &locator.steps, true)
    }

    /// True if the pattern addresses exactly `locator`
    pub fn matches_exact(&self, locator: &Locator) -> bool {
        match_steps(&self.steps, &locator.steps, false)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn match_steps(pattern: &[PatternStep], locator: &[Step], prefix: bool) -> bool {
    let Some((first, rest)) = pattern.split_first() else {
        return prefix || locator.is_empty();
    };
    match first.axis {
        Axis::Child => locator
            .split_first()
            .is_some_and(|(step, tail)| first.matches(step) && match_steps(rest, tail, prefix)),
        Axis::Descendant => (0..locator.len()).any(|skip| {
            let skipped_elements = locator[..skip]
                .iter()
                .all(|step| matches!(step, Step::Element { .. }));
            skipped_elements
                && first.matches(&locator[skip])
                && match_steps(rest, &locator[skip + 1..], prefix)
        }),
    }
}

fn parse_step(source: &str, raw: &str) -> Result<StepTest, ConfigurationError> {
    if let Some(name) = raw.strip_prefix('@') {
        return Ok(StepTest::Attribute(parse_name_test(source, name)?));
    }

    let (head, index) = match raw.find('[') {
        Some(open) => {
            let Some(inner) = raw[open + 1..].strip_suffix(']') else {
                return Err(invalid(source, "unterminated '[' in step"));
            };
            let index: usize = inner
                .trim()
                .parse()
                .map_err(|_| invalid(source, "step index must be a positive integer"))?;
            if index == 0 {
                return Err(invalid(source, "step indices are 1-based"));
            }
            (&raw[..open], Some(index))
        }
        None => (raw, None),
    };

    if head == "text()" {
        return Ok(StepTest::Text { index });
    }
    Ok(StepTest::Element {
        name: parse_name_test(source, head)?,
        index,
    })
}

fn parse_name_test(source: &str, name: &str) -> Result<NameTest, ConfigurationError> {
    if name == "*" {
        return Ok(NameTest::Any);
    }
    if is_qualified_name(name) {
        Ok(NameTest::Name(name.to_string()))
    } else {
        Err(invalid(source, &format!("'{}' is not a valid name", name)))
    }
}

/// Whether `name` is a (possibly prefixed) XML name
pub fn is_qualified_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
        && !name.ends_with(':')
}

fn invalid(path: &str, reason: &str) -> ConfigurationError {
    ConfigurationError::InvalidPathPattern {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}
