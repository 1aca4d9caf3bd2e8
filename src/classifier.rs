//! Diff records and the classifier that produces them from aligned trees

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};
use tracing::trace;

use crate::aligner::{Alignment, Side, TreeAligner};
use crate::error::{EvaluationError, EvaluationResult};
use crate::expression::normalize_space;
use crate::locator::Locator;
use crate::node::{Attribute, Element, Node};
use crate::settings::ComparisonSettings;

/// Kind of a single discrepancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    /// Same position, different value
    Different,
    /// Present in the expected document, absent in the actual one
    Missing,
    /// Present in the actual document, absent in the expected one
    Unexpected,
}

impl DiffKind {
    /// The kind seen from the other side of the comparison
    pub fn mirrored(self) -> Self {
        match self {
            DiffKind::Different => DiffKind::Different,
            DiffKind::Missing => DiffKind::Unexpected,
            DiffKind::Unexpected => DiffKind::Missing,
        }
    }
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiffKind::Different => "DIFFERENT",
            DiffKind::Missing => "MISSING",
            DiffKind::Unexpected => "UNEXPECTED",
        })
    }
}

impl FromStr for DiffKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "different" => Ok(DiffKind::Different),
            "missing" => Ok(DiffKind::Missing),
            "unexpected" => Ok(DiffKind::Unexpected),
            _ => Err(format!(
                "unknown diff kind '{}' (expected different, missing or unexpected)",
                s
            )),
        }
    }
}

/// What a diff compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectClassifier {
    Element,
    Attribute,
    AttributeValue,
    ElementText,
}

impl ObjectClassifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectClassifier::Element => "element",
            ObjectClassifier::Attribute => "attribute",
            ObjectClassifier::AttributeValue => "attribute value",
            ObjectClassifier::ElementText => "element text",
        }
    }
}

impl fmt::Display for ObjectClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ObjectClassifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Value on one side of a diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffValue {
    /// A detached attribute or text node
    Node(Node),
    /// Serialized form of an unpaired element subtree
    Markup(String),
    Text(String),
}

impl DiffValue {
    /// Renders an element subtree without copying it
    pub fn markup(element: &Element) -> Self {
        DiffValue::Markup(element.to_string())
    }
}

impl fmt::Display for DiffValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffValue::Node(node) => node.fmt(f),
            DiffValue::Markup(text) | DiffValue::Text(text) => f.write_str(text),
        }
    }
}

impl Serialize for DiffValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One discovered discrepancy
///
/// At least one locator is always set. MISSING diffs have no actual locator
/// and UNEXPECTED diffs have no expected locator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffDetail {
    pub kind: DiffKind,
    pub object_classifier: ObjectClassifier,
    pub locator_of_expected: Option<Locator>,
    pub locator_of_actual: Option<Locator>,
    pub expected_value: Option<DiffValue>,
    pub actual_value: Option<DiffValue>,
}

impl DiffDetail {
    pub fn different(
        object_classifier: ObjectClassifier,
        locator_of_expected: Locator,
        locator_of_actual: Locator,
        expected_value: DiffValue,
        actual_value: DiffValue,
    ) -> Self {
        Self {
            kind: DiffKind::Different,
            object_classifier,
            locator_of_expected: Some(locator_of_expected),
            locator_of_actual: Some(locator_of_actual),
            expected_value: Some(expected_value),
            actual_value: Some(actual_value),
        }
    }

    pub fn missing(object_classifier: ObjectClassifier, locator: Locator, value: DiffValue) -> Self {
        Self {
            kind: DiffKind::Missing,
            object_classifier,
            locator_of_expected: Some(locator),
            locator_of_actual: None,
            expected_value: Some(value),
            actual_value: None,
        }
    }

    pub fn unexpected(object_classifier: ObjectClassifier, locator: Locator, value: DiffValue) -> Self {
        Self {
            kind: DiffKind::Unexpected,
            object_classifier,
            locator_of_expected: None,
            locator_of_actual: Some(locator),
            expected_value: None,
            actual_value: Some(value),
        }
    }

    /// The expected locator if there is one, the actual one otherwise
    pub fn locator(&self) -> Option<&Locator> {
        self.locator_of_expected
            .as_ref()
            .or(self.locator_of_actual.as_ref())
    }

    /// The same diff as reported by a comparison with the sides swapped
    pub fn mirrored(&self) -> Self {
        Self {
            kind: self.kind.mirrored(),
            object_classifier: self.object_classifier,
            locator_of_expected: self.locator_of_actual.clone(),
            locator_of_actual: self.locator_of_expected.clone(),
            expected_value: self.actual_value.clone(),
            actual_value: self.expected_value.clone(),
        }
    }
}

impl fmt::Display for DiffDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.object_classifier)?;
        match (&self.locator_of_expected, &self.locator_of_actual) {
            (Some(expected), Some(actual)) if expected == actual => write!(f, " at {}", expected)?,
            (Some(expected), Some(actual)) => {
                write!(f, " at {} (actual {})", expected, actual)?
            }
            (Some(expected), None) => write!(f, " at {}", expected)?,
            (None, Some(actual)) => write!(f, " at {}", actual)?,
            (None, None) => {}
        }
        match (&self.expected_value, &self.actual_value) {
            (Some(expected), Some(actual)) => {
                write!(f, ": expected '{}' but was '{}'", expected, actual)
            }
            (Some(expected), None) => write!(f, ": expected {}", expected),
            (None, Some(actual)) => write!(f, ": unexpected {}", actual),
            (None, None) => Ok(()),
        }
    }
}

/// Receives diffs as the classifier discovers them
pub trait DiffSink {
    /// Returns false to stop the walk early
    fn record(&mut self, diff: DiffDetail) -> bool;
}

impl DiffSink for Vec<DiffDetail> {
    fn record(&mut self, diff: DiffDetail) -> bool {
        self.push(diff);
        true
    }
}

enum Halt {
    Stopped,
    Failed(EvaluationError),
}

type Walk = Result<(), Halt>;

/// Walks two trees top-down, emitting typed diffs for every aligned pair
pub struct DiffClassifier<'s> {
    settings: &'s ComparisonSettings,
}

impl<'s> DiffClassifier<'s> {
    pub fn new(settings: &'s ComparisonSettings) -> Self {
        Self { settings }
    }

    /// Classifies two whole documents, feeding every raw diff to `sink`
    ///
    /// Roots with different names are not compared further: the expected
    /// root is reported MISSING and the actual root UNEXPECTED.
    pub fn classify_documents(
        &self,
        expected: &Element,
        actual: &Element,
        sink: &mut dyn DiffSink,
    ) -> EvaluationResult<()> {
        let walk = if expected.name == actual.name {
            let aligner = TreeAligner::new(self.settings.key_expressions(), expected, actual);
            let locator = Locator::root(&expected.name);
            self.classify_pair(
                &aligner,
                &Side::new(expected, locator.clone()),
                &Side::new(actual, locator),
                1,
                sink,
            )
        } else {
            emit(
                sink,
                DiffDetail::missing(
                    ObjectClassifier::Element,
                    Locator::root(&expected.name),
                    DiffValue::markup(expected),
                ),
            )
            .and_then(|()| {
                emit(
                    sink,
                    DiffDetail::unexpected(
                        ObjectClassifier::Element,
                        Locator::root(&actual.name),
                        DiffValue::markup(actual),
                    ),
                )
            })
        };

        match walk {
            Ok(()) | Err(Halt::Stopped) => Ok(()),
            Err(Halt::Failed(error)) => Err(error),
        }
    }

    fn classify_pair(
        &self,
        aligner: &TreeAligner<'_, '_>,
        expected: &Side<'_>,
        actual: &Side<'_>,
        depth: usize,
        sink: &mut dyn DiffSink,
    ) -> Walk {
        let limit = self.settings.max_depth();
        if depth > limit {
            return Err(Halt::Failed(EvaluationError::DepthLimitExceeded {
                limit,
                locator: expected.locator.to_string(),
            }));
        }
        trace!(locator = %expected.locator, depth, "classifying element pair");

        self.classify_attributes(expected, actual, sink)?;
        self.classify_text(expected, actual, sink)?;

        for alignment in aligner.align_children(expected, actual) {
            match alignment {
                Alignment::Paired(expected_child, actual_child) => {
                    self.classify_pair(aligner, &expected_child, &actual_child, depth + 1, sink)?
                }
                Alignment::Missing(child) => emit(
                    sink,
                    DiffDetail::missing(
                        ObjectClassifier::Element,
                        child.locator,
                        DiffValue::markup(child.element),
                    ),
                )?,
                Alignment::Unexpected(child) => emit(
                    sink,
                    DiffDetail::unexpected(
                        ObjectClassifier::Element,
                        child.locator,
                        DiffValue::markup(child.element),
                    ),
                )?,
            }
        }
        Ok(())
    }

    fn classify_attributes(&self, expected: &Side<'_>, actual: &Side<'_>, sink: &mut dyn DiffSink) -> Walk {
        for alignment in TreeAligner::align_attributes(expected.element, actual.element) {
            let diff = match alignment {
                Alignment::Paired(expected_attribute, actual_attribute) => {
                    if expected_attribute.value == actual_attribute.value {
                        continue;
                    }
                    DiffDetail::different(
                        ObjectClassifier::AttributeValue,
                        expected.locator.attribute(&expected_attribute.name),
                        actual.locator.attribute(&actual_attribute.name),
                        DiffValue::Text(expected_attribute.value.clone()),
                        DiffValue::Text(actual_attribute.value.clone()),
                    )
                }
                Alignment::Missing(attribute) => DiffDetail::missing(
                    ObjectClassifier::Attribute,
                    expected.locator.attribute(&attribute.name),
                    attribute_value(attribute),
                ),
                Alignment::Unexpected(attribute) => DiffDetail::unexpected(
                    ObjectClassifier::Attribute,
                    actual.locator.attribute(&attribute.name),
                    attribute_value(attribute),
                ),
            };
            emit(sink, diff)?;
        }
        Ok(())
    }

    fn classify_text(&self, expected: &Side<'_>, actual: &Side<'_>, sink: &mut dyn DiffSink) -> Walk {
        let expected_text = expected.element.direct_text();
        let actual_text = actual.element.direct_text();
        let equal = if self.settings.whitespace_relevant() {
            expected_text == actual_text
        } else {
            normalize_space(&expected_text) == normalize_space(&actual_text)
        };
        if equal {
            return Ok(());
        }
        emit(
            sink,
            DiffDetail::different(
                ObjectClassifier::ElementText,
                expected.locator.text(),
                actual.locator.text(),
                DiffValue::Text(expected_text),
                DiffValue::Text(actual_text),
            ),
        )
    }
}

fn attribute_value(attribute: &Attribute) -> DiffValue {
    DiffValue::Node(Node::Attribute(attribute.clone()))
}

fn emit(sink: &mut dyn DiffSink, diff: DiffDetail) -> Walk {
    if sink.record(diff) {
        Ok(())
    } else {
        Err(Halt::Stopped)
    }
}
