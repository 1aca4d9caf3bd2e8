//! Per-level pairing of corresponding nodes between two trees
//!
//! Children are grouped by qualified name. A name with a registered key
//! expression is paired by key value (first-available matching in document
//! order); every other name is paired by position within its group.
//! Attributes are always paired by name.

use std::collections::{HashMap, VecDeque};

use tracing::{trace, warn};

use crate::expression::{DocumentScope, Expression};
use crate::locator::{Locator, element_positions, sibling_index};
use crate::node::{Attribute, Element};
use crate::settings::KeyExpressionIndex;

/// An element together with its locator in its own document
#[derive(Debug, Clone)]
pub struct Side<'a> {
    pub element: &'a Element,
    pub locator: Locator,
}

impl<'a> Side<'a> {
    pub fn new(element: &'a Element, locator: Locator) -> Self {
        Self { element, locator }
    }
}

/// Outcome of aligning one node
#[derive(Debug, Clone)]
pub enum Alignment<T> {
    /// Same logical node on both sides
    Paired(T, T),
    /// Only in the expected tree
    Missing(T),
    /// Only in the actual tree
    Unexpected(T),
}

pub struct TreeAligner<'k, 'a> {
    keys: &'k KeyExpressionIndex,
    expected_scope: DocumentScope<'a>,
    actual_scope: DocumentScope<'a>,
}

impl<'k, 'a> TreeAligner<'k, 'a> {
    /// Key expressions are evaluated with the given roots as their documents
    pub fn new(keys: &'k KeyExpressionIndex, expected_root: &'a Element, actual_root: &'a Element) -> Self {
        Self {
            keys,
            expected_scope: DocumentScope::new(expected_root),
            actual_scope: DocumentScope::new(actual_root),
        }
    }

    /// Pairs attributes by name: expected order first, then actual-only ones
    pub fn align_attributes<'e>(expected: &'e Element, actual: &'e Element) -> Vec<Alignment<&'e Attribute>> {
        let mut alignments: Vec<Alignment<&'e Attribute>> = expected
            .attributes
            .iter()
            .map(|attribute| {
                match actual.attributes.iter().find(|other| other.name == attribute.name) {
                    Some(other) => Alignment::Paired(attribute, other),
                    None => Alignment::Missing(attribute),
                }
            })
            .collect();
        alignments.extend(
            actual
                .attributes
                .iter()
                .filter(|attribute| expected.attribute(&attribute.name).is_none())
                .map(Alignment::Unexpected),
        );
        alignments
    }

    /// Pairs the child elements of two matched elements
    ///
    /// Pairs and MISSING children come in expected document order, followed
    /// by UNEXPECTED children in actual document order.
    pub fn align_children<'e>(&self, expected: &Side<'e>, actual: &Side<'e>) -> Vec<Alignment<Side<'e>>> {
        let expected_children = children_of(expected);
        let actual_children = children_of(actual);

        let mut groups: Vec<(&'e str, Vec<usize>)> = Vec::new();
        for (index, child) in expected_children.iter().enumerate() {
            let name = child.element.name.as_str();
            match groups.iter_mut().find(|(group, _)| *group == name) {
                Some((_, members)) => members.push(index),
                None => groups.push((name, vec![index])),
            }
        }
        let mut actual_groups: HashMap<&'e str, Vec<usize>> = HashMap::new();
        for (index, child) in actual_children.iter().enumerate() {
            actual_groups
                .entry(child.element.name.as_str())
                .or_default()
                .push(index);
        }

        let mut pairing = Pairing {
            partner: vec![None; expected_children.len()],
        };
        for (name, expected_group) in &groups {
            let Some(actual_group) = actual_groups.get(name) else {
                continue;
            };
            match self.keys.key_expression_for(name) {
                Some(expression) => self.pair_by_key(
                    expression,
                    (expected_children.as_slice(), expected_group.as_slice()),
                    (actual_children.as_slice(), actual_group.as_slice()),
                    &mut pairing,
                ),
                None => pairing.by_position(expected_group, actual_group),
            }
        }

        let mut actual_slots: Vec<Option<Side<'e>>> = actual_children.into_iter().map(Some).collect();
        let mut alignments = Vec::with_capacity(expected_children.len() + actual_slots.len());
        for (index, child) in expected_children.into_iter().enumerate() {
            let partner = pairing.partner[index].and_then(|other| actual_slots[other].take());
            alignments.push(match partner {
                Some(other) => Alignment::Paired(child, other),
                None => Alignment::Missing(child),
            });
        }
        alignments.extend(actual_slots.into_iter().flatten().map(Alignment::Unexpected));

        trace!(
            locator = %expected.locator,
            children = alignments.len(),
            "aligned child elements"
        );
        alignments
    }

    fn pair_by_key<'e>(
        &self,
        expression: &Expression,
        (expected_children, expected_group): (&[Side<'e>], &[usize]),
        (actual_children, actual_group): (&[Side<'e>], &[usize]),
        pairing: &mut Pairing,
    ) {
        // Actual instances per key, in document order
        let mut available: HashMap<String, VecDeque<usize>> = HashMap::new();
        let mut unkeyed_actual = Vec::new();
        for &index in actual_group {
            match key_of(expression, &self.actual_scope, &actual_children[index]) {
                Some(key) => available.entry(key).or_default().push_back(index),
                None => unkeyed_actual.push(index),
            }
        }

        let mut unkeyed_expected = Vec::new();
        for &index in expected_group {
            match key_of(expression, &self.expected_scope, &expected_children[index]) {
                Some(key) => {
                    if let Some(other) = available.get_mut(&key).and_then(VecDeque::pop_front) {
                        pairing.pair(index, other);
                    }
                }
                None => unkeyed_expected.push(index),
            }
        }

        // Instances whose key could not be computed fall back to positional
        // matching among themselves.
        pairing.by_position(&unkeyed_expected, &unkeyed_actual);
    }
}

struct Pairing {
    partner: Vec<Option<usize>>,
}

impl Pairing {
    fn pair(&mut self, expected: usize, actual: usize) {
        self.partner[expected] = Some(actual);
    }

    fn by_position(&mut self, expected: &[usize], actual: &[usize]) {
        for (&expected, &actual) in expected.iter().zip(actual) {
            self.pair(expected, actual);
        }
    }
}

fn children_of<'e>(parent: &Side<'e>) -> Vec<Side<'e>> {
    element_positions(parent.element)
        .into_iter()
        .map(|(child, position, count)| {
            let locator = parent.locator.child(&child.name, sibling_index(position, count));
            Side::new(child, locator)
        })
        .collect()
}

fn key_of(expression: &Expression, scope: &DocumentScope<'_>, side: &Side<'_>) -> Option<String> {
    match expression.evaluate_first(scope, side.element) {
        Ok(key) => Some(key),
        Err(error) => {
            warn!(
                locator = %side.locator,
                expression = expression.as_str(),
                %error,
                "key expression failed, matching this instance by position"
            );
            None
        }
    }
}
