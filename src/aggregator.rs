//! Tolerance filtering and the comparison entry points

use serde::ser::{Serialize, SerializeStruct, Serializer};
use tracing::{debug, trace};

use crate::classifier::{DiffClassifier, DiffDetail, DiffKind, DiffSink};
use crate::error::EvaluationResult;
use crate::node::Element;
use crate::settings::ComparisonSettings;

/// Diffs surviving tolerance filtering, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateDiff {
    details: Vec<DiffDetail>,
    tolerated: usize,
}

impl AggregateDiff {
    /// True iff no diff survived
    pub fn is_equal(&self) -> bool {
        self.details.is_empty()
    }

    pub fn len(&self) -> usize {
        self.details.len()
    }

    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }

    pub fn details(&self) -> &[DiffDetail] {
        &self.details
    }

    pub fn into_details(self) -> Vec<DiffDetail> {
        self.details
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DiffDetail> {
        self.details.iter()
    }

    /// Number of raw diffs suppressed by tolerance rules
    pub fn tolerated(&self) -> usize {
        self.tolerated
    }

    pub fn of_kind(&self, kind: DiffKind) -> impl Iterator<Item = &DiffDetail> {
        self.details.iter().filter(move |detail| detail.kind == kind)
    }
}

impl Serialize for AggregateDiff {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut report = serializer.serialize_struct("AggregateDiff", 3)?;
        report.serialize_field("equal", &self.is_equal())?;
        report.serialize_field("tolerated", &self.tolerated)?;
        report.serialize_field("details", &self.details)?;
        report.end()
    }
}

impl<'a> IntoIterator for &'a AggregateDiff {
    type Item = &'a DiffDetail;
    type IntoIter = std::slice::Iter<'a, DiffDetail>;

    fn into_iter(self) -> Self::IntoIter {
        self.details.iter()
    }
}

/// Compares two documents and returns every diff no tolerance rule suppresses
///
/// Differing documents are a normal result. The only error is the nesting
/// depth guard of `settings`.
pub fn compare(
    expected: &Element,
    actual: &Element,
    settings: &ComparisonSettings,
) -> EvaluationResult<AggregateDiff> {
    debug!(
        expected = %expected.name,
        actual = %actual.name,
        rules = settings.tolerance_rules().len(),
        keys = settings.key_expressions().len(),
        "Comparing documents"
    );

    let mut collector = Collector {
        settings,
        details: Vec::new(),
        tolerated: 0,
    };
    DiffClassifier::new(settings).classify_documents(expected, actual, &mut collector)?;

    let result = AggregateDiff {
        details: collector.details,
        tolerated: collector.tolerated,
    };
    debug!(
        differences = result.len(),
        tolerated = result.tolerated,
        "Comparison finished"
    );
    Ok(result)
}

/// Same answer as `compare(..).is_equal()`, stopping at the first surviving diff
pub fn is_equal(
    expected: &Element,
    actual: &Element,
    settings: &ComparisonSettings,
) -> EvaluationResult<bool> {
    let mut sink = FirstSurvivor {
        settings,
        found: false,
    };
    DiffClassifier::new(settings).classify_documents(expected, actual, &mut sink)?;
    debug!(equal = !sink.found, "Equality check finished");
    Ok(!sink.found)
}

struct Collector<'s> {
    settings: &'s ComparisonSettings,
    details: Vec<DiffDetail>,
    tolerated: usize,
}

impl DiffSink for Collector<'_> {
    fn record(&mut self, diff: DiffDetail) -> bool {
        if self.settings.is_tolerated(&diff) {
            trace!(diff = %diff, "Tolerated");
            self.tolerated += 1;
        } else {
            self.details.push(diff);
        }
        true
    }
}

struct FirstSurvivor<'s> {
    settings: &'s ComparisonSettings,
    found: bool,
}

impl DiffSink for FirstSurvivor<'_> {
    fn record(&mut self, diff: DiffDetail) -> bool {
        if self.settings.is_tolerated(&diff) {
            return true;
        }
        self.found = true;
        false
    }
}
