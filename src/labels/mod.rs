//! Label sets, the label universe, and per-file label matrices.

pub mod parser;

use serde::Serialize;
use std::collections::BTreeSet;
use std::ops::Range;

pub use parser::{parse_record, read_label_file};

/// Set of label indices assigned to one instance.
///
/// Backed by a `BTreeSet`, so duplicates collapse and iteration is always in
/// sorted (canonical) order. Equality is set equality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct LabelSet(BTreeSet<usize>);

impl LabelSet {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn insert(&mut self, label: usize) -> bool {
        self.0.insert(label)
    }

    pub fn contains(&self, label: usize) -> bool {
        self.0.contains(&label)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    /// Largest label index in the set, if any.
    pub fn max_label(&self) -> Option<usize> {
        self.0.iter().next_back().copied()
    }

    pub fn intersection_len(&self, other: &LabelSet) -> usize {
        self.0.intersection(&other.0).count()
    }

    pub fn union_len(&self, other: &LabelSet) -> usize {
        self.len() + other.len() - self.intersection_len(other)
    }

    /// Size of the symmetric difference (labels in exactly one of the two sets).
    pub fn symmetric_difference_len(&self, other: &LabelSet) -> usize {
        self.union_len(other) - self.intersection_len(other)
    }
}

impl FromIterator<usize> for LabelSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[usize; N]> for LabelSet {
    fn from(labels: [usize; N]) -> Self {
        labels.into_iter().collect()
    }
}

/// The contiguous label range `[0, width)` of one evaluation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LabelUniverse {
    width: usize,
}

impl LabelUniverse {
    pub fn new(width: usize) -> Self {
        Self { width }
    }

    pub fn len(&self) -> usize {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0
    }

    pub fn contains(&self, label: usize) -> bool {
        label < self.width
    }

    pub fn labels(&self) -> Range<usize> {
        0..self.width
    }
}

/// All label sets read from one file, index-aligned by instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMatrix {
    universe: LabelUniverse,
    rows: Vec<LabelSet>,
}

impl LabelMatrix {
    pub fn new(universe: LabelUniverse, rows: Vec<LabelSet>) -> Self {
        Self { universe, rows }
    }

    pub fn universe(&self) -> LabelUniverse {
        self.universe
    }

    pub fn rows(&self) -> &[LabelSet] {
        &self.rows
    }

    /// Number of instances.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
