//! Running descriptive state of a column.
//!
//! Numeric columns track their extent, text columns their distinct values.
//! Both are computed once when the column is built and can be updated
//! incrementally or reset afterwards.

use crate::collate::compare_alphanumeric;
use crate::value::Value;
use std::rc::Rc;

/// Extent of a numeric column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericMetadata {
    /// Smallest value seen.
    pub min: f64,
    /// Largest value seen.
    pub max: f64,
}

impl Default for NumericMetadata {
    fn default() -> Self {
        Self::empty_extent()
    }
}

impl NumericMetadata {
    /// Create from explicit bounds.
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// The `{+inf, -inf}` extent of a column with no values.
    #[must_use]
    pub fn empty_extent() -> Self {
        Self::new(f64::INFINITY, f64::NEG_INFINITY)
    }

    /// Compute the extent of `values` in one pass. NaN values are skipped.
    #[must_use]
    pub fn from_values(values: &[f64]) -> Self {
        let mut meta = Self::empty_extent();
        for &v in values {
            meta.update(v);
        }
        meta
    }

    /// Widen the extent to include `value`.
    pub fn update(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// Override the lower bound.
    pub fn set_min(&mut self, value: f64) -> &mut Self {
        self.min = value;
        self
    }

    /// Override the upper bound.
    pub fn set_max(&mut self, value: f64) -> &mut Self {
        self.max = value;
        self
    }

    /// Reset to the empty extent.
    pub fn empty(&mut self) {
        *self = Self::empty_extent();
    }

    /// Check whether no value has been seen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// Width of the extent (`max - min`).
    #[must_use]
    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

/// Distinct values of a text column.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMetadata {
    values: Vec<Rc<str>>,
    sorted: bool,
}

impl Default for TextMetadata {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            sorted: true,
        }
    }
}

impl TextMetadata {
    /// Collect the distinct values of `values`, sorted alphanumerically.
    #[must_use]
    pub fn from_values(values: &[Rc<str>]) -> Self {
        let mut meta = Self::default();
        let mut distinct: Vec<Rc<str>> = values.to_vec();
        distinct.sort_by(|a, b| compare_alphanumeric(a, b));
        distinct.dedup();
        meta.values = distinct;
        meta
    }

    /// Keep distinct values in first-seen order instead of sorting them.
    #[must_use]
    pub fn unsorted(mut self) -> Self {
        self.sorted = false;
        self
    }

    /// Distinct values seen so far.
    #[must_use]
    pub fn values(&self) -> &[Rc<str>] {
        &self.values
    }

    /// Record `value` if it has not been seen yet.
    pub fn update(&mut self, value: &str) {
        if self.sorted {
            if let Err(at) = self.values.binary_search_by(|v| compare_alphanumeric(v, value)) {
                self.values.insert(at, Rc::from(value));
            }
        } else if !self.values.iter().any(|v| &**v == value) {
            self.values.push(Rc::from(value));
        }
    }

    /// Forget every value.
    pub fn empty(&mut self) {
        self.values.clear();
    }
}

/// Descriptive metadata of any column.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Metadata {
    /// Numeric extent.
    Numeric(NumericMetadata),
    /// Distinct text values.
    Text(TextMetadata),
    /// Nothing tracked (constant, composite, reference columns).
    #[default]
    Empty,
}

impl Metadata {
    /// Infer metadata from materialized values: all numbers give an extent,
    /// all text gives a distinct set, anything else (or no values) is empty.
    #[must_use]
    pub fn infer(values: &[Value]) -> Self {
        if values.is_empty() {
            return Metadata::Empty;
        }

        if values.iter().all(|v| matches!(v, Value::Number(_))) {
            let mut meta = NumericMetadata::empty_extent();
            for v in values.iter().filter_map(Value::as_f64) {
                meta.update(v);
            }
            return Metadata::Numeric(meta);
        }

        if values.iter().all(|v| matches!(v, Value::Text(_))) {
            let texts: Vec<Rc<str>> = values
                .iter()
                .filter_map(|v| match v {
                    Value::Text(s) => Some(Rc::clone(s)),
                    _ => None,
                })
                .collect();
            return Metadata::Text(TextMetadata::from_values(&texts));
        }

        Metadata::Empty
    }

    /// Fold one more value into the metadata. Values of the wrong kind are ignored.
    pub fn update(&mut self, value: &Value) {
        match (self, value) {
            (Metadata::Numeric(meta), Value::Number(n)) => meta.update(*n),
            (Metadata::Text(meta), Value::Text(s)) => meta.update(s),
            _ => {}
        }
    }

    /// Reset to the empty state of the same kind.
    pub fn empty(&mut self) {
        match self {
            Metadata::Numeric(meta) => meta.empty(),
            Metadata::Text(meta) => meta.empty(),
            Metadata::Empty => {}
        }
    }

    /// Numeric extent, if this is numeric metadata.
    #[must_use]
    pub fn as_numeric(&self) -> Option<&NumericMetadata> {
        match self {
            Metadata::Numeric(meta) => Some(meta),
            _ => None,
        }
    }

    /// Mutable numeric extent, if this is numeric metadata.
    pub fn as_numeric_mut(&mut self) -> Option<&mut NumericMetadata> {
        match self {
            Metadata::Numeric(meta) => Some(meta),
            _ => None,
        }
    }

    /// Distinct text values, if this is text metadata.
    #[must_use]
    pub fn as_text(&self) -> Option<&TextMetadata> {
        match self {
            Metadata::Text(meta) => Some(meta),
            _ => None,
        }
    }
}
