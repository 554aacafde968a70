//! Reducer output columns and stacking.

use super::ProxyColumn;
use crate::metadata::Metadata;
use crate::reducer::Fold;
use crate::value::Value;
use std::rc::Rc;

/// Per-level values produced by a reducer.
///
/// Keeps the fold that produced it and, inside a nested partition, a proxy
/// over the parent partition's same-named column indexed by each level's
/// parent level. That link is what [`ReducedColumn::stack`] and
/// [`ReducedColumn::rescale_to_parent`] work from; without it both are
/// silent no-ops.
#[derive(Debug, Clone)]
pub struct ReducedColumn {
    values: Rc<[Value]>,
    original: Rc<[Value]>,
    metadata: Metadata,
    fold: Fold,
    parent: Option<ProxyColumn>,
    stacked: bool,
    relative: bool,
}

impl ReducedColumn {
    /// Wrap per-level `values` produced by `fold`.
    #[must_use]
    pub fn new(values: Vec<Value>, fold: Fold) -> Self {
        let metadata = Metadata::infer(&values);
        let values: Rc<[Value]> = values.into();
        Self {
            original: Rc::clone(&values),
            values,
            metadata,
            fold,
            parent: None,
            stacked: false,
            relative: false,
        }
    }

    /// Link to the parent partition's column.
    #[must_use]
    pub fn with_parent(mut self, parent: ProxyColumn) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Parent link, if set.
    #[must_use]
    pub fn parent(&self) -> Option<&ProxyColumn> {
        self.parent.as_ref()
    }

    /// Fold that produced the values.
    #[must_use]
    pub fn fold(&self) -> &Fold {
        &self.fold
    }

    /// Number of levels.
    #[must_use]
    pub fn n(&self) -> usize {
        self.values.len()
    }

    /// Current value of `level`.
    #[must_use]
    pub fn value_at(&self, level: usize) -> Value {
        self.values[level].clone()
    }

    /// Current values.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Values as the reducer produced them, before any stacking.
    #[must_use]
    pub fn original(&self) -> &[Value] {
        &self.original
    }

    /// Metadata of the current values.
    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Mutable metadata.
    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    /// Whether [`ReducedColumn::stack`] has replaced the values.
    #[must_use]
    pub fn is_stacked(&self) -> bool {
        self.stacked
    }

    /// Replace each level's value by the running fold of all levels up to and
    /// including it that share its parent level, walking levels in order.
    ///
    /// The fold restarts from the pre-stack values on every call, so stacking
    /// twice gives the same result as stacking once. The numeric upper bound
    /// is raised to the parent's so values stay comparable across the parent
    /// scale. No-op without a parent link.
    pub fn stack(&mut self) -> &mut Self {
        let Some(parent) = self.parent.clone() else {
            return self;
        };

        if let (Some(meta), Metadata::Numeric(parent_meta)) =
            (self.metadata.as_numeric_mut(), parent.metadata())
        {
            meta.set_max(parent_meta.max);
        }

        let slots = parent.indices().iter().max().map_or(0, |&max| max + 1);
        let mut running: Vec<Value> = (0..slots).map(|_| self.fold.initial()).collect();

        let stacked: Vec<Value> = self
            .original
            .iter()
            .enumerate()
            .map(|(level, value)| {
                let slot = parent.indices()[level];
                let acc = std::mem::take(&mut running[slot]);
                running[slot] = self.fold.apply(acc, value);
                running[slot].clone()
            })
            .collect();

        self.values = stacked.into();
        self.stacked = true;
        self
    }

    /// Report values relative to the parent level's value in
    /// [`ReducedColumn::scaled_at`]. No-op without a parent link.
    pub fn rescale_to_parent(&mut self) -> &mut Self {
        if self.parent.is_some() {
            self.relative = true;
        }
        self
    }

    /// Whether values are reported relative to the parent.
    #[must_use]
    pub fn is_relative(&self) -> bool {
        self.relative
    }

    /// Value of `level` in display scale: `value / parent value` when rescaled
    /// to the parent and both are non-zero numbers, the plain value otherwise.
    #[must_use]
    pub fn scaled_at(&self, level: usize) -> Value {
        let value = self.value_at(level);
        let Some(parent) = self.parent.as_ref().filter(|_| self.relative) else {
            return value;
        };

        match (value.as_f64(), parent.value_at(level).as_f64()) {
            (Some(v), Some(p)) if p != 0.0 => Value::Number(v / p),
            _ => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Column;

    fn numbers(values: &[f64]) -> Vec<Value> {
        values.iter().copied().map(Value::Number).collect()
    }

    fn parent_totals() -> ProxyColumn {
        // two parent levels with totals 10 and 5; fine levels 0,1 -> 0 and 2 -> 1
        let parent = ReducedColumn::new(numbers(&[10.0, 5.0]), Fold::sum());
        ProxyColumn::new(Column::from(parent), vec![0, 0, 1])
    }

    #[test]
    fn test_stack_without_parent_is_noop() {
        let mut col = ReducedColumn::new(numbers(&[1.0, 2.0]), Fold::sum());
        col.stack();
        assert_eq!(col.values(), numbers(&[1.0, 2.0]).as_slice());
        assert!(!col.is_stacked());
    }

    #[test]
    fn test_stack_within_parent() {
        let mut col = ReducedColumn::new(numbers(&[4.0, 6.0, 5.0]), Fold::sum())
            .with_parent(parent_totals());
        col.stack();
        assert_eq!(col.values(), numbers(&[4.0, 10.0, 5.0]).as_slice());
        assert_eq!(col.original(), numbers(&[4.0, 6.0, 5.0]).as_slice());
        assert_eq!(col.metadata().as_numeric().map(|m| m.max), Some(10.0));
    }

    #[test]
    fn test_stack_twice_does_not_double_accumulate() {
        let mut col = ReducedColumn::new(numbers(&[4.0, 6.0, 5.0]), Fold::sum())
            .with_parent(parent_totals());
        col.stack();
        let once = col.values().to_vec();
        col.stack();
        assert_eq!(col.values(), once.as_slice());
    }

    #[test]
    fn test_stack_does_not_touch_clones() {
        let col = ReducedColumn::new(numbers(&[4.0, 6.0, 5.0]), Fold::sum())
            .with_parent(parent_totals());
        let mut stacked = col.clone();
        stacked.stack();
        assert_eq!(col.values(), numbers(&[4.0, 6.0, 5.0]).as_slice());
    }

    #[test]
    fn test_rescale_to_parent() {
        let mut col = ReducedColumn::new(numbers(&[4.0, 6.0, 5.0]), Fold::sum())
            .with_parent(parent_totals());
        assert_eq!(col.scaled_at(0), Value::Number(4.0));

        col.rescale_to_parent();
        assert!(col.is_relative());
        assert_eq!(col.scaled_at(0), Value::Number(0.4));
        assert_eq!(col.scaled_at(2), Value::Number(1.0));
    }

    #[test]
    fn test_rescale_without_parent_is_noop() {
        let mut col = ReducedColumn::new(numbers(&[4.0]), Fold::sum());
        col.rescale_to_parent();
        assert!(!col.is_relative());
        assert_eq!(col.scaled_at(0), Value::Number(4.0));
    }

    #[test]
    fn test_text_values_get_text_metadata() {
        let col = ReducedColumn::new(vec![Value::from("b"), Value::from("a")], Fold::longest());
        assert!(col.metadata().as_text().is_some());
    }
}
