//! Grouped folds.
//!
//! A [`Reducer`] accumulates one value per partition level by replaying a
//! source column through a [`Fold`]. The reducer holds no partition itself;
//! callers drive it with [`Reducer::initialize`] followed by one
//! [`Reducer::update`] per row, in ascending row order.
//!
//! # Example
//!
//! ```rust
//! use trueno_frame::column::Column;
//! use trueno_frame::reducer::Fold;
//! use trueno_frame::value::Value;
//!
//! let column = Column::numeric(vec![1.0, 2.0, 3.0, 4.0]);
//! let mut reducer = column.summarize(Fold::sum());
//!
//! reducer.initialize(2);
//! for (row, level) in [0, 1, 0, 1].into_iter().enumerate() {
//!     reducer.update(level, row);
//! }
//!
//! assert_eq!(reducer.values(), vec![Value::Number(4.0), Value::Number(6.0)]);
//! ```

use crate::column::{Column, ProxyColumn, ReducedColumn};
use crate::value::Value;
use std::fmt;
use std::rc::Rc;

/// Produces the starting accumulator of a level.
pub type InitialFn = Rc<dyn Fn() -> Value>;

/// Folds one source value into an accumulator.
pub type UpdateFn = Rc<dyn Fn(Value, &Value) -> Value>;

/// Maps a finished accumulator to the reported value.
pub type FinalizeFn = Rc<dyn Fn(&Value) -> Value>;

/// Initial-value and update pair of a grouped fold.
///
/// Cloning is cheap: both functions are reference counted, so a reduced
/// column can keep the fold that produced it.
#[derive(Clone)]
pub struct Fold {
    initial: InitialFn,
    update: UpdateFn,
}

impl fmt::Debug for Fold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fold").finish_non_exhaustive()
    }
}

impl Fold {
    /// Create a fold from an initial-value function and an update function.
    pub fn new(
        initial: impl Fn() -> Value + 'static,
        update: impl Fn(Value, &Value) -> Value + 'static,
    ) -> Self {
        Self {
            initial: Rc::new(initial),
            update: Rc::new(update),
        }
    }

    /// Fresh accumulator.
    #[must_use]
    pub fn initial(&self) -> Value {
        (self.initial)()
    }

    /// Fold `value` into `acc`.
    #[must_use]
    pub fn apply(&self, acc: Value, value: &Value) -> Value {
        (self.update)(acc, value)
    }

    /// Numeric sum.
    #[must_use]
    pub fn sum() -> Self {
        Self::new(zero, add)
    }

    /// Number of rows, whatever their value.
    #[must_use]
    pub fn count() -> Self {
        Self::new(zero, |acc, _| add(acc, &Value::Number(1.0)))
    }

    /// Numeric product.
    #[must_use]
    pub fn product() -> Self {
        Self::new(one, times)
    }

    /// Keep the longest string.
    #[must_use]
    pub fn longest() -> Self {
        Self::new(empty, longest)
    }

    /// Keep the `(key, payload)` tuple with the largest numeric key.
    ///
    /// Source values must be two-member tuples (e.g. from a composite
    /// column); ties keep the earlier row. Pair with [`payload`] as the
    /// finalizer to report only the payload.
    #[must_use]
    pub fn max_by_key() -> Self {
        Self::new(
            || Value::tuple([Value::Number(f64::NEG_INFINITY), Value::Null]),
            max_by_key,
        )
    }
}

/// Initial value `0`.
#[must_use]
pub fn zero() -> Value {
    Value::Number(0.0)
}

/// Initial value `1`.
#[must_use]
pub fn one() -> Value {
    Value::Number(1.0)
}

/// Initial value `""`.
#[must_use]
pub fn empty() -> Value {
    Value::from("")
}

/// Numeric addition. Non-numeric operands read as NaN.
#[must_use]
pub fn add(acc: Value, value: &Value) -> Value {
    Value::Number(number(&acc) + number(value))
}

/// Numeric multiplication. Non-numeric operands read as NaN.
#[must_use]
pub fn times(acc: Value, value: &Value) -> Value {
    Value::Number(number(&acc) * number(value))
}

/// Keep whichever string has more characters; ties keep `acc`.
#[must_use]
pub fn longest(acc: Value, value: &Value) -> Value {
    let current = acc.as_str().map_or(0, |s| s.chars().count());
    match value.as_str() {
        Some(s) if s.chars().count() > current => value.clone(),
        _ => acc,
    }
}

/// Keep the `(key, payload)` tuple with the strictly larger key.
#[must_use]
pub fn max_by_key(acc: Value, value: &Value) -> Value {
    let current = tuple_key(&acc).unwrap_or(f64::NEG_INFINITY);
    match tuple_key(value) {
        Some(key) if key > current => value.clone(),
        _ => acc,
    }
}

/// Second member of a `(key, payload)` tuple, or `Null`.
#[must_use]
pub fn payload(acc: &Value) -> Value {
    acc.as_tuple()
        .and_then(|t| t.get(1))
        .cloned()
        .unwrap_or_default()
}

fn number(value: &Value) -> f64 {
    value.as_f64().unwrap_or(f64::NAN)
}

fn tuple_key(value: &Value) -> Option<f64> {
    value.as_tuple().and_then(|t| t.first()).and_then(Value::as_f64)
}

/// Grouped fold over a source column.
#[derive(Clone)]
pub struct Reducer {
    source: Column,
    fold: Fold,
    finalize: Option<FinalizeFn>,
    accumulator: Vec<Value>,
}

impl fmt::Debug for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reducer")
            .field("source", &self.source.name())
            .field("finalize", &self.finalize.is_some())
            .field("cardinality", &self.accumulator.len())
            .finish()
    }
}

impl Reducer {
    /// Create a reducer over `source`.
    #[must_use]
    pub fn new(source: Column, fold: Fold) -> Self {
        Self {
            source,
            fold,
            finalize: None,
            accumulator: Vec::new(),
        }
    }

    /// Map every finished accumulator through `finalize` in [`Reducer::values`].
    #[must_use]
    pub fn with_finalize(mut self, finalize: impl Fn(&Value) -> Value + 'static) -> Self {
        self.finalize = Some(Rc::new(finalize));
        self
    }

    /// Column the reducer reads from.
    #[must_use]
    pub fn source(&self) -> &Column {
        &self.source
    }

    /// Fold applied per row.
    #[must_use]
    pub fn fold(&self) -> &Fold {
        &self.fold
    }

    /// Number of levels allocated by the last [`Reducer::initialize`].
    #[must_use]
    pub fn cardinality(&self) -> usize {
        self.accumulator.len()
    }

    /// Discard any previous state and allocate one fresh accumulator per level.
    pub fn initialize(&mut self, cardinality: usize) -> &mut Self {
        self.accumulator.clear();
        self.accumulator
            .extend((0..cardinality).map(|_| self.fold.initial()));
        self
    }

    /// Fold the source value at row `index` into the accumulator of `level`.
    ///
    /// Rows must be replayed in ascending order: non-commutative folds give
    /// different results otherwise.
    pub fn update(&mut self, level: usize, index: usize) -> &mut Self {
        let value = self.source.value_at(index);
        let acc = std::mem::take(&mut self.accumulator[level]);
        self.accumulator[level] = self.fold.apply(acc, &value);
        self
    }

    /// Raw accumulators, before finalizing.
    #[must_use]
    pub fn accumulator(&self) -> &[Value] {
        &self.accumulator
    }

    /// Per-level results, mapped through the finalizer when one is set.
    #[must_use]
    pub fn values(&self) -> Vec<Value> {
        match &self.finalize {
            Some(finalize) => self.accumulator.iter().map(|acc| finalize(acc)).collect(),
            None => self.accumulator.clone(),
        }
    }

    /// Wrap the current results as a reduced column, optionally linked to the
    /// same-named column of the parent partition.
    #[must_use]
    pub fn to_column(&self, parent: Option<ProxyColumn>) -> Column {
        let mut reduced = ReducedColumn::new(self.values(), self.fold.clone());
        if let Some(parent) = parent {
            reduced = reduced.with_parent(parent);
        }
        Column::from(reduced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_by_level() {
        let column = Column::numeric(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let mut reducer = column.summarize(Fold::sum());
        reducer.initialize(2);
        for (row, level) in [0, 0, 1, 1, 0].into_iter().enumerate() {
            reducer.update(level, row);
        }
        assert_eq!(reducer.values(), vec![Value::Number(8.0), Value::Number(7.0)]);
    }

    #[test]
    fn test_initialize_discards_state() {
        let column = Column::numeric(vec![10.0]);
        let mut reducer = column.summarize(Fold::sum());
        reducer.initialize(1).update(0, 0);
        assert_eq!(reducer.values(), vec![Value::Number(10.0)]);

        reducer.initialize(3);
        assert_eq!(reducer.cardinality(), 3);
        assert!(reducer.values().iter().all(|v| *v == Value::Number(0.0)));
    }

    #[test]
    fn test_count_ignores_values() {
        let column = Column::text(["a", "b", "c"]);
        let mut reducer = column.summarize(Fold::count());
        reducer.initialize(1);
        for row in 0..3 {
            reducer.update(0, row);
        }
        assert_eq!(reducer.values(), vec![Value::Number(3.0)]);
    }

    #[test]
    fn test_product() {
        let column = Column::numeric(vec![2.0, 3.0, 4.0]);
        let mut reducer = column.summarize(Fold::product());
        reducer.initialize(1);
        for row in 0..3 {
            reducer.update(0, row);
        }
        assert_eq!(reducer.values(), vec![Value::Number(24.0)]);
    }

    #[test]
    fn test_longest_keeps_first_on_tie() {
        let column = Column::text(["ab", "cd", "efg", "hij"]);
        let mut reducer = column.summarize(Fold::longest());
        reducer.initialize(1);
        for row in 0..4 {
            reducer.update(0, row);
        }
        assert_eq!(reducer.values(), vec![Value::from("efg")]);
    }

    #[test]
    fn test_max_by_key_with_finalize() {
        let keys = Column::numeric(vec![1.0, 3.0, 2.0]);
        let labels = Column::text(["x", "y", "z"]);
        let pairs = keys.merge(&labels);

        let mut reducer = pairs.summarize(Fold::max_by_key()).with_finalize(payload);
        reducer.initialize(1);
        for row in 0..3 {
            reducer.update(0, row);
        }
        assert_eq!(reducer.values(), vec![Value::from("y")]);
    }

    #[test]
    fn test_replay_order_matters_for_non_commutative_fold() {
        // "keep the latest value": only deterministic under ascending replay
        let column = Column::text(["first", "second"]);
        let fold = Fold::new(empty, |_, value| value.clone());

        let mut ascending = column.summarize(fold.clone());
        ascending.initialize(1).update(0, 0).update(0, 1);

        let mut descending = column.summarize(fold);
        descending.initialize(1).update(0, 1).update(0, 0);

        assert_eq!(ascending.values(), vec![Value::from("second")]);
        assert_ne!(ascending.values(), descending.values());
    }

    #[test]
    fn test_add_with_non_number_is_nan() {
        let v = add(Value::Number(1.0), &Value::Null);
        assert!(v.as_f64().is_some_and(f64::is_nan));
    }

    #[test]
    fn test_to_column_is_reduced() {
        let column = Column::numeric(vec![1.0, 2.0]);
        let mut reducer = column.summarize(Fold::sum());
        reducer.initialize(1).update(0, 0).update(0, 1);

        let reduced = reducer.to_column(None);
        assert!(reduced.as_reduced().is_some());
        assert_eq!(reduced.value_at(0), Value::Number(3.0));
        assert_eq!(reduced.n(), Some(1));
    }
}
