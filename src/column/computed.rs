//! Columns without backing storage.

use crate::value::Value;
use std::fmt;
use std::rc::Rc;

/// Column whose values are produced by a pure function of the row index.
#[derive(Clone)]
pub struct ComputedColumn {
    n: usize,
    f: Rc<dyn Fn(usize) -> Value>,
}

impl fmt::Debug for ComputedColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComputedColumn").field("n", &self.n).finish_non_exhaustive()
    }
}

impl ComputedColumn {
    /// Create a column of `n` values computed by `f`.
    pub fn new(n: usize, f: impl Fn(usize) -> Value + 'static) -> Self {
        Self { n, f: Rc::new(f) }
    }

    /// Number of values.
    #[must_use]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Evaluate the function at `i`.
    #[must_use]
    pub fn value_at(&self, i: usize) -> Value {
        (self.f)(i)
    }
}
