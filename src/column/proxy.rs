//! Index-remapped views.

use super::Column;
use crate::metadata::Metadata;
use crate::value::Value;
use std::rc::Rc;

/// Zero-copy view reading a base column through an index sequence.
///
/// `value_at(i)` is `base.value_at(indices[i])`. Proxies over proxies chain.
#[derive(Debug, Clone)]
pub struct ProxyColumn {
    base: Rc<Column>,
    indices: Rc<[usize]>,
}

impl ProxyColumn {
    /// Create a view of `base` at `indices`.
    #[must_use]
    pub fn new(base: impl Into<Rc<Column>>, indices: impl Into<Rc<[usize]>>) -> Self {
        Self {
            base: base.into(),
            indices: indices.into(),
        }
    }

    /// The viewed column.
    #[must_use]
    pub fn base(&self) -> &Column {
        &self.base
    }

    /// Remapping sequence.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Number of remapped positions.
    #[must_use]
    pub fn n(&self) -> usize {
        self.indices.len()
    }

    /// Base value at `indices[i]`.
    #[must_use]
    pub fn value_at(&self, i: usize) -> Value {
        self.base.value_at(self.indices[i])
    }

    /// Materialize all remapped values.
    #[must_use]
    pub fn values(&self) -> Vec<Value> {
        (0..self.n()).map(|i| self.value_at(i)).collect()
    }

    /// Metadata of the base column.
    #[must_use]
    pub fn metadata(&self) -> Metadata {
        self.base.metadata()
    }
}
