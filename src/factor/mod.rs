//! Partitions of row-index space.
//!
//! A [`Factor`] assigns every row a level in `0..cardinality` and carries a
//! level-space [`Dataframe`] describing the levels (labels, bin edges, the
//! rows each level covers). Factors are rebuilt from scratch whenever their
//! input changes.
//!
//! # Construction
//!
//! - [`Factor::mono`]: one level holding every row, the root of a chain
//! - [`Factor::from_labels`]: one level per distinct string, alphanumerically sorted
//! - [`Factor::bin`]: numeric binning with unused bins pruned
//! - [`Factor::product`]: sparse cross product of two factors
//! - [`Factor::assigned`]: an externally computed row-to-level assignment
//!
//! # Example
//!
//! ```rust
//! use trueno_frame::factor::Factor;
//!
//! let cyl = Factor::from_labels(&["6", "4", "8", "4"]);
//! let drv = Factor::from_labels(&["f", "f", "r", "4"]);
//! let nested = cyl.product(&drv);
//!
//! assert_eq!(cyl.cardinality(), 3);
//! assert_eq!(nested.cardinality(), 4);
//! assert_eq!(nested.parent_indices(), Some(&[0, 0, 1, 2][..]));
//! ```

mod bin;
mod level;
mod product;

pub use bin::{breaks, BinOptions, MAX_BINS};

use crate::column::Column;
use crate::error::{Error, Result};
use crate::frame::Dataframe;
use crate::value::{Key, Value};
use std::collections::BTreeSet;
use std::rc::Rc;
use tracing::trace;

/// A partition of rows into dense levels.
#[derive(Debug, Clone)]
pub struct Factor {
    cardinality: usize,
    indices: Rc<[usize]>,
    data: Dataframe,
    parent_indices: Option<Rc<[usize]>>,
}

impl Factor {
    fn from_parts(
        kind: &'static str,
        cardinality: usize,
        indices: impl Into<Rc<[usize]>>,
        data: Dataframe,
        parent_indices: Option<Rc<[usize]>>,
    ) -> Self {
        let indices = indices.into();
        trace!(kind, cardinality, rows = indices.len(), "built factor");
        Self {
            cardinality,
            indices,
            data,
            parent_indices,
        }
    }

    /// One level covering all `n` rows.
    #[must_use]
    pub fn mono(n: usize) -> Self {
        let data = Dataframe::of([(Key::Positions, Column::reference(vec![Value::positions(0..n)]))]);
        Self::from_parts("mono", 1, vec![0; n], data, None)
    }

    /// Wrap an externally computed assignment of rows to levels, e.g. the
    /// selection groups of an interactive marker.
    pub fn assigned(cardinality: usize, indices: impl Into<Rc<[usize]>>) -> Result<Self> {
        let indices = indices.into();
        if let Some(&level) = indices.iter().find(|&&level| level >= cardinality) {
            return Err(Error::LevelOutOfRange { level, cardinality });
        }

        let data = Dataframe::of([(Key::Positions, positions_column(cardinality, &indices))]);
        Ok(Self::from_parts("assigned", cardinality, indices, data, None))
    }

    /// Attach caller-supplied level descriptors. `data` must have one row per
    /// level; its named columns are appended to the level data.
    pub fn with_level_data(mut self, data: &Dataframe) -> Result<Self> {
        if let Ok(found) = data.n() {
            if found != self.cardinality {
                return Err(Error::LengthMismatch {
                    column: "level data".to_string(),
                    expected: self.cardinality,
                    found,
                });
            }
        }
        self.data = self.data.merge(data);
        Ok(self)
    }

    /// Number of levels.
    #[must_use]
    pub fn cardinality(&self) -> usize {
        self.cardinality
    }

    /// Level of every row.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Level-space dataframe describing the levels.
    #[must_use]
    pub fn data(&self) -> &Dataframe {
        &self.data
    }

    /// Coarser level of every level, for nested factors.
    #[must_use]
    pub fn parent_indices(&self) -> Option<&[usize]> {
        self.parent_indices.as_deref()
    }

    pub(crate) fn parent_link(&self) -> Option<Rc<[usize]>> {
        self.parent_indices.clone()
    }

    /// Rows covered by `level`.
    #[must_use]
    pub fn positions(&self, level: usize) -> Option<Rc<BTreeSet<usize>>> {
        let column = self.data.col(Key::Positions)?;
        if level >= column.n()? {
            return None;
        }
        match column.value_at(level) {
            Value::Positions(rows) => Some(rows),
            _ => None,
        }
    }
}

/// Reference column holding, per level, the set of rows assigned to it.
pub(crate) fn positions_column(cardinality: usize, indices: &[usize]) -> Column {
    let mut positions = vec![BTreeSet::new(); cardinality];
    for (row, &level) in indices.iter().enumerate() {
        positions[level].insert(row);
    }
    Column::reference(
        positions
            .into_iter()
            .map(|rows| Value::Positions(Rc::new(rows)))
            .collect::<Vec<_>>(),
    )
}
