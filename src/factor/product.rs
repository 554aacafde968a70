//! Nested factors.

use super::{positions_column, Factor};
use crate::column::Column;
use crate::frame::Dataframe;
use crate::value::{Key, Value};
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

impl Factor {
    /// Sparse cross product: one level per `(self, other)` level pair that
    /// occurs in some row, ordered by the pair.
    ///
    /// Every level records the level of `self` it lies in, both as
    /// [`Factor::parent_indices`] and as a [`Key::Parent`] column. Named
    /// level-data columns of both factors are carried over as views, the
    /// second factor's names disambiguated on collision.
    #[must_use]
    pub fn product(&self, other: &Factor) -> Self {
        let k = self.cardinality.max(other.cardinality) + 1;

        let mut observed: BTreeMap<usize, (usize, usize)> = BTreeMap::new();
        let combined: Vec<usize> = self
            .indices
            .iter()
            .zip(other.indices.iter())
            .map(|(&a, &b)| {
                let key = k * a + b;
                observed.entry(key).or_insert((a, b));
                key
            })
            .collect();

        let rank: HashMap<usize, usize> = observed
            .keys()
            .enumerate()
            .map(|(level, &key)| (key, level))
            .collect();
        let indices: Vec<usize> = combined.iter().map(|key| rank[key]).collect();
        let cardinality = observed.len();

        let coarse: Rc<[usize]> = observed.values().map(|&(a, _)| a).collect();
        let fine: Rc<[usize]> = observed.values().map(|&(_, b)| b).collect();

        let mut columns: IndexMap<Key, Column> = IndexMap::new();
        for (key, column) in self.data.columns() {
            if !key.is_reserved() {
                columns.insert(key.clone(), Column::proxy(column.clone(), Rc::clone(&coarse)));
            }
        }
        for (key, column) in other.data.columns() {
            if !key.is_reserved() {
                let key = key.clone().disambiguate(|k| columns.contains_key(k));
                columns.insert(key, Column::proxy(column.clone(), Rc::clone(&fine)));
            }
        }
        columns.insert(
            Key::Parent,
            Column::reference(coarse.iter().map(|&a| Value::Level(a)).collect::<Vec<_>>()),
        );
        columns.insert(Key::Positions, positions_column(cardinality, &indices));

        Self::from_parts(
            "product",
            cardinality,
            indices,
            Dataframe::of(columns),
            Some(coarse),
        )
    }

    /// Nest `finer` inside `self`. Same as [`Factor::product`].
    #[must_use]
    pub fn nest(&self, finer: &Factor) -> Self {
        self.product(finer)
    }
}
