//! Lazy partition evaluation.
//!
//! A [`Partitioner`] binds a frame, a factor and optionally the partitioner
//! of the next coarser factor. Nothing happens until
//! [`Partitioner::evaluate`] is called; every call re-reads the factor and
//! re-runs all reducers, so an outer reactive layer can call it again
//! whenever the factor's input changes.
//!
//! Partitioned frames refer to their parent by [`PartitionKey`] rather than
//! by pointer. The parent link of a reduced column is a view over a snapshot
//! of the parent's column taken during the same evaluation.

use super::Dataframe;
use crate::column::ProxyColumn;
use crate::error::{Error, Result};
use crate::factor::Factor;
use indexmap::IndexMap;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, instrument};

/// Identity of one evaluated partition: its depth in the chain and the
/// evaluation count of its partitioner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartitionKey {
    /// 0 for the coarsest factor of a chain.
    pub depth: usize,
    /// 1 for the first evaluation, incremented on every re-evaluation.
    pub generation: u64,
}

/// Where a partitioner gets its factor from on each evaluation.
#[derive(Clone)]
pub struct FactorSource(Rc<dyn Fn() -> Factor>);

impl FactorSource {
    /// Rebuild the factor by calling `f` on every evaluation.
    pub fn new(f: impl Fn() -> Factor + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Current factor.
    #[must_use]
    pub fn get(&self) -> Factor {
        (self.0)()
    }
}

impl From<Factor> for FactorSource {
    fn from(factor: Factor) -> Self {
        Self::new(move || factor.clone())
    }
}

impl fmt::Debug for FactorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FactorSource(..)")
    }
}

/// Deferred evaluation of a frame's reducers over one factor.
#[derive(Debug, Clone)]
pub struct Partitioner {
    frame: Rc<Dataframe>,
    factor: FactorSource,
    parent: Option<Rc<Partitioner>>,
    depth: usize,
    generation: Rc<Cell<u64>>,
}

impl Partitioner {
    fn new(frame: Rc<Dataframe>, factor: FactorSource, parent: Option<&Partitioner>) -> Self {
        Self {
            frame,
            factor,
            depth: parent.map_or(0, |p| p.depth + 1),
            parent: parent.map(|p| Rc::new(p.clone())),
            generation: Rc::new(Cell::new(0)),
        }
    }

    /// Position in the chain, 0 for the coarsest.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Partitioner of the next coarser factor.
    #[must_use]
    pub fn parent(&self) -> Option<&Partitioner> {
        self.parent.as_deref()
    }

    /// Number of completed evaluations.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    /// Fold every row into every reducer and return the level-space frame.
    ///
    /// Reducers are re-initialized to the factor's cardinality and fed rows
    /// `0..n` in ascending order. Each result becomes a reduced column named
    /// after its reducer key; when both this factor has parent indices and a
    /// parent partitioner exists, the column is linked to the parent
    /// partition's same-named column. The factor's level data is merged in
    /// after the reduced columns.
    ///
    /// # Errors
    ///
    /// Fails when the frame has no row count, when the factor covers fewer
    /// rows than the frame, or when evaluating the parent fails.
    #[instrument(skip(self), fields(depth = self.depth))]
    pub fn evaluate(&self) -> Result<Dataframe> {
        let factor = self.factor.get();
        let parent = self.parent.as_ref().map(|p| p.evaluate()).transpose()?;
        let link = factor.parent_link();

        let n = self.frame.n()?;
        let indices = factor.indices().get(..n).ok_or_else(|| Error::LengthMismatch {
            column: "factor".to_string(),
            expected: n,
            found: factor.indices().len(),
        })?;

        let mut columns = IndexMap::with_capacity(self.frame.reducers().len());
        for (key, reducer) in self.frame.reducers() {
            let mut reducer = reducer.clone();
            reducer.initialize(factor.cardinality());
            for (row, &level) in indices.iter().enumerate() {
                reducer.update(level, row);
            }

            let parent_column = match (&parent, &link) {
                (Some(parent), Some(link)) => parent
                    .col(key)
                    .map(|column| ProxyColumn::new(column.clone(), Rc::clone(link))),
                _ => None,
            };

            let mut column = reducer.to_column(parent_column);
            if let Some(name) = key.name() {
                column = column.with_name(name);
            }
            columns.insert(key.clone(), column);
        }

        let generation = self.generation.get() + 1;
        self.generation.set(generation);

        let mut frame = Dataframe::of(columns).merge(factor.data());
        frame.partition = Some(PartitionKey {
            depth: self.depth,
            generation,
        });
        frame.parent = parent.and_then(|p| p.partition);

        debug!(
            generation,
            rows = n,
            cardinality = factor.cardinality(),
            reducers = self.frame.reducers().len(),
            "Evaluated partition"
        );
        Ok(frame)
    }
}

impl Dataframe {
    /// Defer evaluating this frame's reducers over `factor`, optionally
    /// nested inside the partition produced by `parent`.
    pub fn partition_by(
        &self,
        factor: impl Into<FactorSource>,
        parent: Option<&Partitioner>,
    ) -> Partitioner {
        Partitioner::new(Rc::new(self.clone()), factor.into(), parent)
    }

    /// Chain one partitioner per factor, coarsest first, each nested in the
    /// previous one.
    pub fn make_partitions<F: Into<FactorSource>>(
        &self,
        factors: impl IntoIterator<Item = F>,
    ) -> Vec<Partitioner> {
        let frame = Rc::new(self.clone());
        let mut chain: Vec<Partitioner> = Vec::new();
        for factor in factors {
            let partitioner = Partitioner::new(Rc::clone(&frame), factor.into(), chain.last());
            chain.push(partitioner);
        }
        chain
    }
}
