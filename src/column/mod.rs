//! Typed, named, indexable columns.
//!
//! Every storage strategy is a variant of [`ColumnKind`] and is read through
//! the same four calls on [`Column`]: [`Column::n`], [`Column::value_at`],
//! [`Column::values`] and [`Column::metadata`].
//!
//! Owned storage is reference counted and never written after construction,
//! so any number of proxy and composite views may alias it.
//!
//! # Example
//!
//! ```rust
//! use trueno_frame::column::Column;
//! use trueno_frame::value::Value;
//!
//! let hwy = Column::numeric(vec![29.0, 31.0, 24.0]).with_name("hwy");
//! let reordered = Column::proxy(hwy.clone(), vec![2, 0]);
//!
//! assert_eq!(reordered.n(), Some(2));
//! assert_eq!(reordered.value_at(0), Value::Number(24.0));
//! assert_eq!(reordered.metadata(), hwy.metadata());
//! ```

mod computed;
mod proxy;
mod reduced;

pub use computed::ComputedColumn;
pub use proxy::ProxyColumn;
pub use reduced::ReducedColumn;

use crate::error::Result;
use crate::factor::Factor;
use crate::metadata::{Metadata, NumericMetadata, TextMetadata};
use crate::reducer::{Fold, Reducer};
use crate::value::Value;
use std::rc::Rc;

/// Visual channel a column feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mapping {
    /// Horizontal position.
    X,
    /// Vertical position.
    Y,
    /// Mark size.
    Size,
}

/// Storage strategy of a column.
#[derive(Debug, Clone)]
pub enum ColumnKind {
    /// Owned numbers.
    Numeric {
        /// Backing storage.
        values: Rc<[f64]>,
        /// Running extent.
        metadata: Metadata,
    },
    /// Owned strings.
    Text {
        /// Backing storage.
        values: Rc<[Rc<str>]>,
        /// Running distinct set.
        metadata: Metadata,
    },
    /// Owned opaque values (level ids, position sets, tuples).
    Reference(Rc<[Value]>),
    /// One value broadcast to every index.
    Constant(Value),
    /// Index-remapped view over another column.
    Proxy(ProxyColumn),
    /// Tuple of columns read in lockstep.
    Composite(Rc<[Column]>),
    /// Values computed on read.
    Computed(ComputedColumn),
    /// Output of a reducer.
    Reduced(ReducedColumn),
}

/// A named column with a storage strategy.
#[derive(Debug, Clone)]
pub struct Column {
    name: Option<Rc<str>>,
    mapping: Option<Mapping>,
    kind: ColumnKind,
}

impl From<ColumnKind> for Column {
    fn from(kind: ColumnKind) -> Self {
        Self {
            name: None,
            mapping: None,
            kind,
        }
    }
}

impl From<ReducedColumn> for Column {
    fn from(reduced: ReducedColumn) -> Self {
        ColumnKind::Reduced(reduced).into()
    }
}

impl From<ProxyColumn> for Column {
    fn from(proxy: ProxyColumn) -> Self {
        ColumnKind::Proxy(proxy).into()
    }
}

impl Column {
    /// Owned numeric column. Computes the extent once.
    #[must_use]
    pub fn numeric(values: impl Into<Rc<[f64]>>) -> Self {
        let values = values.into();
        let metadata = Metadata::Numeric(NumericMetadata::from_values(&values));
        ColumnKind::Numeric { values, metadata }.into()
    }

    /// Owned text column. Computes the distinct set once.
    #[must_use]
    pub fn text<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Rc<str>>,
    {
        let values: Rc<[Rc<str>]> = values.into_iter().map(Into::into).collect();
        let metadata = Metadata::Text(TextMetadata::from_values(&values));
        ColumnKind::Text { values, metadata }.into()
    }

    /// Owned column of opaque values.
    #[must_use]
    pub fn reference(values: impl Into<Rc<[Value]>>) -> Self {
        ColumnKind::Reference(values.into()).into()
    }

    /// Constant column.
    #[must_use]
    pub fn constant(value: impl Into<Value>) -> Self {
        ColumnKind::Constant(value.into()).into()
    }

    /// Zero-copy view reading `base` at `indices`.
    #[must_use]
    pub fn proxy(base: impl Into<Rc<Column>>, indices: impl Into<Rc<[usize]>>) -> Self {
        ProxyColumn::new(base, indices).into()
    }

    /// Tuple-of-columns view.
    #[must_use]
    pub fn composite(columns: impl IntoIterator<Item = Column>) -> Self {
        ColumnKind::Composite(columns.into_iter().collect()).into()
    }

    /// Column of `n` values computed by `f` on every read.
    #[must_use]
    pub fn computed(n: usize, f: impl Fn(usize) -> Value + 'static) -> Self {
        ColumnKind::Computed(ComputedColumn::new(n, f)).into()
    }

    /// Build an owned column from materialized values, choosing the storage
    /// from the first value: numbers, text, or opaque references.
    #[must_use]
    pub fn from_values(values: Vec<Value>) -> Self {
        match values.first() {
            Some(Value::Number(_)) => Self::numeric(
                values
                    .iter()
                    .map(|v| v.as_f64().unwrap_or(f64::NAN))
                    .collect::<Vec<_>>(),
            ),
            Some(Value::Text(_)) => Self::text(values.iter().map(|v| match v {
                Value::Text(s) => Rc::clone(s),
                other => Rc::from(other.to_string()),
            })),
            _ => Self::reference(values),
        }
    }

    /// Set the name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<Rc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the visual channel.
    #[must_use]
    pub fn with_mapping(mut self, mapping: Mapping) -> Self {
        self.mapping = Some(mapping);
        self
    }

    /// Column name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Visual channel, if any.
    #[must_use]
    pub fn mapping(&self) -> Option<Mapping> {
        self.mapping
    }

    /// Storage strategy.
    #[must_use]
    pub fn kind(&self) -> &ColumnKind {
        &self.kind
    }

    /// Short name of the storage strategy.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            ColumnKind::Numeric { .. } => "numeric",
            ColumnKind::Text { .. } => "text",
            ColumnKind::Reference(_) => "reference",
            ColumnKind::Constant(_) => "constant",
            ColumnKind::Proxy(_) => "proxy",
            ColumnKind::Composite(_) => "composite",
            ColumnKind::Computed(_) => "computed",
            ColumnKind::Reduced(_) => "reduced",
        }
    }

    /// Number of values, or `None` for length-agnostic columns (constants).
    #[must_use]
    pub fn n(&self) -> Option<usize> {
        match &self.kind {
            ColumnKind::Numeric { values, .. } => Some(values.len()),
            ColumnKind::Text { values, .. } => Some(values.len()),
            ColumnKind::Reference(values) => Some(values.len()),
            ColumnKind::Constant(_) => None,
            ColumnKind::Proxy(proxy) => Some(proxy.n()),
            ColumnKind::Composite(columns) => columns.iter().find_map(Column::n),
            ColumnKind::Computed(computed) => Some(computed.n()),
            ColumnKind::Reduced(reduced) => Some(reduced.n()),
        }
    }

    /// Value at row `i`. Requires `i < n()`; out-of-range reads panic.
    #[must_use]
    pub fn value_at(&self, i: usize) -> Value {
        match &self.kind {
            ColumnKind::Numeric { values, .. } => Value::Number(values[i]),
            ColumnKind::Text { values, .. } => Value::Text(Rc::clone(&values[i])),
            ColumnKind::Reference(values) => values[i].clone(),
            ColumnKind::Constant(value) => value.clone(),
            ColumnKind::Proxy(proxy) => proxy.value_at(i),
            ColumnKind::Composite(columns) => {
                Value::Tuple(columns.iter().map(|c| c.value_at(i)).collect())
            }
            ColumnKind::Computed(computed) => computed.value_at(i),
            ColumnKind::Reduced(reduced) => reduced.value_at(i),
        }
    }

    /// Value at row `i` in the column's display scale.
    ///
    /// Only reduced columns rescaled to their parent differ from
    /// [`Column::value_at`].
    #[must_use]
    pub fn scaled_at(&self, i: usize) -> Value {
        match &self.kind {
            ColumnKind::Reduced(reduced) => reduced.scaled_at(i),
            _ => self.value_at(i),
        }
    }

    /// Materialize every value. Constants yield their single value.
    #[must_use]
    pub fn values(&self) -> Vec<Value> {
        match &self.kind {
            ColumnKind::Constant(value) => vec![value.clone()],
            _ => (0..self.n().unwrap_or(0)).map(|i| self.value_at(i)).collect(),
        }
    }

    /// Numbers of an owned numeric column, without copying.
    #[must_use]
    pub fn as_numbers(&self) -> Option<&[f64]> {
        match &self.kind {
            ColumnKind::Numeric { values, .. } => Some(values),
            _ => None,
        }
    }

    /// Snapshot of the descriptive metadata.
    #[must_use]
    pub fn metadata(&self) -> Metadata {
        match &self.kind {
            ColumnKind::Numeric { metadata, .. } | ColumnKind::Text { metadata, .. } => {
                metadata.clone()
            }
            ColumnKind::Proxy(proxy) => proxy.metadata(),
            ColumnKind::Reduced(reduced) => reduced.metadata().clone(),
            ColumnKind::Reference(_)
            | ColumnKind::Constant(_)
            | ColumnKind::Composite(_)
            | ColumnKind::Computed(_) => Metadata::Empty,
        }
    }

    /// Mutable metadata of columns that own theirs.
    pub fn metadata_mut(&mut self) -> Option<&mut Metadata> {
        match &mut self.kind {
            ColumnKind::Numeric { metadata, .. } | ColumnKind::Text { metadata, .. } => {
                Some(metadata)
            }
            ColumnKind::Reduced(reduced) => Some(reduced.metadata_mut()),
            _ => None,
        }
    }

    /// Reducer folding this column with `fold`.
    #[must_use]
    pub fn summarize(&self, fold: Fold) -> Reducer {
        Reducer::new(self.clone(), fold)
    }

    /// Tuple view of this column followed by `other`. Merging into a
    /// composite column extends it instead of nesting.
    #[must_use]
    pub fn merge(&self, other: &Column) -> Column {
        let mut columns: Vec<Column> = match &self.kind {
            ColumnKind::Composite(columns) => columns.to_vec(),
            _ => vec![self.clone()],
        };
        columns.push(other.clone());
        Column::composite(columns)
    }

    /// Level this text column by its sorted distinct values.
    pub fn as_factor(&self) -> Result<Factor> {
        Factor::from_column(self)
    }

    /// Reduced view, if this is a reducer output.
    #[must_use]
    pub fn as_reduced(&self) -> Option<&ReducedColumn> {
        match &self.kind {
            ColumnKind::Reduced(reduced) => Some(reduced),
            _ => None,
        }
    }

    /// Mutable reduced view, if this is a reducer output.
    pub fn as_reduced_mut(&mut self) -> Option<&mut ReducedColumn> {
        match &mut self.kind {
            ColumnKind::Reduced(reduced) => Some(reduced),
            _ => None,
        }
    }
}
