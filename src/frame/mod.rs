//! Named column sets with pending reducers.
//!
//! A [`Dataframe`] maps [`Key`]s to [`Column`]s sharing one row space and
//! holds reducers that are evaluated only when the frame is partitioned (see
//! [`Dataframe::partition_by`]). Every frame owns a constant-1 column under
//! [`Key::Indicator`], the default source for row counts.
//!
//! All derivations return a new frame; columns are cheap to clone because
//! their storage is shared.
//!
//! # Example
//!
//! ```rust
//! use trueno_frame::config::{ColumnType, Schema};
//! use trueno_frame::frame::Dataframe;
//! use trueno_frame::reducer::Fold;
//! use trueno_frame::value::Key;
//!
//! let mut schema = Schema::new();
//! schema.insert("cyl".into(), ColumnType::Discrete);
//! schema.insert("hwy".into(), ColumnType::Numeric);
//!
//! let frame = Dataframe::from_json_str(
//!     r#"{"cyl": ["4", "6", "4"], "hwy": [29, 26, 31]}"#,
//!     &schema,
//! )
//! .unwrap()
//! .summarize(Key::Indicator, "count", Fold::sum())
//! .unwrap();
//!
//! assert_eq!(frame.n().unwrap(), 3);
//! assert!(frame.reducers().contains_key(&Key::from("count")));
//! ```

mod partition;

pub use partition::{FactorSource, PartitionKey, Partitioner};

use crate::column::{Column, Mapping, ReducedColumn};
use crate::config::{ColumnType, Schema};
use crate::error::{Error, Result};
use crate::reducer::{Fold, Reducer};
use crate::value::{Key, Value, COLLISION_MARKER, UNNAMED};
use indexmap::IndexMap;

/// One materialized row, keyed like the frame's columns.
pub type Row = IndexMap<Key, Value>;

/// A set of equally long columns plus pending reducers.
#[derive(Debug, Clone)]
pub struct Dataframe {
    columns: IndexMap<Key, Column>,
    reducers: IndexMap<Key, Reducer>,
    partition: Option<PartitionKey>,
    parent: Option<PartitionKey>,
}

impl Default for Dataframe {
    fn default() -> Self {
        Self::from_parts(IndexMap::new(), IndexMap::new())
    }
}

impl Dataframe {
    fn from_parts(mut columns: IndexMap<Key, Column>, reducers: IndexMap<Key, Reducer>) -> Self {
        columns
            .entry(Key::Indicator)
            .or_insert_with(|| Column::constant(1.0));
        Self {
            columns,
            reducers,
            partition: None,
            parent: None,
        }
    }

    /// Build a frame from keyed columns. Lengths are not checked.
    pub fn of<K: Into<Key>>(columns: impl IntoIterator<Item = (K, Column)>) -> Self {
        let columns = columns
            .into_iter()
            .map(|(key, column)| (key.into(), column))
            .collect();
        Self::from_parts(columns, IndexMap::new())
    }

    /// Build a frame from a JSON object of arrays, one array per declared
    /// column.
    ///
    /// Numeric columns accept numbers, `null` (read as NaN) and numeric
    /// strings. Discrete columns keep strings and stringify anything else.
    ///
    /// # Errors
    ///
    /// [`Error::NotArray`] when a declared field is missing or not an array,
    /// [`Error::LengthMismatch`] when declared arrays differ in length and
    /// [`Error::NotNumeric`] for unreadable numeric values.
    pub fn parse_columns(raw: &serde_json::Value, schema: &Schema) -> Result<Self> {
        let mut length: Option<usize> = None;
        let mut columns = IndexMap::with_capacity(schema.len() + 1);

        for (name, column_type) in schema {
            let items = raw
                .get(name)
                .and_then(serde_json::Value::as_array)
                .ok_or_else(|| Error::NotArray {
                    column: name.clone(),
                })?;

            if let Some(expected) = length {
                if items.len() != expected {
                    return Err(Error::LengthMismatch {
                        column: name.clone(),
                        expected,
                        found: items.len(),
                    });
                }
            }
            length = Some(items.len());

            let column = match column_type {
                ColumnType::Numeric => Column::numeric(parse_numbers(name, items)?),
                ColumnType::Discrete => Column::text(items.iter().map(discrete_label)),
            };
            columns.insert(Key::from(name.as_str()), column.with_name(name.as_str()));
        }

        Ok(Self::from_parts(columns, IndexMap::new()))
    }

    /// Parse `json` and build a frame with [`Dataframe::parse_columns`].
    pub fn from_json_str(json: &str, schema: &Schema) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_str(json)?;
        Self::parse_columns(&raw, schema)
    }

    /// Row count: the length of the first column that has one.
    ///
    /// # Errors
    ///
    /// [`Error::NoLengthedVariable`] when every column is length-agnostic.
    pub fn n(&self) -> Result<usize> {
        self.columns
            .values()
            .find_map(Column::n)
            .ok_or(Error::NoLengthedVariable)
    }

    /// Number of columns, the indicator included.
    #[must_use]
    pub fn ncol(&self) -> usize {
        self.columns.len()
    }

    /// Column under `key`.
    pub fn col(&self, key: impl Into<Key>) -> Option<&Column> {
        self.columns.get(&key.into())
    }

    /// The constant-1 column.
    #[must_use]
    pub fn indicator(&self) -> &Column {
        &self.columns[&Key::Indicator]
    }

    /// All columns in insertion order.
    #[must_use]
    pub fn columns(&self) -> &IndexMap<Key, Column> {
        &self.columns
    }

    /// Pending reducers.
    #[must_use]
    pub fn reducers(&self) -> &IndexMap<Key, Reducer> {
        &self.reducers
    }

    /// Lineage of a partitioned frame.
    #[must_use]
    pub fn partition_key(&self) -> Option<PartitionKey> {
        self.partition
    }

    /// Lineage of the partition this one nests in.
    #[must_use]
    pub fn parent_key(&self) -> Option<PartitionKey> {
        self.parent
    }

    /// Look up several columns at once.
    pub fn pick_cols<K: Into<Key>>(&self, keys: impl IntoIterator<Item = K>) -> Result<Vec<&Column>> {
        keys.into_iter()
            .map(|key| {
                let key = key.into();
                self.columns
                    .get(&key)
                    .ok_or_else(|| Error::UnknownColumn(key.to_string()))
            })
            .collect()
    }

    /// Values of every column at row `i`.
    #[must_use]
    pub fn row(&self, i: usize) -> Row {
        self.columns
            .iter()
            .map(|(key, column)| (key.clone(), column.value_at(i)))
            .collect()
    }

    /// Every row.
    pub fn rows(&self) -> Result<Vec<Row>> {
        Ok((0..self.n()?).map(|i| self.row(i)).collect())
    }

    /// Row `i` keyed by column name, without the indicator.
    ///
    /// Unnamed columns appear as `unnamed`; repeated names get the collision
    /// marker appended until unique.
    #[must_use]
    pub fn named_row(&self, i: usize) -> IndexMap<String, Value> {
        let mut row = IndexMap::with_capacity(self.columns.len());
        for (key, column) in &self.columns {
            if *key == Key::Indicator {
                continue;
            }
            let mut name = column.name().unwrap_or(UNNAMED).to_string();
            while row.contains_key(&name) {
                name.push(COLLISION_MARKER);
            }
            row.insert(name, column.value_at(i));
        }
        row
    }

    /// Display-scaled values of the mapped columns at row `i`.
    #[must_use]
    pub fn mapping_row(&self, i: usize) -> IndexMap<Mapping, Value> {
        self.columns
            .values()
            .filter_map(|column| Some((column.mapping()?, column.scaled_at(i))))
            .collect()
    }

    /// Project the column set through `f`. Reducers are not carried over.
    pub fn select<F, I, K>(&self, f: F) -> Self
    where
        F: FnOnce(&IndexMap<Key, Column>) -> I,
        I: IntoIterator<Item = (K, Column)>,
        K: Into<Key>,
    {
        Self::of(f(&self.columns))
    }

    /// Keep the columns named by `(new key, old key)` pairs, relabelled.
    /// Reducers are not carried over.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownColumn`] when an old key is missing.
    pub fn select_keys<N, O>(&self, keys: impl IntoIterator<Item = (N, O)>) -> Result<Self>
    where
        N: Into<Key>,
        O: Into<Key>,
    {
        let mut columns = IndexMap::new();
        for (new, old) in keys {
            let old = old.into();
            let column = self
                .columns
                .get(&old)
                .ok_or_else(|| Error::UnknownColumn(old.to_string()))?;
            columns.insert(new.into(), column.clone());
        }
        Ok(Self::from_parts(columns, IndexMap::new()))
    }

    /// Union of both frames' columns and reducers.
    ///
    /// Colliding names from `other` get the collision marker appended until
    /// unique; reserved keys already present here are kept.
    #[must_use]
    pub fn merge(&self, other: &Dataframe) -> Self {
        let mut merged = self.clone();
        for (key, column) in &other.columns {
            if key.is_reserved() {
                merged
                    .columns
                    .entry(key.clone())
                    .or_insert_with(|| column.clone());
            } else {
                let key = key.clone().disambiguate(|k| merged.columns.contains_key(k));
                merged.columns.insert(key, column.clone());
            }
        }
        for (key, reducer) in &other.reducers {
            let key = key.clone().disambiguate(|k| merged.reducers.contains_key(k));
            merged.reducers.entry(key).or_insert_with(|| reducer.clone());
        }
        merged
    }

    /// Add (or replace) a column computed from every materialized row.
    ///
    /// Storage is inferred from the first produced value.
    pub fn mutate(&self, name: &str, f: impl Fn(&Row) -> Value) -> Result<Self> {
        let values: Vec<Value> = (0..self.n()?).map(|i| f(&self.row(i))).collect();
        let mut mutated = self.clone();
        mutated
            .columns
            .insert(Key::from(name), Column::from_values(values).with_name(name));
        Ok(mutated)
    }

    /// Attach a reducer folding `source` with `fold` under `key`.
    ///
    /// Nothing is evaluated until the frame is partitioned.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownColumn`] when `source` is missing.
    pub fn summarize(&self, source: impl Into<Key>, key: impl Into<Key>, fold: Fold) -> Result<Self> {
        let reducer = self.source_column(source)?.summarize(fold);
        Ok(self.with_reducer(key.into(), reducer))
    }

    /// [`Dataframe::summarize`] with a finalizer applied to every accumulator.
    pub fn summarize_with(
        &self,
        source: impl Into<Key>,
        key: impl Into<Key>,
        fold: Fold,
        finalize: impl Fn(&Value) -> Value + 'static,
    ) -> Result<Self> {
        let reducer = self
            .source_column(source)?
            .summarize(fold)
            .with_finalize(finalize);
        Ok(self.with_reducer(key.into(), reducer))
    }

    fn source_column(&self, source: impl Into<Key>) -> Result<&Column> {
        let source = source.into();
        self.columns
            .get(&source)
            .ok_or_else(|| Error::UnknownColumn(source.to_string()))
    }

    fn with_reducer(&self, key: Key, reducer: Reducer) -> Self {
        let mut frame = self.clone();
        frame.reducers.insert(key, reducer);
        frame
    }

    /// Tag the column under `key` as feeding `mapping`.
    pub fn encode(&self, key: impl Into<Key>, mapping: Mapping) -> Result<Self> {
        let key = key.into();
        let mut frame = self.clone();
        let column = frame
            .columns
            .get_mut(&key)
            .ok_or_else(|| Error::UnknownColumn(key.to_string()))?;
        *column = column.clone().with_mapping(mapping);
        Ok(frame)
    }

    /// Stack the reduced column under `key` within its parent levels.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownColumn`] when missing, [`Error::UnsupportedColumn`]
    /// when the column is not a reducer output.
    pub fn stack(&mut self, key: impl Into<Key>) -> Result<&mut Self> {
        self.reduced_mut(key.into())?.stack();
        Ok(self)
    }

    /// Report the reduced column under `key` relative to its parent level.
    pub fn rescale_to_parent(&mut self, key: impl Into<Key>) -> Result<&mut Self> {
        self.reduced_mut(key.into())?.rescale_to_parent();
        Ok(self)
    }

    fn reduced_mut(&mut self, key: Key) -> Result<&mut ReducedColumn> {
        let column = self
            .columns
            .get_mut(&key)
            .ok_or_else(|| Error::UnknownColumn(key.to_string()))?;
        column
            .as_reduced_mut()
            .ok_or_else(|| Error::UnsupportedColumn {
                column: key.to_string(),
                expected: "reduced",
            })
    }
}

fn parse_numbers(column: &str, items: &[serde_json::Value]) -> Result<Vec<f64>> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let number = match item {
                serde_json::Value::Number(n) => n.as_f64(),
                serde_json::Value::Null => Some(f64::NAN),
                serde_json::Value::String(s) => s.trim().parse().ok(),
                _ => None,
            };
            number.ok_or_else(|| Error::NotNumeric {
                column: column.to_string(),
                index,
            })
        })
        .collect()
}

fn discrete_label(item: &serde_json::Value) -> String {
    match item {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(columns: &[(&str, ColumnType)]) -> Schema {
        columns.iter().map(|(name, ty)| ((*name).to_string(), *ty)).collect()
    }

    fn mpg() -> Dataframe {
        let raw = json!({
            "manufacturer": ["audi", "audi", "ford", "ford", "ford"],
            "hwy": [29, 31, 17, "19", null],
        });
        Dataframe::parse_columns(
            &raw,
            &schema(&[("manufacturer", ColumnType::Discrete), ("hwy", ColumnType::Numeric)]),
        )
        .unwrap()
    }

    #[test]
    fn test_parse_columns() {
        let frame = mpg();
        assert_eq!(frame.n().unwrap(), 5);
        assert_eq!(frame.ncol(), 3);

        let hwy = frame.col("hwy").unwrap();
        assert_eq!(hwy.name(), Some("hwy"));
        assert_eq!(hwy.kind_name(), "numeric");
        assert_eq!(hwy.value_at(3), Value::Number(19.0));
        assert!(hwy.value_at(4).as_f64().is_some_and(f64::is_nan));
        assert_eq!(frame.col("manufacturer").unwrap().kind_name(), "text");
    }

    #[test]
    fn test_parse_columns_not_array() {
        let raw = json!({"hwy": 29});
        let err = Dataframe::parse_columns(&raw, &schema(&[("hwy", ColumnType::Numeric)])).unwrap_err();
        assert!(matches!(err, Error::NotArray { column } if column == "hwy"));

        let err = Dataframe::parse_columns(&json!({}), &schema(&[("cyl", ColumnType::Discrete)])).unwrap_err();
        assert!(matches!(err, Error::NotArray { .. }));
    }

    #[test]
    fn test_parse_columns_length_mismatch() {
        let raw = json!({"a": [1, 2], "b": ["x"]});
        let err = Dataframe::parse_columns(
            &raw,
            &schema(&[("a", ColumnType::Numeric), ("b", ColumnType::Discrete)]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::LengthMismatch { expected: 2, found: 1, .. }));
    }

    #[test]
    fn test_parse_columns_not_numeric() {
        let raw = json!({"hwy": [1, "fast"]});
        let err = Dataframe::parse_columns(&raw, &schema(&[("hwy", ColumnType::Numeric)])).unwrap_err();
        assert!(matches!(err, Error::NotNumeric { index: 1, .. }));
    }

    #[test]
    fn test_discrete_stringifies_numbers() {
        let raw = json!({"cyl": [4, 6, "8"]});
        let frame = Dataframe::parse_columns(&raw, &schema(&[("cyl", ColumnType::Discrete)])).unwrap();
        let cyl = frame.col("cyl").unwrap();
        assert_eq!(cyl.values(), vec![Value::from("4"), Value::from("6"), Value::from("8")]);
    }

    #[test]
    fn test_from_json_str_invalid() {
        let err = Dataframe::from_json_str("{", &Schema::new()).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_indicator_only_has_no_length() {
        let frame = Dataframe::default();
        assert_eq!(frame.indicator().value_at(0), Value::Number(1.0));
        assert!(matches!(frame.n(), Err(Error::NoLengthedVariable)));
    }

    #[test]
    fn test_merge_suffixes_collisions() {
        let left = Dataframe::of([("x", Column::numeric(vec![1.0, 2.0]))]);
        let right = Dataframe::of([("x", Column::numeric(vec![3.0, 4.0]))]);
        let merged = left.merge(&right);

        assert_eq!(merged.col("x").unwrap().value_at(0), Value::Number(1.0));
        assert_eq!(merged.col("x$").unwrap().value_at(0), Value::Number(3.0));
        assert_eq!(merged.ncol(), 3);
    }

    #[test]
    fn test_select_drops_reducers() {
        let frame = mpg().summarize("hwy", "total", Fold::sum()).unwrap();
        assert_eq!(frame.reducers().len(), 1);

        let selected = frame.select(|columns| {
            columns
                .iter()
                .filter(|(key, _)| key.name() == Some("hwy"))
                .map(|(key, column)| (key.clone(), column.clone()))
                .collect::<Vec<_>>()
        });
        assert!(selected.reducers().is_empty());
        assert!(selected.col("hwy").is_some());
        assert!(selected.col("manufacturer").is_none());
        assert!(selected.col(Key::Indicator).is_some());
    }

    #[test]
    fn test_select_keys() {
        let frame = mpg();
        let selected = frame.select_keys([("make", "manufacturer")]).unwrap();
        assert!(selected.col("make").is_some());
        assert_eq!(selected.ncol(), 2);

        let err = frame.select_keys([("y", "displ")]).unwrap_err();
        assert!(matches!(err, Error::UnknownColumn(name) if name == "displ"));
    }

    #[test]
    fn test_pick_cols() {
        let frame = mpg();
        let picked = frame.pick_cols(["hwy", "manufacturer"]).unwrap();
        assert_eq!(picked.len(), 2);
        assert!(frame.pick_cols(["nope"]).is_err());
    }

    #[test]
    fn test_mutate_infers_storage() {
        let frame = mpg()
            .mutate("label", |row| {
                let make = row[&Key::from("manufacturer")].to_string();
                Value::from(make.to_uppercase())
            })
            .unwrap();
        let label = frame.col("label").unwrap();
        assert_eq!(label.kind_name(), "text");
        assert_eq!(label.value_at(2), Value::from("FORD"));
    }

    #[test]
    fn test_summarize_unknown_source() {
        let err = mpg().summarize("displ", "total", Fold::sum()).unwrap_err();
        assert!(matches!(err, Error::UnknownColumn(_)));
    }

    #[test]
    fn test_named_row() {
        let frame = Dataframe::of([
            ("a", Column::numeric(vec![1.0]).with_name("v")),
            ("b", Column::numeric(vec![2.0]).with_name("v")),
            ("c", Column::numeric(vec![3.0])),
        ]);
        let row = frame.named_row(0);
        let names: Vec<&str> = row.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["v", "v$", "unnamed"]);
        assert_eq!(row["v$"], Value::Number(2.0));
    }

    #[test]
    fn test_rows() {
        let frame = mpg();
        let rows = frame.rows().unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0][&Key::Indicator], Value::Number(1.0));
        assert_eq!(rows[2][&Key::from("manufacturer")], Value::from("ford"));
    }

    #[test]
    fn test_encode_and_mapping_row() {
        let frame = mpg().encode("hwy", Mapping::Y).unwrap();
        let row = frame.mapping_row(0);
        assert_eq!(row.len(), 1);
        assert_eq!(row[&Mapping::Y], Value::Number(29.0));
        assert!(mpg().encode("displ", Mapping::X).is_err());
    }

    #[test]
    fn test_stack_requires_reduced_column() {
        let mut frame = mpg();
        assert!(matches!(frame.stack("displ"), Err(Error::UnknownColumn(_))));
        assert!(matches!(
            frame.stack("hwy"),
            Err(Error::UnsupportedColumn { expected: "reduced", .. })
        ));
    }
}
