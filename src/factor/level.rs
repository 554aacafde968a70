//! Categorical factors.

use super::{positions_column, Factor};
use crate::column::{Column, ColumnKind};
use crate::collate::compare_alphanumeric;
use crate::error::{Error, Result};
use crate::frame::Dataframe;
use crate::value::{Key, UNNAMED};
use std::collections::HashMap;
use std::rc::Rc;

const LABEL: &str = "label";

impl Factor {
    /// One level per distinct string, levels in alphanumeric order.
    ///
    /// The level data holds the sorted labels under `label`.
    #[must_use]
    pub fn from_labels<S: AsRef<str>>(values: &[S]) -> Self {
        let mut labels: Vec<Rc<str>> = values.iter().map(|v| Rc::from(v.as_ref())).collect();
        labels.sort_by(|a, b| compare_alphanumeric(a, b));
        labels.dedup();

        let rank: HashMap<&str, usize> = labels
            .iter()
            .enumerate()
            .map(|(level, label)| (&**label, level))
            .collect();
        let indices: Vec<usize> = values.iter().map(|v| rank[v.as_ref()]).collect();

        Self::labelled("labels", labels, indices, LABEL)
    }

    /// Level `values` by an explicit label set.
    ///
    /// Labels are sorted and deduplicated; labels no row uses still get a
    /// level with empty positions. Fails on values outside the label set.
    pub fn from_labels_with<S, L>(values: &[S], labels: &[L]) -> Result<Self>
    where
        S: AsRef<str>,
        L: AsRef<str>,
    {
        let mut labels: Vec<Rc<str>> = labels.iter().map(|l| Rc::from(l.as_ref())).collect();
        labels.sort_by(|a, b| compare_alphanumeric(a, b));
        labels.dedup();

        let rank: HashMap<&str, usize> = labels
            .iter()
            .enumerate()
            .map(|(level, label)| (&**label, level))
            .collect();
        let indices = values
            .iter()
            .map(|v| {
                rank.get(v.as_ref()).copied().ok_or_else(|| Error::UnknownLevel {
                    value: v.as_ref().to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::labelled("labels", labels, indices, LABEL))
    }

    /// Level a text column by its sorted distinct values.
    ///
    /// Owned text columns reuse the distinct set in their metadata; other
    /// columns qualify when every value is text.
    pub fn from_column(column: &Column) -> Result<Self> {
        let name = column.name().unwrap_or(LABEL);

        if let ColumnKind::Text { values, metadata } = column.kind() {
            if let Some(meta) = metadata.as_text() {
                let labels = meta.values().to_vec();
                let rank: HashMap<&str, usize> = labels
                    .iter()
                    .enumerate()
                    .map(|(level, label)| (&**label, level))
                    .collect();
                let indices = values
                    .iter()
                    .map(|v| {
                        rank.get(&**v).copied().ok_or_else(|| Error::UnknownLevel {
                            value: v.to_string(),
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                return Ok(Self::labelled("column", labels, indices, name));
            }
        }

        let values = column.values();
        let texts: Option<Vec<&str>> = values.iter().map(|v| v.as_str()).collect();
        match texts {
            Some(texts) if column.n().is_some() => {
                let factor = Self::from_labels(&texts);
                Ok(factor.renamed(name))
            }
            _ => Err(Error::UnsupportedColumn {
                column: column.name().unwrap_or(UNNAMED).to_string(),
                expected: "text",
            }),
        }
    }

    fn labelled(kind: &'static str, labels: Vec<Rc<str>>, indices: Vec<usize>, name: &str) -> Self {
        let cardinality = labels.len();
        let data = Dataframe::of([
            (Key::from(name), Column::text(labels).with_name(name)),
            (Key::Positions, positions_column(cardinality, &indices)),
        ]);
        Self::from_parts(kind, cardinality, indices, data, None)
    }

    fn renamed(mut self, name: &str) -> Self {
        if name == LABEL {
            return self;
        }
        self.data = self.data.select(|columns| {
            columns
                .iter()
                .map(|(key, column)| match key.name() {
                    Some(LABEL) => (Key::from(name), column.clone().with_name(name)),
                    _ => (key.clone(), column.clone()),
                })
                .collect::<Vec<_>>()
        });
        self
    }
}
