//! Numeric binning.
//!
//! Break points are laid out on a fixed-width grid anchored at a chosen
//! value, with one extra break on either side of the data extent. A value
//! equal to a break falls into the bin below it. Bins no row lands in are
//! dropped, so levels stay dense.

use super::{positions_column, Factor};
use crate::column::Column;
use crate::error::{Error, Result};
use crate::frame::Dataframe;
use crate::metadata::NumericMetadata;
use crate::value::{Key, UNNAMED};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

fn default_bins() -> usize {
    10
}

/// Binning parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinOptions {
    /// Number of break intervals across the extent when no width is given.
    #[serde(default = "default_bins")]
    pub bins: usize,
    /// Bin width. Derived from `bins` when absent.
    #[serde(default)]
    pub width: Option<f64>,
    /// A value the break grid passes through. Defaults to the minimum.
    #[serde(default)]
    pub anchor: Option<f64>,
}

impl Default for BinOptions {
    fn default() -> Self {
        Self {
            bins: default_bins(),
            width: None,
            anchor: None,
        }
    }
}

impl BinOptions {
    /// Fixed bin width.
    #[must_use]
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    /// Grid anchor.
    #[must_use]
    pub fn with_anchor(mut self, anchor: f64) -> Self {
        self.anchor = Some(anchor);
        self
    }

    /// Interval count used when no width is set.
    #[must_use]
    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }

    fn usable_width(&self) -> Option<f64> {
        self.width.filter(|w| w.is_finite() && *w > 0.0)
    }
}

/// Most break intervals a grid may span.
pub const MAX_BINS: usize = 1 << 20;

/// Interval count of `range` split into steps of `width`, plus one.
fn bin_count(range: f64, width: f64) -> Result<usize> {
    let steps = (range / width).ceil();
    if !steps.is_finite() || steps >= MAX_BINS as f64 {
        return Err(Error::TooManyBins { limit: MAX_BINS });
    }
    Ok(steps.max(0.0) as usize + 1)
}

/// Break points covering `[min, max]`.
///
/// The grid starts one width below `min`, shifted so that it passes through
/// the anchor, and the last break lies at least one step past `max`. A
/// non-positive or non-finite width is ignored in favour of the `bins`
/// derived one; a zero range falls back to a width of 1.
pub fn breaks(min: f64, max: f64, options: &BinOptions) -> Result<Vec<f64>> {
    if !(min.is_finite() && max.is_finite()) {
        return Err(Error::NonFiniteData);
    }

    let range = max - min;
    let (n_bins, width) = match options.usable_width() {
        Some(width) => (bin_count(range, width)?, width),
        None if options.bins > MAX_BINS => return Err(Error::TooManyBins { limit: MAX_BINS }),
        None => {
            let n_bins = options.bins.max(2);
            (n_bins, range / (n_bins - 1) as f64)
        }
    };

    let (n_bins, width) = if width.is_finite() && width > 0.0 {
        (n_bins, width)
    } else {
        warn!(min, max, "degenerate bin range, using unit width");
        (bin_count(range, 1.0)?, 1.0)
    };

    let anchor = options.anchor.unwrap_or(min);
    let first = min - width + (anchor - min) % width;
    let last = max + width - (max - anchor) % width;

    let len = n_bins + 2;
    let mut breaks: Vec<f64> = (0..len).map(|i| first + i as f64 * width).collect();
    breaks[len - 1] = last;
    Ok(breaks)
}

/// Bin of `value`: the interval whose upper break is the first break at or
/// above it. Values past the last break land in the last bin.
fn bin_of(breaks: &[f64], value: f64) -> usize {
    breaks
        .iter()
        .position(|&b| b >= value)
        .map_or(breaks.len() - 2, |i| i.saturating_sub(1))
}

impl Factor {
    /// Bin `values` on a fixed-width grid.
    ///
    /// The level data holds each bin's lower and upper break as `bin0` and
    /// `bin1`. Fails on input with no numbers, on infinite values, and
    /// when the grid would exceed [`MAX_BINS`] intervals.
    pub fn bin(values: &[f64], options: &BinOptions) -> Result<Self> {
        let extent = NumericMetadata::from_values(values);
        if values.is_empty() || extent.is_empty() {
            return Err(Error::EmptyData);
        }

        let breaks = breaks(extent.min, extent.max, options)?;
        let raw: Vec<usize> = values.iter().map(|&v| bin_of(&breaks, v)).collect();
        let used: BTreeSet<usize> = raw.iter().copied().collect();

        let mut dense = vec![0; breaks.len()];
        for (level, &bin) in used.iter().enumerate() {
            dense[bin] = level;
        }
        let indices: Vec<usize> = raw.iter().map(|&bin| dense[bin]).collect();

        let cardinality = used.len();
        let lower: Vec<f64> = used.iter().map(|&bin| breaks[bin]).collect();
        let upper: Vec<f64> = used.iter().map(|&bin| breaks[bin + 1]).collect();
        let data = Dataframe::of([
            (Key::from("bin0"), Column::numeric(lower).with_name("bin0")),
            (Key::from("bin1"), Column::numeric(upper).with_name("bin1")),
            (Key::Positions, positions_column(cardinality, &indices)),
        ]);

        Ok(Self::from_parts("bin", cardinality, indices, data, None))
    }

    /// Bin a column whose values are all numbers.
    pub fn bin_column(column: &Column, options: &BinOptions) -> Result<Self> {
        if let Some(values) = column.as_numbers() {
            return Self::bin(values, options);
        }

        let values = column
            .values()
            .iter()
            .enumerate()
            .map(|(index, v)| {
                v.as_f64().ok_or_else(|| Error::NotNumeric {
                    column: column.name().unwrap_or(UNNAMED).to_string(),
                    index,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::bin(&values, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use approx::assert_relative_eq;

    fn numbers(column: &Column) -> Vec<f64> {
        column.values().iter().filter_map(Value::as_f64).collect()
    }

    #[test]
    fn test_bin_fixed_width() {
        let options = BinOptions::default().with_width(2.0);
        let factor = Factor::bin(&[1.0, 2.0, 3.0, 8.0, 9.0], &options).unwrap();

        assert_eq!(factor.cardinality(), 3);
        assert_eq!(factor.indices(), &[0, 1, 1, 2, 2]);
        assert_eq!(numbers(factor.data().col("bin0").unwrap()), vec![-1.0, 1.0, 7.0]);
        assert_eq!(numbers(factor.data().col("bin1").unwrap()), vec![1.0, 3.0, 9.0]);
    }

    #[test]
    fn test_breaks_grid() {
        let b = breaks(1.0, 9.0, &BinOptions::default().with_width(2.0)).unwrap();
        assert_eq!(b, vec![-1.0, 1.0, 3.0, 5.0, 7.0, 9.0, 11.0]);
    }

    #[test]
    fn test_breaks_with_anchor() {
        let b = breaks(1.0, 9.0, &BinOptions::default().with_width(2.0).with_anchor(0.0)).unwrap();
        assert_eq!(b.first().copied(), Some(-2.0));
        assert_eq!(b.last().copied(), Some(10.0));
        for pair in b.windows(2) {
            assert_relative_eq!(pair[1] - pair[0], 2.0);
        }
    }

    #[test]
    fn test_breaks_derived_width() {
        let b = breaks(0.0, 9.0, &BinOptions::default()).unwrap();
        assert_eq!(b.len(), 12);
        assert_relative_eq!(b[1] - b[0], 1.0);
    }

    #[test]
    fn test_value_on_break_goes_below() {
        let b = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(bin_of(&b, 1.0), 0);
        assert_eq!(bin_of(&b, 1.5), 1);
        assert_eq!(bin_of(&b, -5.0), 0);
        assert_eq!(bin_of(&b, 99.0), 2);
    }

    #[test]
    fn test_bin_constant_values() {
        let factor = Factor::bin(&[5.0, 5.0, 5.0], &BinOptions::default()).unwrap();
        assert_eq!(factor.cardinality(), 1);
        assert_eq!(factor.indices(), &[0, 0, 0]);
    }

    #[test]
    fn test_bin_empty_fails() {
        assert!(matches!(
            Factor::bin(&[], &BinOptions::default()),
            Err(Error::EmptyData)
        ));
        assert!(matches!(
            Factor::bin(&[f64::NAN], &BinOptions::default()),
            Err(Error::EmptyData)
        ));
    }

    #[test]
    fn test_bin_infinite_value_fails() {
        let values = [0.0, 1.0, f64::INFINITY];
        assert!(matches!(
            Factor::bin(&values, &BinOptions::default()),
            Err(Error::NonFiniteData)
        ));
        assert!(matches!(
            Factor::bin(&values, &BinOptions::default().with_width(1.0)),
            Err(Error::NonFiniteData)
        ));
        assert!(matches!(
            Factor::bin(&[f64::NEG_INFINITY, 2.0], &BinOptions::default()),
            Err(Error::NonFiniteData)
        ));
    }

    #[test]
    fn test_bin_after_division_by_zero_fails() {
        let frame = Dataframe::of([("x", Column::numeric(vec![0.0, 1.0, 2.0]).with_name("x"))])
            .mutate("ratio", |row| {
                let x = row[&Key::from("x")].as_f64().unwrap_or(f64::NAN);
                Value::from(1.0 / x)
            })
            .unwrap();
        let ratio = frame.col("ratio").unwrap();
        assert!(matches!(
            Factor::bin_column(ratio, &BinOptions::default()),
            Err(Error::NonFiniteData)
        ));
    }

    #[test]
    fn test_breaks_too_many_bins() {
        let tiny = BinOptions::default().with_width(1e-12);
        assert!(matches!(breaks(0.0, 1.0, &tiny), Err(Error::TooManyBins { .. })));

        let wide = BinOptions::default().with_bins(usize::MAX);
        assert!(matches!(breaks(0.0, 1.0, &wide), Err(Error::TooManyBins { .. })));

        assert!(matches!(
            breaks(-f64::MAX, f64::MAX, &BinOptions::default()),
            Err(Error::TooManyBins { .. })
        ));
    }

    #[test]
    fn test_unusable_width_uses_bin_count() {
        let negative = breaks(0.0, 9.0, &BinOptions::default().with_width(-1.0)).unwrap();
        let derived = breaks(0.0, 9.0, &BinOptions::default()).unwrap();
        assert_eq!(negative, derived);

        let zero_range = breaks(3.0, 3.0, &BinOptions::default().with_width(f64::NAN)).unwrap();
        assert_eq!(zero_range.len(), 3);
        assert_relative_eq!(zero_range[1] - zero_range[0], 1.0);
    }

    #[test]
    fn test_bin_column_requires_numbers() {
        let column = Column::text(["a"]).with_name("t");
        let err = Factor::bin_column(&column, &BinOptions::default()).unwrap_err();
        assert!(matches!(err, Error::NotNumeric { index: 0, .. }));

        let proxy = Column::proxy(Column::numeric(vec![1.0, 4.0]), vec![1, 0]);
        let factor = Factor::bin_column(&proxy, &BinOptions::default().with_width(1.0)).unwrap();
        assert_eq!(factor.cardinality(), 2);
    }

    #[test]
    fn test_options_deserialize_defaults() {
        let options: BinOptions = serde_yaml_ng::from_str("width: 2.5").unwrap();
        assert_eq!(options.bins, 10);
        assert_eq!(options.width, Some(2.5));
        assert_eq!(options.anchor, None);
    }
}
