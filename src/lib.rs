//! # Trueno-Frame
//!
//! Columnar dataframes with grouped reducers over nested partitions, the
//! data layer underneath interactive, linked statistical graphics.
//!
//! Raw records become typed [`column::Column`]s inside a
//! [`frame::Dataframe`]. Reducers attached with
//! [`frame::Dataframe::summarize`] stay pending until the frame is split by a
//! [`factor::Factor`]; evaluating the resulting [`frame::Partitioner`] yields
//! one reduced value per level. Chains of ever finer factors keep a link from
//! every level to its parent level, which drives stacking and
//! parent-relative scaling.
//!
//! ## Quick Start
//!
//! ```rust
//! use trueno_frame::prelude::*;
//!
//! let mut schema = Schema::new();
//! schema.insert("cyl".into(), ColumnType::Discrete);
//! schema.insert("drv".into(), ColumnType::Discrete);
//!
//! let frame = Dataframe::from_json_str(
//!     r#"{"cyl": ["4", "4", "6", "8", "8"], "drv": ["f", "4", "f", "r", "r"]}"#,
//!     &schema,
//! )?
//! .summarize(Key::Indicator, "count", Fold::sum())?;
//!
//! let cyl = frame.col("cyl").unwrap().as_factor()?;
//! let drv = frame.col("drv").unwrap().as_factor()?;
//! let chain = frame.make_partitions([Factor::mono(5), cyl.clone(), cyl.product(&drv)]);
//!
//! let mut fine = chain[2].evaluate()?;
//! fine.stack("count")?;
//! assert_eq!(fine.n()?, 4);
//! # Ok::<(), trueno_frame::Error>(())
//! ```
//!
//! ## Logging
//!
//! Diagnostics go through [`tracing`]; install a subscriber to see partition
//! evaluations (`debug`) and factor construction (`trace`).

#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Core Modules
// ============================================================================

/// Cell values and column keys.
pub mod value;

/// Alphanumeric string ordering.
pub mod collate;

/// Column extents and distinct-value sets.
pub mod metadata;

/// Columns and their storage strategies.
pub mod column;

// ============================================================================
// Aggregation Modules
// ============================================================================

/// Grouped folds.
pub mod reducer;

/// Row partitions.
pub mod factor;

/// Dataframes and partition evaluation.
pub mod frame;

// ============================================================================
// Configuration & Error Types
// ============================================================================

/// YAML configuration.
pub mod config;

/// Error types for trueno-frame operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types for convenient imports.
///
/// ```rust
/// use trueno_frame::prelude::*;
/// ```
pub mod prelude {
    pub use crate::column::{Column, ColumnKind, Mapping};
    pub use crate::config::{ColumnType, Config, Schema};
    pub use crate::error::{Error, Result};
    pub use crate::factor::{BinOptions, Factor};
    pub use crate::frame::{Dataframe, FactorSource, Partitioner, Row};
    pub use crate::metadata::Metadata;
    pub use crate::reducer::{Fold, Reducer};
    pub use crate::value::{Key, Value};
}
