//! The in-memory dataset and the transformations applied to it.
//!
//! A dataset is a polars [`DataFrame`](polars::prelude::DataFrame); the
//! missing marker is polars null. Each stage takes a frame and returns a new
//! one, so stages compose in a straight line:
//!
//! ```text
//! load_csv ─> normalize_column_names ─> trim_text_columns ─> coerce_columns
//!          ─> handle_missing ─> filter_invalid_rows ─> save_csv
//! ```
//!
//! - [`io`]: reading and (atomically) writing delimited files
//! - [`naming`]: column-name normalization and collision resolution
//! - [`cleaning`]: the cell-level stages

pub mod cleaning;
pub mod io;
pub mod naming;

pub use cleaning::{
    Coercion, Imputation, MissingOutcome, RowFilter, coerce_columns, filter_invalid_rows,
    handle_missing, trim_text_columns,
};
pub use io::{load_csv, save_csv};
pub use naming::{
    ColumnRename, NamePlan, ShadowedColumn, normalize_column_name, normalize_column_names,
    plan_column_names,
};
