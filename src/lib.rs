//! # salesclean
//!
//! Cleans a raw sales CSV into an analysis-ready file: normalized column
//! names, trimmed text, numeric price/quantity columns, a single explicit
//! missing-value policy, and no rows with negative amounts.
//!
//! ## Quick Start
//!
//! ```no_run
//! use salesclean::pipeline::{PipelineSpec, run_pipeline, write_preview};
//!
//! let spec = PipelineSpec::default_sales();
//! let report = run_pipeline(&spec, "data/raw/sales_data_raw.csv", "data/processed/sales_data_clean.csv")?;
//! write_preview(&mut std::io::stdout(), &report, spec.output.preview_rows)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Core Modules
//!
//! - [`dataset`]: loading, saving and the individual cleaning stages
//! - [`pipeline`]: the declarative spec, validation, execution and preview
//! - [`error`]: error types
//! - [`logging`]: `tracing` subscriber setup for the binary
//! - [`utils`]: default paths and small helpers
//!
//! ## Schema
//!
//! Columns are described declaratively rather than probed one by one. Each
//! [`pipeline::FieldSpec`] names a column (plus aliases such as `qty`), its
//! kind, whether it is required, how to impute it and whether negative values
//! are invalid. Every stage walks the same resolved field list.

#![warn(clippy::all, rust_2018_idioms)]

pub mod dataset;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod utils;
