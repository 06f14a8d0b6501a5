//! Pipeline specification and execution.
//!
//! A run is described by a JSON [`PipelineSpec`] and executed by
//! [`run_pipeline`], which applies the stages in a fixed order:
//!
//! 1. **Load** the delimited input
//! 2. **Normalize column names** (last-write-wins on collisions)
//! 3. **Trim** every text column
//! 4. **Coerce** declared fields to numeric / text
//! 5. **Handle missing values** per [`MissingPolicy`] (impute or drop)
//! 6. **Filter** rows with negative values in `non_negative` fields
//! 7. **Persist** atomically to the output path
//!
//! The returned [`RunReport`] can then be rendered with [`write_preview`].
//!
//! # Example
//!
//! ```no_run
//! use salesclean::pipeline::{MissingPolicy, PipelineSpec, run_pipeline};
//!
//! let mut spec = PipelineSpec::default_sales();
//! spec.missing = MissingPolicy::Drop;
//!
//! let report = run_pipeline(
//!     &spec,
//!     "data/raw/sales_data_raw.csv",
//!     "data/processed/sales_data_clean.csv",
//! )?;
//! println!("{}", report.summary());
//! # Ok::<(), salesclean::error::CleanError>(())
//! ```

pub mod executor;
pub mod preview;
pub mod spec;
pub mod validation;

pub use executor::{RunReport, clean_dataset, run_pipeline};
pub use preview::write_preview;
pub use spec::{
    ColumnKind, FieldSpec, ImputeStrategy, InputConfig, MissingPolicy, OutputConfig, PipelineSpec,
    SPEC_VERSION, SchemaConfig, SchemaMatchMode,
};
pub use validation::{ValidationError, validate_columns, validate_spec};
