//! Pipeline execution engine.
//!
//! Runs the cleaning stages in order against a loaded dataset and collects
//! what each stage did into a [`RunReport`].

use super::spec::{PipelineSpec, parse_delimiter};
use super::validation::{describe, validate_columns, validate_spec};
use crate::dataset::cleaning::{
    Coercion, Imputation, RowFilter, coerce_columns, filter_invalid_rows, handle_missing,
    trim_text_columns,
};
use crate::dataset::io::{load_csv, save_csv};
use crate::dataset::naming::{ColumnRename, ShadowedColumn, normalize_column_names};
use crate::error::{CleanError, Result};
use polars::prelude::DataFrame;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Report generated after pipeline execution
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Number of rows before processing
    pub rows_before: usize,

    /// Number of columns before processing
    pub columns_before: usize,

    /// Number of rows after processing
    pub rows_after: usize,

    /// Number of columns after processing
    pub columns_after: usize,

    /// Raw -> normalized name of every surviving column, in output order
    pub columns: Vec<ColumnRename>,

    /// Columns dropped by a later column with the same normalized name
    pub shadowed: Vec<ShadowedColumn>,

    /// Cells per column that failed type coercion
    pub coercions: Vec<Coercion>,

    pub imputations: Vec<Imputation>,

    /// Rows dropped by the drop policy
    pub rows_dropped_missing: usize,

    /// Rows dropped for negative values, per column
    pub rows_dropped_invalid: Vec<RowFilter>,

    /// Schema fields that matched no column
    pub skipped_fields: Vec<String>,

    /// Warnings generated during execution
    pub warnings: Vec<String>,

    /// Where the cleaned file was written (None for in-memory runs)
    pub output_path: Option<PathBuf>,

    /// Time taken for execution
    pub duration: Duration,

    /// The cleaned dataset
    pub frame: DataFrame,
}

impl RunReport {
    pub fn total_rows_dropped_invalid(&self) -> usize {
        self.rows_dropped_invalid.iter().map(|f| f.rows).sum()
    }

    pub fn total_cells_coerced(&self) -> usize {
        self.coercions.iter().map(|c| c.cells).sum()
    }

    /// Create a summary message
    pub fn summary(&self) -> String {
        format!(
            "Cleaning completed: rows {} → {} ({} dropped missing, {} dropped invalid), columns {} → {}, {} cell(s) coerced, {} imputed, {:.2}s",
            self.rows_before,
            self.rows_after,
            self.rows_dropped_missing,
            self.total_rows_dropped_invalid(),
            self.columns_before,
            self.columns_after,
            self.total_cells_coerced(),
            self.imputations.iter().map(|i| i.cells).sum::<usize>(),
            self.duration.as_secs_f64()
        )
    }
}

/// Load `input_path`, clean it according to `spec`, and write the result to
/// `output_path`.
///
/// Nothing is written unless every stage succeeds.
///
/// # Errors
///
/// - [`CleanError::Config`] if the spec is invalid (checked before reading)
/// - [`CleanError::NotFound`] / [`CleanError::Parse`] from loading
/// - [`CleanError::Parse`] if strict mode is missing a required column
/// - [`CleanError::Io`] if the output cannot be written
pub fn run_pipeline(
    spec: &PipelineSpec,
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
) -> Result<RunReport> {
    let start = Instant::now();
    let input_path = input_path.as_ref();
    let output_path = output_path.as_ref();

    let (input_delimiter, output_delimiter) = checked_delimiters(spec)?;

    tracing::info!("Loading {}", input_path.display());
    let df = load_csv(input_path, input_delimiter)?;

    let mut report = apply_stages(df, spec)?;

    tracing::info!("Writing {}", output_path.display());
    save_csv(
        &mut report.frame,
        output_path,
        output_delimiter,
        spec.output.overwrite,
    )?;

    report.output_path = Some(output_path.to_path_buf());
    report.duration = start.elapsed();
    tracing::info!("{}", report.summary());
    Ok(report)
}

/// Clean an in-memory dataset without touching the filesystem.
///
/// # Errors
///
/// Same as [`run_pipeline`], minus the I/O cases.
pub fn clean_dataset(df: DataFrame, spec: &PipelineSpec) -> Result<RunReport> {
    let start = Instant::now();
    checked_delimiters(spec)?;
    let mut report = apply_stages(df, spec)?;
    report.duration = start.elapsed();
    Ok(report)
}

fn checked_delimiters(spec: &PipelineSpec) -> Result<(u8, u8)> {
    let errors = validate_spec(spec);
    if !errors.is_empty() {
        return Err(CleanError::Config(format!(
            "Pipeline spec validation failed:\n{}",
            describe(&errors)
        )));
    }

    match (
        parse_delimiter(&spec.input.delimiter),
        parse_delimiter(&spec.output.delimiter),
    ) {
        (Some(input), Some(output)) => Ok((input, output)),
        _ => Err(CleanError::Config("Invalid delimiter".to_owned())),
    }
}

fn apply_stages(df: DataFrame, spec: &PipelineSpec) -> Result<RunReport> {
    let rows_before = df.height();
    let columns_before = df.width();
    let mut warnings = Vec::new();

    let (df, plan) = normalize_column_names(df)?;
    for shadow in &plan.shadowed {
        warnings.push(format!(
            "Column '{}' shadowed by '{}' (both normalize to '{}')",
            shadow.raw, shadow.shadowed_by, shadow.normalized
        ));
    }

    let names: Vec<&str> = plan.columns.iter().map(|c| c.normalized.as_str()).collect();
    let resolution = spec.schema.resolve(&names);

    let errors = validate_columns(spec, &resolution);
    if !errors.is_empty() {
        return Err(CleanError::Parse(describe(&errors)));
    }

    let mut skipped_fields = Vec::new();
    for field in &resolution.missing {
        tracing::warn!(
            "Column '{}' not found; skipping it at every stage",
            field.name
        );
        warnings.push(format!("Column '{}' not found (skipped)", field.name));
        skipped_fields.push(field.name.clone());
    }

    let df = trim_text_columns(df)?;

    let (df, coercions) = coerce_columns(df, &resolution.present)?;
    for c in &coercions {
        warnings.push(format!(
            "{} value(s) in '{}' could not be coerced and were treated as missing",
            c.cells, c.column
        ));
    }

    tracing::debug!("Missing-value policy: {}", spec.missing.as_str());
    let (df, missing) = handle_missing(df, &resolution.present, spec.missing)?;
    warnings.extend(missing.warnings);

    let (df, rows_dropped_invalid) = filter_invalid_rows(df, &resolution.present)?;

    Ok(RunReport {
        rows_before,
        columns_before,
        rows_after: df.height(),
        columns_after: df.width(),
        columns: plan.columns,
        shadowed: plan.shadowed,
        coercions,
        imputations: missing.imputations,
        rows_dropped_missing: missing.rows_dropped,
        rows_dropped_invalid,
        skipped_fields,
        warnings,
        output_path: None,
        duration: Duration::ZERO,
        frame: df,
    })
}
